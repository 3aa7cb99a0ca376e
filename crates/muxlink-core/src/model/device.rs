// ── Device domain types ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::mac::MacAddress;

/// Transmitter or receiver, derived from the model name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum DeviceRole {
    #[strum(serialize = "tx", serialize = "transmitter")]
    Transmitter,
    #[strum(serialize = "rx", serialize = "receiver")]
    Receiver,
}

/// A model is a transmitter iff its name contains `-TX`.
///
/// There is no "unknown" bucket: every other model, including an empty
/// name, is treated as a receiver.
pub fn classify(model_name: &str) -> DeviceRole {
    if model_name.contains("-TX") {
        DeviceRole::Transmitter
    } else {
        DeviceRole::Receiver
    }
}

/// One appliance endpoint as reported by `get_devices`.
///
/// Only `mac` is typed, so it is the only field that can reject an entry.
/// Every other attribute (names, resolution, frame rate, compression flags,
/// IR/RS-232 settings...) is stored untouched in `extra` and serializes
/// back under its original name and JSON type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub mac: MacAddress,
    /// Catch-all for passthrough fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl DeviceRecord {
    pub fn role(&self) -> DeviceRole {
        classify(self.model_name())
    }

    /// `modelName`, or `""` when it is absent, null or not a string.
    pub fn model_name(&self) -> &str {
        self.text("modelName").unwrap_or_default()
    }

    pub fn custom_name(&self) -> Option<&str> {
        self.text("customName")
    }

    pub fn ip(&self) -> Option<&str> {
        self.text("ip")
    }

    /// Display label: `"<customName> <mac>"`, or just the MAC when the
    /// endpoint has no custom name.
    pub fn label(&self) -> String {
        match self.custom_name().map(str::trim) {
            Some(name) if !name.is_empty() => format!("{name} {}", self.mac),
            _ => self.mac.to_string(),
        }
    }

    /// Raw passthrough field by its wire name.
    pub fn field(&self, name: &str) -> Option<&serde_json::Value> {
        self.extra.get(name)
    }

    fn text(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(serde_json::Value::as_str)
    }

    /// MAC of the transmitter a receiver is currently watching, if any.
    ///
    /// The appliance spells this field with a space: `"connected Mac"`.
    pub fn connected_mac(&self) -> Option<MacAddress> {
        self.field("connected Mac")
            .and_then(serde_json::Value::as_str)
            .filter(|s| !s.is_empty())
            .map(MacAddress::new)
            .filter(|m| !m.is_no_transmitter())
    }
}

impl TryFrom<serde_json::Value> for DeviceRecord {
    type Error = serde_json::Error;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        serde_json::from_value(value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn classify_by_tx_substring() {
        assert_eq!(classify("HDM-TX-100"), DeviceRole::Transmitter);
        assert_eq!(classify("HDM-RX-100"), DeviceRole::Receiver);
        assert_eq!(classify("GENERIC"), DeviceRole::Receiver);
        assert_eq!(classify(""), DeviceRole::Receiver);
        // Case-sensitive, as reported by the appliance.
        assert_eq!(classify("hdm-tx-100"), DeviceRole::Receiver);
    }

    #[test]
    fn role_parses_short_and_long_names() {
        assert_eq!("tx".parse::<DeviceRole>().unwrap(), DeviceRole::Transmitter);
        assert_eq!("Receiver".parse::<DeviceRole>().unwrap(), DeviceRole::Receiver);
        assert!("both".parse::<DeviceRole>().is_err());
    }

    #[test]
    fn record_keeps_passthrough_fields() {
        let raw = json!({
            "mac": "00-11-22-33-44-55",
            "customName": "Desk",
            "modelName": "500778-TX",
            "productName": "HDMI 4K over IP",
            "ip": "192.168.168.50",
            "videoResolution": "1920x1080",
            "is60fps": 1,
            "isAutoCompressionOn": 0,
            "connected Mac": "",
        });
        let record = DeviceRecord::try_from(raw.clone()).unwrap();

        assert_eq!(record.role(), DeviceRole::Transmitter);
        assert_eq!(record.label(), "Desk 00-11-22-33-44-55");
        assert_eq!(record.model_name(), "500778-TX");
        assert_eq!(record.ip(), Some("192.168.168.50"));
        assert_eq!(record.field("is60fps"), Some(&json!(1)));
        assert_eq!(record.field("videoResolution"), Some(&json!("1920x1080")));
        assert_eq!(record.connected_mac(), None);

        assert_eq!(serde_json::to_value(&record).unwrap(), raw);
    }

    #[test]
    fn label_without_custom_name_is_the_mac() {
        let record = DeviceRecord::try_from(json!({ "mac": "B", "modelName": "X-RX" })).unwrap();
        assert_eq!(record.label(), "B");
    }

    #[test]
    fn connected_mac_ignores_the_sentinel() {
        let watching = DeviceRecord::try_from(json!({
            "mac": "B", "modelName": "X-RX", "connected Mac": "00-11-22-33-44-55",
        }))
        .unwrap();
        assert_eq!(
            watching.connected_mac(),
            Some(MacAddress::new("00-11-22-33-44-55"))
        );

        let idle = DeviceRecord::try_from(json!({
            "mac": "B", "modelName": "X-RX", "connected Mac": "00-00-00-00-00-00",
        }))
        .unwrap();
        assert_eq!(idle.connected_mac(), None);
    }

    #[test]
    fn odd_field_types_do_not_reject_the_record() {
        let raw = json!({
            "mac": "00-11-22-33-44-66",
            "modelName": null,
            "customName": 42,
            "ip": 5,
        });
        let record = DeviceRecord::try_from(raw.clone()).unwrap();

        assert_eq!(record.model_name(), "");
        assert_eq!(record.role(), DeviceRole::Receiver);
        assert_eq!(record.custom_name(), None);
        assert_eq!(record.ip(), None);
        assert_eq!(record.label(), "00-11-22-33-44-66");
        assert_eq!(serde_json::to_value(&record).unwrap(), raw);
    }

    #[test]
    fn record_without_mac_is_rejected() {
        assert!(DeviceRecord::try_from(json!({ "modelName": "X-TX" })).is_err());
    }
}
