// ── Command API ──
//
// Every operator intent flows through a unified `Command` enum. Each
// variant maps to exactly one appliance command kind and one
// single-entry `p_data` payload.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use muxlink_api::CommandKind;

use crate::error::CoreError;
use crate::model::MacAddress;

/// All operations the appliance accepts from an operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // ── Routing ──────────────────────────────────────────────────────
    /// Route transmitter `tx` to receiver `rx`.
    Connect { tx: MacAddress, rx: MacAddress },
    /// Route the "no transmitter" sentinel to `rx`.
    Disconnect { rx: MacAddress },

    // ── Device operations ────────────────────────────────────────────
    Reboot { mac: MacAddress },
    SetAttribute {
        mac: MacAddress,
        attribute: DeviceAttribute,
    },

    // ── Presets ──────────────────────────────────────────────────────
    ApplyPreset { preset_id: PresetId },
    SavePreset { preset_id: PresetId },
    CreatePreset { name: String },
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::Connect { .. } | Self::Disconnect { .. } => CommandKind::Connection,
            Self::Reboot { .. } => CommandKind::RebootDevices,
            Self::SetAttribute { .. } => CommandKind::UpdateDevices,
            Self::ApplyPreset { .. } => CommandKind::SelectPreset,
            Self::SavePreset { .. } => CommandKind::SavePreset,
            Self::CreatePreset { .. } => CommandKind::CreatePreset,
        }
    }

    /// The single `p_data` entry for this command.
    pub fn payload(&self) -> Value {
        match self {
            Self::Connect { tx, rx } => json!({ "macRx": rx, "macTx": tx }),
            Self::Disconnect { rx } => json!({
                "macRx": rx,
                "macTx": MacAddress::no_transmitter(),
            }),
            Self::Reboot { mac } => json!({ "mac": mac }),
            Self::SetAttribute { mac, attribute } => {
                let mut entry = serde_json::Map::new();
                entry.insert("mac".into(), Value::String(mac.to_string()));
                entry.insert(attribute.wire_name().into(), attribute.wire_value());
                Value::Object(entry)
            }
            Self::ApplyPreset { preset_id } | Self::SavePreset { preset_id } => {
                json!({ "presetId": preset_id })
            }
            Self::CreatePreset { name } => json!({ "presetName": name }),
        }
    }

    /// Operation name used in log lines.
    pub fn description(&self) -> String {
        match self {
            Self::Connect { .. } => "Connection".into(),
            Self::Disconnect { .. } => "Disconnection".into(),
            Self::Reboot { .. } => "Reboot".into(),
            Self::SetAttribute { attribute, .. } => {
                format!("Device Attribute {} set", attribute.wire_name())
            }
            Self::ApplyPreset { .. } => "Preset Apply".into(),
            Self::SavePreset { .. } => "Preset Save".into(),
            Self::CreatePreset { .. } => "Preset Save New".into(),
        }
    }

    /// Identity of the thing acted on, as shown in log lines.
    pub fn target(&self) -> String {
        match self {
            Self::Connect { tx, rx } => format!("{tx}:{rx}"),
            Self::Disconnect { rx } => rx.to_string(),
            Self::Reboot { mac } | Self::SetAttribute { mac, .. } => mac.to_string(),
            Self::ApplyPreset { preset_id } | Self::SavePreset { preset_id } => {
                preset_id.to_string()
            }
            Self::CreatePreset { name } => name.clone(),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.description(), self.target())
    }
}

// ── Settable device attributes ───────────────────────────────────────

/// The attributes `update_devices` is used for, each with a fixed wire
/// name and value type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceAttribute {
    CustomName(String),
    AutoCompression(bool),
    SixtyFps(bool),
}

impl DeviceAttribute {
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::CustomName(_) => "customName",
            Self::AutoCompression(_) => "isAutoCompressionOn",
            Self::SixtyFps(_) => "is60fps",
        }
    }

    /// Flags travel as the numbers `0` and `1`.
    pub fn wire_value(&self) -> Value {
        match self {
            Self::CustomName(name) => Value::String(name.clone()),
            Self::AutoCompression(on) | Self::SixtyFps(on) => Value::from(u8::from(*on)),
        }
    }
}

// ── Preset identity ──────────────────────────────────────────────────

/// Appliance preset number.
///
/// Operators type it as free text, so parsing validates it. On the wire
/// it is sent as the decimal string the appliance expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct PresetId(u32);

impl PresetId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for PresetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PresetId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        trimmed
            .parse::<u32>()
            .map(Self)
            .map_err(|_| CoreError::ValidationFailed {
                message: format!("preset must be a non-negative number, got {trimmed:?}"),
            })
    }
}

impl TryFrom<String> for PresetId {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<PresetId> for String {
    fn from(id: PresetId) -> Self {
        id.to_string()
    }
}

// ── Outcome ──────────────────────────────────────────────────────────

/// How one dispatched command ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The appliance answered `SUCCESS`.
    Succeeded,
    /// The appliance answered `FAILED`.
    Rejected { message: String },
    /// Network failure, non-200 answer or an unreadable body.
    ///
    /// `status` is set when the appliance answered with a non-200 code.
    TransportFailed {
        message: String,
        status: Option<u16>,
    },
    /// The reply carried neither `SUCCESS` nor `FAILED`.
    Unrecognized { status: String },
    /// The session has no usable host or credentials.
    NotConfigured,
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded => f.write_str("succeeded"),
            Self::Rejected { message } | Self::TransportFailed { message, .. } => {
                f.write_str(message)
            }
            Self::Unrecognized { status } => write!(f, "unrecognized reply status {status:?}"),
            Self::NotConfigured => f.write_str("session is not configured"),
        }
    }
}
