// ── Endpoint identity ──
//
// The appliance identifies every transmitter and receiver by its MAC,
// written upper-case and dash-separated. Operators type MACs by hand, so
// the common variants are folded into that form before they are compared
// or sent.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use muxlink_api::protocol::SENTINEL_NO_TRANSMITTER;

/// MAC address, normalized to `AA-BB-CC-DD-EE-FF` when the input is a
/// 12-digit hex MAC (dash, colon, dot or no separators).
///
/// Anything else is kept verbatim: free-text input is passed through to
/// the appliance, which has the final say.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct MacAddress(String);

impl MacAddress {
    pub fn new(raw: impl AsRef<str>) -> Self {
        let raw = raw.as_ref().trim();
        let digits: Vec<char> = raw
            .chars()
            .filter(|c| !matches!(c, '-' | ':' | '.'))
            .collect();

        if digits.len() == 12 && digits.iter().all(char::is_ascii_hexdigit) {
            let normalized = digits
                .chunks(2)
                .map(|pair| pair.iter().collect::<String>().to_ascii_uppercase())
                .collect::<Vec<_>>()
                .join("-");
            Self(normalized)
        } else {
            Self(raw.to_owned())
        }
    }

    /// The "no transmitter" MAC used to disconnect a receiver.
    pub fn no_transmitter() -> Self {
        Self(SENTINEL_NO_TRANSMITTER.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` when the value is in canonical `XX-XX-XX-XX-XX-XX` form.
    pub fn is_well_formed(&self) -> bool {
        let bytes = self.0.as_bytes();
        bytes.len() == 17
            && bytes.iter().enumerate().all(|(i, b)| {
                if i % 3 == 2 {
                    *b == b'-'
                } else {
                    b.is_ascii_hexdigit()
                }
            })
    }

    pub fn is_no_transmitter(&self) -> bool {
        self.0 == SENTINEL_NO_TRANSMITTER
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for MacAddress {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<String> for MacAddress {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for MacAddress {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<MacAddress> for String {
    fn from(mac: MacAddress) -> Self {
        mac.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_colons_and_case() {
        let mac = MacAddress::new("aa:bb:cc:dd:ee:0f");
        assert_eq!(mac.as_str(), "AA-BB-CC-DD-EE-0F");
        assert!(mac.is_well_formed());
    }

    #[test]
    fn normalizes_bare_hex() {
        assert_eq!(MacAddress::new("001122334455").as_str(), "00-11-22-33-44-55");
    }

    #[test]
    fn canonical_form_is_unchanged() {
        let mac: MacAddress = "00-11-22-33-44-55".parse().unwrap();
        assert_eq!(mac.to_string(), "00-11-22-33-44-55");
    }

    #[test]
    fn free_text_passes_through() {
        let mac = MacAddress::new(" desk-tx ");
        assert_eq!(mac.as_str(), "desk-tx");
        assert!(!mac.is_well_formed());
    }

    #[test]
    fn sentinel_is_recognized() {
        assert!(MacAddress::no_transmitter().is_no_transmitter());
        assert!(MacAddress::new("00:00:00:00:00:00").is_no_transmitter());
    }

    #[test]
    fn deserialization_normalizes() {
        let mac: MacAddress = serde_json::from_str("\"aa-bb-cc-dd-ee-ff\"").unwrap();
        assert_eq!(mac.as_str(), "AA-BB-CC-DD-EE-FF");
        assert_eq!(serde_json::to_string(&mac).unwrap(), "\"AA-BB-CC-DD-EE-FF\"");
    }
}
