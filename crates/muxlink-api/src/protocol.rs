// Secure API wire types
//
// Every request is a POST of one JSON envelope to `/mnc/secure_api.php`.
// Every reply echoes the command and carries `p_rspStatus`. Fields use
// `#[serde(default)]` liberally because replies differ between firmware
// versions and between commands.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Fixed endpoint path on the appliance.
pub const API_PATH: &str = "/mnc/secure_api.php";

/// MAC the appliance interprets as "no transmitter" on a `connection` command.
pub const SENTINEL_NO_TRANSMITTER: &str = "00-00-00-00-00-00";

// ── Command kinds ────────────────────────────────────────────────────

/// Value of `p_cmd` in the request envelope.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CommandKind {
    GetDevices,
    Connection,
    RebootDevices,
    SelectPreset,
    SavePreset,
    CreatePreset,
    UpdateDevices,
}

// ── Request envelope ─────────────────────────────────────────────────

/// The common request wrapper.
///
/// ```json
/// { "p_targetId": 0, "p_userName": "admin", "p_password": "...",
///   "p_cmd": "connection", "p_data": [ { "macRx": "...", "macTx": "..." } ] }
/// ```
///
/// `p_data` is always a single-element list when present, even though
/// the appliance accepts several entries per call.
#[derive(Clone, Serialize)]
pub struct RequestEnvelope<'a> {
    #[serde(rename = "p_targetId")]
    pub target_id: u32,
    #[serde(rename = "p_userName")]
    pub user_name: &'a str,
    #[serde(rename = "p_password")]
    pub password: &'a str,
    #[serde(rename = "p_cmd")]
    pub cmd: CommandKind,
    #[serde(rename = "p_data", skip_serializing_if = "Option::is_none")]
    pub data: Option<[serde_json::Value; 1]>,
}

impl fmt::Debug for RequestEnvelope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestEnvelope")
            .field("target_id", &self.target_id)
            .field("user_name", &self.user_name)
            .field("password", &"[REDACTED]")
            .field("cmd", &self.cmd)
            .field("data", &self.data)
            .finish()
    }
}

// ── Reply ────────────────────────────────────────────────────────────

/// `p_rspStatus` as sent by the appliance.
///
/// Only `SUCCESS` and `FAILED` are documented; anything else is kept
/// verbatim so the caller can report it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyStatus {
    Success,
    Failed,
    Unrecognized(String),
}

impl ReplyStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
            Self::Unrecognized(s) => s,
        }
    }
}

impl fmt::Display for ReplyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ReplyStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ReplyStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "SUCCESS" => Self::Success,
            "FAILED" => Self::Failed,
            _ => Self::Unrecognized(raw),
        })
    }
}

/// Reply envelope for every command.
///
/// `get_devices` replies carry one object per endpoint in `p_data`;
/// command replies echo the addressed entries with a per-entry status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Reply {
    #[serde(default, rename = "p_targetId")]
    pub target_id: Option<serde_json::Value>,
    #[serde(default, rename = "p_cmd")]
    pub cmd: Option<String>,
    #[serde(default, rename = "p_rspStatus")]
    pub status: Option<ReplyStatus>,
    #[serde(default, rename = "p_msg")]
    pub message: Option<String>,
    #[serde(default, rename = "p_data", deserialize_with = "null_as_empty")]
    pub data: Vec<serde_json::Value>,
}

/// Some firmware sends `"p_data": null` on failure.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default())
}
