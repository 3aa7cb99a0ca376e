// ── Runtime session configuration ──
//
// Describes *how* to reach one appliance. Carries credentials and
// polling tuning, but never touches disk. The CLI (or any other host)
// builds a `SessionConfig` and hands it in.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use muxlink_api::{Credentials, TransportConfig};

/// Default poll period for the device registry.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Configuration for one session against one appliance.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Appliance address, optionally with a port.
    pub host: String,
    pub username: String,
    pub password: SecretString,
    /// Numeric system id (`p_targetId`).
    pub system_id: u32,
    /// Re-run the device refresh every `poll_interval`.
    pub polling: bool,
    pub poll_interval: Duration,
    /// Per-request timeout for the HTTP transport.
    pub timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            username: "admin".into(),
            password: SecretString::from("admin".to_owned()),
            system_id: 0,
            polling: true,
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: Duration::from_secs(30),
        }
    }
}

impl SessionConfig {
    /// Host, username and password must all be non-empty before any
    /// request is made.
    pub fn is_connectable(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Names of the required fields that are still empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.host.trim().is_empty() {
            missing.push("host");
        }
        if self.username.is_empty() {
            missing.push("username");
        }
        if self.password.expose_secret().is_empty() {
            missing.push("password");
        }
        missing
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            system_id: self.system_id,
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }

    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            timeout: self.timeout,
            ..TransportConfig::default()
        }
    }
}
