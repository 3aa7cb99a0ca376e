//! Profile configuration for muxlink.
//!
//! TOML profiles, password resolution (env + keyring + plaintext), and
//! translation to `muxlink_core::SessionConfig`. The CLI layers its
//! flag overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use muxlink_core::SessionConfig;

/// Keyring service name for stored passwords.
pub const KEYRING_SERVICE: &str = "muxlink";

/// Password fallback read after a profile's own `password_env`.
pub const PASSWORD_ENV: &str = "MUXLINK_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String, available: Vec<String> },

    #[error("no password configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("keyring error: {0}")]
    Keyring(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named appliance profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Look up a profile, falling back to `default_profile`.
    pub fn profile(&self, name: Option<&str>) -> Result<(String, &Profile), ConfigError> {
        let name = name
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into());

        match self.profiles.get(&name) {
            Some(profile) => Ok((name, profile)),
            None => {
                let mut available: Vec<String> = self.profiles.keys().cloned().collect();
                available.sort();
                Err(ConfigError::ProfileNotFound { name, available })
            }
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

/// A named appliance profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Appliance address, optionally with a port (e.g., "192.168.168.50").
    pub host: String,

    #[serde(default = "default_username")]
    pub username: String,

    /// Password (plaintext — prefer keyring or env var).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Environment variable name containing the password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_env: Option<String>,

    /// Numeric system id sent as `p_targetId`.
    #[serde(default)]
    pub system_id: u32,

    #[serde(default = "default_polling")]
    pub polling: bool,

    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Override the global timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Profile {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            username: default_username(),
            password: None,
            password_env: None,
            system_id: 0,
            polling: default_polling(),
            poll_interval_secs: default_poll_interval(),
            timeout_secs: None,
        }
    }
}

fn default_username() -> String {
    "admin".into()
}
fn default_polling() -> bool {
    true
}
fn default_poll_interval() -> u64 {
    muxlink_core::DEFAULT_POLL_INTERVAL.as_secs()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "muxlink", "muxlink").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("muxlink");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from `path` + environment.
///
/// Environment keys use `__` as the nesting separator, e.g.
/// `MUXLINK_PROFILES__LAB__HOST`. A missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("MUXLINK_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist or is
/// unreadable.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Password resolution ─────────────────────────────────────────────

/// Where a resolved password came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordSource {
    Env(String),
    Keyring,
    Plaintext,
}

impl std::fmt::Display for PasswordSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Env(var) => write!(f, "env:{var}"),
            Self::Keyring => f.write_str("keyring"),
            Self::Plaintext => f.write_str("config file"),
        }
    }
}

/// Resolve a profile's password.
///
/// Chain: the profile's `password_env` variable, then `MUXLINK_PASSWORD`,
/// then the system keyring (`muxlink`, `<profile>/password`), then the
/// plaintext `password` field.
pub fn resolve_password(
    profile: &Profile,
    profile_name: &str,
) -> Result<(SecretString, PasswordSource), ConfigError> {
    resolve_password_with(
        profile,
        profile_name,
        |var| std::env::var(var).ok(),
        keyring_password,
    )
}

fn resolve_password_with(
    profile: &Profile,
    profile_name: &str,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl Fn(&str) -> Option<String>,
) -> Result<(SecretString, PasswordSource), ConfigError> {
    // 1. Profile's password_env → env var lookup
    if let Some(ref var) = profile.password_env {
        if let Some(val) = env(var).filter(|v| !v.is_empty()) {
            return Ok((SecretString::from(val), PasswordSource::Env(var.clone())));
        }
    }

    // 2. Global env var
    if let Some(val) = env(PASSWORD_ENV).filter(|v| !v.is_empty()) {
        return Ok((SecretString::from(val), PasswordSource::Env(PASSWORD_ENV.into())));
    }

    // 3. System keyring
    if let Some(val) = keyring(profile_name) {
        return Ok((SecretString::from(val), PasswordSource::Keyring));
    }

    // 4. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok((SecretString::from(pw.clone()), PasswordSource::Plaintext));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))
}

fn keyring_password(profile_name: &str) -> Option<String> {
    keyring_entry(profile_name)
        .and_then(|entry| entry.get_password())
        .ok()
        .filter(|pw| !pw.is_empty())
}

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)
        .and_then(|entry| entry.set_password(password))
        .map_err(|e| ConfigError::Keyring(e.to_string()))
}

// ── Translation to the session layer ────────────────────────────────

/// Build a `SessionConfig` from a profile — no CLI flag overrides.
pub fn profile_to_session_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<SessionConfig, ConfigError> {
    if profile.host.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "host".into(),
            reason: format!("profile '{profile_name}' has no host"),
        });
    }
    if profile.username.is_empty() {
        return Err(ConfigError::Validation {
            field: "username".into(),
            reason: format!("profile '{profile_name}' has an empty username"),
        });
    }

    let (password, _) = resolve_password(profile, profile_name)?;

    Ok(SessionConfig {
        host: profile.host.trim().to_owned(),
        username: profile.username.clone(),
        password,
        system_id: profile.system_id,
        polling: profile.polling,
        poll_interval: Duration::from_secs(profile.poll_interval_secs),
        timeout: Duration::from_secs(profile.timeout_secs.unwrap_or(defaults.timeout)),
    })
}
