//! CLI error types with miette diagnostics.
//!
//! Maps core errors, command outcomes and config failures into user-facing
//! errors with actionable help text and a stable exit code.

use miette::Diagnostic;
use thiserror::Error;

use muxlink_config::ConfigError;
use muxlink_core::{CommandOutcome, CoreError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach appliance at {host}: {reason}")]
    #[diagnostic(
        code(muxlink::connection_failed),
        help(
            "Check that the appliance is powered and reachable.\n\
             Host: {host}\n\
             Try: muxlink devices --host <address>"
        )
    )]
    ConnectionFailed { host: String, reason: String },

    #[error("Request to {host} timed out")]
    #[diagnostic(
        code(muxlink::timeout),
        help("Increase the timeout with --timeout or check the appliance's load.")
    )]
    Timeout { host: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed ({reason})")]
    #[diagnostic(
        code(muxlink::auth_failed),
        help(
            "Verify the username and password for this appliance.\n\
             Run: muxlink config set-password"
        )
    )]
    AuthFailed { reason: String },

    #[error("No password configured for profile '{profile}'")]
    #[diagnostic(
        code(muxlink::no_credentials),
        help(
            "Configure credentials with: muxlink config init\n\
             Or set the MUXLINK_PASSWORD environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Appliance replies ────────────────────────────────────────────

    #[error("{message}")]
    #[diagnostic(
        code(muxlink::command_failed),
        help("The appliance answered FAILED. Run `muxlink devices` to check the endpoints.")
    )]
    CommandFailed { message: String },

    #[error("Appliance returned an unrecognized status: {status}")]
    #[diagnostic(code(muxlink::unrecognized_reply))]
    UnrecognizedReply { status: String },

    #[error("Device '{identifier}' not found")]
    #[diagnostic(
        code(muxlink::not_found),
        help("Run: muxlink devices to see available endpoints")
    )]
    NotFound { identifier: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(muxlink::validation))]
    Validation { field: String, reason: String },

    #[error("Session is not configured: {reason}")]
    #[diagnostic(
        code(muxlink::not_configured),
        help("Set a host and password with: muxlink config init")
    )]
    NotConfigured { reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(muxlink::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: muxlink config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(muxlink::no_config),
        help(
            "Create one with: muxlink config init\n\
             Or pass --host. Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Keyring error: {0}")]
    #[diagnostic(code(muxlink::keyring))]
    Keyring(String),

    #[error(transparent)]
    #[diagnostic(code(muxlink::config))]
    Config(ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NotConfigured { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Translate a core error raised while talking to `host`.
    pub fn from_core(err: CoreError, host: &str) -> Self {
        match err {
            CoreError::NotConfigured { reason } => Self::NotConfigured { reason },
            CoreError::Transport { message, status } => transport_failure(host, message, status),
            CoreError::Rejected { message } => Self::CommandFailed { message },
            CoreError::UnrecognizedReply { status } => Self::UnrecognizedReply { status },
            CoreError::ValidationFailed { message } => Self::Validation {
                field: "input".into(),
                reason: message,
            },
        }
    }

    /// Turn a non-success command outcome into an error.
    pub fn check_outcome(outcome: CommandOutcome, host: &str) -> Result<(), Self> {
        match outcome {
            CommandOutcome::Succeeded => Ok(()),
            CommandOutcome::Rejected { message } => Err(Self::CommandFailed { message }),
            CommandOutcome::TransportFailed { message, status } => {
                Err(transport_failure(host, message, status))
            }
            CommandOutcome::Unrecognized { status } => Err(Self::UnrecognizedReply { status }),
            CommandOutcome::NotConfigured => Err(Self::NotConfigured {
                reason: "session has not been started".into(),
            }),
        }
    }
}

fn transport_failure(host: &str, message: String, status: Option<u16>) -> CliError {
    match status {
        Some(401 | 403) => CliError::AuthFailed { reason: message },
        _ if message.starts_with("ETIMEDOUT") => CliError::Timeout { host: host.into() },
        _ => CliError::ConnectionFailed {
            host: host.into(),
            reason: message,
        },
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::ProfileNotFound { name, available } => Self::ProfileNotFound {
                name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            },
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::Keyring(message) => Self::Keyring(message),
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Config(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_outcomes_pick_the_exit_code() {
        let refused = CliError::check_outcome(
            CommandOutcome::TransportFailed {
                message: "ECONNREFUSED: connection refused".into(),
                status: None,
            },
            "10.0.0.5",
        );
        assert_eq!(refused.map_err(|e| e.exit_code()), Err(exit_code::CONNECTION));

        let timeout = CliError::check_outcome(
            CommandOutcome::TransportFailed {
                message: "ETIMEDOUT: operation timed out".into(),
                status: None,
            },
            "10.0.0.5",
        );
        assert_eq!(timeout.map_err(|e| e.exit_code()), Err(exit_code::TIMEOUT));

        let unauthorized = CliError::check_outcome(
            CommandOutcome::TransportFailed {
                message: "401: Unauthorized".into(),
                status: Some(401),
            },
            "10.0.0.5",
        );
        assert_eq!(unauthorized.map_err(|e| e.exit_code()), Err(exit_code::AUTH));
    }

    #[test]
    fn auth_failure_comes_from_the_status_not_the_message() {
        let forbidden = CliError::check_outcome(
            CommandOutcome::TransportFailed {
                message: "Forbidden".into(),
                status: Some(403),
            },
            "10.0.0.5",
        );
        assert_eq!(forbidden.map_err(|e| e.exit_code()), Err(exit_code::AUTH));

        let no_answer = CliError::check_outcome(
            CommandOutcome::TransportFailed {
                message: "401: proxy refused the tunnel".into(),
                status: None,
            },
            "10.0.0.5",
        );
        assert_eq!(no_answer.map_err(|e| e.exit_code()), Err(exit_code::CONNECTION));
    }

    #[test]
    fn rejected_command_is_a_general_failure() {
        let err = CliError::check_outcome(
            CommandOutcome::Rejected {
                message: "Reboot failed: A".into(),
            },
            "10.0.0.5",
        );
        assert_eq!(err.map_err(|e| e.exit_code()), Err(exit_code::GENERAL));
        assert!(CliError::check_outcome(CommandOutcome::Succeeded, "h").is_ok());
    }

    #[test]
    fn core_transport_errors_keep_http_status() {
        let err = CliError::from_core(
            CoreError::Transport {
                message: "403: Forbidden".into(),
                status: Some(403),
            },
            "10.0.0.5",
        );
        assert_eq!(err.exit_code(), exit_code::AUTH);

        let err = CliError::from_core(
            CoreError::NotConfigured {
                reason: "missing host".into(),
            },
            "",
        );
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }
}
