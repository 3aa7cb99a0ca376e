// ── Core error types ──
//
// Errors surfaced by muxlink-core. Consumers never see raw reqwest or
// serde failures; the `From<muxlink_api::Error>` impl folds every wire
// failure into `Transport`, which is the connection-fatal kind for a
// poll cycle.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Session errors ───────────────────────────────────────────────
    #[error("Session is not configured: {reason}")]
    NotConfigured { reason: String },

    // ── Transport errors ─────────────────────────────────────────────
    /// Network failure, non-200 answer, or a body that is not a reply.
    #[error("{message}")]
    Transport {
        message: String,
        /// HTTP status code, when the appliance answered at all.
        status: Option<u16>,
    },

    // ── Application errors ───────────────────────────────────────────
    /// The appliance answered `FAILED`.
    #[error("{message}")]
    Rejected { message: String },

    /// The appliance answered with neither `SUCCESS` nor `FAILED`.
    #[error("Unrecognized reply status: {status}")]
    UnrecognizedReply { status: String },

    // ── Input errors ─────────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },
}

impl CoreError {
    /// Returns `true` for failures that stop the poll task.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<muxlink_api::Error> for CoreError {
    fn from(err: muxlink_api::Error) -> Self {
        match err {
            muxlink_api::Error::InvalidUrl(e) => CoreError::NotConfigured {
                reason: format!("invalid host: {e}"),
            },
            other => CoreError::Transport {
                status: other.http_status(),
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_keeps_code_and_message() {
        let err = CoreError::from(muxlink_api::Error::HttpStatus {
            status: 401,
            status_text: "Unauthorized".into(),
        });
        assert!(err.is_transport());
        assert_eq!(err.to_string(), "401: Unauthorized");
        assert!(matches!(err, CoreError::Transport { status: Some(401), .. }));
    }

    #[test]
    fn invalid_url_is_a_configuration_problem() {
        let Err(api_err) = muxlink_api::client::endpoint_url("") else {
            panic!("empty host must not produce a URL");
        };
        let err = CoreError::from(api_err);
        assert!(!err.is_transport());
        assert!(matches!(err, CoreError::NotConfigured { .. }));
    }
}
