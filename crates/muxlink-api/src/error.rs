use thiserror::Error;

/// Top-level error type for the `muxlink-api` crate.
///
/// Every variant is a transport-level failure from the caller's point of
/// view: the appliance either could not be reached, answered with a
/// non-200 status, or sent a body that is not a reply envelope.
/// Application-level `FAILED` replies are *not* errors here -- they are
/// parsed successfully and interpreted by `muxlink-core`.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// The request never produced an HTTP response (refused, DNS, timeout).
    ///
    /// Rendered as `"<code>: <message>"`.
    #[error("{code}: {message}")]
    Transport { code: String, message: String },

    /// The appliance answered, but not with HTTP 200.
    ///
    /// Rendered as `"<status>: <status message>"`.
    #[error("{status}: {status_text}")]
    HttpStatus { status: u16, status_text: String },

    /// URL construction failed (bad host in configuration).
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The HTTP client itself could not be built.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Classify a `reqwest` failure into an error-code/message pair.
    pub(crate) fn from_reqwest(err: &reqwest::Error) -> Self {
        let code = if err.is_timeout() {
            "ETIMEDOUT"
        } else if err.is_connect() {
            "ECONNREFUSED"
        } else if err.is_body() || err.is_decode() {
            "EBODY"
        } else {
            "EREQUEST"
        };
        Self::Transport {
            code: code.into(),
            message: err.to_string(),
        }
    }

    /// HTTP status carried by the failure, if the appliance answered at all.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_renders_code_and_reason() {
        let err = Error::HttpStatus {
            status: 404,
            status_text: "Not Found".into(),
        };
        assert_eq!(err.to_string(), "404: Not Found");
        assert_eq!(err.http_status(), Some(404));
    }

    #[test]
    fn transport_renders_code_and_message() {
        let err = Error::Transport {
            code: "ECONNREFUSED".into(),
            message: "connection refused".into(),
        };
        assert_eq!(err.to_string(), "ECONNREFUSED: connection refused");
        assert_eq!(err.http_status(), None);
    }
}
