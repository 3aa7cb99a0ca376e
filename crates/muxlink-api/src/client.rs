// Appliance API client
//
// Owns the endpoint URL and the static credential triple, wraps every
// command in the request envelope, and turns the transport's raw answer
// into a parsed `Reply`. Interpreting `p_rspStatus` is left to the caller.

use std::fmt;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::protocol::{API_PATH, CommandKind, Reply, RequestEnvelope};
use crate::transport::{HttpTransport, Transport, TransportConfig};

/// Static credentials sent with every request.
#[derive(Clone)]
pub struct Credentials {
    pub system_id: u32,
    pub username: String,
    pub password: SecretString,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("system_id", &self.system_id)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Client for one appliance.
///
/// Cheap to clone; the transport is shared.
#[derive(Clone)]
pub struct ApplianceClient {
    transport: Arc<dyn Transport>,
    host: String,
    url: Url,
    credentials: Credentials,
}

impl ApplianceClient {
    /// Create a client that talks through the given transport.
    ///
    /// `host` is an address with an optional port (`10.0.0.5`,
    /// `kvm.local:8080`). A host that already includes a scheme is used
    /// as the base URL unchanged.
    pub fn new(
        host: &str,
        credentials: Credentials,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, Error> {
        let url = endpoint_url(host)?;
        Ok(Self {
            transport,
            host: host.to_owned(),
            url,
            credentials,
        })
    }

    /// Create a client backed by a fresh [`HttpTransport`].
    pub fn with_http(
        host: &str,
        credentials: Credentials,
        config: &TransportConfig,
    ) -> Result<Self, Error> {
        let transport = HttpTransport::new(config)?;
        Self::new(host, credentials, Arc::new(transport))
    }

    /// The configured host, as given.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Build the request envelope for a command.
    pub fn envelope(
        &self,
        kind: CommandKind,
        payload: Option<serde_json::Value>,
    ) -> RequestEnvelope<'_> {
        RequestEnvelope {
            target_id: self.credentials.system_id,
            user_name: &self.credentials.username,
            password: self.credentials.password.expose_secret(),
            cmd: kind,
            data: payload.map(|p| [p]),
        }
    }

    // ── Requests ─────────────────────────────────────────────────────

    /// Send one command and parse the reply envelope.
    ///
    /// Fails on transport errors, non-200 statuses and bodies that are not
    /// JSON objects. A parsed `FAILED` reply is returned as `Ok`.
    pub async fn send(
        &self,
        kind: CommandKind,
        payload: Option<serde_json::Value>,
    ) -> Result<Reply, Error> {
        let envelope = self.envelope(kind, payload);
        let body = serde_json::to_value(&envelope).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: String::new(),
        })?;

        debug!(cmd = %kind, url = %self.url, "POST");

        let raw = self.transport.post(&self.url, &body).await?;
        let text = raw.into_success()?;

        serde_json::from_str(&text).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: text,
        })
    }

    /// `get_devices`: list every endpoint known to the appliance.
    pub async fn get_devices(&self) -> Result<Reply, Error> {
        self.send(CommandKind::GetDevices, None).await
    }
}

impl fmt::Debug for ApplianceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplianceClient")
            .field("url", &self.url.as_str())
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

/// `http://{host}/mnc/secure_api.php`, or `{host}/mnc/secure_api.php` when
/// the host already names a scheme.
pub fn endpoint_url(host: &str) -> Result<Url, Error> {
    let host = host.trim().trim_end_matches('/');
    if host.is_empty() {
        return Err(Error::InvalidUrl(url::ParseError::EmptyHost));
    }
    let full = if host.contains("://") {
        format!("{host}{API_PATH}")
    } else {
        format!("http://{host}{API_PATH}")
    };
    Ok(Url::parse(&full)?)
}
