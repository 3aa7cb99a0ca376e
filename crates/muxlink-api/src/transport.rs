// Transport collaborator
//
// The appliance client never talks to `reqwest` directly. It hands a URL
// and a JSON body to a `Transport` and gets back the raw status and body.
// `HttpTransport` is the production implementation; tests and embedding
// hosts can supply their own.

use std::time::Duration;

use async_trait::async_trait;
use tracing::trace;
use url::Url;

use crate::error::Error;

/// What a transport returns when the appliance answered at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl RawResponse {
    /// Build a `200 OK` response around a body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            status_text: "OK".into(),
            body: body.into(),
        }
    }

    /// Only HTTP 200 counts as success; anything else becomes
    /// [`Error::HttpStatus`].
    pub fn into_success(self) -> Result<String, Error> {
        if self.status == 200 {
            Ok(self.body)
        } else {
            Err(Error::HttpStatus {
                status: self.status,
                status_text: self.status_text,
            })
        }
    }
}

/// "Perform this REST call" primitive.
///
/// Implementations POST `body` as JSON to `url` and report either the
/// response or a delivered error. They must not interpret the body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, url: &Url, body: &serde_json::Value) -> Result<RawResponse, Error>;
}

// ── HTTP implementation ──────────────────────────────────────────────

/// Settings for building the `reqwest::Client` behind [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!("muxlink/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .build()
            .map_err(|e| Error::ClientBuild(e.to_string()))
    }
}

/// [`Transport`] backed by a `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: config.build_client()?,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, url: &Url, body: &serde_json::Value) -> Result<RawResponse, Error> {
        let resp = self
            .http
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| Error::from_reqwest(&e))?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| Error::from_reqwest(&e))?;
        trace!(status = status.as_u16(), len = text.len(), "response received");

        Ok(RawResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_owned(),
            body: text,
        })
    }
}
