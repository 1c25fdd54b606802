//! Rate-limited HTTP fetching.
//!
//! Every upstream call goes through [`Fetcher::fetch`], which retries 429
//! responses after a fixed backoff and reports every other outcome as a
//! [`FetchOutcome`] instead of an error. Callers classify the status code
//! themselves, because "not found" means different things per endpoint.
//!
//! There is no retry ceiling. A persistently saturated upstream blocks the
//! caller indefinitely, so callers that need a bound wrap the whole run in
//! their own deadline.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use url::Url;

#[cfg(test)]
pub(crate) mod mock;

/// Header carrying the static API credential.
pub const TOKEN_HEADER: &str = "x-riot-token";

const TOO_MANY_REQUESTS: u16 = 429;

/// Errors raised by a transport.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid API key header: {0}")]
    InvalidCredential(String),

    #[error("Transport failure: {0}")]
    Transport(String),
}

/// A raw response as seen by the transport.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// Query parameters for a GET request.
pub type Query = [(&'static str, String)];

/// The network seam under the fetcher.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &Url, query: &Query) -> Result<RawResponse, FetchError>;
}

/// Result of a fetch after rate-limit retries.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    /// HTTP status, `None` when no response was received at all
    pub status: Option<u16>,

    /// Decoded body, present only for successful responses
    pub payload: Option<Value>,
}

impl FetchOutcome {
    /// The payload, if the call succeeded and returned something non-empty.
    pub fn data(&self) -> Option<&Value> {
        self.payload.as_ref().filter(|value| !is_empty_json(value))
    }

    /// A 404, or any 2xx that carried nothing.
    pub fn is_missing(&self) -> bool {
        self.data().is_none() && matches!(self.status, Some(404) | Some(200..=299))
    }

    pub fn into_data(self) -> Option<Value> {
        self.payload.filter(|value| !is_empty_json(value))
    }
}

fn is_empty_json(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Configuration for the HTTP fetcher.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Request timeout
    pub timeout: Duration,

    /// Wait before retrying a rate-limited request
    pub rate_limit_backoff: Duration,

    /// User agent string
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            rate_limit_backoff: Duration::from_secs(5),
            user_agent: format!("duo-tracker/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// `reqwest` transport presenting the API key on every request.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(api_key: &str, config: &FetcherConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("duo-tracker")),
        );
        let mut token = HeaderValue::from_str(api_key)
            .map_err(|e| FetchError::InvalidCredential(e.to_string()))?;
        token.set_sensitive(true);
        headers.insert(TOKEN_HEADER, token);

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &Url, query: &Query) -> Result<RawResponse, FetchError> {
        let response = self.client.get(url.as_str()).query(query).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(RawResponse { status, body })
    }
}

/// Fetcher that absorbs upstream rate limiting.
#[derive(Clone)]
pub struct Fetcher {
    transport: Arc<dyn Transport>,
    backoff: Duration,
}

impl Fetcher {
    pub fn new(transport: Arc<dyn Transport>, backoff: Duration) -> Self {
        Self { transport, backoff }
    }

    /// Build a fetcher over `reqwest` with the given credential.
    pub fn with_api_key(api_key: &str, config: &FetcherConfig) -> Result<Self, FetchError> {
        let transport = ReqwestTransport::new(api_key, config)?;
        Ok(Self::new(Arc::new(transport), config.rate_limit_backoff))
    }

    /// GET `url`, retrying every 429 after the backoff interval.
    pub async fn fetch(&self, url: &Url, query: &Query) -> FetchOutcome {
        loop {
            debug!("GET {}", url);
            let response = match self.transport.get(url, query).await {
                Ok(response) => response,
                Err(e) => {
                    error!("Request to {} failed: {}", url, e);
                    return FetchOutcome {
                        status: None,
                        payload: None,
                    };
                }
            };

            if response.status == TOO_MANY_REQUESTS {
                info!(
                    "Rate limit exceeded. Waiting {} seconds...",
                    self.backoff.as_secs()
                );
                tokio::time::sleep(self.backoff).await;
                continue;
            }

            if !(200..300).contains(&response.status) {
                warn!("{}: request to {} failed", response.status, url);
                return FetchOutcome {
                    status: Some(response.status),
                    payload: None,
                };
            }

            let payload = if response.body.trim().is_empty() {
                None
            } else {
                match serde_json::from_str(&response.body) {
                    Ok(value) => Some(value),
                    Err(e) => {
                        warn!("Unparseable body from {}: {}", url, e);
                        None
                    }
                }
            };

            return FetchOutcome {
                status: Some(response.status),
                payload,
            };
        }
    }
}
