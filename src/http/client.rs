//! HTTP client with retry
//!
//! Provides the HTTP client used by listing loaders:
//! - Automatic retries with configurable backoff
//! - Error classification for retry decisions
//! - JSON envelope parsing

use crate::decode::JsonEnvelopeDecoder;
use crate::error::{is_retryable_status, Error, Result};
use crate::types::{BackoffType, StringMap};
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL that relative paths are resolved against
    pub base_url: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Maximum number of retries
    pub max_retries: u32,
    /// Initial delay for backoff
    pub initial_backoff: Duration,
    /// Maximum delay for backoff
    pub max_backoff: Duration,
    /// Type of backoff strategy
    pub backoff_type: BackoffType,
    /// Default headers for all requests
    pub default_headers: StringMap,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(30),
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(60),
            backoff_type: BackoffType::Exponential,
            default_headers: StringMap::new(),
            user_agent: format!("solidafy-pager/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Default settings with relative paths resolved against `base_url`
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            ..Self::default()
        }
    }
}

/// HTTP client with retry
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        if let Some(base) = &config.base_url {
            Url::parse(base)?;
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self { client, config })
    }

    /// Client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Make a GET request, retrying transient failures
    pub async fn get(&self, url: &str, query: &StringMap) -> Result<Response> {
        let full_url = self.build_url(url)?;
        let max_retries = self.config.max_retries;
        let timeout = self.config.timeout;

        let mut last_error = None;
        let mut attempt = 0;

        while attempt <= max_retries {
            let mut req = self.client.get(full_url.clone());

            for (key, value) in &self.config.default_headers {
                req = req.header(key.as_str(), value.as_str());
            }

            if !query.is_empty() {
                req = req.query(query);
            }

            match req.send().await {
                Ok(response) => {
                    let status = response.status();

                    if is_retryable_status(status.as_u16()) && attempt < max_retries {
                        let delay = match extract_retry_after(&response) {
                            Some(wait) if status == StatusCode::TOO_MANY_REQUESTS => {
                                wait.min(self.config.max_backoff)
                            }
                            _ => self.calculate_backoff(attempt),
                        };
                        warn!(
                            status = status.as_u16(),
                            attempt = attempt + 1,
                            max_attempts = max_retries + 1,
                            ?delay,
                            "Request failed, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        last_error = Some(Error::http_status(status.as_u16(), ""));
                        continue;
                    }

                    if status.is_client_error() || status.is_server_error() {
                        let body = response.text().await.unwrap_or_default();
                        return Err(Error::http_status(status.as_u16(), body));
                    }

                    debug!(url = %full_url, status = status.as_u16(), "Request succeeded");
                    return Ok(response);
                }
                Err(e) => {
                    #[allow(clippy::cast_possible_truncation)]
                    let timeout_ms = timeout.as_millis() as u64;

                    if (e.is_timeout() || e.is_connect()) && attempt < max_retries {
                        let delay = self.calculate_backoff(attempt);
                        warn!(
                            error = %e,
                            attempt = attempt + 1,
                            max_attempts = max_retries + 1,
                            ?delay,
                            "Transport error, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        last_error = Some(if e.is_timeout() {
                            Error::Timeout { timeout_ms }
                        } else {
                            Error::Http(e)
                        });
                        continue;
                    }

                    if e.is_timeout() {
                        return Err(Error::Timeout { timeout_ms });
                    }
                    return Err(Error::Http(e));
                }
            }
        }

        // Exhausted all retries
        Err(last_error.unwrap_or(Error::MaxRetriesExceeded { max_retries }))
    }

    /// Make a GET request and parse the body as a JSON envelope
    ///
    /// A body that is not valid JSON is a decode failure, not a transport one.
    pub async fn get_json(&self, url: &str, query: &StringMap) -> Result<Value> {
        let response = self.get(url, query).await?;
        let body = response.text().await?;
        JsonEnvelopeDecoder::parse(&body)
    }

    /// Resolve a path against the base URL; absolute URLs pass through
    pub fn build_url(&self, path: &str) -> Result<Url> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return Ok(Url::parse(path)?);
        }

        match &self.config.base_url {
            Some(base) => {
                let base = base.trim_end_matches('/');
                let path = path.trim_start_matches('/');
                Ok(Url::parse(&format!("{base}/{path}"))?)
            }
            None => Ok(Url::parse(path)?),
        }
    }

    /// Calculate backoff delay for a given attempt
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let delay = match self.config.backoff_type {
            BackoffType::Constant => self.config.initial_backoff,
            BackoffType::Linear => self.config.initial_backoff * (attempt + 1),
            BackoffType::Exponential => {
                let factor = 2u32.saturating_pow(attempt);
                self.config.initial_backoff * factor
            }
        };

        std::cmp::min(delay, self.config.max_backoff)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Extract the retry-after header value
fn extract_retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
        .map(Duration::from_secs)
}
