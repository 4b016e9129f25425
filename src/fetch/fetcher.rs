//! HTTP fetcher implementation
//!
//! This module handles all outbound HTTP requests, including:
//! - Building the HTTP client with the configured user agent and timeouts
//! - GET requests bounded by a per-request timeout
//! - Error classification into timeout, unreachable, status and transport failures

use crate::config::FetcherConfig;
use crate::storage::{FailureKind, FetchFailure};
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: String,

    /// HTTP status code
    pub status_code: u16,

    /// Content-Type header value, if present
    pub content_type: Option<String>,

    /// Full response body
    pub body: Vec<u8>,
}

impl FetchedPage {
    /// Returns true unless the server declared a non-HTML content type
    pub fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .map_or(true, |ct| ct.contains("text/html") || ct.contains("xhtml"))
    }
}

/// Reasons a fetch produced no page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Could not connect to {url}: {message}")]
    Unreachable { url: String, message: String },

    #[error("HTTP {status_code} from {url}")]
    Status { url: String, status_code: u16 },

    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },
}

impl FetchError {
    /// Converts the error into the descriptor stored on a failed result
    pub fn to_failure(&self) -> FetchFailure {
        let (kind, status_code) = match self {
            Self::Timeout { .. } => (FailureKind::Timeout, None),
            Self::Unreachable { .. } => (FailureKind::Unreachable, None),
            Self::Status { status_code, .. } => (FailureKind::HttpStatus, Some(*status_code)),
            Self::Transport { .. } => (FailureKind::Transport, None),
        };

        FetchFailure {
            kind,
            message: self.to_string(),
            status_code,
        }
    }

    fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else if err.is_connect() {
            Self::Unreachable {
                url: url.to_string(),
                message: err.to_string(),
            }
        } else {
            Self::Transport {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }
}

/// Capability to fetch the bytes behind a URL within a time limit
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchedPage, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use pulse_scraper::config::FetcherConfig;
/// use pulse_scraper::fetch::build_http_client;
///
/// let client = build_http_client(&FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent())
        .timeout(config.request_timeout())
        .connect_timeout(config.connect_timeout())
        .redirect(Policy::limited(config.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`PageFetcher`] backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &FetcherConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    /// Fetches a URL with a request timeout covering connect through body read
    ///
    /// # Error Classification
    ///
    /// | Condition | Error |
    /// |-----------|-------|
    /// | Timeout (connect, headers or body) | `Timeout` |
    /// | Connection refused, DNS, TLS | `Unreachable` |
    /// | Non-2xx status | `Status` |
    /// | Anything else | `Transport` |
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        let final_url = response.url().to_string();

        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status_code: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        Ok(FetchedPage {
            final_url,
            status_code: status.as_u16(),
            content_type,
            body: body.to_vec(),
        })
    }
}
