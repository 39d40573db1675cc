//! Content fetching for a record's own URL.
//!
//! [`HttpFetcher`] issues one GET per call with a bounded timeout and a
//! redirect limit and reports the declared content type so the document
//! parser can choose a strategy without looking at the URL.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::sync::Arc;

use crate::config::HttpConfig;
use crate::utils::{user_agent, HttpClient};

/// Accept header sent with direct fetches: documents first, anything else last
pub const ACCEPT_DOCUMENTS: &str =
    "application/pdf, text/html, application/xhtml+xml, application/xml;q=0.9, */*;q=0.8";

/// Raw response body plus its declared content type (lower-cased)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedContent {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl FetchedContent {
    pub fn new(bytes: impl Into<Vec<u8>>, content_type: &str) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: content_type.to_lowercase(),
        }
    }

    /// Whether the declared type selects the binary-document branch
    pub fn is_pdf(&self) -> bool {
        self.content_type.contains("pdf")
    }
}

/// Errors that can occur while fetching a URL
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The URL could not be parsed or uses an unsupported scheme
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The request did not complete in time
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Too many redirects were followed
    #[error("Redirect limit exceeded: {0}")]
    TooManyRedirects(String),

    /// The server answered with a non-success status
    #[error("HTTP status {0}")]
    Status(u16),

    /// Connection, TLS or body read failure
    #[error("Network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(err.to_string())
        } else if err.is_redirect() {
            FetchError::TooManyRedirects(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::Status(status.as_u16())
        } else if err.is_builder() {
            FetchError::InvalidUrl(err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

/// Retrieves the raw content behind a URL
#[async_trait]
pub trait Fetcher: Send + Sync + std::fmt::Debug {
    async fn fetch(&self, url: &str) -> Result<FetchedContent, FetchError>;
}

/// Fetcher backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Arc<HttpClient>,
}

impl HttpFetcher {
    /// Create a fetcher with the timeout, redirect limit and contact address from `config`
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        let client = HttpClient::new(
            &user_agent(&config.contact_email),
            config.fetch_timeout(),
            config.max_redirects,
        )?;

        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// Create with a custom HTTP client
    pub fn with_client(client: Arc<HttpClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedContent, FetchError> {
        let parsed = url::Url::parse(url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
        match parsed.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(FetchError::InvalidUrl(format!(
                    "unsupported scheme: {}",
                    scheme
                )))
            }
        }

        tracing::debug!("Fetching {}", url);

        let response = self
            .client
            .get(parsed.as_str())
            .header(ACCEPT, ACCEPT_DOCUMENTS)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let bytes = response.bytes().await?;

        tracing::debug!(
            "Fetched {} bytes from {} ({})",
            bytes.len(),
            url,
            if content_type.is_empty() {
                "no content type"
            } else {
                content_type.as_str()
            }
        );

        Ok(FetchedContent::new(bytes.to_vec(), &content_type))
    }
}
