//! Abstract providers: external services that return an abstract for a paper.
//!
//! Every provider implements [`AbstractProvider`]. The fallible
//! [`fetch_abstract`](AbstractProvider::fetch_abstract) distinguishes "no
//! data" (`Ok` with an empty string) from request and decoding failures;
//! [`lookup`](AbstractProvider::lookup) is the boundary the pipeline uses and
//! never fails: errors are logged and become empty text.
//!
//! Providers are queried at most once per record and are never retried.

mod crossref;
mod pubmed;
mod semantic;

pub use crossref::CrossrefProvider;
pub use pubmed::{parse_abstract_sections, PubMedProvider};
pub use semantic::SemanticScholarProvider;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use std::sync::Arc;

use crate::config::Config;
use crate::models::Record;
use crate::utils::{resolve_doi, user_agent, HttpClient};

/// Identifiers a provider can search by
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupQuery {
    pub doi: Option<String>,
    pub title: Option<String>,
}

impl LookupQuery {
    pub fn new(doi: Option<String>, title: Option<String>) -> Self {
        let clean = |v: Option<String>| {
            v.map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        Self {
            doi: clean(doi),
            title: clean(title),
        }
    }

    /// Resolve the DOI and take the title from a record
    pub fn from_record(record: &Record) -> Self {
        Self::new(resolve_doi(record), record.title.clone())
    }

    pub fn is_empty(&self) -> bool {
        self.doi.is_none() && self.title.is_none()
    }
}

/// A service that can produce an abstract for a paper
#[async_trait]
pub trait AbstractProvider: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this provider (e.g., "crossref")
    fn id(&self) -> &str;

    /// Human-readable name of this provider
    fn name(&self) -> &str;

    /// Look up the abstract; `Ok("")` means the service has none
    async fn fetch_abstract(&self, query: &LookupQuery) -> Result<String, ProviderError>;

    /// Look up the abstract, logging failures and returning empty text for them
    async fn lookup(&self, query: &LookupQuery) -> String {
        match self.fetch_abstract(query).await {
            Ok(text) => text,
            Err(ProviderError::NotFound(what)) => {
                tracing::debug!("{}: not found: {}", self.name(), what);
                String::new()
            }
            Err(e) => {
                tracing::warn!("{} lookup failed: {}", self.name(), e);
                String::new()
            }
        }
    }
}

/// Errors that can occur when talking to a provider
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Network, timeout or TLS error
    #[error("Network error: {0}")]
    Network(String),

    /// The service answered with an unexpected status
    #[error("API error: {0}")]
    Api(String),

    /// The service does not know the identifier
    #[error("{0}")]
    NotFound(String),

    /// The response body could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProviderError::Parse(err.to_string())
        } else {
            ProviderError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::Parse(format!("JSON: {}", err))
    }
}

/// Build the HTTP client shared by the providers
pub fn provider_client(config: &Config) -> Result<Arc<HttpClient>, reqwest::Error> {
    let client = HttpClient::new(
        &user_agent(&config.http.contact_email),
        config.http.provider_timeout(),
        config.http.max_redirects,
    )?;
    Ok(Arc::new(client))
}

/// Send a request and reject non-success statuses
async fn send_checked(request: RequestBuilder, service: &str) -> Result<Response, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|e| ProviderError::Network(format!("Failed to reach {}: {}", service, e)))?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(ProviderError::NotFound(format!(
            "{} returned 404 for {}",
            service,
            response.url().path()
        )));
    }
    if !status.is_success() {
        return Err(ProviderError::Api(format!(
            "{} returned status: {}",
            service, status
        )));
    }

    Ok(response)
}

fn join_base(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_query_trims_and_drops_blank() {
        let query = LookupQuery::new(Some(" 10.1/x ".into()), Some("   ".into()));
        assert_eq!(query.doi.as_deref(), Some("10.1/x"));
        assert_eq!(query.title, None);
        assert!(!query.is_empty());
        assert!(LookupQuery::new(None, Some("".into())).is_empty());
    }

    #[test]
    fn test_lookup_query_from_record_resolves_doi_from_url() {
        let record = Record::new(
            Some("https://doi.org/10.5555/12345678).".into()),
            None,
            Some("A Title".into()),
        );
        let query = LookupQuery::from_record(&record);
        assert_eq!(query.doi.as_deref(), Some("10.5555/12345678"));
        assert_eq!(query.title.as_deref(), Some("A Title"));
    }

    #[test]
    fn test_join_base() {
        assert_eq!(join_base("http://h/", "/works/x"), "http://h/works/x");
        assert_eq!(join_base("http://h", "/works/x"), "http://h/works/x");
    }
}
