//! Semantic Scholar abstract provider.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use super::{join_base, provider_client, send_checked, AbstractProvider, LookupQuery, ProviderError};
use crate::config::Config;
use crate::utils::{normalize_whitespace, HttpClient};

const FIELDS: &str = "title,abstract";

/// Semantic Scholar abstract provider
///
/// Looks the paper up by DOI first and falls back to a title search that
/// takes the single best match.
#[derive(Debug, Clone)]
pub struct SemanticScholarProvider {
    client: Arc<HttpClient>,
    base_url: String,
    api_key: Option<String>,
}

impl SemanticScholarProvider {
    pub fn new(config: &Config) -> Result<Self, ProviderError> {
        let client = provider_client(config)?;
        Ok(Self::with_client(client, &config.endpoints.semantic_scholar)
            .api_key(config.api_keys.semantic_scholar.clone()))
    }

    /// Create with a custom HTTP client and API base (for testing or mirrors)
    pub fn with_client(client: Arc<HttpClient>, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            api_key: None,
        }
    }

    /// Set the API key (optional, for higher rate limits)
    pub fn api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    /// Add API key to request headers if available
    fn add_api_key_if_present(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(ref key) = self.api_key {
            builder.header("x-api-key", key)
        } else {
            builder
        }
    }

    fn paper_url(&self, doi: &str) -> String {
        // The DOI's own slashes stay literal; `#`, `?` and friends must not end the path
        let doi = urlencoding::encode(doi).replace("%2F", "/");
        join_base(
            &self.base_url,
            &format!("/paper/DOI:{}?fields={}", doi, FIELDS),
        )
    }

    async fn by_doi(&self, doi: &str) -> Result<String, ProviderError> {
        let url = self.paper_url(doi);

        let response =
            send_checked(self.add_api_key_if_present(self.client.get(&url)), self.name()).await?;

        let paper: S2Paper = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(format!("Failed to parse JSON: {}", e)))?;

        Ok(paper.abstract_text())
    }

    async fn by_title(&self, title: &str) -> Result<String, ProviderError> {
        let url = join_base(
            &self.base_url,
            &format!(
                "/paper/search?query={}&fields={}&limit=1",
                urlencoding::encode(title),
                FIELDS
            ),
        );

        let response =
            send_checked(self.add_api_key_if_present(self.client.get(&url)), self.name()).await?;

        let data: S2SearchResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(format!("Failed to parse JSON: {}", e)))?;

        Ok(data
            .data
            .first()
            .map(S2Paper::abstract_text)
            .unwrap_or_default())
    }
}

#[async_trait]
impl AbstractProvider for SemanticScholarProvider {
    fn id(&self) -> &str {
        "semantic"
    }

    fn name(&self) -> &str {
        "Semantic Scholar"
    }

    async fn fetch_abstract(&self, query: &LookupQuery) -> Result<String, ProviderError> {
        let mut last_error = None;

        if let Some(doi) = query.doi.as_deref() {
            match self.by_doi(doi).await {
                Ok(text) if !text.is_empty() => return Ok(text),
                Ok(_) => tracing::debug!("Semantic Scholar has no abstract for DOI {}", doi),
                Err(e) => {
                    tracing::debug!("Semantic Scholar DOI lookup failed: {}", e);
                    last_error = Some(e);
                }
            }
        }

        if let Some(title) = query.title.as_deref() {
            match self.by_title(title).await {
                Ok(text) if !text.is_empty() => return Ok(text),
                Ok(_) => {
                    tracing::debug!("Semantic Scholar title search found no abstract");
                    return Ok(String::new());
                }
                Err(e) => last_error = Some(e),
            }
        }

        match last_error {
            Some(e) => Err(e),
            None => Ok(String::new()),
        }
    }
}

// ===== Semantic Scholar API Types =====

#[derive(Debug, Deserialize)]
struct S2Paper {
    #[serde(default)]
    r#abstract: Option<String>,
}

impl S2Paper {
    fn abstract_text(&self) -> String {
        self.r#abstract
            .as_deref()
            .map(normalize_whitespace)
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct S2SearchResponse {
    #[serde(default)]
    data: Vec<S2Paper>,
}
