//! Crossref abstract provider.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use super::{join_base, provider_client, send_checked, AbstractProvider, LookupQuery, ProviderError};
use crate::config::Config;
use crate::utils::{strip_tags, HttpClient};

/// Crossref abstract provider
///
/// Uses the Crossref REST API `works/{doi}` route. Abstracts are stored as
/// JATS fragments and are flattened to plain text. Requires a DOI.
#[derive(Debug, Clone)]
pub struct CrossrefProvider {
    client: Arc<HttpClient>,
    base_url: String,
}

impl CrossrefProvider {
    pub fn new(config: &Config) -> Result<Self, ProviderError> {
        let client = provider_client(config)?;
        Ok(Self::with_client(client, &config.endpoints.crossref))
    }

    /// Create with a custom HTTP client and API base (for testing or mirrors)
    pub fn with_client(client: Arc<HttpClient>, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }

    fn work_url(&self, doi: &str) -> String {
        join_base(
            &self.base_url,
            &format!("/works/{}", urlencoding::encode(doi)),
        )
    }
}

#[async_trait]
impl AbstractProvider for CrossrefProvider {
    fn id(&self) -> &str {
        "crossref"
    }

    fn name(&self) -> &str {
        "Crossref"
    }

    async fn fetch_abstract(&self, query: &LookupQuery) -> Result<String, ProviderError> {
        let Some(doi) = query.doi.as_deref() else {
            tracing::debug!("Crossref skipped: no DOI");
            return Ok(String::new());
        };

        let response = send_checked(self.client.get(&self.work_url(doi)), self.name()).await?;

        let data: CRWorkResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(format!("Failed to parse JSON: {}", e)))?;

        Ok(data
            .message
            .r#abstract
            .map(|jats| strip_tags(&jats))
            .unwrap_or_default())
    }
}

// ===== Crossref API Types =====

#[derive(Debug, Deserialize)]
struct CRWorkResponse {
    message: CRWork,
}

#[derive(Debug, Deserialize)]
struct CRWork {
    #[serde(default)]
    r#abstract: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use serde_json::json;

    fn provider(server: &Server) -> CrossrefProvider {
        let config = Config::default();
        CrossrefProvider::with_client(provider_client(&config).unwrap(), &server.url())
    }

    fn doi_query(doi: &str) -> LookupQuery {
        LookupQuery::new(Some(doi.to_string()), None)
    }

    #[test]
    fn test_work_url_encodes_doi() {
        let config = Config::default();
        let provider = CrossrefProvider::new(&config).unwrap();
        assert_eq!(
            provider.work_url("10.1000/xyz 1"),
            "https://api.crossref.org/works/10.1000%2Fxyz%201"
        );
    }

    #[tokio::test]
    async fn test_abstract_is_flattened() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/works/10.1000%2Fxyz123")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "status": "ok",
                    "message": {
                        "DOI": "10.1000/xyz123",
                        "title": ["Example"],
                        "abstract": "<jats:title>Abstract</jats:title>\n  <jats:p>Cells   <jats:italic>divide</jats:italic>.</jats:p>"
                    }
                })
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let text = provider(&server)
            .fetch_abstract(&doi_query("10.1000/xyz123"))
            .await
            .unwrap();

        assert_eq!(text, "Abstract Cells divide.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_abstract_field_is_empty() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/works/10.1000%2Fnoabs")
            .with_status(200)
            .with_body(json!({"message": {"DOI": "10.1000/noabs"}}).to_string())
            .create_async()
            .await;

        let text = provider(&server)
            .fetch_abstract(&doi_query("10.1000/noabs"))
            .await
            .unwrap();
        assert!(text.is_empty());
    }

    #[tokio::test]
    async fn test_no_doi_makes_no_request() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let query = LookupQuery::new(None, Some("Some title".into()));
        let text = provider(&server).lookup(&query).await;
        assert!(text.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unknown_doi_and_server_errors_are_empty_lookups() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/works/10.1000%2Fmissing")
            .with_status(404)
            .with_body("Resource not found.")
            .create_async()
            .await;
        server
            .mock("GET", "/works/10.1000%2Fbroken")
            .with_status(500)
            .create_async()
            .await;

        let p = provider(&server);
        assert!(matches!(
            p.fetch_abstract(&doi_query("10.1000/missing")).await,
            Err(ProviderError::NotFound(_))
        ));
        assert!(matches!(
            p.fetch_abstract(&doi_query("10.1000/broken")).await,
            Err(ProviderError::Api(_))
        ));
        assert!(p.lookup(&doi_query("10.1000/missing")).await.is_empty());
        assert!(p.lookup(&doi_query("10.1000/broken")).await.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_json_is_parse_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/works/10.1000%2Fbad")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let result = provider(&server).fetch_abstract(&doi_query("10.1000/bad")).await;
        assert!(matches!(result, Err(ProviderError::Parse(_))));
    }
}
