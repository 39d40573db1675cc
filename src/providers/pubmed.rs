//! PubMed abstract provider using the NCBI E-utilities API.

use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;
use std::sync::Arc;

use super::{join_base, provider_client, send_checked, AbstractProvider, LookupQuery, ProviderError};
use crate::config::Config;
use crate::utils::{normalize_whitespace, HttpClient};

/// Element holding one (possibly labelled) abstract section
const ABSTRACT_TEXT: &[u8] = b"AbstractText";

/// PubMed abstract provider
///
/// Two steps: `esearch` finds the first PMID matching the DOI (or the title
/// when there is no DOI), then `efetch` pulls the record as XML and every
/// `AbstractText` section is joined in document order.
#[derive(Debug, Clone)]
pub struct PubMedProvider {
    client: Arc<HttpClient>,
    base_url: String,
    api_key: Option<String>,
    email: Option<String>,
}

impl PubMedProvider {
    pub fn new(config: &Config) -> Result<Self, ProviderError> {
        let client = provider_client(config)?;
        Ok(Self::with_client(client, &config.endpoints.pubmed)
            .api_key(config.api_keys.ncbi.clone())
            .email(Some(config.http.contact_email.clone())))
    }

    /// Create with a custom HTTP client and E-utilities base (for testing or mirrors)
    pub fn with_client(client: Arc<HttpClient>, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            api_key: None,
            email: None,
        }
    }

    /// Set the NCBI API key (optional, raises the rate limit)
    pub fn api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    /// Set the contact address NCBI uses to reach heavy users
    pub fn email(mut self, email: Option<String>) -> Self {
        self.email = email;
        self
    }

    /// Parameters NCBI asks every E-utilities caller to send
    fn identity_params(&self) -> String {
        let mut params = format!("&tool={}", env!("CARGO_PKG_NAME"));
        if let Some(email) = &self.email {
            params.push_str(&format!("&email={}", urlencoding::encode(email)));
        }
        if let Some(key) = &self.api_key {
            params.push_str(&format!("&api_key={}", urlencoding::encode(key)));
        }
        params
    }

    /// Build E-utilities search URL
    fn build_search_url(&self, term: &str) -> String {
        join_base(
            &self.base_url,
            &format!(
                "/esearch.fcgi?db=pubmed&retmode=json&retmax=1&term={}{}",
                urlencoding::encode(term),
                self.identity_params()
            ),
        )
    }

    /// Build E-utilities fetch URL for one PubMed ID
    fn build_fetch_url(&self, pmid: &str) -> String {
        join_base(
            &self.base_url,
            &format!(
                "/efetch.fcgi?db=pubmed&id={}&retmode=xml{}",
                urlencoding::encode(pmid),
                self.identity_params()
            ),
        )
    }

    async fn search_pmid(&self, term: &str) -> Result<Option<String>, ProviderError> {
        let response = send_checked(self.client.get(&self.build_search_url(term)), self.name()).await?;

        let data: ESearchResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(format!("Failed to parse esearch JSON: {}", e)))?;

        Ok(data.esearchresult.idlist.into_iter().next())
    }

    async fn fetch_record(&self, pmid: &str) -> Result<String, ProviderError> {
        let response = send_checked(self.client.get(&self.build_fetch_url(pmid)), self.name()).await?;

        response
            .text()
            .await
            .map_err(|e| ProviderError::Network(format!("Failed to read response: {}", e)))
    }
}

#[async_trait]
impl AbstractProvider for PubMedProvider {
    fn id(&self) -> &str {
        "pubmed"
    }

    fn name(&self) -> &str {
        "PubMed"
    }

    async fn fetch_abstract(&self, query: &LookupQuery) -> Result<String, ProviderError> {
        let Some(term) = query.doi.as_deref().or(query.title.as_deref()) else {
            tracing::debug!("PubMed skipped: no DOI or title");
            return Ok(String::new());
        };

        let Some(pmid) = self.search_pmid(term).await? else {
            tracing::debug!("PubMed search found no record for {}", term);
            return Ok(String::new());
        };

        let xml = self.fetch_record(&pmid).await?;
        let sections = parse_abstract_sections(&xml);

        tracing::debug!("PubMed {} has {} abstract section(s)", pmid, sections.len());

        Ok(sections.join(" "))
    }
}

/// Collect the text of every `AbstractText` element in document order.
///
/// Inline markup inside a section (`<i>`, `<sup>`, ...) is dropped and its
/// text kept; each section is whitespace-normalized and empty sections are
/// skipped. Malformed markup ends the scan; sections closed before that point
/// are still returned.
pub fn parse_abstract_sections(xml: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().check_end_names = false;
    let mut sections = Vec::new();
    let mut current = String::new();
    // Element depth inside the open AbstractText; 0 when outside one
    let mut depth = 0usize;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!(
                    "PubMed XML malformed at byte {}: {}",
                    reader.buffer_position(),
                    e
                );
                break;
            }
        };

        match event {
            Event::Start(e) => {
                if depth > 0 {
                    depth += 1;
                } else if e.local_name().as_ref() == ABSTRACT_TEXT {
                    depth = 1;
                    current.clear();
                }
            }
            Event::End(_) if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    let section = normalize_whitespace(&current);
                    if !section.is_empty() {
                        sections.push(section);
                    }
                }
            }
            Event::Text(e) if depth > 0 => match e.unescape() {
                Ok(text) => current.push_str(&text),
                // Undeclared entities such as &nbsp; are kept verbatim
                Err(_) => current.push_str(&String::from_utf8_lossy(&e)),
            },
            Event::CData(e) if depth > 0 => current.push_str(&String::from_utf8_lossy(&e)),
            Event::Eof => break,
            _ => {}
        }
    }

    sections
}

// ===== E-utilities API Types =====

#[derive(Debug, Deserialize)]
struct ESearchResponse {
    esearchresult: ESearchResult,
}

#[derive(Debug, Deserialize)]
struct ESearchResult {
    #[serde(default)]
    idlist: Vec<String>,
}
