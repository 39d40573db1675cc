//! Extraction orchestrator.
//!
//! [`Extractor::extract`] runs one record through a fixed sequence:
//!
//! 1. fetch the record's own URL and parse it (PDF or markup);
//! 2. Crossref abstract;
//! 3. Semantic Scholar abstract;
//! 4. PubMed abstract.
//!
//! The first step producing non-empty text wins. Every failure along the way
//! is logged and treated as "no text from this step"; nothing is retried and
//! `extract` itself never fails.

use futures_util::stream::{self, StreamExt};
use std::sync::Arc;

use crate::config::Config;
use crate::fetch::{Fetcher, HttpFetcher};
use crate::models::{ExtractionResult, Record, TextSource};
use crate::parse::{DocumentKind, DocumentParser, PdfTextExtractor};
use crate::providers::{
    provider_client, AbstractProvider, CrossrefProvider, LookupQuery, PubMedProvider,
    SemanticScholarProvider,
};
use crate::utils::{normalize_whitespace, HttpClient};

/// Errors that can occur while assembling an [`Extractor`]
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to create HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Resolves records into text
///
/// Holds no mutable state; share it behind an `Arc` to process records
/// concurrently.
#[derive(Debug, Clone)]
pub struct Extractor {
    fetcher: Arc<dyn Fetcher>,
    parser: Arc<DocumentParser>,
    crossref: Arc<dyn AbstractProvider>,
    semantic_scholar: Arc<dyn AbstractProvider>,
    pubmed: Arc<dyn AbstractProvider>,
}

impl Extractor {
    /// Create an extractor talking to the services named in `config`
    pub fn from_config(config: &Config) -> Result<Self, BuildError> {
        Self::builder(config.clone()).build()
    }

    /// Start a builder for swapping in custom components
    pub fn builder(config: Config) -> ExtractorBuilder {
        ExtractorBuilder::new(config)
    }

    /// Resolve one record into the best available text
    pub async fn extract(&self, record: &Record) -> ExtractionResult {
        match record.target_url.as_deref() {
            Some(url) => {
                if let Some(result) = self.try_direct(url).await {
                    return result;
                }
            }
            None => tracing::debug!("Record has no URL, going straight to abstract providers"),
        }

        let query = LookupQuery::from_record(record);
        if query.is_empty() {
            tracing::warn!("Record has no URL text, DOI or title; nothing to look up");
            return ExtractionResult::empty();
        }

        for (source, provider) in self.provider_chain() {
            let text = normalize_whitespace(&provider.lookup(&query).await);
            if !text.is_empty() {
                tracing::info!(
                    "Using {} abstract ({} chars) for {}",
                    provider.name(),
                    text.len(),
                    describe(&query)
                );
                return ExtractionResult::found(text, source);
            }
            tracing::info!("{} had no abstract for {}", provider.name(), describe(&query));
        }

        tracing::warn!("No text found for {}", describe(&query));
        ExtractionResult::empty()
    }

    /// Resolve many records, at most `concurrency` at a time.
    ///
    /// Results are returned in input order.
    pub async fn extract_all(&self, records: &[Record], concurrency: usize) -> Vec<ExtractionResult> {
        stream::iter(records.iter().map(|record| self.extract(record)))
            .buffered(concurrency.max(1))
            .collect()
            .await
    }

    /// Step 1: fetch and parse the record's own document
    async fn try_direct(&self, url: &str) -> Option<ExtractionResult> {
        let content = match self.fetcher.fetch(url).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Direct fetch of {} failed: {}", url, e);
                return None;
            }
        };

        // PDF extraction is CPU-bound
        let parser = Arc::clone(&self.parser);
        let parsed = match tokio::task::spawn_blocking(move || parser.parse(&content)).await {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Parsing {} aborted: {}", url, e);
                return None;
            }
        };

        if parsed.text.is_empty() {
            tracing::info!("No text in document at {}, trying abstract providers", url);
            return None;
        }

        let source = match parsed.kind {
            DocumentKind::Pdf => TextSource::DirectPdf,
            DocumentKind::Html => TextSource::DirectHtml,
        };
        tracing::info!("Extracted {} chars from {} ({})", parsed.text.len(), url, source);

        Some(ExtractionResult::found(parsed.text, source))
    }

    /// Steps 2-4, in priority order
    fn provider_chain(&self) -> [(TextSource, &Arc<dyn AbstractProvider>); 3] {
        [
            (TextSource::Crossref, &self.crossref),
            (TextSource::SemanticScholar, &self.semantic_scholar),
            (TextSource::Pubmed, &self.pubmed),
        ]
    }
}

fn describe(query: &LookupQuery) -> String {
    match (&query.doi, &query.title) {
        (Some(doi), _) => format!("DOI {}", doi),
        (None, Some(title)) => format!("\"{}\"", title),
        (None, None) => "record".to_string(),
    }
}

/// Builder for [`Extractor`]
///
/// Components not supplied are built from the configuration. The provider
/// slots are fixed; only their implementations can be swapped.
#[derive(Debug)]
pub struct ExtractorBuilder {
    config: Config,
    fetcher: Option<Arc<dyn Fetcher>>,
    parser: Option<DocumentParser>,
    crossref: Option<Arc<dyn AbstractProvider>>,
    semantic_scholar: Option<Arc<dyn AbstractProvider>>,
    pubmed: Option<Arc<dyn AbstractProvider>>,
}

impl ExtractorBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            fetcher: None,
            parser: None,
            crossref: None,
            semantic_scholar: None,
            pubmed: None,
        }
    }

    pub fn fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Use a specific PDF extractor instead of the built-in one
    pub fn pdf_extractor(mut self, extractor: Arc<dyn PdfTextExtractor>) -> Self {
        self.parser = Some(DocumentParser::new(Some(extractor)));
        self
    }

    /// Skip the body of PDF documents
    pub fn without_pdf(mut self) -> Self {
        self.parser = Some(DocumentParser::without_pdf());
        self
    }

    pub fn crossref(mut self, provider: Arc<dyn AbstractProvider>) -> Self {
        self.crossref = Some(provider);
        self
    }

    pub fn semantic_scholar(mut self, provider: Arc<dyn AbstractProvider>) -> Self {
        self.semantic_scholar = Some(provider);
        self
    }

    pub fn pubmed(mut self, provider: Arc<dyn AbstractProvider>) -> Self {
        self.pubmed = Some(provider);
        self
    }

    pub fn build(self) -> Result<Extractor, BuildError> {
        let config = self.config;

        let fetcher: Arc<dyn Fetcher> = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(HttpFetcher::new(&config.http)?),
        };

        let parser = self.parser.unwrap_or_default();
        if !parser.has_pdf_extractor() {
            tracing::info!("No PDF extractor configured; PDF bodies will be skipped");
        }

        // One connection pool for all built-in providers, created on first use
        let mut shared: Option<Arc<HttpClient>> = None;
        let mut client = || -> Result<Arc<HttpClient>, BuildError> {
            if let Some(client) = &shared {
                return Ok(Arc::clone(client));
            }
            let client = provider_client(&config)?;
            shared = Some(Arc::clone(&client));
            Ok(client)
        };

        let crossref: Arc<dyn AbstractProvider> = match self.crossref {
            Some(provider) => provider,
            None => Arc::new(CrossrefProvider::with_client(
                client()?,
                &config.endpoints.crossref,
            )),
        };

        let semantic_scholar: Arc<dyn AbstractProvider> = match self.semantic_scholar {
            Some(provider) => provider,
            None => Arc::new(
                SemanticScholarProvider::with_client(client()?, &config.endpoints.semantic_scholar)
                    .api_key(config.api_keys.semantic_scholar.clone()),
            ),
        };

        let pubmed: Arc<dyn AbstractProvider> = match self.pubmed {
            Some(provider) => provider,
            None => Arc::new(
                PubMedProvider::with_client(client()?, &config.endpoints.pubmed)
                    .api_key(config.api_keys.ncbi.clone())
                    .email(Some(config.http.contact_email.clone())),
            ),
        };

        Ok(Extractor {
            fetcher,
            parser: Arc::new(parser),
            crossref,
            semantic_scholar,
            pubmed,
        })
    }
}
