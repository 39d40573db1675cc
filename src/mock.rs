//! Mock fetcher and provider for testing purposes.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::fetch::{FetchError, FetchedContent, Fetcher};
use crate::providers::{AbstractProvider, LookupQuery, ProviderError};

/// Canned outcome of a mock call
#[derive(Debug, Clone)]
enum Canned<T> {
    Ok(T),
    Err(String),
}

/// A mock fetcher that returns one predefined response for every URL.
#[derive(Debug)]
pub struct MockFetcher {
    response: Canned<FetchedContent>,
    calls: AtomicUsize,
    urls: Mutex<Vec<String>>,
}

impl MockFetcher {
    /// Serve `body` with the given content type.
    pub fn with_body(body: impl Into<Vec<u8>>, content_type: &str) -> Self {
        Self::from_canned(Canned::Ok(FetchedContent::new(body, content_type)))
    }

    /// Fail every fetch with a network error.
    pub fn failing(message: &str) -> Self {
        Self::from_canned(Canned::Err(message.to_string()))
    }

    fn from_canned(response: Canned<FetchedContent>) -> Self {
        Self {
            response,
            calls: AtomicUsize::new(0),
            urls: Mutex::new(Vec::new()),
        }
    }

    /// Number of fetches made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// URLs requested so far, in order.
    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().map(|urls| urls.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedContent, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut urls) = self.urls.lock() {
            urls.push(url.to_string());
        }
        match &self.response {
            Canned::Ok(content) => Ok(content.clone()),
            Canned::Err(message) => Err(FetchError::Network(message.clone())),
        }
    }
}

/// A mock provider that returns one predefined answer and counts calls.
#[derive(Debug)]
pub struct MockProvider {
    id: String,
    response: Canned<String>,
    calls: AtomicUsize,
    queries: Mutex<Vec<LookupQuery>>,
}

impl MockProvider {
    /// Answer every lookup with `text` (empty for "no abstract").
    pub fn returning(id: &str, text: &str) -> Self {
        Self::from_canned(id, Canned::Ok(text.to_string()))
    }

    /// Fail every lookup with an API error.
    pub fn failing(id: &str, message: &str) -> Self {
        Self::from_canned(id, Canned::Err(message.to_string()))
    }

    fn from_canned(id: &str, response: Canned<String>) -> Self {
        Self {
            id: id.to_string(),
            response,
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Number of lookups made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Queries received so far, in order.
    pub fn queries(&self) -> Vec<LookupQuery> {
        self.queries
            .lock()
            .map(|queries| queries.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl AbstractProvider for MockProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.id
    }

    async fn fetch_abstract(&self, query: &LookupQuery) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.clone());
        }
        match &self.response {
            Canned::Ok(text) => Ok(text.clone()),
            Canned::Err(message) => Err(ProviderError::Api(message.clone())),
        }
    }
}
