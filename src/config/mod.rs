//! Configuration management.
//!
//! Configuration is read from a TOML file with environment variable
//! overrides (prefix `PAPER_EXTRACT`, `__` between section and key):
//!
//! ```toml
//! [http]
//! contact_email = "librarian@example.edu"
//! fetch_timeout_ms = 15000
//! provider_timeout_ms = 10000
//! max_redirects = 5
//!
//! [endpoints]
//! crossref = "https://api.crossref.org"
//! semantic_scholar = "https://api.semanticscholar.org/graph/v1"
//! pubmed = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils"
//!
//! [api_keys]
//! semantic_scholar = "your-api-key"
//! ncbi = "your-ncbi-key"
//!
//! [batch]
//! concurrency = 4
//! ```
//!
//! e.g. `PAPER_EXTRACT_HTTP__CONTACT_EMAIL=me@example.org`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "paper-extract.toml";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Base URLs of the external services
    #[serde(default)]
    pub endpoints: EndpointConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeys,

    /// Batch processing settings
    #[serde(default)]
    pub batch: BatchConfig,
}

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Contact address sent in the user agent
    #[serde(default = "default_contact_email")]
    pub contact_email: String,

    /// Timeout for fetching the record's own URL
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,

    /// Timeout for each abstract-provider request
    #[serde(default = "default_provider_timeout_ms")]
    pub provider_timeout_ms: u64,

    /// Maximum redirects followed by the direct fetch
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

impl HttpConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_millis(self.provider_timeout_ms)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            contact_email: default_contact_email(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
            provider_timeout_ms: default_provider_timeout_ms(),
            max_redirects: default_max_redirects(),
        }
    }
}

fn default_contact_email() -> String {
    "paper-extract@example.com".to_string()
}

fn default_fetch_timeout_ms() -> u64 {
    15_000
}

fn default_provider_timeout_ms() -> u64 {
    10_000
}

fn default_max_redirects() -> usize {
    5
}

/// Base URLs for the abstract providers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default = "default_crossref_base")]
    pub crossref: String,

    #[serde(default = "default_semantic_scholar_base")]
    pub semantic_scholar: String,

    #[serde(default = "default_pubmed_base")]
    pub pubmed: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            crossref: default_crossref_base(),
            semantic_scholar: default_semantic_scholar_base(),
            pubmed: default_pubmed_base(),
        }
    }
}

fn default_crossref_base() -> String {
    "https://api.crossref.org".to_string()
}

fn default_semantic_scholar_base() -> String {
    "https://api.semanticscholar.org/graph/v1".to_string()
}

fn default_pubmed_base() -> String {
    "https://eutils.ncbi.nlm.nih.gov/entrez/eutils".to_string()
}

/// API keys for external services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeys {
    /// Semantic Scholar API key (optional, for higher rate limits)
    #[serde(default = "default_semantic_scholar_key")]
    pub semantic_scholar: Option<String>,

    /// NCBI E-utilities API key (optional, raises the PubMed rate limit)
    #[serde(default = "default_ncbi_key")]
    pub ncbi: Option<String>,
}

impl Default for ApiKeys {
    fn default() -> Self {
        Self {
            semantic_scholar: default_semantic_scholar_key(),
            ncbi: default_ncbi_key(),
        }
    }
}

fn default_semantic_scholar_key() -> Option<String> {
    std::env::var("SEMANTIC_SCHOLAR_API_KEY").ok()
}

fn default_ncbi_key() -> Option<String> {
    std::env::var("NCBI_API_KEY").ok()
}

/// Batch processing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Records processed at the same time
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}

fn default_concurrency() -> usize {
    4
}

/// Load configuration from a file
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(config::Environment::with_prefix("PAPER_EXTRACT").separator("__"))
        .build()?;

    settings.try_deserialize()
}

/// Find the first existing configuration file.
///
/// Looks for `./paper-extract.toml`, then `<config dir>/paper-extract/config.toml`.
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join(env!("CARGO_PKG_NAME")).join("config.toml"))
        .filter(|path| path.is_file())
}

/// Load from an explicit path, a discovered file, or fall back to defaults
pub fn get_config(path: Option<&Path>) -> Result<Config, config::ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => match find_config_file() {
            Some(found) => {
                tracing::debug!("Using config file: {}", found.display());
                load_config(&found)
            }
            None => Ok(Config::default()),
        },
    }
}
