//! # Paper Extract
//!
//! Turns bibliographic records (a URL, a DOI, a title, or any mix) into plain
//! text for downstream indexing.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (Record, ExtractionResult, TextSource)
//! - [`fetch`]: Retrieving the record's own document over HTTP
//! - [`parse`]: PDF and HTML text extraction
//! - [`providers`]: Crossref, Semantic Scholar and PubMed abstract lookups
//! - [`pipeline`]: The orchestrator that tries each step in a fixed order
//! - [`utils`]: HTTP client, DOI resolution and text helpers
//! - [`config`]: Configuration management
//!
//! ```rust,no_run
//! use paper_extract::{Config, Extractor, Record};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let extractor = Extractor::from_config(&Config::default())?;
//! let record = Record::new(None, Some("10.1038/nature14539".into()), None);
//! let result = extractor.extract(&record).await;
//! println!("[{}] {}", result.source, result.text);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod fetch;
pub mod mock;
pub mod models;
pub mod parse;
pub mod pipeline;
pub mod providers;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use models::{ExtractionResult, Record, TextSource};
pub use pipeline::{BuildError, Extractor, ExtractorBuilder};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
