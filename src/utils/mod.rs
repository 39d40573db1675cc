//! Utility modules supporting extraction.
//!
//! - [`resolve_doi`]: Pick the DOI for a record, explicit field first, then its URL
//! - [`doi_from_url`]: Find a DOI inside a `doi.org` link
//! - [`HttpClient`]: Shared HTTP client with timeouts and a polite user agent
//! - [`normalize_whitespace`]: Collapse runs of whitespace into single spaces
//! - [`strip_tags`]: Drop markup from abstract fragments
//!
//! # DOI resolution
//!
//! ```rust
//! use paper_extract::utils::doi_from_url;
//!
//! assert_eq!(
//!     doi_from_url("https://doi.org/10.1000/xyz123").as_deref(),
//!     Some("10.1000/xyz123")
//! );
//! assert_eq!(doi_from_url("https://example.org/paper"), None);
//! ```

mod doi;
mod http;
mod text;

pub use doi::{doi_from_url, resolve_doi};
pub use http::{user_agent, HttpClient};
pub use text::{normalize_whitespace, strip_tags};
