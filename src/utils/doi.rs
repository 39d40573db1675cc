//! DOI discovery from record fields and URLs.

use regex::Regex;
use std::sync::OnceLock;

use crate::models::Record;

static DOI_URL_RE: OnceLock<Option<Regex>> = OnceLock::new();

/// `doi.org/` followed by a registrant prefix and a suffix that runs to the
/// next whitespace.
fn doi_url_regex() -> Option<&'static Regex> {
    DOI_URL_RE
        .get_or_init(|| Regex::new(r"(?i)doi\.org/(10\.\d{4,9}/\S+)").ok())
        .as_ref()
}

/// Punctuation that commonly trails a DOI copied out of prose or markdown.
const TRAILING_PUNCTUATION: &[char] = &[')', ']', '.', ',', ';'];

/// Resolve the DOI for a record.
///
/// An explicit `doi` field wins (trimmed; blank counts as missing). Otherwise
/// the target URL is searched for a `doi.org/10.xxxx/...` link.
pub fn resolve_doi(record: &Record) -> Option<String> {
    if let Some(doi) = record.doi.as_deref().map(str::trim) {
        if !doi.is_empty() {
            return Some(doi.to_string());
        }
    }

    record.target_url.as_deref().and_then(doi_from_url)
}

/// Pattern-match a DOI out of a URL such as `https://doi.org/10.1000/xyz`.
pub fn doi_from_url(url: &str) -> Option<String> {
    let captures = doi_url_regex()?.captures(url)?;
    let doi = captures
        .get(1)?
        .as_str()
        .trim_end_matches(TRAILING_PUNCTUATION);

    // "10.1234/" followed only by punctuation leaves no suffix
    if doi.ends_with('/') {
        return None;
    }

    Some(doi.to_string())
}
