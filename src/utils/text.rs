//! Text normalization shared by the document parser and the abstract providers.

use regex::Regex;
use std::sync::OnceLock;

static TAG_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn tag_regex() -> Option<&'static Regex> {
    TAG_RE.get_or_init(|| Regex::new(r"<[^>]*>").ok()).as_ref()
}

/// Collapse every whitespace run to a single space and trim both ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove markup tags such as JATS `<jats:p>` and collapse whitespace.
pub fn strip_tags(text: &str) -> String {
    match tag_regex() {
        Some(re) => normalize_whitespace(&re.replace_all(text, "")),
        None => normalize_whitespace(text),
    }
}
