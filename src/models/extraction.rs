//! Extraction result model.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where the final text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextSource {
    DirectPdf,
    DirectHtml,
    Crossref,
    SemanticScholar,
    Pubmed,
    None,
}

impl TextSource {
    /// Returns the source identifier used in logs and output
    pub fn id(&self) -> &'static str {
        match self {
            TextSource::DirectPdf => "direct-pdf",
            TextSource::DirectHtml => "direct-html",
            TextSource::Crossref => "crossref",
            TextSource::SemanticScholar => "semantic-scholar",
            TextSource::Pubmed => "pubmed",
            TextSource::None => "none",
        }
    }
}

impl std::fmt::Display for TextSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Outcome of running the pipeline on one record.
///
/// `text` is either empty with `source == TextSource::None`, or non-empty,
/// whitespace-normalized text supplied by exactly one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub text: String,
    pub source: TextSource,
}

impl ExtractionResult {
    /// A result carrying text from `source`
    pub fn found(text: String, source: TextSource) -> Self {
        Self { text, source }
    }

    /// The terminal result after every source came up empty
    pub fn empty() -> Self {
        Self {
            text: String::new(),
            source: TextSource::None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Per-source tally over a batch of results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub by_source: BTreeMap<TextSource, usize>,
}

impl BatchSummary {
    pub fn from_results(results: &[ExtractionResult]) -> Self {
        let mut summary = Self::default();
        for result in results {
            summary.total += 1;
            *summary.by_source.entry(result.source).or_insert(0) += 1;
        }
        summary
    }

    /// Number of records for which no source produced text
    pub fn unresolved(&self) -> usize {
        self.by_source.get(&TextSource::None).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_serializes_kebab_case() {
        let json = serde_json::to_string(&TextSource::SemanticScholar).unwrap();
        assert_eq!(json, "\"semantic-scholar\"");
        let json = serde_json::to_string(&TextSource::DirectPdf).unwrap();
        assert_eq!(json, "\"direct-pdf\"");
    }

    #[test]
    fn test_display_matches_serde_name() {
        for source in [
            TextSource::DirectPdf,
            TextSource::DirectHtml,
            TextSource::Crossref,
            TextSource::SemanticScholar,
            TextSource::Pubmed,
            TextSource::None,
        ] {
            let json = serde_json::to_string(&source).unwrap();
            assert_eq!(json.trim_matches('"'), source.to_string());
        }
    }

    #[test]
    fn test_empty_result() {
        let result = ExtractionResult::empty();
        assert!(result.is_empty());
        assert_eq!(result.source, TextSource::None);
    }

    #[test]
    fn test_batch_summary() {
        let results = vec![
            ExtractionResult::found("a".into(), TextSource::Crossref),
            ExtractionResult::found("b".into(), TextSource::Crossref),
            ExtractionResult::empty(),
        ];
        let summary = BatchSummary::from_results(&results);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.by_source[&TextSource::Crossref], 2);
        assert_eq!(summary.unresolved(), 1);
    }
}
