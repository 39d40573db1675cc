//! Bibliographic record model, the input to the extraction pipeline.

use serde::{Deserialize, Serialize};

/// A paper to be resolved into text.
///
/// Records come from heterogeneous rosters, so deserialization accepts the
/// alternative field names used there: the target URL is `pdfUrl` when set,
/// otherwise `url`; the title is `title` when set, otherwise `paperTitle`.
/// Empty strings count as missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawRecord", rename_all = "camelCase")]
pub struct Record {
    /// URL to fetch the document from
    pub target_url: Option<String>,

    /// Digital Object Identifier, if known
    pub doi: Option<String>,

    /// Paper title
    pub title: Option<String>,
}

impl Record {
    /// Create a record from already-selected fields
    pub fn new(target_url: Option<String>, doi: Option<String>, title: Option<String>) -> Self {
        Self {
            target_url: non_empty(target_url),
            doi: non_empty(doi),
            title: non_empty(title),
        }
    }

    /// Whether the record has anything a source could work with
    pub fn is_blank(&self) -> bool {
        self.target_url.is_none() && self.doi.is_none() && self.title.is_none()
    }
}

/// Wire shape of a record as found in roster files.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecord {
    #[serde(default)]
    pdf_url: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    doi: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    paper_title: Option<String>,
    #[serde(default)]
    target_url: Option<String>,
}

impl From<RawRecord> for Record {
    fn from(raw: RawRecord) -> Self {
        let target_url = non_empty(raw.pdf_url)
            .or_else(|| non_empty(raw.url))
            .or_else(|| non_empty(raw.target_url));
        let title = non_empty(raw.title).or_else(|| non_empty(raw.paper_title));

        Self {
            target_url,
            doi: non_empty(raw.doi),
            title,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
