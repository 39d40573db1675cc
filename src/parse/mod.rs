//! Document parsing: fetched bytes to normalized plain text.
//!
//! Dispatch is driven by the declared content type only. Anything containing
//! `pdf` goes to the pluggable [`PdfTextExtractor`]; everything else is
//! treated as markup and run through the heuristics in [`html`].

mod html;
mod pdf;

pub use html::{extract_html_text, HtmlBranch};
#[cfg(feature = "pdf")]
pub use pdf::PdfExtract;
pub use pdf::{default_extractor, PdfTextExtractor};

use std::sync::Arc;

use crate::fetch::FetchedContent;
use crate::utils::normalize_whitespace;

/// Errors that can occur while turning a document into text
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// No binary-document extractor is configured
    #[error("PDF extraction not available: no extractor configured")]
    ExtractorUnavailable,

    /// The extractor rejected the document
    #[error("Failed to extract text from PDF: {0}")]
    Pdf(String),
}

/// Kind of document the parser handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Html,
}

/// Text pulled out of a fetched document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocument {
    pub kind: DocumentKind,
    /// Whitespace-normalized; empty means the document had no usable text
    pub text: String,
}

/// Converts fetched content into text
#[derive(Debug, Clone)]
pub struct DocumentParser {
    pdf: Option<Arc<dyn PdfTextExtractor>>,
}

impl DocumentParser {
    /// Create a parser with an explicit PDF extractor (or none)
    pub fn new(pdf: Option<Arc<dyn PdfTextExtractor>>) -> Self {
        Self { pdf }
    }

    /// Parser without PDF support; PDF documents yield empty text
    pub fn without_pdf() -> Self {
        Self { pdf: None }
    }

    pub fn has_pdf_extractor(&self) -> bool {
        self.pdf.is_some()
    }

    /// Which branch a piece of content will take
    pub fn kind_of(content: &FetchedContent) -> DocumentKind {
        if content.is_pdf() {
            DocumentKind::Pdf
        } else {
            DocumentKind::Html
        }
    }

    /// Parse, reporting extractor failures
    pub fn try_parse(&self, content: &FetchedContent) -> Result<ParsedDocument, ParseError> {
        match Self::kind_of(content) {
            DocumentKind::Pdf => {
                let extractor = self.pdf.as_ref().ok_or(ParseError::ExtractorUnavailable)?;
                let raw = extractor.extract(&content.bytes)?;
                Ok(ParsedDocument {
                    kind: DocumentKind::Pdf,
                    text: normalize_whitespace(&raw),
                })
            }
            DocumentKind::Html => {
                let markup = String::from_utf8_lossy(&content.bytes);
                let (text, branch) = extract_html_text(&markup);
                tracing::debug!("Markup text taken from {:?} branch", branch);
                Ok(ParsedDocument {
                    kind: DocumentKind::Html,
                    text,
                })
            }
        }
    }

    /// Parse, turning any failure into empty text
    pub fn parse(&self, content: &FetchedContent) -> ParsedDocument {
        self.try_parse(content).unwrap_or_else(|e| {
            match &e {
                ParseError::ExtractorUnavailable => tracing::warn!("Skipping PDF body: {}", e),
                ParseError::Pdf(_) => tracing::warn!("{}", e),
            }
            ParsedDocument {
                kind: Self::kind_of(content),
                text: String::new(),
            }
        })
    }
}

impl Default for DocumentParser {
    /// Parser using the extractor compiled into this build
    fn default() -> Self {
        Self::new(default_extractor())
    }
}
