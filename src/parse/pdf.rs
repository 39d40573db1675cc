//! PDF text extraction.
//!
//! The parser only depends on the [`PdfTextExtractor`] trait. With the `pdf`
//! feature (on by default) [`PdfExtract`] provides an implementation backed
//! by the pdf-extract crate; hosts can plug in their own (an OCR service, a
//! poppler binding) through the pipeline builder.

use super::ParseError;

/// Converts the bytes of a PDF into text
pub trait PdfTextExtractor: Send + Sync + std::fmt::Debug {
    fn extract(&self, bytes: &[u8]) -> Result<String, ParseError>;
}

/// Extractor using the pure-Rust pdf-extract crate
#[cfg(feature = "pdf")]
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtract;

#[cfg(feature = "pdf")]
impl PdfTextExtractor for PdfExtract {
    fn extract(&self, bytes: &[u8]) -> Result<String, ParseError> {
        if !bytes.starts_with(b"%PDF") {
            tracing::debug!("Response declared as PDF lacks the %PDF header");
        }

        // pdf-extract panics on some malformed documents instead of erroring
        match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
            Ok(Ok(text)) => {
                if text.trim().is_empty() {
                    // Scanned or image-only PDF
                    tracing::debug!("Extracted empty text from PDF ({} bytes)", bytes.len());
                }
                Ok(text)
            }
            Ok(Err(e)) => Err(ParseError::Pdf(e.to_string())),
            Err(_) => Err(ParseError::Pdf("extractor panicked on malformed input".to_string())),
        }
    }
}

/// The extractor compiled into this build, if any
pub fn default_extractor() -> Option<std::sync::Arc<dyn PdfTextExtractor>> {
    #[cfg(feature = "pdf")]
    {
        Some(std::sync::Arc::new(PdfExtract))
    }
    #[cfg(not(feature = "pdf"))]
    {
        None
    }
}
