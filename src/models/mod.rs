//! Core data models for records and extraction results.

mod extraction;
mod record;

pub use extraction::{BatchSummary, ExtractionResult, TextSource};
pub use record::Record;
