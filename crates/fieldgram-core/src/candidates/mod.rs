//! Candidate n-gram extraction module.

mod extractor;
pub mod rules;

pub use extractor::{CandidateExtractor, ExtractionResult};

use tracing::warn;

use crate::error::FieldgramError;
use crate::models::Page;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, FieldgramError>;

/// Trait for page-level candidate extractors.
pub trait NGramExtractor {
    /// Segment `page` into lines and classify every span.
    fn extract(&self, page: &Page) -> Result<ExtractionResult>;

    /// Extract every page of a document, in order, one result per page.
    ///
    /// A page that fails (a blank page has no words) does not affect the
    /// others. Successful results carry their 1-based page number.
    fn extract_pages(&self, pages: &[Page]) -> Vec<Result<ExtractionResult>> {
        pages
            .iter()
            .enumerate()
            .map(|(i, page)| {
                self.extract(page)
                    .map(|result| ExtractionResult { page: i + 1, ..result })
                    .inspect_err(|e| warn!("Skipping page {}: {}", i + 1, e))
            })
            .collect()
    }
}
