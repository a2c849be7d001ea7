//! Core library for invoice field candidate extraction.
//!
//! This crate provides:
//! - Word sources (local OCR, cloud text detection, PDF text layer)
//! - Layout-aware line segmentation of word boxes
//! - N-gram enumeration over reconstructed lines
//! - Date and amount detection, extraction and normalization with an injectable clock

pub mod candidates;
pub mod clock;
pub mod error;
pub mod layout;
pub mod models;
pub mod source;

pub use candidates::rules::{DateFinder, FieldPatternMatcher, Normalizer, normalize_amount};
pub use candidates::{CandidateExtractor, ExtractionResult, NGramExtractor};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{FieldgramError, InputError, PatternParseError, Result, SourceError};
pub use layout::{Line, LineSegmenter, NGramEnumerator};
pub use models::config::{DateOrder, DpiScaling, FieldgramConfig, WordSourceEngine};
pub use models::{FieldKind, FieldType, NGram, Page, ParsedValue, Word, INVOICE_FIELDS};
pub use source::{source_for_engine, CloudTextSource, DocumentTextDetector, RecordedDetector, WordSource};
#[cfg(feature = "native")]
pub use source::LocalOcrSource;
#[cfg(feature = "pdf")]
pub use source::PdfTextLayerSource;
