//! Error types for the fieldgram-core library.

use thiserror::Error;

/// Main error type for the fieldgram library.
#[derive(Error, Debug)]
pub enum FieldgramError {
    /// Word list or page geometry rejected by the segmenter.
    #[error("input error: {0}")]
    Input(#[from] InputError),

    /// Word source failure (OCR, PDF text layer, detection service).
    #[error("word source error: {0}")]
    Source(#[from] SourceError),

    /// Unrecognized word source engine selector.
    #[error("unsupported word source engine: {0}")]
    UnsupportedEngine(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised when a page cannot be segmented.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum InputError {
    /// The page contains no words.
    #[error("word list is empty")]
    EmptyWordList,

    /// Page dimensions must be positive.
    #[error("invalid page size {width}x{height}")]
    InvalidPageSize { width: u32, height: u32 },
}

/// Errors raised by word sources.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Failed to parse the PDF or walk its text layer.
    #[error("failed to read PDF text layer: {0}")]
    Pdf(String),

    /// The document text detection service failed or returned garbage.
    #[error("text detection failed: {0}")]
    Detection(String),
}

/// A date-shaped fragment that names no calendar day.
///
/// Date discovery skips such fragments and carries on with the rest of the text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("could not build a calendar date from {fragment:?}")]
pub struct PatternParseError {
    /// Text fragment that looked like a date but was not one.
    pub fragment: String,
}

/// Result type for the fieldgram library.
pub type Result<T> = std::result::Result<T, FieldgramError>;
