//! Data models shared across the pipeline.

pub mod config;
pub mod fields;
pub mod ngram;
pub mod word;

pub use fields::{field_type, FieldType, INVOICE_FIELDS};
pub use ngram::{FieldKind, NGram, ParsedValue, DATE_FORMAT};
pub use word::{Page, Word};
