//! Rule-based classification and normalization of span text.

pub mod dates;
pub mod matcher;
pub mod normalize;
pub mod patterns;

pub use dates::DateFinder;
pub use matcher::FieldPatternMatcher;
pub use normalize::{normalize_amount, Normalizer};
