//! Page layout: line segmentation and span enumeration.

mod lines;
mod ngrams;

pub use lines::{Line, LineSegmenter};
pub use ngrams::NGramEnumerator;
