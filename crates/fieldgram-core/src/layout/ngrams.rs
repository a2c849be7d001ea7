//! Contiguous word spans over a line.

use crate::error::FieldgramError;
use crate::models::Word;

/// Enumerates every contiguous span of 1..=`max_length` words in a line.
#[derive(Debug, Clone, Copy)]
pub struct NGramEnumerator {
    max_length: usize,
}

impl NGramEnumerator {
    /// Create an enumerator; `max_length` must be at least 1.
    pub fn new(max_length: usize) -> Result<Self, FieldgramError> {
        if max_length == 0 {
            return Err(FieldgramError::Config(
                "max_ngram_length must be at least 1".to_string(),
            ));
        }
        Ok(Self { max_length })
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Spans of `line`, shortest first, each length in start-offset order.
    pub fn spans<'a>(&self, line: &'a [Word]) -> impl Iterator<Item = &'a [Word]> + 'a {
        let max_length = self.max_length;
        (1..=max_length)
            .filter(move |n| *n <= line.len())
            .flat_map(move |n| line.windows(n))
    }

    /// Number of spans [`spans`](Self::spans) yields for a line of `len` words.
    pub fn count(&self, len: usize) -> usize {
        (1..=self.max_length)
            .map(|n| (len + 1).saturating_sub(n))
            .sum()
    }
}

impl Default for NGramEnumerator {
    fn default() -> Self {
        Self { max_length: 4 }
    }
}
