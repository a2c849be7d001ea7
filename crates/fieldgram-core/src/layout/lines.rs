//! Reading-order line reconstruction from word geometry.

use tracing::{debug, trace};

use crate::error::InputError;
use crate::models::config::SegmentationConfig;
use crate::models::Word;

/// Words of one reconstructed line, left to right.
pub type Line = Vec<Word>;

/// Groups a flat word list into lines using page-relative gap thresholds.
///
/// Words are visited in the source's scan order and compared against the word
/// immediately before them. A word starts a new line when it sits lower than
/// its predecessor by more than `vertical_threshold` of the page height, or
/// when the horizontal gap after its predecessor exceeds `horizontal_threshold`
/// of the page width. The thresholds suit dense, mostly single-column pages;
/// multi-column layouts may interleave.
#[derive(Debug, Clone, Default)]
pub struct LineSegmenter {
    config: SegmentationConfig,
}

impl LineSegmenter {
    /// Create a segmenter with the default thresholds (0.5% height, 5% width).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a segmenter with custom thresholds.
    pub fn with_config(config: SegmentationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SegmentationConfig {
        &self.config
    }

    /// Split `words` into lines for a `width` x `height` pixel page.
    pub fn segment(&self, words: &[Word], width: u32, height: u32) -> Result<Vec<Line>, InputError> {
        let Some(first) = words.first() else {
            return Err(InputError::EmptyWordList);
        };
        if width == 0 || height == 0 {
            return Err(InputError::InvalidPageSize { width, height });
        }

        let (width, height) = (width as f64, height as f64);
        let mut lines = Vec::new();
        let mut line: Line = Vec::new();
        let mut previous = first;

        for word in words {
            let vertical_gap = (word.top as f64 - previous.top as f64) / height;
            let horizontal_gap = (word.left as f64 - previous.right as f64) / width;

            if vertical_gap > self.config.vertical_threshold {
                trace!("vertical break before {:?} ({:.4})", word.text, vertical_gap);
                lines.push(std::mem::take(&mut line));
            } else if horizontal_gap > self.config.horizontal_threshold {
                trace!("horizontal break before {:?} ({:.4})", word.text, horizontal_gap);
                lines.push(std::mem::take(&mut line));
            }
            line.push(word.clone());
            previous = word;
        }
        lines.push(line);

        debug!("Segmented {} words into {} lines", words.len(), lines.len());
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn word(text: &str, left: i32, top: i32, right: i32) -> Word {
        Word::new(text, left, top, right, top + 10)
    }

    fn texts(lines: &[Line]) -> Vec<Vec<&str>> {
        lines
            .iter()
            .map(|l| l.iter().map(|w| w.text.as_str()).collect())
            .collect()
    }

    #[test]
    fn test_empty_word_list() {
        let segmenter = LineSegmenter::new();
        assert_eq!(segmenter.segment(&[], 1000, 100), Err(InputError::EmptyWordList));
    }

    #[test]
    fn test_extreme_coordinates() {
        let segmenter = LineSegmenter::new();
        let words = vec![
            Word::new("far", i32::MIN, i32::MIN, i32::MIN + 10, i32::MIN + 10),
            Word::new("away", i32::MAX - 10, i32::MAX - 10, i32::MAX, i32::MAX),
            Word::new("back", i32::MIN, i32::MIN, i32::MIN + 10, i32::MIN + 10),
        ];
        let lines = segmenter.segment(&words, 1000, 1000).unwrap();
        assert_eq!(texts(&lines), vec![vec!["far"], vec!["away", "back"]]);
    }

    #[test]
    fn test_invalid_page_size() {
        let segmenter = LineSegmenter::new();
        let words = vec![word("a", 0, 0, 10)];
        assert_eq!(
            segmenter.segment(&words, 0, 100),
            Err(InputError::InvalidPageSize { width: 0, height: 100 })
        );
    }

    #[test]
    fn test_horizontal_gap_at_threshold_stays_on_line() {
        let segmenter = LineSegmenter::new();
        let words = vec![word("a", 0, 0, 10), word("b", 60, 0, 70)];
        let lines = segmenter.segment(&words, 1000, 100).unwrap();
        assert_eq!(texts(&lines), vec![vec!["a", "b"]]);
    }

    #[test]
    fn test_horizontal_gap_over_threshold_breaks() {
        let segmenter = LineSegmenter::new();
        let words = vec![word("a", 0, 0, 10), word("b", 61, 0, 71)];
        let lines = segmenter.segment(&words, 1000, 100).unwrap();
        assert_eq!(texts(&lines), vec![vec!["a"], vec!["b"]]);
    }

    #[test]
    fn test_vertical_gap_breaks_regardless_of_horizontal() {
        let segmenter = LineSegmenter::new();
        // 1px down on a 100px page is 1% > 0.5%, even though the words touch.
        let words = vec![word("a", 0, 0, 10), word("b", 10, 1, 20)];
        let lines = segmenter.segment(&words, 1000, 100).unwrap();
        assert_eq!(texts(&lines), vec![vec!["a"], vec!["b"]]);
    }

    #[test]
    fn test_small_vertical_jitter_stays_on_line() {
        let segmenter = LineSegmenter::new();
        let words = vec![
            word("Invoice", 100, 500, 180),
            word("date:", 190, 502, 240),
            word("2021-09-01", 250, 499, 350),
        ];
        let lines = segmenter.segment(&words, 2000, 1000).unwrap();
        assert_eq!(texts(&lines), vec![vec!["Invoice", "date:", "2021-09-01"]]);
    }

    #[test]
    fn test_previous_tracks_every_word() {
        let segmenter = LineSegmenter::new();
        // "c" is compared with "b" (new line), not with "a".
        let words = vec![
            word("a", 0, 0, 10),
            word("b", 0, 50, 10),
            word("c", 15, 50, 25),
            word("d", 0, 100, 10),
        ];
        let lines = segmenter.segment(&words, 1000, 1000).unwrap();
        assert_eq!(texts(&lines), vec![vec!["a"], vec!["b", "c"], vec!["d"]]);
    }

    #[test]
    fn test_custom_thresholds() {
        let segmenter = LineSegmenter::with_config(SegmentationConfig {
            vertical_threshold: 0.005,
            horizontal_threshold: 0.1,
        });
        let words = vec![word("a", 0, 0, 10), word("b", 61, 0, 71)];
        let lines = segmenter.segment(&words, 1000, 100).unwrap();
        assert_eq!(lines.len(), 1);
    }
}
