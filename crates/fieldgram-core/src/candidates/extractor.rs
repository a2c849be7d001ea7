//! Page-level candidate extraction: lines -> spans -> classified n-grams.

use std::time::Instant;

use tracing::{debug, info};

use super::rules::{FieldPatternMatcher, Normalizer};
use super::{NGramExtractor, Result};
use crate::clock::{Clock, SystemClock};
use crate::layout::{LineSegmenter, NGramEnumerator};
use crate::models::config::{DateOrder, FieldgramConfig, SegmentationConfig};
use crate::models::{FieldKind, NGram, Page, ParsedValue};

/// Result of candidate extraction for one page.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// 1-based page number within the document.
    pub page: usize,
    /// Every span of the page, classified or not.
    pub ngrams: Vec<NGram>,
    /// Number of reconstructed lines.
    pub line_count: usize,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl ExtractionResult {
    /// Spans carrying a date or amount parse.
    pub fn candidates(&self) -> impl Iterator<Item = &NGram> {
        self.ngrams.iter().filter(|n| n.parses.is_some())
    }

    /// Spans classified as `kind`.
    pub fn of_kind<'a>(&'a self, kind: &'a FieldKind) -> impl Iterator<Item = &'a NGram> + 'a {
        self.ngrams
            .iter()
            .filter(move |n| n.parses.as_ref().is_some_and(|p| &p.kind() == kind))
    }
}

/// Segments a page, enumerates spans per line and classifies each span.
#[derive(Debug, Clone)]
pub struct CandidateExtractor<C = SystemClock> {
    segmenter: LineSegmenter,
    enumerator: NGramEnumerator,
    matcher: FieldPatternMatcher<C>,
    normalizer: Normalizer<C>,
}

impl CandidateExtractor<SystemClock> {
    /// Create an extractor with default settings and the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for CandidateExtractor<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock + Clone> CandidateExtractor<C> {
    /// Create an extractor with default settings evaluating "now" through `clock`.
    pub fn with_clock(clock: C) -> Self {
        Self {
            segmenter: LineSegmenter::new(),
            enumerator: NGramEnumerator::default(),
            matcher: FieldPatternMatcher::with_clock(clock.clone()),
            normalizer: Normalizer::with_clock(clock),
        }
    }

    /// Create an extractor from configuration.
    pub fn from_config(config: &FieldgramConfig, clock: C) -> Result<Self> {
        Ok(Self::with_clock(clock)
            .with_segmentation(config.segmentation)
            .with_date_order(config.extraction.date_order)
            .with_max_ngram_length(config.extraction.max_ngram_length)?)
    }

    /// Set line segmentation thresholds.
    pub fn with_segmentation(mut self, config: SegmentationConfig) -> Self {
        self.segmenter = LineSegmenter::with_config(config);
        self
    }

    /// Set the longest span considered.
    pub fn with_max_ngram_length(mut self, max_length: usize) -> Result<Self> {
        self.enumerator = NGramEnumerator::new(max_length)?;
        Ok(self)
    }

    /// Set the preferred reading of ambiguous numeric dates.
    pub fn with_date_order(mut self, order: DateOrder) -> Self {
        self.matcher = self.matcher.with_date_order(order);
        self.normalizer = self.normalizer.with_date_order(order);
        self
    }

    pub fn matcher(&self) -> &FieldPatternMatcher<C> {
        &self.matcher
    }

    pub fn normalizer(&self) -> &Normalizer<C> {
        &self.normalizer
    }

    /// Classify one span's text. Dates take precedence over amounts.
    pub fn classify(&self, text: &str) -> Option<ParsedValue> {
        if let Some(date) = self.matcher.find(text, &FieldKind::Date).into_iter().next() {
            return Some(ParsedValue::Date(date));
        }
        self.matcher
            .find(text, &FieldKind::Amount)
            .into_iter()
            .next()
            .map(|raw| ParsedValue::Amount(self.normalizer.normalize(&raw, &FieldKind::Amount)))
    }
}

impl<C: Clock + Clone> NGramExtractor for CandidateExtractor<C> {
    fn extract(&self, page: &Page) -> Result<ExtractionResult> {
        let start = Instant::now();

        let lines = self.segmenter.segment(&page.words, page.width, page.height)?;

        let mut ngrams = Vec::new();
        for line in &lines {
            ngrams.reserve(self.enumerator.count(line.len()));
            for span in self.enumerator.spans(line) {
                let mut ngram = NGram::new(span.to_vec());
                ngram.parses = self.classify(&ngram.text());
                ngrams.push(ngram);
            }
        }

        let candidates = ngrams.iter().filter(|n| n.parses.is_some()).count();
        debug!(
            "{} lines, {} spans, {} candidates",
            lines.len(),
            ngrams.len(),
            candidates
        );

        let processing_time_ms = start.elapsed().as_millis() as u64;
        info!(
            "Extracted {} candidates from {} words in {}ms",
            candidates,
            page.words.len(),
            processing_time_ms
        );

        Ok(ExtractionResult {
            page: 1,
            ngrams,
            line_count: lines.len(),
            processing_time_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::error::{FieldgramError, InputError};
    use crate::models::Word;
    use pretty_assertions::assert_eq;

    fn extractor() -> CandidateExtractor<FixedClock> {
        CandidateExtractor::with_clock(FixedClock::ymd(2021, 9, 2).unwrap())
    }

    fn invoice_page() -> Page {
        let words = vec![
            Word::new("Invoice", 100, 100, 220, 130),
            Word::new("date:", 230, 101, 300, 130),
            Word::new("2021-09-01", 310, 100, 470, 130),
            Word::new("Total", 100, 400, 180, 430),
            Word::new("due:", 190, 401, 250, 430),
            Word::new("1,234.5", 260, 400, 380, 430),
            Word::new("USD", 390, 400, 450, 430),
        ];
        Page::new(words, 1700, 2200)
    }

    #[test]
    fn test_extract_page() {
        let result = extractor().extract(&invoice_page()).unwrap();

        assert_eq!(result.line_count, 2);
        // 3 words -> 3+2+1 spans, 4 words -> 4+3+2+1 spans
        assert_eq!(result.ngrams.len(), 16);

        let dates: Vec<String> = result.of_kind(&FieldKind::Date).map(|n| n.text()).collect();
        assert_eq!(dates, vec!["2021-09-01", "date: 2021-09-01", "Invoice date: 2021-09-01"]);
        assert!(result
            .of_kind(&FieldKind::Date)
            .all(|n| n.parses == Some(ParsedValue::Date("09-01-2021".to_string()))));

        let amounts: Vec<&NGram> = result.of_kind(&FieldKind::Amount).collect();
        assert_eq!(amounts.len(), 6);
        assert!(amounts
            .iter()
            .all(|n| n.parses == Some(ParsedValue::Amount("1234.50".to_string()))));
    }

    #[test]
    fn test_future_dates_not_candidates() {
        let extractor = CandidateExtractor::with_clock(FixedClock::ymd(2021, 8, 1).unwrap());
        let result = extractor.extract(&invoice_page()).unwrap();
        assert_eq!(result.of_kind(&FieldKind::Date).count(), 0);
    }

    #[test]
    fn test_date_wins_over_amount() {
        assert_eq!(
            extractor().classify("08.12.2021"),
            Some(ParsedValue::Date("08-12-2021".to_string()))
        );
        assert_eq!(
            extractor().classify("Paid 99.90 on 2021-08-30"),
            Some(ParsedValue::Date("08-30-2021".to_string()))
        );
    }

    #[test]
    fn test_amount_parse_is_normalized() {
        assert_eq!(
            extractor().classify("Net 2,000.999"),
            Some(ParsedValue::Amount("2000.99".to_string()))
        );
        assert_eq!(extractor().classify("Qty 3"), None);
        // December is still ahead of the clock, so the dotted digits count as an amount.
        assert_eq!(
            extractor().classify("12.08.2021"),
            Some(ParsedValue::Amount("12.08".to_string()))
        );
    }

    #[test]
    fn test_empty_page_is_input_error() {
        let result = extractor().extract(&Page::new(Vec::new(), 100, 100));
        assert!(matches!(
            result,
            Err(FieldgramError::Input(InputError::EmptyWordList))
        ));
    }

    #[test]
    fn test_blank_page_does_not_fail_document() {
        let pages = vec![
            Page::new(vec![Word::new("Total", 10, 10, 60, 30), Word::new("9.99", 70, 10, 110, 30)], 1000, 1000),
            Page::new(Vec::new(), 1000, 1000),
            invoice_page(),
        ];

        let results = extractor().extract_pages(&pages);
        assert_eq!(results.len(), 3);

        let first = results[0].as_ref().unwrap();
        assert_eq!(first.page, 1);
        assert_eq!(first.candidates().count(), 2);

        assert!(matches!(
            results[1],
            Err(FieldgramError::Input(InputError::EmptyWordList))
        ));

        let third = results[2].as_ref().unwrap();
        assert_eq!(third.page, 3);
        assert_eq!(third.ngrams.len(), 16);
    }

    #[test]
    fn test_from_config_rejects_zero_length() {
        let mut config = FieldgramConfig::default();
        config.extraction.max_ngram_length = 0;
        let result = CandidateExtractor::from_config(&config, FixedClock::ymd(2021, 1, 1).unwrap());
        assert!(matches!(result, Err(FieldgramError::Config(_))));
    }

    #[test]
    fn test_max_ngram_length_from_config() {
        let mut config = FieldgramConfig::default();
        config.extraction.max_ngram_length = 1;
        let extractor =
            CandidateExtractor::from_config(&config, FixedClock::ymd(2021, 9, 2).unwrap()).unwrap();
        let result = extractor.extract(&invoice_page()).unwrap();
        assert_eq!(result.ngrams.len(), 7);
        assert_eq!(result.candidates().count(), 2);
    }
}
