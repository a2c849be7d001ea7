//! WASM bindings for invoice field candidate extraction.
//!
//! Word geometry comes from the host (browser OCR, a detection service, a
//! PDF renderer); this crate runs segmentation, n-gram enumeration and the
//! date/amount matcher on it.

use chrono::NaiveDate;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use fieldgram_core::{
    CandidateExtractor, Clock, ExtractionResult, FieldKind, FieldPatternMatcher, FixedClock, NGram,
    NGramExtractor, Normalizer, Page, Word, WordSourceEngine,
};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Today's date from the JavaScript `Date` object.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserClock;

impl Clock for BrowserClock {
    fn today(&self) -> NaiveDate {
        let now = js_sys::Date::new_0();
        NaiveDate::from_ymd_opt(now.get_full_year() as i32, now.get_month() + 1, now.get_date())
            .unwrap_or_default()
    }
}

fn to_js_error(e: impl ToString) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Clock pinned to `today` (`YYYY-MM-DD`), or to the browser's date.
fn clock_for(today: Option<String>) -> Result<FixedClock, String> {
    match today {
        Some(s) => parse_today(&s),
        None => Ok(FixedClock(BrowserClock.today())),
    }
}

fn parse_today(s: &str) -> Result<FixedClock, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(FixedClock)
        .map_err(|e| format!("invalid date {:?}: {}", s, e))
}

fn run_extractor(
    page: &Page,
    clock: FixedClock,
    max_ngram_length: Option<u32>,
) -> Result<ExtractionResult, String> {
    let mut extractor = CandidateExtractor::with_clock(clock);
    if let Some(max) = max_ngram_length {
        extractor = extractor
            .with_max_ngram_length(max as usize)
            .map_err(|e| e.to_string())?;
    }
    extractor.extract(page).map_err(|e| e.to_string())
}

fn extract_page(page: &Page, clock: FixedClock, max_ngram_length: Option<u32>) -> Result<Vec<NGram>, String> {
    run_extractor(page, clock, max_ngram_length).map(|result| result.ngrams)
}

/// Extraction output with page statistics.
#[derive(Serialize)]
struct ExtractOutput {
    ngrams: Vec<NGram>,
    line_count: usize,
    candidate_count: usize,
    processing_time_ms: u64,
}

impl From<ExtractionResult> for ExtractOutput {
    fn from(result: ExtractionResult) -> Self {
        Self {
            candidate_count: result.candidates().count(),
            line_count: result.line_count,
            processing_time_ms: result.processing_time_ms,
            ngrams: result.ngrams,
        }
    }
}

fn extract_json(page_json: &str, clock: FixedClock, max_ngram_length: Option<u32>) -> Result<String, String> {
    let page: Page = serde_json::from_str(page_json).map_err(|e| format!("invalid page: {}", e))?;
    let ngrams = extract_page(&page, clock, max_ngram_length)?;
    serde_json::to_string(&ngrams).map_err(|e| e.to_string())
}

fn normalize_with(clock: FixedClock, text: &str, tag: &str) -> String {
    let normalizer = Normalizer::with_clock(clock);
    match FieldKind::from(tag) {
        FieldKind::Other(field) => normalizer.normalize_field(text, &field),
        kind => normalizer.normalize(text, &kind),
    }
}

/// Extract n-grams from a page object `{words, width, height}`.
///
/// `today` (`YYYY-MM-DD`) overrides the browser clock for future-date rejection.
#[wasm_bindgen]
pub fn extract_candidates(
    page: JsValue,
    today: Option<String>,
    max_ngram_length: Option<u32>,
) -> Result<JsValue, JsValue> {
    let page: Page = serde_wasm_bindgen::from_value(page).map_err(to_js_error)?;
    let clock = clock_for(today).map_err(to_js_error)?;
    let ngrams = extract_page(&page, clock, max_ngram_length).map_err(to_js_error)?;

    serde_wasm_bindgen::to_value(&ngrams).map_err(to_js_error)
}

/// Like [`extract_candidates`], also reporting line and candidate counts
/// and the processing time.
#[wasm_bindgen]
pub fn extract_with_metadata(
    page: JsValue,
    today: Option<String>,
    max_ngram_length: Option<u32>,
) -> Result<JsValue, JsValue> {
    let page: Page = serde_wasm_bindgen::from_value(page).map_err(to_js_error)?;
    let clock = clock_for(today).map_err(to_js_error)?;
    let result = run_extractor(&page, clock, max_ngram_length).map_err(to_js_error)?;

    serde_wasm_bindgen::to_value(&ExtractOutput::from(result)).map_err(to_js_error)
}

/// Extract n-grams from a page given as a JSON string; returns a JSON array.
#[wasm_bindgen]
pub fn extract_candidates_json(
    page_json: &str,
    today: Option<String>,
    max_ngram_length: Option<u32>,
) -> Result<String, JsValue> {
    let clock = clock_for(today).map_err(to_js_error)?;
    extract_json(page_json, clock, max_ngram_length).map_err(to_js_error)
}

/// Whether `text` contains a value of kind `tag` (`date` or `amount`).
#[wasm_bindgen]
pub fn detect_field(text: &str, tag: &str, today: Option<String>) -> Result<bool, JsValue> {
    let clock = clock_for(today).map_err(to_js_error)?;
    Ok(FieldPatternMatcher::with_clock(clock).detect(text, &FieldKind::from(tag)))
}

/// Every value of kind `tag` in `text`.
#[wasm_bindgen]
pub fn find_field(text: &str, tag: &str, today: Option<String>) -> Result<JsValue, JsValue> {
    let clock = clock_for(today).map_err(to_js_error)?;
    let found = FieldPatternMatcher::with_clock(clock).find(text, &FieldKind::from(tag));
    serde_wasm_bindgen::to_value(&found).map_err(to_js_error)
}

/// Replace every `tag` match in `text` with `substitute`.
#[wasm_bindgen]
pub fn replace_field(text: &str, tag: &str, substitute: &str) -> String {
    FieldPatternMatcher::with_clock(BrowserClock).replace(text, &FieldKind::from(tag), substitute)
}

/// Canonical form of a date, an amount, or a named invoice field value.
#[wasm_bindgen]
pub fn normalize_field(text: &str, tag: &str, today: Option<String>) -> Result<String, JsValue> {
    let clock = clock_for(today).map_err(to_js_error)?;
    Ok(normalize_with(clock, text, tag))
}

/// Canonical name of a word source engine, accepting aliases.
#[wasm_bindgen]
pub fn engine_name(name: &str) -> Result<String, JsValue> {
    name.parse::<WordSourceEngine>()
        .map(|engine| engine.as_str().to_string())
        .map_err(to_js_error)
}

/// Incremental page builder for browser use.
#[wasm_bindgen]
pub struct PageBuilder {
    words: Vec<Word>,
    clock: FixedClock,
    max_ngram_length: Option<u32>,
}

#[wasm_bindgen]
impl PageBuilder {
    /// Create a builder. `today` (`YYYY-MM-DD`) overrides the browser clock.
    #[wasm_bindgen(constructor)]
    pub fn new(today: Option<String>, max_ngram_length: Option<u32>) -> Result<PageBuilder, JsValue> {
        Ok(Self {
            words: Vec::new(),
            clock: clock_for(today).map_err(to_js_error)?,
            max_ngram_length,
        })
    }

    /// Append a word in the source's scan order.
    #[wasm_bindgen]
    pub fn add_word(&mut self, text: &str, left: i32, top: i32, right: i32, bottom: i32) {
        self.words.push(Word::new(text, left, top, right, bottom));
    }

    /// Number of words added so far.
    #[wasm_bindgen]
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Remove all words.
    #[wasm_bindgen]
    pub fn clear(&mut self) {
        self.words.clear();
    }

    /// Extract n-grams from the collected words on a `width` x `height` page.
    #[wasm_bindgen]
    pub fn extract(&self, width: u32, height: u32) -> Result<JsValue, JsValue> {
        let page = Page::new(self.words.clone(), width, height);
        let ngrams = extract_page(&page, self.clock, self.max_ngram_length).map_err(to_js_error)?;
        serde_wasm_bindgen::to_value(&ngrams).map_err(to_js_error)
    }
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_detect_field_with_today() {
        let today = Some("2021-09-02".to_string());
        assert!(detect_field("Issued 2021-09-01", "date", today.clone()).unwrap());
        assert!(!detect_field("Issued 2021-09-03", "date", today).unwrap());
    }

    #[wasm_bindgen_test]
    fn test_engine_name_alias() {
        assert_eq!(engine_name("textract").unwrap(), "cloud_text_detection");
        assert!(engine_name("abbyy").is_err());
    }

    #[wasm_bindgen_test]
    fn test_page_builder() {
        let mut builder = PageBuilder::new(Some("2021-09-02".to_string()), Some(2)).unwrap();
        builder.add_word("Total", 10, 10, 60, 30);
        builder.add_word("12.5", 70, 10, 110, 30);
        assert_eq!(builder.word_count(), 2);

        let ngrams: Vec<NGram> =
            serde_wasm_bindgen::from_value(builder.extract(1000, 1000).unwrap()).unwrap();
        assert_eq!(ngrams.len(), 3);

        builder.clear();
        assert!(builder.extract(1000, 1000).is_err());
    }
}
