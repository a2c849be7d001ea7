//! PDF text layer words via `pdf-extract`.

use pdf_extract::{Document, MediaBox, OutputDev, OutputError, Transform};
use tracing::{debug, info, trace};

use super::WordSource;
use crate::error::{Result, SourceError};
use crate::models::config::{DpiScaling, WordSourceEngine};
use crate::models::{Page, Word};

/// Reads words from the text layer of a born-digital PDF.
///
/// Glyph positions are flipped to a top-left origin and rescaled from PDF
/// points to the configured pixel resolution.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextLayerSource {
    dpi: DpiScaling,
}

impl PdfTextLayerSource {
    pub fn new(dpi: DpiScaling) -> Self {
        Self { dpi }
    }

    pub fn dpi(&self) -> DpiScaling {
        self.dpi
    }
}

impl WordSource for PdfTextLayerSource {
    fn engine(&self) -> WordSourceEngine {
        WordSourceEngine::PdfTextLayer
    }

    fn read_pages(&self, data: &[u8]) -> Result<Vec<Page>> {
        let document = Document::load_mem(data).map_err(|e| SourceError::Pdf(e.to_string()))?;
        if document.is_encrypted() {
            return Err(SourceError::Pdf("document is encrypted".to_string()).into());
        }

        let mut collector = WordCollector::new(self.dpi);
        pdf_extract::output_doc(&document, &mut collector)
            .map_err(|e| SourceError::Pdf(e.to_string()))?;

        let pages = collector.into_pages();
        info!(
            "Read {} words from {} PDF pages",
            pages.iter().map(|p| p.words.len()).sum::<usize>(),
            pages.len()
        );
        Ok(pages)
    }
}

/// Word under construction, in points with a top-left origin.
#[derive(Debug)]
struct PendingWord {
    text: String,
    left: f64,
    top: f64,
    right: f64,
    bottom: f64,
    baseline: f64,
}

/// Output device grouping glyphs into words.
///
/// A word ends at whitespace, at a line end, when the next glyph jumps back
/// or leaves the baseline, or when the gap to the next glyph exceeds a tenth
/// of the font size.
#[derive(Debug)]
struct WordCollector {
    dpi: DpiScaling,
    pages: Vec<Page>,
    words: Vec<Word>,
    pending: Option<PendingWord>,
    origin: (f64, f64),
    size: (f64, f64),
}

impl WordCollector {
    fn new(dpi: DpiScaling) -> Self {
        Self {
            dpi,
            pages: Vec::new(),
            words: Vec::new(),
            pending: None,
            origin: (0.0, 0.0),
            size: (0.0, 0.0),
        }
    }

    /// Start a page with lower-left `(llx, lly)` and upper-right `(urx, ury)`.
    fn start_page(&mut self, llx: f64, lly: f64, urx: f64, ury: f64) {
        self.words.clear();
        self.pending = None;
        self.origin = (llx, ury);
        self.size = (urx - llx, ury - lly);
    }

    /// Add one glyph at PDF position `(x, y)` with horizontal `advance` and
    /// rendered `font_size`, both in points.
    fn glyph(&mut self, x: f64, y: f64, advance: f64, font_size: f64, text: &str) {
        if text.trim().is_empty() {
            self.flush();
            return;
        }

        let left = x - self.origin.0;
        let baseline = self.origin.1 - y;

        if let Some(word) = &self.pending {
            let jumped_back = left < word.left;
            let off_baseline = (baseline - word.baseline).abs() > font_size * 0.5;
            let gap = left > word.right + font_size * 0.1;
            if jumped_back || off_baseline || gap {
                self.flush();
            }
        }

        let right = left + advance;
        let top = baseline - font_size;
        match &mut self.pending {
            Some(word) => {
                word.text.push_str(text);
                word.right = word.right.max(right);
                word.top = word.top.min(top);
                word.bottom = word.bottom.max(baseline);
            }
            None => {
                self.pending = Some(PendingWord {
                    text: text.to_string(),
                    left,
                    top,
                    right,
                    bottom: baseline,
                    baseline,
                });
            }
        }
    }

    fn flush(&mut self) {
        let Some(word) = self.pending.take() else {
            return;
        };
        trace!("word {:?} at ({:.1}, {:.1})", word.text, word.left, word.top);
        self.words.push(Word::new(
            word.text,
            self.dpi.scale(word.left),
            self.dpi.scale(word.top),
            self.dpi.scale(word.right),
            self.dpi.scale(word.bottom),
        ));
    }

    fn finish_page(&mut self) {
        self.flush();
        let width = self.dpi.scale(self.size.0).max(0) as u32;
        let height = self.dpi.scale(self.size.1).max(0) as u32;
        debug!(
            "PDF page {}: {} words, {}x{} px",
            self.pages.len() + 1,
            self.words.len(),
            width,
            height
        );
        self.pages
            .push(Page::new(std::mem::take(&mut self.words), width, height));
    }

    fn into_pages(self) -> Vec<Page> {
        self.pages
    }
}

impl OutputDev for WordCollector {
    fn begin_page(
        &mut self,
        _page_num: u32,
        media_box: &MediaBox,
        _art_box: Option<(f64, f64, f64, f64)>,
    ) -> std::result::Result<(), OutputError> {
        self.start_page(media_box.llx, media_box.lly, media_box.urx, media_box.ury);
        Ok(())
    }

    fn end_page(&mut self) -> std::result::Result<(), OutputError> {
        self.finish_page();
        Ok(())
    }

    fn output_character(
        &mut self,
        trm: &Transform,
        width: f64,
        _spacing: f64,
        font_size: f64,
        char: &str,
    ) -> std::result::Result<(), OutputError> {
        let size = font_size * (trm.m11 * trm.m22).abs().sqrt();
        self.glyph(trm.m31, trm.m32, width * size, size, char);
        Ok(())
    }

    fn begin_word(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }

    fn end_word(&mut self) -> std::result::Result<(), OutputError> {
        Ok(())
    }

    fn end_line(&mut self) -> std::result::Result<(), OutputError> {
        self.flush();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Letter page, 612 x 792 points.
    fn collector() -> WordCollector {
        let mut collector = WordCollector::new(DpiScaling::default());
        collector.start_page(0.0, 0.0, 612.0, 792.0);
        collector
    }

    fn show(collector: &mut WordCollector, x: f64, y: f64, text: &str) {
        let mut x = x;
        for ch in text.chars() {
            collector.glyph(x, y, 6.0, 12.0, &ch.to_string());
            x += 6.0;
        }
    }

    #[test]
    fn test_words_split_on_spaces() {
        let mut c = collector();
        show(&mut c, 72.0, 720.0, "Total 12.50");
        c.finish_page();

        let pages = c.into_pages();
        let texts: Vec<&str> = pages[0].words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["Total", "12.50"]);
    }

    #[test]
    fn test_flip_and_scale() {
        let mut c = collector();
        show(&mut c, 72.0, 720.0, "Hi");
        c.finish_page();

        let page = &c.into_pages()[0];
        // 612pt -> 1700px, 792pt -> 2200px
        assert_eq!((page.width, page.height), (1700, 2200));
        // left 72 -> 200, top 792-720-12=60 -> 166, right 84 -> 233, bottom 72 -> 200
        assert_eq!(page.words[0], Word::new("Hi", 200, 166, 233, 200));
    }

    #[test]
    fn test_gap_and_line_change_split_words() {
        let mut c = collector();
        show(&mut c, 72.0, 720.0, "ab");
        show(&mut c, 120.0, 720.0, "cd");
        show(&mut c, 72.0, 700.0, "ef");
        c.end_line().unwrap();
        show(&mut c, 90.0, 700.0, "gh");
        c.finish_page();

        let texts: Vec<String> = c.into_pages()[0].words.iter().map(|w| w.text.clone()).collect();
        assert_eq!(texts, vec!["ab", "cd", "ef", "gh"]);
    }

    #[test]
    fn test_pages_kept_apart() {
        let mut c = collector();
        show(&mut c, 72.0, 720.0, "one");
        c.finish_page();
        c.start_page(0.0, 0.0, 612.0, 792.0);
        show(&mut c, 72.0, 720.0, "two");
        c.finish_page();

        let pages = c.into_pages();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].words.len(), 1);
        assert_eq!(pages[1].words[0].text, "two");
    }

    #[test]
    fn test_invalid_pdf() {
        let source = PdfTextLayerSource::default();
        assert!(source.read_pages(b"not a pdf").is_err());
    }
}
