//! Local OCR words using `pure-onnx-ocr`.

use std::cmp::Ordering;
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use super::WordSource;
use crate::error::{Result, SourceError};
use crate::models::config::{OcrConfig, WordSourceEngine};
use crate::models::{Page, Word};

/// Regions whose tops fall in the same band are read left to right.
const ROW_BAND: f64 = 20.0;

/// Word source running PaddleOCR models through `pure-onnx-ocr` (pure Rust,
/// no external ONNX Runtime).
pub struct LocalOcrSource {
    engine: pure_onnx_ocr::engine::OcrEngine,
    config: OcrConfig,
}

impl LocalOcrSource {
    /// Load the detection, recognition and dictionary files named by `config`.
    pub fn from_config(config: OcrConfig) -> Result<Self> {
        let det_path = config.model_path(&config.detection_model);
        let rec_path = config.model_path(&config.recognition_model);
        let dict_path = config.model_path(&config.dictionary);

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| SourceError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", config.model_dir.display());

        Ok(Self { engine, config })
    }

    /// Recognize one page image into words in reading order.
    pub fn recognize(&self, image: &DynamicImage) -> Result<Page> {
        let start = Instant::now();
        let (width, height) = image.dimensions();

        let results = self
            .engine
            .run_from_image(image)
            .map_err(|e| SourceError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        debug!("pure-onnx-ocr returned {} text regions", results.len());

        let mut regions: Vec<Region> = results
            .iter()
            .map(|r| {
                let text = if self.config.keep_unk {
                    r.text.clone()
                } else {
                    r.text.replace("[UNK]", " ")
                };
                Region {
                    text,
                    rect: polygon_rect(&r.bounding_box),
                }
            })
            .collect();

        sort_reading_order(&mut regions);
        let words: Vec<Word> = regions.iter().flat_map(Region::words).collect();

        info!(
            "OCR complete: {} words on {}x{} page in {}ms",
            words.len(),
            width,
            height,
            start.elapsed().as_millis()
        );

        Ok(Page::new(words, width, height))
    }
}

impl WordSource for LocalOcrSource {
    fn engine(&self) -> WordSourceEngine {
        WordSourceEngine::LocalOcr
    }

    fn read_pages(&self, data: &[u8]) -> Result<Vec<Page>> {
        let image = image::load_from_memory(data)
            .map_err(|e| SourceError::Recognition(format!("cannot decode page image: {}", e)))?;
        Ok(vec![self.recognize(&image)?])
    }
}

/// A recognized text region with its axis-aligned rectangle.
#[derive(Debug, Clone)]
struct Region {
    text: String,
    /// `(min_x, min_y, max_x, max_y)`
    rect: (f64, f64, f64, f64),
}

impl Region {
    /// Split the region into words, giving each a slice of the box
    /// proportional to its character offset. Blank regions yield nothing.
    fn words(&self) -> Vec<Word> {
        let (min_x, min_y, max_x, max_y) = self.rect;
        let total = self.text.chars().count();
        if total == 0 {
            return Vec::new();
        }
        let per_char = (max_x - min_x) / total as f64;

        let mut words = Vec::new();
        let mut offset = 0usize;
        let mut current = String::new();
        let mut start = 0usize;

        for ch in self.text.chars().chain(std::iter::once(' ')) {
            if ch.is_whitespace() {
                if !current.is_empty() {
                    let len = current.chars().count();
                    words.push(Word::new(
                        std::mem::take(&mut current),
                        (min_x + per_char * start as f64).floor() as i32,
                        min_y.floor() as i32,
                        (min_x + per_char * (start + len) as f64).ceil() as i32,
                        max_y.ceil() as i32,
                    ));
                }
            } else {
                if current.is_empty() {
                    start = offset;
                }
                current.push(ch);
            }
            offset += 1;
        }
        words
    }
}

/// Sort regions top to bottom in bands, then left to right.
fn sort_reading_order(regions: &mut [Region]) {
    regions.sort_by(|a, b| {
        let row_a = (a.rect.1 / ROW_BAND) as i32;
        let row_b = (b.rect.1 / ROW_BAND) as i32;
        row_a
            .cmp(&row_b)
            .then(a.rect.0.partial_cmp(&b.rect.0).unwrap_or(Ordering::Equal))
    });
}

/// Axis-aligned bounds of a detection polygon.
fn polygon_rect(polygon: &pure_onnx_ocr::Polygon<f64>) -> (f64, f64, f64, f64) {
    polygon.exterior().coords().fold(
        (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        |(min_x, min_y, max_x, max_y), c| {
            (min_x.min(c.x), min_y.min(c.y), max_x.max(c.x), max_y.max(c.y))
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn region(text: &str, rect: (f64, f64, f64, f64)) -> Region {
        Region {
            text: text.to_string(),
            rect,
        }
    }

    #[test]
    fn test_region_split_by_char_count() {
        // 10 chars over 100px: 10px per char
        let words = region("Total 12.5", (0.0, 5.0, 100.0, 25.0)).words();
        assert_eq!(
            words,
            vec![
                Word::new("Total", 0, 5, 50, 25),
                Word::new("12.5", 60, 5, 100, 25),
            ]
        );
    }

    #[test]
    fn test_blank_region_dropped() {
        assert!(region("", (0.0, 0.0, 10.0, 10.0)).words().is_empty());
        assert!(region("   ", (0.0, 0.0, 10.0, 10.0)).words().is_empty());
    }

    #[test]
    fn test_fractional_edges_widen() {
        let words = region("ab c", (10.5, 0.5, 20.5, 9.5)).words();
        assert_eq!(words[0], Word::new("ab", 10, 0, 16, 10));
        assert_eq!(words[1], Word::new("c", 18, 0, 21, 10));
    }

    #[test]
    fn test_reading_order() {
        let mut regions = vec![
            region("right", (300.0, 105.0, 400.0, 125.0)),
            region("below", (0.0, 200.0, 100.0, 220.0)),
            region("left", (0.0, 101.0, 100.0, 121.0)),
        ];
        sort_reading_order(&mut regions);
        let texts: Vec<&str> = regions.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["left", "right", "below"]);
    }
}
