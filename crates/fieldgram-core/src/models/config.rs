//! Configuration structures for the candidate pipeline.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FieldgramError;

/// Main configuration for the fieldgram pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldgramConfig {
    /// Candidate extraction configuration.
    pub extraction: ExtractionConfig,

    /// Line segmentation thresholds.
    pub segmentation: SegmentationConfig,

    /// Word source selection.
    pub word_source: WordSourceConfig,

    /// Local OCR model configuration.
    pub ocr: OcrConfig,
}

/// Candidate extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Longest word span considered as a candidate.
    pub max_ngram_length: usize,

    /// Preferred reading of ambiguous numeric dates.
    pub date_order: DateOrder,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_ngram_length: 4,
            date_order: DateOrder::MonthFirst,
        }
    }
}

/// Preferred reading of `a/b/year` dates when both readings are valid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateOrder {
    /// `MM/DD/YYYY` (US convention).
    #[default]
    MonthFirst,
    /// `DD/MM/YYYY`.
    DayFirst,
}

/// Line-break thresholds as fractions of the page size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Vertical offset (fraction of page height) that starts a new line.
    pub vertical_threshold: f64,

    /// Horizontal gap (fraction of page width) that starts a new line.
    pub horizontal_threshold: f64,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            vertical_threshold: 0.005,
            horizontal_threshold: 0.05,
        }
    }
}

/// Word source selection and coordinate scaling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WordSourceConfig {
    /// Engine producing words.
    pub engine: WordSourceEngine,

    /// Resolution pair for PDF text-layer coordinates.
    pub pdf_dpi: DpiScaling,
}

/// Engine producing the word list for a page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WordSourceEngine {
    /// Local OCR on a rendered page image.
    #[default]
    LocalOcr,
    /// Cloud document text detection.
    CloudTextDetection,
    /// Embedded PDF text layer.
    PdfTextLayer,
}

impl WordSourceEngine {
    pub fn as_str(self) -> &'static str {
        match self {
            WordSourceEngine::LocalOcr => "local_ocr",
            WordSourceEngine::CloudTextDetection => "cloud_text_detection",
            WordSourceEngine::PdfTextLayer => "pdf_text_layer",
        }
    }
}

impl FromStr for WordSourceEngine {
    type Err = FieldgramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local_ocr" | "local" | "tesseract" | "pytesseract" => Ok(Self::LocalOcr),
            "cloud_text_detection" | "cloud" | "textract" | "aws_textract" => {
                Ok(Self::CloudTextDetection)
            }
            "pdf_text_layer" | "pdf" | "pdfminer" => Ok(Self::PdfTextLayer),
            _ => Err(FieldgramError::UnsupportedEngine(s.to_string())),
        }
    }
}

impl fmt::Display for WordSourceEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source and target resolutions for PDF coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DpiScaling {
    /// Resolution the PDF text layer measures in (points).
    pub source_dpi: u32,

    /// Resolution of the pixel space the thresholds assume.
    pub target_dpi: u32,
}

impl Default for DpiScaling {
    fn default() -> Self {
        Self {
            source_dpi: 72,
            target_dpi: 200,
        }
    }
}

impl DpiScaling {
    /// Scale one coordinate, truncating toward zero.
    pub fn scale(&self, value: f64) -> i32 {
        if self.source_dpi == 0 {
            return value as i32;
        }
        (value * self.target_dpi as f64 / self.source_dpi as f64) as i32
    }
}

/// Local OCR model files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,

    /// Keep `[UNK]` markers in recognized text instead of blanking them.
    pub keep_unk: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
            keep_unk: false,
        }
    }
}

impl OcrConfig {
    /// Get full path to a model file.
    pub fn model_path(&self, model_name: &str) -> PathBuf {
        self.model_dir.join(model_name)
    }
}

impl FieldgramConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
