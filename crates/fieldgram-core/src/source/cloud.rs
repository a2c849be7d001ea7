//! Cloud document text detection with an injected transport.

use std::path::Path;

use image::GenericImageView;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::WordSource;
use crate::error::{Result, SourceError};
use crate::models::config::WordSourceEngine;
use crate::models::{Page, Word};

/// Detection response in the service's wire shape (`{"Blocks": [...]}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DetectionResponse {
    #[serde(default)]
    pub blocks: Vec<DetectionBlock>,
}

/// One detected block (page, line or word).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DetectionBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Geometry {
    pub bounding_box: BoundingBox,
}

/// Box in page-relative coordinates, each value in `0..1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BoundingBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    /// Pixel box for a `width` x `height` page: edges floored, far edges ceiled.
    pub fn to_pixels(&self, width: u32, height: u32) -> (i32, i32, i32, i32) {
        let (w, h) = (width as f64, height as f64);
        (
            (self.left * w).floor() as i32,
            (self.top * h).floor() as i32,
            ((self.left + self.width) * w).ceil() as i32,
            ((self.top + self.height) * h).ceil() as i32,
        )
    }
}

/// Transport to a document text detection service.
pub trait DocumentTextDetector {
    /// Detect text in an encoded page image.
    fn detect_document_text(&self, image: &[u8]) -> Result<DetectionResponse>;
}

impl<D: DocumentTextDetector + ?Sized> DocumentTextDetector for Box<D> {
    fn detect_document_text(&self, image: &[u8]) -> Result<DetectionResponse> {
        (**self).detect_document_text(image)
    }
}

/// Replays a saved detection response regardless of the image.
#[derive(Debug, Clone, Default)]
pub struct RecordedDetector {
    response: DetectionResponse,
}

impl RecordedDetector {
    pub fn new(response: DetectionResponse) -> Self {
        Self { response }
    }

    /// Parse a response from its JSON form.
    pub fn from_json(json: &str) -> Result<Self> {
        let response = serde_json::from_str(json)
            .map_err(|e| SourceError::Detection(format!("invalid response: {}", e)))?;
        Ok(Self::new(response))
    }

    /// Load a response saved as JSON.
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn response(&self) -> &DetectionResponse {
        &self.response
    }
}

impl DocumentTextDetector for RecordedDetector {
    fn detect_document_text(&self, _image: &[u8]) -> Result<DetectionResponse> {
        Ok(self.response.clone())
    }
}

/// Word source backed by a [`DocumentTextDetector`].
pub struct CloudTextSource<D> {
    detector: D,
}

impl<D: DocumentTextDetector> CloudTextSource<D> {
    pub fn new(detector: D) -> Self {
        Self { detector }
    }

    /// Detect words on one page image of known pixel size.
    pub fn detect_page(&self, image: &[u8], width: u32, height: u32) -> Result<Page> {
        let response = self.detector.detect_document_text(image)?;
        debug!("Detector returned {} blocks", response.blocks.len());
        Ok(Page::new(words_from_response(&response, width, height), width, height))
    }
}

impl<D: DocumentTextDetector> WordSource for CloudTextSource<D> {
    fn engine(&self) -> WordSourceEngine {
        WordSourceEngine::CloudTextDetection
    }

    fn read_pages(&self, data: &[u8]) -> Result<Vec<Page>> {
        let (width, height) = image::load_from_memory(data)
            .map_err(|e| SourceError::Detection(format!("cannot decode page image: {}", e)))?
            .dimensions();

        let page = self.detect_page(data, width, height)?;
        info!("Detected {} words on {}x{} page", page.words.len(), width, height);
        Ok(vec![page])
    }
}

/// Every block carrying text, in response order, converted to pixels.
pub fn words_from_response(response: &DetectionResponse, width: u32, height: u32) -> Vec<Word> {
    response
        .blocks
        .iter()
        .filter_map(|block| {
            let text = block.text.as_ref()?;
            let Some(geometry) = block.geometry else {
                warn!("Skipping block {:?} without geometry", text);
                return None;
            };
            let (left, top, right, bottom) = geometry.bounding_box.to_pixels(width, height);
            Some(Word::new(text.clone(), left, top, right, bottom))
        })
        .collect()
}
