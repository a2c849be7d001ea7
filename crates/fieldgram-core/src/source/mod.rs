//! Word sources: OCR, document text detection and PDF text layers.
//!
//! Every source turns raw document bytes into [`Page`]s of words in one pixel
//! space, ready for line segmentation.

mod cloud;
#[cfg(feature = "native")]
mod ocr;
#[cfg(feature = "pdf")]
mod pdf;

pub use cloud::{
    BoundingBox, CloudTextSource, DetectionBlock, DetectionResponse, DocumentTextDetector, Geometry,
    RecordedDetector,
};
#[cfg(feature = "native")]
pub use ocr::LocalOcrSource;
#[cfg(feature = "pdf")]
pub use pdf::PdfTextLayerSource;

use crate::error::{FieldgramError, Result};
use crate::models::config::{FieldgramConfig, WordSourceEngine};
use crate::models::Page;

/// Trait for word source implementations.
pub trait WordSource {
    /// Engine this source implements.
    fn engine(&self) -> WordSourceEngine;

    /// Read every page of a document from its raw bytes.
    fn read_pages(&self, data: &[u8]) -> Result<Vec<Page>>;
}

impl<S: WordSource + ?Sized> WordSource for Box<S> {
    fn engine(&self) -> WordSourceEngine {
        (**self).engine()
    }

    fn read_pages(&self, data: &[u8]) -> Result<Vec<Page>> {
        (**self).read_pages(data)
    }
}

/// Build the word source selected by `engine`.
///
/// Cloud detection has no built-in transport, so `detector` must be supplied
/// for [`WordSourceEngine::CloudTextDetection`]. Engines compiled out of this
/// build are reported as unsupported.
pub fn source_for_engine(
    engine: WordSourceEngine,
    config: &FieldgramConfig,
    detector: Option<Box<dyn DocumentTextDetector>>,
) -> Result<Box<dyn WordSource>> {
    match engine {
        WordSourceEngine::LocalOcr => local_ocr(config),
        WordSourceEngine::CloudTextDetection => match detector {
            Some(detector) => Ok(Box::new(CloudTextSource::new(detector))),
            None => Err(FieldgramError::Config(
                "cloud text detection needs a detector".to_string(),
            )),
        },
        WordSourceEngine::PdfTextLayer => pdf_text_layer(config),
    }
}

#[cfg(feature = "native")]
fn local_ocr(config: &FieldgramConfig) -> Result<Box<dyn WordSource>> {
    Ok(Box::new(LocalOcrSource::from_config(config.ocr.clone())?))
}

#[cfg(not(feature = "native"))]
fn local_ocr(_config: &FieldgramConfig) -> Result<Box<dyn WordSource>> {
    Err(FieldgramError::UnsupportedEngine(
        WordSourceEngine::LocalOcr.to_string(),
    ))
}

#[cfg(feature = "pdf")]
fn pdf_text_layer(config: &FieldgramConfig) -> Result<Box<dyn WordSource>> {
    Ok(Box::new(PdfTextLayerSource::new(config.word_source.pdf_dpi)))
}

#[cfg(not(feature = "pdf"))]
fn pdf_text_layer(_config: &FieldgramConfig) -> Result<Box<dyn WordSource>> {
    Err(FieldgramError::UnsupportedEngine(
        WordSourceEngine::PdfTextLayer.to_string(),
    ))
}
