//! Shared document pipeline: config, word source selection and extraction.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::Args;
use serde::Deserialize;
use tracing::{debug, info};

use fieldgram_core::{
    source_for_engine, CandidateExtractor, Clock, DocumentTextDetector, ExtractionResult,
    FieldgramConfig, FixedClock, NGramExtractor, Page, RecordedDetector, SystemClock, WordSource,
    WordSourceEngine,
};

/// Extensions accepted as document input.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "png", "jpg", "jpeg", "tiff", "tif", "bmp", "json"];

/// Word source and clock options shared by `extract` and `batch`.
#[derive(Args, Clone, Debug)]
pub struct SourceArgs {
    /// Word source engine (local_ocr, cloud_text_detection, pdf_text_layer or an alias
    /// such as tesseract, textract, pdfminer)
    #[arg(short, long)]
    pub engine: Option<String>,

    /// Saved text detection response (a JSON file, or a directory of `<stem>.json` files)
    #[arg(long)]
    pub detections: Option<PathBuf>,

    /// Longest word span to consider
    #[arg(long)]
    pub max_ngram_length: Option<usize>,

    /// Treat this date (YYYY-MM-DD) as today when rejecting future dates
    #[arg(long)]
    pub today: Option<NaiveDate>,
}

/// Pre-extracted words: one page or a list of pages.
#[derive(Deserialize)]
#[serde(untagged)]
enum WordsFile {
    Pages(Vec<Page>),
    Page(Page),
}

/// Load configuration from an explicit path, the default location, or defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<FieldgramConfig> {
    if let Some(path) = config_path {
        return Ok(FieldgramConfig::from_file(Path::new(path))?);
    }

    let default_path = super::config::default_config_path();
    if default_path.exists() {
        debug!("Using config at {}", default_path.display());
        Ok(FieldgramConfig::from_file(&default_path)?)
    } else {
        Ok(FieldgramConfig::default())
    }
}

/// Whether `path` has an extension the pipeline can read.
pub fn is_supported(path: &Path) -> bool {
    SUPPORTED_EXTENSIONS.contains(&extension(path).as_str())
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// A page that could not be extracted.
#[derive(Debug, Clone)]
pub struct PageFailure {
    /// 1-based page number.
    pub page: usize,
    pub error: String,
}

/// Extraction results of one document.
#[derive(Debug)]
pub struct DocumentResult {
    /// Pages that were extracted, in page order.
    pub pages: Vec<ExtractionResult>,
    /// Pages that were skipped.
    pub failures: Vec<PageFailure>,
}

impl DocumentResult {
    /// `page 2: <error>; page 5: <error>`
    pub fn failure_summary(&self) -> String {
        self.failures
            .iter()
            .map(|f| format!("page {}: {}", f.page, f.error))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Word source selection plus candidate extraction for documents on disk.
pub struct Pipeline {
    config: FieldgramConfig,
    args: SourceArgs,
    extractor: CandidateExtractor<FixedClock>,
    sources: Vec<Box<dyn WordSource>>,
}

impl Pipeline {
    pub fn new(mut config: FieldgramConfig, args: SourceArgs) -> anyhow::Result<Self> {
        if let Some(max) = args.max_ngram_length {
            config.extraction.max_ngram_length = max;
        }
        let today = args.today.unwrap_or_else(|| SystemClock.today());
        info!("Rejecting dates after {}", today);

        let extractor = CandidateExtractor::from_config(&config, FixedClock(today))?;

        Ok(Self {
            config,
            args,
            extractor,
            sources: Vec::new(),
        })
    }

    /// Engine for `path`: the explicit flag, the PDF text layer for PDFs, else the config.
    pub fn engine_for(&self, path: &Path) -> anyhow::Result<WordSourceEngine> {
        if let Some(name) = &self.args.engine {
            return Ok(name.parse()?);
        }
        if extension(path) == "pdf" {
            return Ok(WordSourceEngine::PdfTextLayer);
        }
        Ok(self.config.word_source.engine)
    }

    /// Read the pages of one document.
    pub fn read_pages(&mut self, path: &Path) -> anyhow::Result<Vec<Page>> {
        if extension(path) == "json" {
            let content = fs::read_to_string(path)?;
            let pages = match serde_json::from_str(&content)? {
                WordsFile::Pages(pages) => pages,
                WordsFile::Page(page) => vec![page],
            };
            debug!("Loaded {} pages of words from {}", pages.len(), path.display());
            return Ok(pages);
        }

        let engine = self.engine_for(path)?;
        let data = fs::read(path)?;

        if engine == WordSourceEngine::CloudTextDetection {
            let detector = self.detector_for(path)?;
            let source = source_for_engine(engine, &self.config, Some(detector))?;
            return Ok(source.read_pages(&data)?);
        }

        if !self.sources.iter().any(|s| s.engine() == engine) {
            debug!("Creating {} word source", engine);
            self.sources.push(source_for_engine(engine, &self.config, None)?);
        }
        let source = self
            .sources
            .iter()
            .find(|s| s.engine() == engine)
            .ok_or_else(|| anyhow::anyhow!("word source {} unavailable", engine))?;

        Ok(source.read_pages(&data)?)
    }

    /// Extract candidates from already loaded pages.
    ///
    /// Failed pages are collected next to the successful ones; the document
    /// only fails when no page could be extracted.
    pub fn extract_pages(&self, pages: &[Page]) -> anyhow::Result<DocumentResult> {
        if pages.is_empty() {
            anyhow::bail!("No pages to extract from");
        }

        let mut document = DocumentResult {
            pages: Vec::with_capacity(pages.len()),
            failures: Vec::new(),
        };
        for (i, result) in self.extractor.extract_pages(pages).into_iter().enumerate() {
            match result {
                Ok(page) => document.pages.push(page),
                Err(e) => document.failures.push(PageFailure {
                    page: i + 1,
                    error: e.to_string(),
                }),
            }
        }

        if document.pages.is_empty() {
            anyhow::bail!("No page could be extracted: {}", document.failure_summary());
        }
        Ok(document)
    }

    /// Read one document and extract candidates from every page.
    pub fn extract(&mut self, path: &Path) -> anyhow::Result<DocumentResult> {
        let pages = self.read_pages(path)?;
        self.extract_pages(&pages)
    }

    fn detector_for(&self, path: &Path) -> anyhow::Result<Box<dyn DocumentTextDetector>> {
        let Some(detections) = &self.args.detections else {
            anyhow::bail!(
                "Cloud text detection needs a saved response. Pass --detections <file>."
            );
        };

        let response_path = if detections.is_dir() {
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("page");
            detections.join(format!("{}.json", stem))
        } else {
            detections.clone()
        };

        debug!("Replaying detections from {}", response_path.display());
        Ok(Box::new(RecordedDetector::from_file(&response_path)?))
    }
}
