//! Preview pipeline: classify, extract, shape, aggregate
//!
//! [`IngestPipeline::process_file`] never fails; every error becomes an
//! [`ExtractionOutcome::Failure`]. [`IngestPipeline::process_batch`] runs
//! each file on the blocking pool under a timeout so that a panicking or
//! hanging parser only affects its own result slot.

use futures::stream::{self, StreamExt};
use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;

use crate::config::{PreviewConfig, PreviewLimits};
use crate::error::{Error, Result};
use crate::ingestion::{read_csv, read_spreadsheet, FileFormat, FormatClassifier, OcrEngine, PdfExtractor};
use crate::types::{BatchResult, ExtractionOutcome, UploadedFile};

/// Cut `text` to at most `max_chars` characters (not bytes)
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Stateless per-request preview pipeline
#[derive(Debug, Clone)]
pub struct IngestPipeline {
    classifier: FormatClassifier,
    limits: PreviewLimits,
    pdf: Arc<PdfExtractor>,
    file_timeout: Duration,
    max_concurrent_files: usize,
}

impl IngestPipeline {
    /// Create a pipeline with an explicit OCR engine (or none)
    pub fn new(config: &PreviewConfig, ocr: Option<OcrEngine>) -> Self {
        Self {
            classifier: FormatClassifier::from_config(&config.classifier),
            limits: config.preview.clone(),
            pdf: Arc::new(PdfExtractor::new(ocr)),
            file_timeout: config.processing.file_timeout(),
            max_concurrent_files: config.processing.max_concurrent_files.max(1),
        }
    }

    /// Create a pipeline using pdftoppm + tesseract when OCR is enabled
    pub fn from_config(config: &PreviewConfig) -> Self {
        let ocr = config
            .ocr
            .enabled
            .then(|| OcrEngine::from_config(&config.ocr));
        Self::new(config, ocr)
    }

    /// Override the per-file time budget
    pub fn with_file_timeout(mut self, file_timeout: Duration) -> Self {
        self.file_timeout = file_timeout;
        self
    }

    pub fn classifier(&self) -> &FormatClassifier {
        &self.classifier
    }

    pub fn file_timeout(&self) -> Duration {
        self.file_timeout
    }

    /// Produce the outcome for one file
    pub fn process_file(&self, file: &UploadedFile) -> ExtractionOutcome {
        let format = self.classifier.classify(&file.name);
        let start = Instant::now();

        tracing::info!("Processing file: {} ({} bytes, {})", file.name, file.len(), format);

        let outcome = match self.extract(format, file) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("Failed to preview {}: {}", file.name, e);
                ExtractionOutcome::failure(file.name.clone(), &e)
            }
        };

        tracing::debug!(
            "{} -> {} in {:.1}ms",
            file.name,
            outcome.status(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        outcome
    }

    fn extract(&self, format: FileFormat, file: &UploadedFile) -> Result<ExtractionOutcome> {
        let filename = file.name.clone();
        match format {
            FileFormat::Spreadsheet => {
                let table = read_spreadsheet(&file.name, &file.bytes, self.limits.max_rows)?;
                Ok(ExtractionOutcome::TabularPreview {
                    filename,
                    rows: table.rows,
                })
            }
            FileFormat::Csv => {
                let table = read_csv(&file.name, &file.bytes, self.limits.max_rows)?;
                Ok(ExtractionOutcome::TabularPreview {
                    filename,
                    rows: table.rows,
                })
            }
            FileFormat::Pdf => {
                let text = self.pdf.extract(&file.name, &file.bytes)?;
                Ok(ExtractionOutcome::TextPreview {
                    filename,
                    text: truncate_chars(&text, self.limits.max_chars).to_string(),
                })
            }
            FileFormat::Unsupported => Ok(ExtractionOutcome::Unsupported { filename }),
        }
    }

    /// Process every file and return outcomes in submission order
    pub async fn process_batch(&self, files: Vec<UploadedFile>) -> BatchResult {
        let start = Instant::now();
        let file_count = files.len();

        let outcomes: Vec<ExtractionOutcome> = stream::iter(files.into_iter().map(|file| {
            let pipeline = self.clone();
            async move { pipeline.process_isolated(file).await }
        }))
        .buffered(self.max_concurrent_files)
        .collect()
        .await;

        let batch = BatchResult::new(outcomes);
        tracing::info!(
            "Batch complete: {} files ({} ok, {} failed) in {:.1}s",
            file_count,
            batch.success_count(),
            batch.failure_count(),
            start.elapsed().as_secs_f64()
        );
        batch
    }

    /// Run one file on the blocking pool, converting panics and overruns
    async fn process_isolated(self, file: UploadedFile) -> ExtractionOutcome {
        let filename = file.name.clone();
        let file_timeout = self.file_timeout;
        let pipeline = self;

        // A timed-out task keeps running on the blocking pool; its scratch
        // files are released when it finishes.
        let handle = tokio::task::spawn_blocking(move || pipeline.process_file(&file));

        match timeout(file_timeout, handle).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(join_err)) => {
                let message = if join_err.is_panic() {
                    format!("parser panicked: {}", panic_message(join_err.into_panic()))
                } else {
                    format!("task failed: {}", join_err)
                };
                tracing::error!("Processing {} aborted: {}", filename, message);
                ExtractionOutcome::failure(filename, &Error::internal(message))
            }
            Err(_) => {
                tracing::error!("Processing {} timed out after {:?}", filename, file_timeout);
                ExtractionOutcome::failure(filename, &Error::Timeout(file_timeout))
            }
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
