//! docpeek: upload triage service with spreadsheet, CSV and PDF previews
//!
//! Each uploaded file is classified by its filename suffix and routed to a
//! format-specific extractor. Tables yield their first rows as JSON records;
//! PDFs yield the leading characters of their text layer, falling back to
//! OCR (pdftoppm + tesseract) for scanned documents. Every file gets exactly
//! one outcome and outcomes keep submission order.

pub mod config;
pub mod error;
pub mod ingestion;
pub mod processing;
pub mod server;
pub mod types;

pub use config::PreviewConfig;
pub use error::{Error, FailureKind, Result};
pub use ingestion::{FileFormat, FormatClassifier, OcrEngine};
pub use processing::IngestPipeline;
pub use types::{BatchResult, ExtractionOutcome, UploadedFile};
