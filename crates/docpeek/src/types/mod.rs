//! Core types for the preview pipeline

pub mod outcome;
pub mod upload;

pub use outcome::{BatchResult, ExtractionOutcome};
pub use upload::UploadedFile;
