//! Per-file outcomes and the batch envelope returned to the caller
//!
//! The JSON shape is fixed by the upload contract:
//!
//! - `{"filename", "status": "success", "data": [row, ...]}` for tables
//! - `{"filename", "status": "success", "data": "text"}` for PDFs
//! - `{"filename", "status": "unsupported format"}`
//! - `{"filename", "status": "error", "error": "message", "error_type": "parse_error"}`

use serde::ser::{Serialize, SerializeMap, SerializeStruct, Serializer};

use crate::error::{Error, FailureKind};
use crate::ingestion::Row;

/// Status string for successful previews
pub const STATUS_SUCCESS: &str = "success";
/// Status string for files no strategy handles
pub const STATUS_UNSUPPORTED: &str = "unsupported format";
/// Status string for failed extractions
pub const STATUS_ERROR: &str = "error";

/// Result of running one uploaded file through the pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    /// First rows of a spreadsheet or CSV
    TabularPreview { filename: String, rows: Vec<Row> },
    /// Leading characters of a PDF's text
    TextPreview { filename: String, text: String },
    /// The classifier found no strategy for this file
    Unsupported { filename: String },
    /// Extraction failed; other files are unaffected
    Failure {
        filename: String,
        kind: FailureKind,
        message: String,
    },
}

impl ExtractionOutcome {
    /// Build a failure outcome from an error
    pub fn failure(filename: impl Into<String>, error: &Error) -> Self {
        Self::Failure {
            filename: filename.into(),
            kind: error.kind(),
            message: error.to_string(),
        }
    }

    /// Filename this outcome belongs to
    pub fn filename(&self) -> &str {
        match self {
            Self::TabularPreview { filename, .. }
            | Self::TextPreview { filename, .. }
            | Self::Unsupported { filename }
            | Self::Failure { filename, .. } => filename,
        }
    }

    /// Wire status string
    pub fn status(&self) -> &'static str {
        match self {
            Self::TabularPreview { .. } | Self::TextPreview { .. } => STATUS_SUCCESS,
            Self::Unsupported { .. } => STATUS_UNSUPPORTED,
            Self::Failure { .. } => STATUS_ERROR,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::TabularPreview { .. } | Self::TextPreview { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }
}

impl Serialize for ExtractionOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = match self {
            Self::Unsupported { .. } => 2,
            Self::Failure { .. } => 4,
            _ => 3,
        };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("filename", self.filename())?;
        map.serialize_entry("status", self.status())?;
        match self {
            Self::TabularPreview { rows, .. } => map.serialize_entry("data", rows)?,
            Self::TextPreview { text, .. } => map.serialize_entry("data", text)?,
            Self::Unsupported { .. } => {}
            Self::Failure { kind, message, .. } => {
                map.serialize_entry("error", message)?;
                map.serialize_entry("error_type", kind)?;
            }
        }
        map.end()
    }
}

/// Ordered outcomes for one upload request, one per submitted file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResult {
    outcomes: Vec<ExtractionOutcome>,
}

impl BatchResult {
    pub fn new(outcomes: Vec<ExtractionOutcome>) -> Self {
        Self { outcomes }
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn outcomes(&self) -> &[ExtractionOutcome] {
        &self.outcomes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ExtractionOutcome> {
        self.outcomes.iter()
    }

    pub fn into_outcomes(self) -> Vec<ExtractionOutcome> {
        self.outcomes
    }

    /// Number of successful previews
    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Number of failed extractions
    pub fn failure_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failure()).count()
    }
}

impl Serialize for BatchResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("BatchResult", 1)?;
        state.serialize_field("results", &self.outcomes)?;
        state.end()
    }
}

impl<'a> IntoIterator for &'a BatchResult {
    type Item = &'a ExtractionOutcome;
    type IntoIter = std::slice::Iter<'a, ExtractionOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.iter()
    }
}
