//! Filename-based format classification

use serde::{Deserialize, Serialize};

use crate::config::ClassifierConfig;

/// Handling strategy selected for an uploaded file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    /// Excel workbook (.xls / .xlsx)
    Spreadsheet,
    /// Comma separated values
    Csv,
    /// PDF document (text layer, OCR fallback)
    Pdf,
    /// No strategy matches
    Unsupported,
}

impl FileFormat {
    /// Whether the format yields a table preview
    pub fn is_tabular(&self) -> bool {
        matches!(self, Self::Spreadsheet | Self::Csv)
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Spreadsheet => "Excel Spreadsheet",
            Self::Csv => "CSV",
            Self::Pdf => "PDF",
            Self::Unsupported => "Unsupported",
        }
    }
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Suffix table, checked in order
const SUFFIXES: &[(&str, FileFormat)] = &[
    (".xls", FileFormat::Spreadsheet),
    (".xlsx", FileFormat::Spreadsheet),
    (".csv", FileFormat::Csv),
    (".pdf", FileFormat::Pdf),
];

/// Selects a [`FileFormat`] from a filename suffix
///
/// Matching is case-sensitive unless configured otherwise. File content and
/// magic numbers are never inspected.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatClassifier {
    case_insensitive: bool,
}

impl FormatClassifier {
    pub fn new(case_insensitive: bool) -> Self {
        Self { case_insensitive }
    }

    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self::new(config.case_insensitive)
    }

    /// Classify a filename
    pub fn classify(&self, filename: &str) -> FileFormat {
        let lowered;
        let name = if self.case_insensitive {
            lowered = filename.to_lowercase();
            lowered.as_str()
        } else {
            filename
        };

        SUFFIXES
            .iter()
            .find(|(suffix, _)| name.ends_with(suffix))
            .map(|(_, format)| *format)
            .unwrap_or(FileFormat::Unsupported)
    }
}
