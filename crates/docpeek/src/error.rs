//! Error types for the preview service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

/// Result type alias for docpeek operations
pub type Result<T> = std::result::Result<T, Error>;

/// docpeek errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Bytes are not a well-formed file of the claimed kind
    #[error("Failed to parse file '{filename}': {message}")]
    FileParse { filename: String, message: String },

    /// Rasterization or optical recognition failed
    #[error("Extraction failed: {0}")]
    Extraction(String),

    /// Processing a single file exceeded its time budget
    #[error("Processing timeout after {0:?}")]
    Timeout(std::time::Duration),

    /// Malformed upload request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Upload request carried no file parts
    #[error("No files provided: expected one or more multipart fields named '{0}'")]
    MissingFiles(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Typed failure classification carried by per-file error outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Malformed input of the claimed format
    ParseError,
    /// Rasterization or OCR failure
    ExtractionError,
    /// Per-file time budget exceeded
    Timeout,
    /// Anything else (including a panicking parser)
    InternalError,
}

impl FailureKind {
    /// Wire name of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::ParseError => "parse_error",
            FailureKind::ExtractionError => "extraction_error",
            FailureKind::Timeout => "timeout",
            FailureKind::InternalError => "internal_error",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Create a file parse error
    pub fn file_parse(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FileParse {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create an extraction error
    pub fn extraction(message: impl Into<String>) -> Self {
        Self::Extraction(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Classify this error for a per-file failure outcome
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::FileParse { .. } => FailureKind::ParseError,
            Error::Extraction(_) | Error::Io(_) => FailureKind::ExtractionError,
            Error::Timeout(_) => FailureKind::Timeout,
            _ => FailureKind::InternalError,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            Error::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            Error::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            Error::MissingFiles(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            Error::Json(_) => (StatusCode::BAD_REQUEST, "json_error"),
            Error::FileParse { .. } => (StatusCode::BAD_REQUEST, "parse_error"),
            Error::Extraction(_) | Error::Io(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "extraction_error")
            }
            Error::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "timeout"),
            Error::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}
