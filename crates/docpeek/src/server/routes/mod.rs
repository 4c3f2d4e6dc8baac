//! Routes for the preview server

pub mod frontend;
pub mod upload;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::config::OcrConfig;
use crate::ingestion::{PopplerRasterizer, TesseractRecognizer};
use crate::server::state::AppState;

/// Upload route with a larger body limit for multipart uploads
pub fn upload_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new().route(
        "/upload",
        post(upload::upload_files).layer(DefaultBodyLimit::max(max_upload_size)),
    )
}

/// Build all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new().route("/info", get(info))
}

/// API info endpoint
async fn info(state: axum::extract::State<AppState>) -> Json<Value> {
    let ocr = state.config().ocr.clone();
    let enabled = ocr.enabled;
    let (pdftoppm, tesseract) = tokio::task::spawn_blocking(move || tool_availability(&ocr))
        .await
        .unwrap_or((false, false));

    Json(json!({
        "name": "docpeek",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Upload triage: previews of spreadsheets, CSVs and PDFs",
        "endpoints": {
            "GET /": "Front-end page",
            "POST /upload": "Preview uploaded files (multipart field 'files')",
            "GET /health": "Health check",
            "GET /api/info": "Service information"
        },
        "ocr": {
            "enabled": enabled,
            "pdftoppm": pdftoppm,
            "tesseract": tesseract
        }
    }))
}

/// Check the OCR tools on the PATH (spawns processes)
pub fn tool_availability(config: &OcrConfig) -> (bool, bool) {
    (
        PopplerRasterizer::from_config(config).is_available(),
        TesseractRecognizer::from_config(config).is_available(),
    )
}
