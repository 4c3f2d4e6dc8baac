//! Upload preview endpoint

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use std::time::Instant;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{BatchResult, UploadedFile};

/// Multipart field carrying uploaded files
pub const FILES_FIELD: &str = "files";

/// POST /upload - Preview every uploaded file
pub async fn upload_files(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<BatchResult>> {
    let start = Instant::now();
    let mut multipart = multipart.map_err(|e| Error::BadRequest(e.body_text()))?;
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        Error::BadRequest(format!("Failed to read multipart field: {}", e))
    })? {
        let name = field.name().unwrap_or("").to_string();
        if name != FILES_FIELD {
            tracing::debug!("Ignoring multipart field '{}'", name);
            continue;
        }

        // Get filename
        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("file_{}.bin", Uuid::new_v4()));

        let data = field.bytes().await.map_err(|e| {
            Error::BadRequest(format!("Failed to read file '{}': {}", filename, e))
        })?;

        tracing::info!("Received file: {} ({} bytes)", filename, data.len());
        files.push(UploadedFile::new(filename, data));
    }

    if files.is_empty() {
        return Err(Error::MissingFiles(FILES_FIELD.to_string()));
    }

    let pipeline = state.pipeline().clone();
    let batch = pipeline.process_batch(files).await;

    tracing::info!(
        "Upload handled: {} files in {:.1}s",
        batch.len(),
        start.elapsed().as_secs_f64()
    );

    Ok(Json(batch))
}
