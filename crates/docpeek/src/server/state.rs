//! Application state for the preview server

use std::sync::Arc;

use crate::config::PreviewConfig;
use crate::processing::IngestPipeline;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: PreviewConfig,
    /// Stateless pipeline shared by every request
    pipeline: IngestPipeline,
}

impl AppState {
    /// Create new application state with the configured OCR tools
    pub fn new(config: PreviewConfig) -> Self {
        let pipeline = IngestPipeline::from_config(&config);
        Self::with_pipeline(config, pipeline)
    }

    /// Create state around a prebuilt pipeline
    pub fn with_pipeline(config: PreviewConfig, pipeline: IngestPipeline) -> Self {
        tracing::info!(
            "Preview pipeline ready (max_rows: {}, max_chars: {}, ocr: {})",
            config.preview.max_rows,
            config.preview.max_chars,
            config.ocr.enabled
        );
        Self {
            inner: Arc::new(AppStateInner { config, pipeline }),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &PreviewConfig {
        &self.inner.config
    }

    /// Get the preview pipeline
    pub fn pipeline(&self) -> &IngestPipeline {
        &self.inner.pipeline
    }
}
