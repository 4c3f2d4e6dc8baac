//! Configuration for the preview service
//!
//! Every section has serde defaults, so a TOML file only needs to name the
//! values it changes. [`PreviewConfig::load`] reads the file named by
//! `DOCPEEK_CONFIG` (if any) and then applies `DOCPEEK_HOST` / `DOCPEEK_PORT`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Environment variable naming a TOML configuration file
pub const CONFIG_PATH_ENV: &str = "DOCPEEK_CONFIG";
/// Environment variable overriding `server.host`
pub const HOST_ENV: &str = "DOCPEEK_HOST";
/// Environment variable overriding `server.port`
pub const PORT_ENV: &str = "DOCPEEK_PORT";

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Preview shaping limits
    pub preview: PreviewLimits,
    /// Format classifier configuration
    pub classifier: ClassifierConfig,
    /// OCR fallback configuration
    pub ocr: OcrConfig,
    /// Per-file processing configuration
    pub processing: ProcessingConfig,
    /// Front-end page configuration
    pub frontend: FrontendConfig,
}

impl PreviewConfig {
    /// Parse configuration from a TOML string
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)
            .map_err(|e| Error::Config(format!("Invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&raw)
    }

    /// Load configuration from `DOCPEEK_CONFIG` (or defaults) plus environment overrides
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim())?,
            _ => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply host/port overrides from a key lookup (normally the process environment)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(HOST_ENV).filter(|h| !h.trim().is_empty()) {
            self.server.host = host.trim().to_string();
        }
        if let Some(port) = lookup(PORT_ENV) {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|e| Error::Config(format!("Invalid {} '{}': {}", PORT_ENV, port, e)))?;
        }
        Ok(())
    }

    /// Reject values that would make the pipeline unusable
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::Config("server.port must be non-zero".to_string()));
        }
        if self.processing.file_timeout_secs == 0 {
            return Err(Error::Config(
                "processing.file_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.processing.max_concurrent_files == 0 {
            return Err(Error::Config(
                "processing.max_concurrent_files must be at least 1".to_string(),
            ));
        }
        if self.ocr.enabled && self.ocr.dpi == 0 {
            return Err(Error::Config("ocr.dpi must be non-zero".to_string()));
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable permissive CORS
    pub enable_cors: bool,
    /// Maximum upload size in bytes (default: 100MB)
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            enable_cors: true,
            max_upload_size: 100 * 1024 * 1024, // 100MB
        }
    }
}

/// Preview shaping limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewLimits {
    /// Rows kept from a table
    pub max_rows: usize,
    /// Characters kept from extracted text
    pub max_chars: usize,
}

impl Default for PreviewLimits {
    fn default() -> Self {
        Self {
            max_rows: 5,
            max_chars: 1000,
        }
    }
}

/// Format classifier configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Lowercase filenames before suffix matching (default: false, `report.PDF` is unsupported)
    pub case_insensitive: bool,
}

/// OCR fallback configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Run rasterize + recognize when a PDF has no text layer
    pub enabled: bool,
    /// Rasterization resolution passed to pdftoppm
    pub dpi: u32,
    /// Tesseract language
    pub language: String,
    /// pdftoppm executable
    pub pdftoppm_bin: String,
    /// tesseract executable
    pub tesseract_bin: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dpi: 150, // good balance of quality and speed
            language: "eng".to_string(),
            pdftoppm_bin: "pdftoppm".to_string(),
            tesseract_bin: "tesseract".to_string(),
        }
    }
}

/// Per-file processing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Timeout for processing a single file in seconds (default: 300 = 5 minutes)
    pub file_timeout_secs: u64,
    /// Files processed at once within a batch (default: 1, strictly sequential)
    pub max_concurrent_files: usize,
}

impl ProcessingConfig {
    /// Per-file timeout as a [`Duration`]
    pub fn file_timeout(&self) -> Duration {
        Duration::from_secs(self.file_timeout_secs)
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            file_timeout_secs: 300,
            max_concurrent_files: 1,
        }
    }
}

/// Front-end page configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontendConfig {
    /// Directory mounted at `/static` (default: the crate's bundled `static/`)
    pub static_dir: PathBuf,
    /// Page served at `/`, relative to `static_dir`
    pub index_file: String,
}

impl FrontendConfig {
    /// Full path of the index page
    pub fn index_path(&self) -> PathBuf {
        self.static_dir.join(&self.index_file)
    }
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            static_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/static")),
            index_file: "frontend.html".to_string(),
        }
    }
}
