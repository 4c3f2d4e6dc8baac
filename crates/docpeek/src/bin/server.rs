//! Preview server binary
//!
//! Run with: cargo run -p docpeek --bin docpeek-server

use docpeek::{config::PreviewConfig, server::routes::tool_availability, server::PreviewServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docpeek=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!(
        r#"
╔═══════════════════════════════════════════════════════════╗
║                         docpeek                           ║
║          Spreadsheet, CSV and PDF upload previews         ║
╚═══════════════════════════════════════════════════════════╝
"#
    );

    let config = PreviewConfig::load()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Preview rows: {}", config.preview.max_rows);
    tracing::info!("  - Preview characters: {}", config.preview.max_chars);
    tracing::info!("  - File timeout: {}s", config.processing.file_timeout_secs);
    tracing::info!("  - Concurrent files: {}", config.processing.max_concurrent_files);

    // Check OCR tools
    if config.ocr.enabled {
        let (pdftoppm, tesseract) = tool_availability(&config.ocr);
        if pdftoppm && tesseract {
            tracing::info!("OCR fallback available (pdftoppm + tesseract, {} dpi)", config.ocr.dpi);
        } else {
            if !pdftoppm {
                tracing::warn!("pdftoppm not found at '{}'", config.ocr.pdftoppm_bin);
                tracing::warn!("  Install: apt install poppler-utils (or brew install poppler)");
            }
            if !tesseract {
                tracing::warn!("tesseract not found at '{}'", config.ocr.tesseract_bin);
                tracing::warn!("  Install: apt install tesseract-ocr (or brew install tesseract)");
            }
            tracing::warn!("Scanned PDFs will be reported as extraction errors");
        }
    } else {
        tracing::info!("OCR fallback disabled");
    }

    // Create and start server
    let server = PreviewServer::new(config)?;

    println!("\nServer starting...");
    println!("  Front-end: http://{}/", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("  API Info: http://{}/api/info", server.address());
    println!("\nEndpoints:");
    println!("  POST /upload - Preview files (multipart field 'files')");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
