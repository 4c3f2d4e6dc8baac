//! Rasterize-and-recognize fallback for PDFs without a text layer
//!
//! Local tools:
//! - pdftoppm (poppler-utils) renders one page at a time to PNG
//! - tesseract recognizes text in each rendered page
//!
//! The PDF bytes and rendered pages live in a [`ScratchPdf`], a temporary
//! directory that is removed when the guard is closed or dropped. Every exit
//! path out of [`OcrEngine::recognize_pdf`] releases it, including errors
//! and panics in a collaborator.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use tempfile::TempDir;

use crate::config::OcrConfig;
use crate::error::{Error, Result};

/// Renders a single PDF page to an image file
pub trait Rasterizer: Send + Sync {
    /// Render `page_number` (1-based) of the PDF at `pdf_path` into `out_dir`
    /// and return the image path
    fn render_page(&self, pdf_path: &Path, page_number: u32, out_dir: &Path) -> Result<PathBuf>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

/// Recognizes text in a rendered page image
pub trait TextRecognizer: Send + Sync {
    /// Recognize the text of one image (best effort, may be empty)
    fn recognize(&self, image_path: &Path) -> Result<String>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

/// Scoped temporary copy of a PDF used during rasterization
pub struct ScratchPdf {
    dir: TempDir,
    pdf_path: PathBuf,
}

impl ScratchPdf {
    /// Write `data` to `input.pdf` inside a fresh temporary directory
    pub fn create(data: &[u8]) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("docpeek-ocr-")
            .tempdir()
            .map_err(|e| Error::extraction(format!("Failed to create temp dir: {}", e)))?;

        let pdf_path = dir.path().join("input.pdf");
        std::fs::write(&pdf_path, data)
            .map_err(|e| Error::extraction(format!("Failed to write temp PDF: {}", e)))?;

        Ok(Self { dir, pdf_path })
    }

    pub fn pdf_path(&self) -> &Path {
        &self.pdf_path
    }

    /// Directory rendered pages are written to
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the directory now, reporting failure instead of ignoring it
    pub fn close(self) -> std::io::Result<()> {
        self.dir.close()
    }
}

/// Dual collaborator OCR engine: one rasterizer, one recognizer
#[derive(Clone)]
pub struct OcrEngine {
    rasterizer: Arc<dyn Rasterizer>,
    recognizer: Arc<dyn TextRecognizer>,
}

impl OcrEngine {
    pub fn new(rasterizer: Arc<dyn Rasterizer>, recognizer: Arc<dyn TextRecognizer>) -> Self {
        Self {
            rasterizer,
            recognizer,
        }
    }

    /// pdftoppm + tesseract engine from configuration
    pub fn from_config(config: &OcrConfig) -> Self {
        Self::new(
            Arc::new(PopplerRasterizer::from_config(config)),
            Arc::new(TesseractRecognizer::from_config(config)),
        )
    }

    /// Render every page, then recognize each image, concatenating text in
    /// page order with no separator
    pub fn recognize_pdf(&self, data: &[u8], page_count: u32) -> Result<String> {
        let scratch = ScratchPdf::create(data)?;

        let mut images = Vec::with_capacity(page_count as usize);
        for page_number in 1..=page_count {
            let image = self
                .rasterizer
                .render_page(scratch.pdf_path(), page_number, scratch.dir())?;
            images.push(image);
        }

        let mut text = String::new();
        for image in &images {
            text.push_str(&self.recognizer.recognize(image)?);
        }

        if let Err(e) = scratch.close() {
            tracing::warn!("Failed to remove OCR scratch directory: {}", e);
        }

        tracing::info!(
            "OCR ({} + {}) extracted {} characters from {} pages",
            self.rasterizer.name(),
            self.recognizer.name(),
            text.chars().count(),
            page_count
        );
        Ok(text)
    }
}

impl std::fmt::Debug for OcrEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrEngine")
            .field("rasterizer", &self.rasterizer.name())
            .field("recognizer", &self.recognizer.name())
            .finish()
    }
}

/// Page rasterizer backed by `pdftoppm`
#[derive(Debug, Clone)]
pub struct PopplerRasterizer {
    binary: String,
    dpi: u32,
}

impl PopplerRasterizer {
    pub fn new(binary: impl Into<String>, dpi: u32) -> Self {
        Self {
            binary: binary.into(),
            dpi,
        }
    }

    pub fn from_config(config: &OcrConfig) -> Self {
        Self::new(config.pdftoppm_bin.clone(), config.dpi)
    }

    /// Check if pdftoppm is available
    pub fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("-v")
            .output()
            .map(|_| true) // pdftoppm -v writes to stderr, just check the command exists
            .unwrap_or(false)
    }
}

impl Rasterizer for PopplerRasterizer {
    fn render_page(&self, pdf_path: &Path, page_number: u32, out_dir: &Path) -> Result<PathBuf> {
        let prefix = out_dir.join(format!("page-{:05}", page_number));
        let page = page_number.to_string();

        let output = Command::new(&self.binary)
            .arg("-png")
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg("-f")
            .arg(&page)
            .arg("-l")
            .arg(&page)
            .arg("-singlefile")
            .arg(pdf_path)
            .arg(&prefix)
            .output()
            .map_err(|e| tool_error(&self.binary, "poppler-utils", e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::extraction(format!(
                "pdftoppm error on page {}: {}",
                page_number,
                stderr.trim()
            )));
        }

        let image = prefix.with_extension("png");
        if !image.exists() {
            return Err(Error::extraction(format!(
                "pdftoppm produced no image for page {}",
                page_number
            )));
        }

        Ok(image)
    }

    fn name(&self) -> &'static str {
        "pdftoppm"
    }
}

/// Text recognizer backed by the `tesseract` CLI
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    binary: String,
    language: String,
}

impl TesseractRecognizer {
    pub fn new(binary: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            language: language.into(),
        }
    }

    pub fn from_config(config: &OcrConfig) -> Self {
        Self::new(config.tesseract_bin.clone(), config.language.clone())
    }

    /// Check if tesseract is available
    pub fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize(&self, image_path: &Path) -> Result<String> {
        let output = Command::new(&self.binary)
            .arg(image_path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .output()
            .map_err(|e| tool_error(&self.binary, "tesseract-ocr", e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::extraction(format!("tesseract error: {}", stderr.trim())));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn name(&self) -> &'static str {
        "tesseract"
    }
}

fn tool_error(binary: &str, package: &str, e: std::io::Error) -> Error {
    if e.kind() == ErrorKind::NotFound {
        Error::extraction(format!(
            "{} not found. Install with: apt install {}",
            binary, package
        ))
    } else {
        Error::extraction(format!("{} failed: {}", binary, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    /// Writes a marker image per page and remembers where the PDF lived
    #[derive(Default)]
    struct RecordingRasterizer {
        seen_pdfs: Mutex<Vec<PathBuf>>,
        fail_on_page: Option<u32>,
    }

    impl Rasterizer for RecordingRasterizer {
        fn render_page(&self, pdf_path: &Path, page_number: u32, out_dir: &Path) -> Result<PathBuf> {
            assert!(pdf_path.exists(), "scratch PDF must exist while rendering");
            self.seen_pdfs.lock().push(pdf_path.to_path_buf());
            if self.fail_on_page == Some(page_number) {
                return Err(Error::extraction(format!("cannot render page {}", page_number)));
            }
            let image = out_dir.join(format!("page-{}.png", page_number));
            std::fs::write(&image, format!("page {}|", page_number))?;
            Ok(image)
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    /// "Recognizes" the marker text written by the rasterizer
    struct EchoRecognizer;

    impl TextRecognizer for EchoRecognizer {
        fn recognize(&self, image_path: &Path) -> Result<String> {
            Ok(std::fs::read_to_string(image_path)?)
        }

        fn name(&self) -> &'static str {
            "echo"
        }
    }

    struct BrokenRecognizer;

    impl TextRecognizer for BrokenRecognizer {
        fn recognize(&self, _image_path: &Path) -> Result<String> {
            Err(Error::extraction("recognition engine crashed"))
        }

        fn name(&self) -> &'static str {
            "broken"
        }
    }

    #[test]
    fn test_scratch_pdf_released_on_close_and_drop() {
        let scratch = ScratchPdf::create(b"%PDF-1.4").unwrap();
        let dir = scratch.dir().to_path_buf();
        assert_eq!(std::fs::read(scratch.pdf_path()).unwrap(), b"%PDF-1.4");
        scratch.close().unwrap();
        assert!(!dir.exists());

        let scratch = ScratchPdf::create(b"%PDF-1.4").unwrap();
        let dir = scratch.dir().to_path_buf();
        drop(scratch);
        assert!(!dir.exists());
    }

    #[test]
    fn test_pages_recognized_in_order() {
        let rasterizer = Arc::new(RecordingRasterizer::default());
        let engine = OcrEngine::new(rasterizer.clone(), Arc::new(EchoRecognizer));

        let text = engine.recognize_pdf(b"%PDF-1.4", 3).unwrap();
        assert_eq!(text, "page 1|page 2|page 3|");

        let seen = rasterizer.seen_pdfs.lock();
        assert_eq!(seen.len(), 3);
        assert!(seen.iter().all(|p| !p.exists()));
    }

    #[test]
    fn test_scratch_released_when_rasterizer_fails_midway() {
        let rasterizer = Arc::new(RecordingRasterizer {
            fail_on_page: Some(2),
            ..Default::default()
        });
        let engine = OcrEngine::new(rasterizer.clone(), Arc::new(EchoRecognizer));

        let err = engine.recognize_pdf(b"%PDF-1.4", 3).unwrap_err();
        assert!(matches!(err, Error::Extraction(_)));

        let seen = rasterizer.seen_pdfs.lock();
        assert_eq!(seen.len(), 2);
        assert!(!seen[0].exists());
        assert!(!seen[0].parent().unwrap().exists());
    }

    #[test]
    fn test_recognizer_failure_propagates() {
        let rasterizer = Arc::new(RecordingRasterizer::default());
        let engine = OcrEngine::new(rasterizer.clone(), Arc::new(BrokenRecognizer));

        let err = engine.recognize_pdf(b"%PDF-1.4", 1).unwrap_err();
        assert!(err.to_string().contains("recognition engine crashed"));
        assert!(rasterizer.seen_pdfs.lock().iter().all(|p| !p.exists()));
    }

    #[test]
    fn test_zero_pages_yields_empty_text() {
        let engine = OcrEngine::new(
            Arc::new(RecordingRasterizer::default()),
            Arc::new(EchoRecognizer),
        );
        assert_eq!(engine.recognize_pdf(b"%PDF-1.4", 0).unwrap(), "");
    }

    #[test]
    fn test_missing_binaries_are_extraction_errors() {
        let rasterizer = PopplerRasterizer::new("docpeek-no-such-pdftoppm", 150);
        assert!(!rasterizer.is_available());
        let scratch = ScratchPdf::create(b"%PDF-1.4").unwrap();
        let err = rasterizer
            .render_page(scratch.pdf_path(), 1, scratch.dir())
            .unwrap_err();
        assert!(err.to_string().contains("apt install poppler-utils"));

        let recognizer = TesseractRecognizer::new("docpeek-no-such-tesseract", "eng");
        assert!(!recognizer.is_available());
        let err = recognizer.recognize(scratch.pdf_path()).unwrap_err();
        assert_eq!(err.kind(), crate::error::FailureKind::ExtractionError);
    }
}
