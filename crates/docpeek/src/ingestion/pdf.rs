//! PDF text extraction with OCR fallback
//!
//! Stage 1 reads the embedded text layer page by page with lopdf. When the
//! combined text is blank (scanned documents) stage 2 hands the raw bytes to
//! the [`OcrEngine`].

use lopdf::Document;

use crate::error::{Error, Result};
use crate::ingestion::ocr::OcrEngine;

/// Text layer of a PDF, in page order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextLayer {
    pub text: String,
    pub page_count: u32,
}

/// Read the embedded text of every page
///
/// A page whose text cannot be decoded contributes nothing; the document as
/// a whole only fails when it cannot be loaded.
pub fn read_text_layer(filename: &str, data: &[u8]) -> Result<TextLayer> {
    let doc = Document::load_mem(data)
        .map_err(|e| Error::file_parse(filename, format!("Failed to load PDF: {}", e)))?;

    let pages = doc.get_pages();
    let mut text = String::new();

    for page_num in pages.keys() {
        match doc.extract_text(&[*page_num]) {
            Ok(page_text) => text.push_str(&page_text),
            Err(e) => {
                tracing::debug!("Could not extract text from page {} of {}: {}", page_num, filename, e);
            }
        }
    }

    Ok(TextLayer {
        text,
        page_count: pages.len() as u32,
    })
}

/// Two-stage PDF text extractor
#[derive(Debug, Clone, Default)]
pub struct PdfExtractor {
    ocr: Option<OcrEngine>,
}

impl PdfExtractor {
    /// Extractor that falls back to `ocr` for image-only documents
    pub fn new(ocr: Option<OcrEngine>) -> Self {
        Self { ocr }
    }

    /// Whether an OCR engine is configured
    pub fn has_ocr(&self) -> bool {
        self.ocr.is_some()
    }

    /// Full (untruncated) text of the document
    pub fn extract(&self, filename: &str, data: &[u8]) -> Result<String> {
        let layer = read_text_layer(filename, data)?;

        if !layer.text.trim().is_empty() {
            tracing::debug!(
                "{}: text layer has {} characters across {} pages",
                filename,
                layer.text.chars().count(),
                layer.page_count
            );
            return Ok(layer.text);
        }

        tracing::warn!(
            "{}: no text layer found on {} pages, falling back to OCR",
            filename,
            layer.page_count
        );

        match &self.ocr {
            Some(engine) => engine.recognize_pdf(data, layer.page_count),
            None => Err(Error::extraction(
                "PDF has no text layer and OCR fallback is disabled",
            )),
        }
    }
}
