//! Format classification and per-format extraction

pub mod classifier;
pub mod ocr;
pub mod pdf;
pub mod tabular;

pub use classifier::{FileFormat, FormatClassifier};
pub use ocr::{OcrEngine, PopplerRasterizer, Rasterizer, ScratchPdf, TesseractRecognizer, TextRecognizer};
pub use pdf::{read_text_layer, PdfExtractor, TextLayer};
pub use tabular::{read_csv, read_spreadsheet, Row, TablePreview};
