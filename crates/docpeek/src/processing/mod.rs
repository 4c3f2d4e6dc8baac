//! Per-file extraction and ordered batch aggregation

mod pipeline;

pub use pipeline::{truncate_chars, IngestPipeline};
