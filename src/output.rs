//! Result types returned by a successful conversion.

use serde::Serialize;
use std::path::PathBuf;

/// What a finished run produced and where it put it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionReport {
    /// Absolute path of the source PDF.
    pub input: PathBuf,
    /// Markdown file that was written.
    pub output: PathBuf,
    /// Directory holding the extracted images.
    pub assets_dir: PathBuf,
    /// Referenced images, in reference order.
    pub images: Vec<PathBuf>,
    pub stats: ConversionStats,
}

/// Sizes and timings of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionStats {
    /// Pages reported by the text engine.
    pub page_count: usize,
    /// Lines of extracted text.
    pub text_lines: usize,
    /// Bytes of extracted text.
    pub text_bytes: usize,
    /// Image references written.
    pub image_count: usize,
    /// Bytes of the written Markdown file.
    pub markdown_bytes: usize,
    pub text_duration_ms: u64,
    pub image_duration_ms: u64,
    pub total_duration_ms: u64,
}
