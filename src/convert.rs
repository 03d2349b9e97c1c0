//! Conversion orchestration.
//!
//! [`Converter`] runs the pipeline as a fixed sequence of stages:
//!
//! ```text
//! Init ─▶ ExtractText ─▶ ExtractImages ─▶ Assemble ─▶ Persist
//! ```
//!
//! Each stage is awaited before the next begins and the first error ends
//! the run. There are no retries and no rollback: an assets directory
//! created in `Init`, or images written by a tool that later failed, stay
//! on disk. The Markdown file itself is only ever replaced whole, so a
//! failed run leaves any previous output untouched.

use crate::config::ConversionConfig;
use crate::error::{ConversionStage, Pdf2MdError};
use crate::output::{ConversionReport, ConversionStats};
use crate::pipeline::images::{CommandImageExtractor, ImageExtractor};
use crate::pipeline::text::{ExtractedText, PdfiumTextExtractor, TextExtractor};
use crate::pipeline::{input, markdown};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// File name given to in-memory input on disk.
const BYTES_INPUT_NAME: &str = "document.pdf";

/// The conversion pipeline with its two extraction engines.
///
/// [`Converter::new`] wires pdfium for text and the configured command for
/// images; either can be replaced, e.g. with a fake in tests.
///
/// # Example
/// ```rust,no_run
/// use pdftext2md::{ConversionConfig, Converter};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ConversionConfig::builder()
///     .output("paper.md")
///     .assets("paper-assets")
///     .build()?;
/// let report = Converter::new(config).run("paper.pdf").await?;
/// println!("{} images", report.stats.image_count);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Converter {
    config: ConversionConfig,
    text: Arc<dyn TextExtractor>,
    images: Arc<dyn ImageExtractor>,
}

impl Converter {
    pub fn new(config: ConversionConfig) -> Self {
        let text = Arc::new(PdfiumTextExtractor::new(config.password.clone()));
        let images = Arc::new(CommandImageExtractor::from_config(&config));
        Self {
            config,
            text,
            images,
        }
    }

    pub fn with_text_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.text = extractor;
        self
    }

    pub fn with_image_extractor(mut self, extractor: Arc<dyn ImageExtractor>) -> Self {
        self.images = extractor;
        self
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// Convert `input` and write the Markdown to `config.output`.
    ///
    /// # Errors
    /// The first failing stage's error; see [`Pdf2MdError::stage`].
    pub async fn run(&self, input: impl AsRef<Path>) -> Result<ConversionReport, Pdf2MdError> {
        let result = self.run_stages(input.as_ref()).await;
        if let (Err(e), Some(cb)) = (&result, &self.config.progress_callback) {
            cb.on_stage_error(e.stage(), &e.to_string());
        }
        result
    }

    /// Convert PDF bytes held in memory.
    ///
    /// The bytes are written to `document.pdf` inside a managed temporary
    /// directory that is removed when the call returns, so the reported
    /// `input` path no longer exists afterwards. pdfcpu names images after
    /// the input file, so the fixed name lets a repeated run overwrite its
    /// own images in the assets directory.
    pub async fn run_from_bytes(&self, bytes: &[u8]) -> Result<ConversionReport, Pdf2MdError> {
        let tmp_dir = tempfile::Builder::new()
            .prefix("pdf2md-")
            .tempdir()
            .map_err(|e| Pdf2MdError::Internal(format!("tempdir: {e}")))?;
        let pdf_path = tmp_dir.path().join(BYTES_INPUT_NAME);
        tokio::fs::write(&pdf_path, bytes)
            .await
            .map_err(|e| Pdf2MdError::Internal(format!("tempfile write: {e}")))?;
        self.run(&pdf_path).await
    }

    /// Blocking variant of [`Converter::run`].
    ///
    /// Creates a temporary single-threaded tokio runtime; must not be called
    /// from inside another runtime.
    pub fn run_blocking(&self, input: impl AsRef<Path>) -> Result<ConversionReport, Pdf2MdError> {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Pdf2MdError::Internal(format!("Failed to create tokio runtime: {}", e)))?
            .block_on(self.run(input))
    }

    async fn run_stages(&self, input_path: &Path) -> Result<ConversionReport, Pdf2MdError> {
        let total_start = Instant::now();
        let config = &self.config;
        info!("Starting conversion: {}", input_path.display());

        // ── Step 1: Assets directory ─────────────────────────────────────
        self.stage_start(ConversionStage::Init);
        ensure_assets_dir(&config.assets).await?;
        self.stage_complete(ConversionStage::Init);

        // ── Step 2: Text ─────────────────────────────────────────────────
        self.stage_start(ConversionStage::ExtractText);
        let text_start = Instant::now();
        let pdf_path = input::resolve_input(input_path)?;
        let extracted = self.extract_text(&pdf_path).await?;
        if config.require_text && extracted.is_blank() {
            return Err(Pdf2MdError::NoTextLayer {
                path: pdf_path,
                pages: extracted.page_count,
            });
        }
        let text_duration_ms = text_start.elapsed().as_millis() as u64;
        info!(
            "Extracted {} bytes of text from {} pages in {}ms",
            extracted.text.len(),
            extracted.page_count,
            text_duration_ms
        );
        self.stage_complete(ConversionStage::ExtractText);

        // ── Step 3: Images ───────────────────────────────────────────────
        self.stage_start(ConversionStage::ExtractImages);
        let image_start = Instant::now();
        let images = self
            .images
            .extract_images(&pdf_path, &config.assets)
            .await?;
        let image_duration_ms = image_start.elapsed().as_millis() as u64;
        info!("Found {} images in {}ms", images.len(), image_duration_ms);
        self.stage_complete(ConversionStage::ExtractImages);

        // ── Step 4: Assemble ─────────────────────────────────────────────
        self.stage_start(ConversionStage::Assemble);
        let markdown = markdown::assemble_markdown(&extracted.text, &images, &config.assets);
        self.stage_complete(ConversionStage::Assemble);

        // ── Step 5: Persist ──────────────────────────────────────────────
        self.stage_start(ConversionStage::Persist);
        write_markdown(&config.output, &markdown).await?;
        self.stage_complete(ConversionStage::Persist);

        let stats = ConversionStats {
            page_count: extracted.page_count,
            text_lines: extracted.text.lines().count(),
            text_bytes: extracted.text.len(),
            image_count: images.len(),
            markdown_bytes: markdown.len(),
            text_duration_ms,
            image_duration_ms,
            total_duration_ms: total_start.elapsed().as_millis() as u64,
        };

        info!(
            "Conversion complete: {} → {} ({} images, {}ms)",
            pdf_path.display(),
            config.output.display(),
            stats.image_count,
            stats.total_duration_ms
        );

        if let Some(ref cb) = config.progress_callback {
            cb.on_conversion_complete(stats.image_count, stats.markdown_bytes);
        }

        Ok(ConversionReport {
            input: pdf_path,
            output: config.output.clone(),
            assets_dir: config.assets.clone(),
            images,
            stats,
        })
    }

    /// pdfium is blocking, so the extractor runs on the blocking pool.
    async fn extract_text(&self, pdf_path: &Path) -> Result<ExtractedText, Pdf2MdError> {
        let extractor = Arc::clone(&self.text);
        let path = pdf_path.to_path_buf();
        tokio::task::spawn_blocking(move || extractor.extract_text(&path))
            .await
            .map_err(|e| Pdf2MdError::Internal(format!("Text extraction task panicked: {}", e)))?
    }

    fn stage_start(&self, stage: ConversionStage) {
        debug!("Stage start: {:?}", stage);
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_stage_start(stage);
        }
    }

    fn stage_complete(&self, stage: ConversionStage) {
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_stage_complete(stage);
        }
    }
}

/// Convert a PDF file to Markdown with the default engines.
///
/// Shorthand for `Converter::new(config.clone()).run(input)`.
pub async fn convert(
    input: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionReport, Pdf2MdError> {
    Converter::new(config.clone()).run(input).await
}

/// Synchronous wrapper around [`convert`].
///
/// See [`Converter::run_blocking`].
pub fn convert_sync(
    input: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionReport, Pdf2MdError> {
    Converter::new(config.clone()).run_blocking(input)
}

/// Convert PDF bytes in memory to Markdown.
///
/// See [`Converter::run_from_bytes`].
pub async fn convert_from_bytes(
    bytes: &[u8],
    config: &ConversionConfig,
) -> Result<ConversionReport, Pdf2MdError> {
    Converter::new(config.clone()).run_from_bytes(bytes).await
}

/// Create `dir` (and missing parents) unless it already exists.
pub async fn ensure_assets_dir(dir: &Path) -> Result<(), Pdf2MdError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| Pdf2MdError::DirectorySetup {
            path: dir.to_path_buf(),
            source: e,
        })?;
    debug!("Assets directory ready: {}", dir.display());
    Ok(())
}

/// Replace `path` with `markdown`.
///
/// Atomic write: the content goes to a sibling `*.tmp` file which is then
/// renamed over `path`.
pub async fn write_markdown(path: &Path, markdown: &str) -> Result<(), Pdf2MdError> {
    let write_err = |source| Pdf2MdError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let tmp_path = temp_sibling(path);
    tokio::fs::write(&tmp_path, markdown)
        .await
        .map_err(write_err)?;

    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_err(e));
    }
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("output.md"));
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_sibling_stays_in_same_directory() {
        assert_eq!(
            temp_sibling(Path::new("docs/out.md")),
            PathBuf::from("docs/out.md.tmp")
        );
        assert_eq!(temp_sibling(Path::new("README")), PathBuf::from("README.tmp"));
    }

    #[tokio::test]
    async fn write_markdown_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.md");
        std::fs::write(&out, "old content that is longer").unwrap();

        write_markdown(&out, "new\n").await.unwrap();

        assert_eq!(std::fs::read_to_string(&out).unwrap(), "new\n");
        assert!(!dir.path().join("out.md.tmp").exists());
    }

    #[tokio::test]
    async fn write_markdown_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("missing").join("out.md");

        let err = write_markdown(&out, "x").await.unwrap_err();
        assert!(matches!(err, Pdf2MdError::OutputWriteFailed { .. }));
        assert_eq!(err.stage(), ConversionStage::Persist);
    }

    #[tokio::test]
    async fn ensure_assets_dir_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let assets = dir.path().join("a").join("b");
        ensure_assets_dir(&assets).await.unwrap();
        ensure_assets_dir(&assets).await.unwrap();
        assert!(assets.is_dir());
    }

    #[tokio::test]
    async fn ensure_assets_dir_over_a_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("assets");
        std::fs::write(&blocker, b"not a dir").unwrap();

        let err = ensure_assets_dir(&blocker).await.unwrap_err();
        assert!(matches!(err, Pdf2MdError::DirectorySetup { .. }));
    }
}
