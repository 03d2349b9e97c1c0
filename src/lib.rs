//! # pdftext2md
//!
//! Convert a PDF into a Markdown file: the document's text layer becomes the
//! body, embedded images are extracted into an assets directory and linked
//! at the end of the document.
//!
//! This is a quick, scriptable converter, not a layout-preserving one. Text
//! comes from pdfium's text layer; images come from the external `pdfcpu`
//! tool. Nothing is placed in reading position: all image references follow
//! the text, numbered in file-name order.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Init     create the assets directory
//!  ├─ 2. Text     pdfium text layer, line endings normalised (spawn_blocking)
//!  ├─ 3. Images   `pdfcpu extract -mode image <pdf> <assets>` with a timeout
//!  ├─ 4. Assemble text + "---" + ![Image n](assets/<name>) lines
//!  └─ 5. Persist  atomic write of the Markdown file
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdftext2md::{convert, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder()
//!         .output("out.md")
//!         .assets("pics")
//!         .build()?;
//!     let report = convert("sample.pdf", &config).await?;
//!     eprintln!("{} pages, {} images", report.stats.page_count, report.stats.image_count);
//!     Ok(())
//! }
//! ```
//!
//! ## Runtime requirements
//!
//! * the pdfium shared library (`PDFIUM_LIB_PATH`, the working directory, or
//!   a system install);
//! * `pdfcpu` on `PATH`, or another program given via
//!   [`ConversionConfigBuilder::image_tool`].
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2md` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert, convert_from_bytes, convert_sync, Converter};
pub use error::{ConversionStage, Pdf2MdError};
pub use output::{ConversionReport, ConversionStats};
pub use pipeline::images::{CommandImageExtractor, ImageExtractor, IMAGE_EXTENSIONS};
pub use pipeline::markdown::assemble_markdown;
pub use pipeline::text::{ExtractedText, PdfiumTextExtractor, TextExtractor};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
