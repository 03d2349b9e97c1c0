//! Error types for the pdftext2md library.
//!
//! Every failure is fatal: the pipeline has no partial-success mode, so a
//! single [`Pdf2MdError`] is returned from the top-level `convert*`
//! functions and nothing is written to the output path.
//!
//! Each variant belongs to exactly one [`ConversionStage`], available via
//! [`Pdf2MdError::stage`]. The CLI uses it to prefix messages; library
//! callers can use it to decide which input to blame (the PDF, the image
//! tool, or the file system).

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The five steps of a conversion, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ConversionStage {
    /// Config validation and assets directory setup.
    Init,
    /// Plain-text extraction through pdfium.
    ExtractText,
    /// Subprocess image extraction plus directory listing.
    ExtractImages,
    /// Markdown assembly (pure, never fails).
    Assemble,
    /// Writing the Markdown file.
    Persist,
}

impl ConversionStage {
    /// All stages in the order the orchestrator runs them.
    pub const ALL: [ConversionStage; 5] = [
        ConversionStage::Init,
        ConversionStage::ExtractText,
        ConversionStage::ExtractImages,
        ConversionStage::Assemble,
        ConversionStage::Persist,
    ];

    /// Short human label, e.g. for progress output.
    pub fn label(self) -> &'static str {
        match self {
            ConversionStage::Init => "Preparing assets directory",
            ConversionStage::ExtractText => "Extracting text",
            ConversionStage::ExtractImages => "Extracting images",
            ConversionStage::Assemble => "Assembling Markdown",
            ConversionStage::Persist => "Writing output",
        }
    }
}

impl fmt::Display for ConversionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// All errors returned by the pdftext2md library.
#[derive(Debug, Error)]
pub enum Pdf2MdError {
    // ── Setup errors ──────────────────────────────────────────────────────
    /// The assets directory could not be created.
    #[error("Failed to create assets directory '{path}': {source}")]
    DirectorySetup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── Text extraction errors ────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// pdfium opened the document but could not produce text for a page.
    #[error("Text extraction failed for page {page} of '{path}': {detail}")]
    TextExtractionFailed {
        path: PathBuf,
        page: usize,
        detail: String,
    },

    /// Strict mode: the document has no text layer at all.
    #[error("PDF '{path}' has no extractable text layer ({pages} pages scanned)")]
    NoTextLayer { path: PathBuf, pages: usize },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Text extraction needs the pdfium shared library. You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n\
  • Place libpdfium next to the working directory.\n\
  • Install pdfium system-wide (https://github.com/bblanchon/pdfium-binaries).\n"
    )]
    PdfiumBindingFailed(String),

    // ── Image extraction errors ───────────────────────────────────────────
    /// The image tool could not be started or exited unsuccessfully.
    #[error("Image extraction with '{tool}' failed: {status}\nOutput: {output}")]
    ImageExtractionFailed {
        tool: String,
        /// Exit status, or the launch error when the process never ran.
        status: String,
        /// Combined stdout + stderr of the tool (empty if it never ran).
        output: String,
    },

    /// The image tool did not finish within the configured timeout.
    #[error("Image extraction with '{tool}' timed out after {secs}s\nIncrease --image-timeout.")]
    ImageExtractionTimeout { tool: String, secs: u64 },

    /// The assets directory could not be listed after extraction.
    #[error("Failed to read assets directory '{path}': {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output Markdown file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Pdf2MdError {
    /// The pipeline stage this error belongs to.
    pub fn stage(&self) -> ConversionStage {
        match self {
            Pdf2MdError::DirectorySetup { .. }
            | Pdf2MdError::InvalidConfig(_)
            | Pdf2MdError::Internal(_) => ConversionStage::Init,

            Pdf2MdError::FileNotFound { .. }
            | Pdf2MdError::PermissionDenied { .. }
            | Pdf2MdError::NotAPdf { .. }
            | Pdf2MdError::CorruptPdf { .. }
            | Pdf2MdError::PasswordRequired { .. }
            | Pdf2MdError::WrongPassword { .. }
            | Pdf2MdError::TextExtractionFailed { .. }
            | Pdf2MdError::NoTextLayer { .. }
            | Pdf2MdError::PdfiumBindingFailed(_) => ConversionStage::ExtractText,

            Pdf2MdError::ImageExtractionFailed { .. }
            | Pdf2MdError::ImageExtractionTimeout { .. }
            | Pdf2MdError::DirectoryRead { .. } => ConversionStage::ExtractImages,

            Pdf2MdError::OutputWriteFailed { .. } => ConversionStage::Persist,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_failure_display_includes_output() {
        let e = Pdf2MdError::ImageExtractionFailed {
            tool: "pdfcpu".into(),
            status: "exit status: 1".into(),
            output: "open broken.pdf: no such file".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("pdfcpu"), "got: {msg}");
        assert!(msg.contains("exit status: 1"), "got: {msg}");
        assert!(msg.contains("no such file"), "got: {msg}");
    }

    #[test]
    fn timeout_display() {
        let e = Pdf2MdError::ImageExtractionTimeout {
            tool: "pdfcpu".into(),
            secs: 30,
        };
        assert!(e.to_string().contains("30s"));
    }

    #[test]
    fn write_error_keeps_source() {
        use std::error::Error as _;
        let e = Pdf2MdError::OutputWriteFailed {
            path: PathBuf::from("/nope/out.md"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing parent"),
        };
        assert!(e.source().is_some());
        assert!(e.to_string().contains("/nope/out.md"));
    }

    #[test]
    fn stages_map_to_taxonomy() {
        let io = || std::io::Error::other("x");
        assert_eq!(
            Pdf2MdError::DirectorySetup {
                path: "a".into(),
                source: io()
            }
            .stage(),
            ConversionStage::Init
        );
        assert_eq!(
            Pdf2MdError::CorruptPdf {
                path: "a.pdf".into(),
                detail: "xref".into()
            }
            .stage(),
            ConversionStage::ExtractText
        );
        assert_eq!(
            Pdf2MdError::DirectoryRead {
                path: "a".into(),
                source: io()
            }
            .stage(),
            ConversionStage::ExtractImages
        );
        assert_eq!(
            Pdf2MdError::OutputWriteFailed {
                path: "o.md".into(),
                source: io()
            }
            .stage(),
            ConversionStage::Persist
        );
    }

    #[test]
    fn stage_order_is_pipeline_order() {
        assert_eq!(ConversionStage::ALL[0], ConversionStage::Init);
        assert_eq!(ConversionStage::ALL[4], ConversionStage::Persist);
        assert_eq!(ConversionStage::ExtractImages.to_string(), "Extracting images");
    }
}
