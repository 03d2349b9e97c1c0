//! Plain-text extraction via pdfium.
//!
//! pdfium reports page text with `\r\n` line breaks and no trailing
//! terminator; we join pages with `\n` and then run everything through
//! [`normalize_lines`] so the Markdown body always uses `\n` and every line,
//! including the last, is terminated.
//!
//! The engine sits behind [`TextExtractor`] so the orchestrator can be
//! exercised without a pdfium shared library.

use crate::error::Pdf2MdError;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming an explicit pdfium library file.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Text pulled out of a document, ready for assembly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedText {
    /// Newline-normalised text of the whole document.
    pub text: String,
    /// Number of pages the engine read.
    pub page_count: usize,
}

impl ExtractedText {
    /// True when the document produced no visible characters.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A source of plain text for a PDF file.
///
/// Implementations are blocking; the orchestrator calls them from
/// `spawn_blocking`.
pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, pdf_path: &Path) -> Result<ExtractedText, Pdf2MdError>;
}

/// [`TextExtractor`] backed by the pdfium C++ library.
#[derive(Clone, Default)]
pub struct PdfiumTextExtractor {
    password: Option<String>,
    library_path: Option<PathBuf>,
}

impl std::fmt::Debug for PdfiumTextExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfiumTextExtractor")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("library_path", &self.library_path)
            .finish()
    }
}

impl PdfiumTextExtractor {
    pub fn new(password: Option<String>) -> Self {
        Self {
            password,
            library_path: None,
        }
    }

    /// Bind to this pdfium library file instead of searching for one.
    pub fn with_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.library_path = Some(path.into());
        self
    }
}

impl TextExtractor for PdfiumTextExtractor {
    fn extract_text(&self, pdf_path: &Path) -> Result<ExtractedText, Pdf2MdError> {
        let pdfium = bind_pdfium(self.library_path.as_deref())?;
        let password = self.password.as_deref();

        let document = pdfium
            .load_pdf_from_file(pdf_path, password)
            .map_err(|e| classify_load_error(pdf_path, password.is_some(), e))?;

        let pages = document.pages();
        let page_count = pages.len() as usize;
        info!("PDF loaded: {} pages", page_count);

        let mut raw = String::new();
        for (idx, page) in pages.iter().enumerate() {
            let page_text = page
                .text()
                .map_err(|e| Pdf2MdError::TextExtractionFailed {
                    path: pdf_path.to_path_buf(),
                    page: idx + 1,
                    detail: format!("{:?}", e),
                })?
                .all();
            debug!("Page {} → {} chars", idx + 1, page_text.chars().count());

            if idx > 0 {
                raw.push('\n');
            }
            raw.push_str(&page_text);
        }

        Ok(ExtractedText {
            text: normalize_lines(&raw),
            page_count,
        })
    }
}

/// Bind to a pdfium library.
///
/// Lookup order: `explicit`, then `$PDFIUM_LIB_PATH`, then a platform
/// library in the working directory, then the system library.
pub fn bind_pdfium(explicit: Option<&Path>) -> Result<Pdfium, Pdf2MdError> {
    let from_env = std::env::var_os(PDFIUM_LIB_PATH_ENV).map(PathBuf::from);

    let bindings = match explicit.map(Path::to_path_buf).or(from_env) {
        Some(path) => {
            debug!("Binding pdfium from {}", path.display());
            Pdfium::bind_to_library(&path).map_err(|e| {
                Pdf2MdError::PdfiumBindingFailed(format!("{}: {:?}", path.display(), e))
            })?
        }
        None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| Pdf2MdError::PdfiumBindingFailed(format!("{:?}", e)))?,
    };

    Ok(Pdfium::new(bindings))
}

/// Re-split `raw` into lines and terminate each with a single `\n`.
///
/// Both `\n` and `\r\n` end a line; a lone `\r` is kept as content.
/// Empty input stays empty.
pub fn normalize_lines(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 1);
    for line in raw.lines() {
        out.push_str(line);
        out.push('\n');
    }
    out
}

fn classify_load_error(path: &Path, had_password: bool, err: PdfiumError) -> Pdf2MdError {
    let err_str = format!("{:?}", err);
    if err_str.contains("Password") || err_str.contains("password") {
        if had_password {
            Pdf2MdError::WrongPassword {
                path: path.to_path_buf(),
            }
        } else {
            Pdf2MdError::PasswordRequired {
                path: path.to_path_buf(),
            }
        }
    } else {
        Pdf2MdError::CorruptPdf {
            path: path.to_path_buf(),
            detail: err_str,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crlf_becomes_lf() {
        assert_eq!(normalize_lines("Hello\r\nWorld"), "Hello\nWorld\n");
    }

    #[test]
    fn trailing_newline_not_doubled() {
        assert_eq!(normalize_lines("one\ntwo\n"), "one\ntwo\n");
    }

    #[test]
    fn blank_lines_survive() {
        assert_eq!(normalize_lines("a\n\nb"), "a\n\nb\n");
    }

    #[test]
    fn empty_stays_empty() {
        assert_eq!(normalize_lines(""), "");
    }

    #[test]
    fn lone_carriage_return_is_content() {
        assert_eq!(normalize_lines("a\rb"), "a\rb\n");
    }

    #[test]
    fn blank_detection() {
        let t = ExtractedText {
            text: "\n \n".into(),
            page_count: 2,
        };
        assert!(t.is_blank());
        let t = ExtractedText {
            text: "x\n".into(),
            page_count: 1,
        };
        assert!(!t.is_blank());
    }

    #[test]
    fn bind_to_missing_library_fails_cleanly() {
        let err = bind_pdfium(Some(Path::new("/definitely/not/libpdfium.so")))
            .err()
            .expect("binding a missing file must fail");
        assert!(matches!(err, Pdf2MdError::PdfiumBindingFailed(_)));
    }
}
