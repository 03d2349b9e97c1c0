//! Input resolution: validate the user-supplied PDF path.
//!
//! pdfium and the image tool both produce unhelpful messages for a missing
//! or non-PDF file, so we check existence, read permission and the `%PDF`
//! magic bytes up front. The returned path is absolute, which keeps the
//! subprocess independent of how the caller spelled the input.

use crate::error::Pdf2MdError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolve a local PDF path, validating existence and PDF magic bytes.
pub fn resolve_input(path: &Path) -> Result<PathBuf, Pdf2MdError> {
    if !path.exists() {
        return Err(Pdf2MdError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Pdf2MdError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(Pdf2MdError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    };

    // A file shorter than the magic is rejected too.
    let mut magic = [0u8; 4];
    if file.read_exact(&mut magic).is_err() || &magic != b"%PDF" {
        return Err(Pdf2MdError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        });
    }

    let absolute = std::path::absolute(path).map_err(|e| {
        Pdf2MdError::Internal(format!("Cannot make '{}' absolute: {e}", path.display()))
    })?;

    debug!("Resolved local PDF: {}", absolute.display());
    Ok(absolute)
}
