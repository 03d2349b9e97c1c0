//! Image extraction through an external executable.
//!
//! pdfium can render pages but does not hand back embedded image streams in
//! their original encoding, so this stage shells out to `pdfcpu`:
//!
//! ```text
//! pdfcpu [extra args…] extract -mode image [-upw <password>] <pdf> <assets_dir>
//! ```
//!
//! and then lists `assets_dir` for files with a recognised image extension.
//! Anything else the tool leaves behind (logs, metadata) is ignored but not
//! deleted.
//!
//! The run is bounded by a timeout; on expiry the child is killed
//! (`kill_on_drop`) and the conversion fails.

use crate::config::ConversionConfig;
use crate::error::Pdf2MdError;
use futures::future::BoxFuture;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Extensions (lower-case, without the dot) accepted as extracted images.
pub const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "gif", "bmp", "tiff", "svg"];

/// Anything that can pull the images out of a PDF into a directory.
///
/// The returned paths are the images now present in `assets_dir`, in the
/// order they should be referenced.
pub trait ImageExtractor: Send + Sync {
    fn extract_images<'a>(
        &'a self,
        pdf_path: &'a Path,
        assets_dir: &'a Path,
    ) -> BoxFuture<'a, Result<Vec<PathBuf>, Pdf2MdError>>;
}

/// [`ImageExtractor`] that runs an external program (pdfcpu by default).
#[derive(Clone)]
pub struct CommandImageExtractor {
    program: String,
    leading_args: Vec<String>,
    password: Option<String>,
    timeout: Duration,
}

impl std::fmt::Debug for CommandImageExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandImageExtractor")
            .field("program", &self.program)
            .field("leading_args", &self.leading_args)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl CommandImageExtractor {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
            password: None,
            timeout: Duration::from_secs(crate::config::DEFAULT_IMAGE_TIMEOUT_SECS),
        }
    }

    pub fn from_config(config: &ConversionConfig) -> Self {
        Self {
            program: config.image_tool.clone(),
            leading_args: config.image_tool_args.clone(),
            password: config.password.clone(),
            timeout: Duration::from_secs(config.image_timeout_secs),
        }
    }

    /// Arguments inserted between the program and `extract`.
    pub fn with_leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.leading_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Full argument vector passed to the program.
    pub fn command_args(&self, pdf_path: &Path, assets_dir: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.leading_args.iter().map(OsString::from).collect();
        args.extend(["extract", "-mode", "image"].map(OsString::from));
        if let Some(ref pw) = self.password {
            args.push("-upw".into());
            args.push(pw.into());
        }
        args.push(pdf_path.into());
        args.push(assets_dir.into());
        args
    }

    async fn run_tool(&self, pdf_path: &Path, assets_dir: &Path) -> Result<(), Pdf2MdError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.command_args(pdf_path, assets_dir))
            .stdin(Stdio::null())
            .kill_on_drop(true);

        debug!(
            "Running {} on {} → {}",
            self.program,
            pdf_path.display(),
            assets_dir.display()
        );

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Err(_) => {
                return Err(Pdf2MdError::ImageExtractionTimeout {
                    tool: self.program.clone(),
                    secs: self.timeout.as_secs(),
                })
            }
            Ok(Err(e)) => {
                return Err(Pdf2MdError::ImageExtractionFailed {
                    tool: self.program.clone(),
                    status: format!("could not start: {e}"),
                    output: String::new(),
                })
            }
            Ok(Ok(output)) => output,
        };

        // stdout first, then stderr
        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        let combined = combined.trim().to_string();

        if !output.status.success() {
            return Err(Pdf2MdError::ImageExtractionFailed {
                tool: self.program.clone(),
                status: output.status.to_string(),
                output: combined,
            });
        }

        if !combined.is_empty() {
            debug!("{} output:\n{}", self.program, combined);
        }
        Ok(())
    }
}

impl Default for CommandImageExtractor {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_IMAGE_TOOL)
    }
}

impl ImageExtractor for CommandImageExtractor {
    fn extract_images<'a>(
        &'a self,
        pdf_path: &'a Path,
        assets_dir: &'a Path,
    ) -> BoxFuture<'a, Result<Vec<PathBuf>, Pdf2MdError>> {
        Box::pin(async move {
            self.run_tool(pdf_path, assets_dir).await?;
            let images = collect_images(assets_dir).await?;
            info!("{} images in {}", images.len(), assets_dir.display());
            Ok(images)
        })
    }
}

/// List `dir` for image files, sorted by file name.
///
/// Directories and files without a recognised extension are skipped.
pub async fn collect_images(dir: &Path) -> Result<Vec<PathBuf>, Pdf2MdError> {
    let read_err = |source| Pdf2MdError::DirectoryRead {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(read_err)?;
    let mut names = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(read_err)? {
        let file_type = entry.file_type().await.map_err(read_err)?;
        if file_type.is_dir() {
            continue;
        }
        let name = entry.file_name();
        if is_image_file(Path::new(&name)) {
            names.push(name);
        } else {
            warn!("Ignoring non-image file in assets: {}", name.to_string_lossy());
        }
    }

    names.sort();
    Ok(names.into_iter().map(|name| dir.join(name)).collect())
}

/// True when `path` has one of [`IMAGE_EXTENSIONS`] (case-insensitive).
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_image_extensions() {
        for name in [
            "a.png", "b.JPG", "c.jpeg", "d.Gif", "e.bmp", "f.TIFF", "g.svg",
        ] {
            assert!(is_image_file(Path::new(name)), "{name}");
        }
    }

    #[test]
    fn rejects_other_files() {
        for name in ["log.txt", "meta.json", "noext", ".png", "img.png.bak", "x.tif"] {
            assert!(!is_image_file(Path::new(name)), "{name}");
        }
    }

    #[test]
    fn command_args_follow_pdfcpu_layout() {
        let ex = CommandImageExtractor::new("pdfcpu");
        let args = ex.command_args(Path::new("/in/doc.pdf"), Path::new("assets"));
        assert_eq!(
            args,
            ["extract", "-mode", "image", "/in/doc.pdf", "assets"].map(OsString::from)
        );
    }

    #[test]
    fn command_args_with_password_and_leading_args() {
        let ex = CommandImageExtractor::new("pdfcpu")
            .with_leading_args(["-q"])
            .with_password("pw");
        let args = ex.command_args(Path::new("doc.pdf"), Path::new("out"));
        assert_eq!(
            args,
            ["-q", "extract", "-mode", "image", "-upw", "pw", "doc.pdf", "out"].map(OsString::from)
        );
    }

    #[test]
    fn from_config_copies_tool_settings() {
        let config = ConversionConfig::builder()
            .image_tool("mytool")
            .image_tool_args(["--fast"])
            .image_timeout_secs(7)
            .build()
            .unwrap();
        let ex = CommandImageExtractor::from_config(&config);
        assert_eq!(ex.program(), "mytool");
        assert_eq!(ex.timeout, Duration::from_secs(7));
        assert_eq!(ex.leading_args, vec!["--fast".to_string()]);
    }

    #[tokio::test]
    async fn collect_images_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["img-2.png", "log.txt", "img-1.JPG", "img-10.svg"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.png")).unwrap();

        let images = collect_images(dir.path()).await.unwrap();
        let names: Vec<_> = images
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, ["img-1.JPG", "img-10.svg", "img-2.png"]);
        assert!(images.iter().all(|p| p.starts_with(dir.path())));
    }

    #[tokio::test]
    async fn collect_images_missing_dir_is_read_error() {
        let err = collect_images(Path::new("/definitely/not/a/dir"))
            .await
            .unwrap_err();
        assert!(matches!(err, Pdf2MdError::DirectoryRead { .. }));
    }
}
