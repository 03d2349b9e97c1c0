//! Configuration types for PDF-to-Markdown conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The CLI builds exactly one config at
//! startup and threads it through the pipeline; no stage reads defaults from
//! anywhere else.

use crate::error::Pdf2MdError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;

/// Default Markdown output file.
pub const DEFAULT_OUTPUT: &str = "output.md";

/// Default directory for extracted images.
pub const DEFAULT_ASSETS_DIR: &str = "assets";

/// Default image-extraction executable, looked up on `PATH`.
pub const DEFAULT_IMAGE_TOOL: &str = "pdfcpu";

/// Default upper bound for one run of the image tool, in seconds.
pub const DEFAULT_IMAGE_TIMEOUT_SECS: u64 = 300;

/// Configuration for a PDF-to-Markdown conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdftext2md::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .output("result.md")
///     .assets("images")
///     .image_timeout_secs(60)
///     .build()
///     .unwrap();
/// assert_eq!(config.assets.to_str(), Some("images"));
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Destination Markdown file. Overwritten if it exists. Default: `output.md`.
    pub output: PathBuf,

    /// Directory receiving extracted images. Created if missing. Default: `assets`.
    ///
    /// Image links in the Markdown are written relative to this path exactly
    /// as given, so the Markdown file and the assets directory should share
    /// a parent when the document is rendered.
    pub assets: PathBuf,

    /// Image-extraction executable. Default: `pdfcpu`.
    pub image_tool: String,

    /// Extra arguments placed before `extract -mode image …`, e.g. a pdfcpu
    /// config flag. Default: none.
    pub image_tool_args: Vec<String>,

    /// Timeout for the image tool in seconds. Default: 300.
    ///
    /// The child process is killed when it expires.
    pub image_timeout_secs: u64,

    /// PDF user password for encrypted documents. Forwarded to pdfium and
    /// to the image tool (`-upw`).
    pub password: Option<String>,

    /// Fail with [`Pdf2MdError::NoTextLayer`] when the PDF has no text at
    /// all instead of producing an image-only document. Default: false.
    pub require_text: bool,

    /// Optional stage-progress observer.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_OUTPUT),
            assets: PathBuf::from(DEFAULT_ASSETS_DIR),
            image_tool: DEFAULT_IMAGE_TOOL.to_string(),
            image_tool_args: Vec::new(),
            image_timeout_secs: DEFAULT_IMAGE_TIMEOUT_SECS,
            password: None,
            require_text: false,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("output", &self.output)
            .field("assets", &self.assets)
            .field("image_tool", &self.image_tool)
            .field("image_tool_args", &self.image_tool_args)
            .field("image_timeout_secs", &self.image_timeout_secs)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("require_text", &self.require_text)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output = path.into();
        self
    }

    pub fn assets(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.assets = dir.into();
        self
    }

    pub fn image_tool(mut self, program: impl Into<String>) -> Self {
        self.config.image_tool = program.into();
        self
    }

    pub fn image_tool_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.image_tool_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn image_timeout_secs(mut self, secs: u64) -> Self {
        self.config.image_timeout_secs = secs;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn require_text(mut self, v: bool) -> Self {
        self.config.require_text = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Pdf2MdError> {
        let c = &self.config;
        if c.output.as_os_str().is_empty() {
            return Err(Pdf2MdError::InvalidConfig(
                "Output path must not be empty".into(),
            ));
        }
        if c.assets.as_os_str().is_empty() {
            return Err(Pdf2MdError::InvalidConfig(
                "Assets directory must not be empty".into(),
            ));
        }
        if c.image_tool.trim().is_empty() {
            return Err(Pdf2MdError::InvalidConfig(
                "Image tool must not be empty".into(),
            ));
        }
        if c.image_timeout_secs == 0 {
            return Err(Pdf2MdError::InvalidConfig(
                "Image timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_cli_defaults() {
        let c = ConversionConfig::default();
        assert_eq!(c.output, PathBuf::from("output.md"));
        assert_eq!(c.assets, PathBuf::from("assets"));
        assert_eq!(c.image_tool, "pdfcpu");
        assert_eq!(c.image_timeout_secs, 300);
        assert!(c.image_tool_args.is_empty());
        assert!(!c.require_text);
    }

    #[test]
    fn builder_sets_fields() {
        let c = ConversionConfig::builder()
            .output("out.md")
            .assets("pics")
            .image_tool("/opt/bin/pdfcpu")
            .image_tool_args(["-q"])
            .password("s3cret")
            .require_text(true)
            .build()
            .unwrap();
        assert_eq!(c.output, PathBuf::from("out.md"));
        assert_eq!(c.assets, PathBuf::from("pics"));
        assert_eq!(c.image_tool, "/opt/bin/pdfcpu");
        assert_eq!(c.image_tool_args, vec!["-q".to_string()]);
        assert_eq!(c.password.as_deref(), Some("s3cret"));
        assert!(c.require_text);
    }

    #[test]
    fn builder_rejects_zero_timeout() {
        let err = ConversionConfig::builder()
            .image_timeout_secs(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, Pdf2MdError::InvalidConfig(_)));
    }

    #[test]
    fn builder_rejects_empty_paths() {
        assert!(ConversionConfig::builder().output("").build().is_err());
        assert!(ConversionConfig::builder().assets("").build().is_err());
        assert!(ConversionConfig::builder().image_tool("  ").build().is_err());
    }

    #[test]
    fn debug_redacts_password() {
        let c = ConversionConfig::builder().password("hunter2").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("<redacted>"));
    }
}
