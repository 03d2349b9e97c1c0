//! Progress-callback trait for per-stage conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the pipeline moves through its stages. The CLI uses it to drive
//! a spinner; library callers can forward events anywhere.
//!
//! # Example
//!
//! ```rust
//! use pdftext2md::{ConversionConfig, ConversionProgressCallback, ConversionStage};
//! use std::sync::{Arc, Mutex};
//!
//! struct StageLog(Mutex<Vec<ConversionStage>>);
//!
//! impl ConversionProgressCallback for StageLog {
//!     fn on_stage_complete(&self, stage: ConversionStage) {
//!         self.0.lock().unwrap().push(stage);
//!     }
//! }
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(Arc::new(StageLog(Mutex::new(Vec::new()))))
//!     .build()
//!     .unwrap();
//! ```

use crate::error::ConversionStage;
use std::sync::Arc;

/// Called by the conversion pipeline as it enters and leaves each stage.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Stages run strictly one after another, but the
/// trait is `Send + Sync` so a callback can be shared with other threads.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called when a stage starts.
    fn on_stage_start(&self, stage: ConversionStage) {
        let _ = stage;
    }

    /// Called when a stage finishes successfully.
    fn on_stage_complete(&self, stage: ConversionStage) {
        let _ = stage;
    }

    /// Called once when a stage fails; no further events follow.
    fn on_stage_error(&self, stage: ConversionStage, error: &str) {
        let _ = (stage, error);
    }

    /// Called once after the Markdown file has been written.
    ///
    /// # Arguments
    /// * `image_count`  — number of image references in the output
    /// * `markdown_len` — byte length of the written Markdown
    fn on_conversion_complete(&self, image_count: usize, markdown_len: usize) {
        let _ = (image_count, markdown_len);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
