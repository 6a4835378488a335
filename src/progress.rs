//! Progress-callback trait for build events.
//!
//! Inject an [`Arc<dyn BuildProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to be told
//! when each stage of a build starts, when a figure is written and when the
//! build finishes.
//!
//! # Example
//!
//! ```rust
//! use nb2paper::{BuildProgressCallback, BuildStage, ConversionConfig};
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl BuildProgressCallback for Printer {
//!     fn on_stage(&self, stage: BuildStage) {
//!         eprintln!("→ {stage}");
//!     }
//! }
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(Arc::new(Printer))
//!     .build()
//!     .unwrap();
//! ```

use crate::output::BuildResult;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// The steps of a build, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStage {
    ResolveTemplate,
    ExtractMetadata,
    ExtractFigures,
    ExtractEquations,
    ExtractCitations,
    Export,
    Render,
    Write,
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BuildStage::ResolveTemplate => "resolving template",
            BuildStage::ExtractMetadata => "extracting front matter",
            BuildStage::ExtractFigures => "saving figures",
            BuildStage::ExtractEquations => "scanning equations",
            BuildStage::ExtractCitations => "collecting references",
            BuildStage::Export => "exporting notebook body",
            BuildStage::Render => "rendering document",
            BuildStage::Write => "writing output files",
        };
        f.write_str(label)
    }
}

/// Called by the build as it progresses. All methods default to no-ops.
///
/// Implementations must be `Send + Sync` because builds started through
/// [`crate::convert::convert`] run on a blocking worker thread.
pub trait BuildProgressCallback: Send + Sync {
    /// Called when `stage` begins. Skipped stages are not reported.
    fn on_stage(&self, stage: BuildStage) {
        let _ = stage;
    }

    /// Called after each figure file is written.
    ///
    /// # Arguments
    /// * `index`: 1-based figure number
    /// * `path`: written file
    fn on_figure_saved(&self, index: usize, path: &Path) {
        let _ = (index, path);
    }

    /// Called once after every output file has been written.
    fn on_build_complete(&self, result: &BuildResult) {
        let _ = result;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BuildProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn BuildProgressCallback>;
