//! Records produced by the extractors and the build orchestrator.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Placeholder title used when the first cell carries no heading.
pub const DEFAULT_TITLE: &str = "Untitled";

/// Front-matter fields scanned from the first two narrative cells.
///
/// Every field is always present; unmatched fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub title: String,
    pub authors: String,
    pub institution: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub keywords: Vec<String>,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            authors: String::new(),
            institution: String::new(),
            abstract_text: String::new(),
            keywords: Vec::new(),
        }
    }
}

/// Display (`$$…$$`) or inline (`$…$`) math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquationKind {
    Display,
    Inline,
}

/// One math span found in a narrative cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equation {
    #[serde(rename = "type")]
    pub kind: EquationKind,
    /// Inner content, trimmed.
    pub content: String,
    /// Index of the originating cell in the notebook.
    pub cell: usize,
}

/// Result of a full paper build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildResult {
    pub success: bool,
    pub output_dir: PathBuf,
    /// Path of the rendered main document (`<output_dir>/main.tex`).
    pub main_file: PathBuf,
    /// `Some` only when at least one citation was written.
    pub bibliography_file: Option<PathBuf>,
    /// Saved figure files in creation order.
    pub figures: Vec<PathBuf>,
    pub equation_count: usize,
    pub citation_count: usize,
    pub metadata: Metadata,
}
