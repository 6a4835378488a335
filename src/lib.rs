//! # nb2paper
//!
//! Turn Jupyter notebooks into LaTeX paper skeletons.
//!
//! A build reads front matter from the first two markdown cells, saves PNG
//! outputs as numbered figures, counts the math, collects a numbered
//! references section into `references.bib`, and wraps the exported notebook
//! body in one of a set of named document templates.
//!
//! ## Pipeline Overview
//!
//! ```text
//! notebook (.ipynb path or URL)
//!  │
//!  ├─ 1. Template   resolve by name in the registry, or use a custom one
//!  ├─ 2. Metadata   title / authors / institution / keywords / abstract
//!  ├─ 3. Figures    image/png outputs → figure1.png, figure2.png, …
//!  ├─ 4. Equations  $$display$$ and $inline$ spans (counted)
//!  ├─ 5. Citations  "[n] …" lines of the References cell
//!  ├─ 6. Export     body LaTeX from nbconvert (or the built-in exporter)
//!  └─ 7. Write      main.tex (+ references.bib)
//! ```
//!
//! Around the build sit thin helpers for the rest of the paper workflow:
//! [`latex`] (pdflatex/bibtex or a remote build service), [`overleaf`]
//! (collaboration-service client) and [`github`] (git / gh publishing).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nb2paper::{convert, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder().template_name("ieee").build()?;
//!     let result = convert("analysis.ipynb", "paper", &config).await?;
//!     println!("{}", result.main_file.display());
//!     eprintln!("{} figures, {} equations, {} citations",
//!         result.figures.len(),
//!         result.equation_count,
//!         result.citation_count);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `nb2paper` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! nb2paper = { version = "0.1", default-features = false }
//! ```
//!
//! ## Templates
//!
//! | Name | Document class | Layout |
//! |------|----------------|--------|
//! | `article`       | `article`  | one column |
//! | `twocolumn`     | `article`  | two column |
//! | `ieee`          | `IEEEtran` | two column |
//! | `acta_acustica` | `article`  | two column |
//! | `thesis`        | `report`   | one column |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod github;
pub mod latex;
pub mod notebook;
pub mod output;
pub mod overleaf;
pub mod pipeline;
pub mod progress;
mod service;
pub mod template;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, FigureFormat, TemplateSelector};
pub use convert::{build_paper, convert, convert_sync, Converter};
pub use error::{Nb2PaperError, Result};
pub use latex::{check_latex_installation, CompileReport, LatexCompiler};
pub use notebook::{Cell, CellKind, Notebook, Output};
pub use output::{BuildResult, Equation, EquationKind, Metadata};
pub use overleaf::OverleafClient;
pub use pipeline::{
    extract_citations, extract_equations, extract_figures, extract_metadata, NbconvertExporter,
    NotebookExporter, PlainExporter,
};
pub use progress::{BuildProgressCallback, BuildStage, NoopProgressCallback, ProgressCallback};
pub use template::{FrontMatter, Layout, Template, TemplateRegistry};
