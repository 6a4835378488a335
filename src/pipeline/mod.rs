//! Pipeline stages for notebook-to-paper conversion.
//!
//! Each submodule implements exactly one step. The four extractors are total
//! functions over a [`crate::notebook::Notebook`]: malformed or missing
//! content yields defaults and empty collections, never an error.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ metadata ──▶ figures ──▶ equations ──▶ citations ──▶ export
//! (path/URL)  (cells 0-1)  (PNG files)  ($ / $$)     ([n] lines)   (body)
//! ```
//!
//! 1. [`input`]     : read a notebook from a path or fetch it from a URL
//! 2. [`metadata`]  : title/authors/institution/keywords/abstract
//! 3. [`figures`]   : decode `image/png` outputs to `figure<N>.png`
//! 4. [`equations`] : display and inline math spans
//! 5. [`citations`] : bracket-numbered lines of the references cell
//! 6. [`export`]    : LaTeX body from an external or built-in exporter

pub mod citations;
pub mod equations;
pub mod export;
pub mod figures;
pub mod input;
pub mod metadata;

pub use citations::extract_citations;
pub use equations::extract_equations;
pub use export::{ExportOutput, NbconvertExporter, NotebookExporter, PlainExporter};
pub use figures::extract_figures;
pub use metadata::extract_metadata;
