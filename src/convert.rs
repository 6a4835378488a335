//! Notebook-to-paper build orchestration.
//!
//! [`Converter::build`] runs the whole pipeline on an in-memory notebook.
//! It is synchronous: every step is either pure scanning or blocking local
//! I/O. [`Converter::convert`] adds input resolution (local path or URL) in
//! front of it and runs the build on a blocking worker thread.
//!
//! Output layout:
//!
//! ```text
//! <output_dir>/
//!   main.tex          always
//!   references.bib    only when citations were found
//!   figure<N>.png     only when figures are saved and PNG outputs exist
//! ```

use crate::config::ConversionConfig;
use crate::error::{Nb2PaperError, Result};
use crate::notebook::Notebook;
use crate::output::BuildResult;
use crate::pipeline::{
    extract_citations, extract_equations, extract_figures, extract_metadata, input,
    NbconvertExporter, NotebookExporter,
};
use crate::progress::{BuildProgressCallback, BuildStage};
use crate::template::{FrontMatter, TemplateRegistry};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// File name of the bibliography written next to the main document.
pub const BIBLIOGRAPHY_FILE: &str = "references.bib";

/// Build context: the template registry and the body exporter.
///
/// Cheap to clone; both parts are shared.
#[derive(Clone)]
pub struct Converter {
    registry: Arc<TemplateRegistry>,
    exporter: Arc<dyn NotebookExporter>,
}

impl Default for Converter {
    /// Built-in templates and the nbconvert exporter.
    fn default() -> Self {
        Self::new(TemplateRegistry::builtin(), NbconvertExporter::default())
    }
}

impl std::fmt::Debug for Converter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Converter")
            .field("templates", &self.registry.list_names())
            .field("exporter", &self.exporter.name())
            .finish()
    }
}

impl Converter {
    pub fn new(registry: TemplateRegistry, exporter: impl NotebookExporter + 'static) -> Self {
        Self {
            registry: Arc::new(registry),
            exporter: Arc::new(exporter),
        }
    }

    /// Share an already-constructed exporter.
    pub fn with_shared_exporter(registry: TemplateRegistry, exporter: Arc<dyn NotebookExporter>) -> Self {
        Self {
            registry: Arc::new(registry),
            exporter,
        }
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Build a paper from an in-memory notebook.
    ///
    /// Steps, in order: resolve template → front matter → figures (optional)
    /// → equations (counted) → citations (optional) → export body (code
    /// cells stripped unless `include_code`) → render → write `main.tex` →
    /// write `references.bib` if any citation was found.
    ///
    /// # Errors
    /// Unknown template, exporter failure, or an unwritable output
    /// directory. Nothing written before the failure is cleaned up.
    pub fn build(
        &self,
        notebook: &Notebook,
        output_dir: &Path,
        config: &ConversionConfig,
    ) -> Result<BuildResult> {
        let start = Instant::now();
        let progress = config.progress_callback.as_deref();
        let stage = |s: BuildStage| {
            debug!("Stage: {}", s);
            if let Some(cb) = progress {
                cb.on_stage(s);
            }
        };

        // ── Step 1: Template ─────────────────────────────────────────────
        stage(BuildStage::ResolveTemplate);
        let template = config.template.resolve(&self.registry)?;
        info!(
            "Building paper with template '{}' into {}",
            template.name,
            output_dir.display()
        );

        // ── Step 2: Front matter ─────────────────────────────────────────
        stage(BuildStage::ExtractMetadata);
        let metadata = extract_metadata(notebook);

        // ── Step 3: Figures ──────────────────────────────────────────────
        let figures = if config.save_figures {
            stage(BuildStage::ExtractFigures);
            let figures = extract_figures(notebook, output_dir, config.figure_format)?;
            if let Some(cb) = progress {
                for (i, path) in figures.iter().enumerate() {
                    cb.on_figure_saved(i + 1, path);
                }
            }
            figures
        } else {
            Vec::new()
        };

        // ── Step 4: Equations ────────────────────────────────────────────
        stage(BuildStage::ExtractEquations);
        let equation_count = extract_equations(notebook).len();

        // ── Step 5: Citations ────────────────────────────────────────────
        let citations = if config.extract_citations {
            stage(BuildStage::ExtractCitations);
            extract_citations(notebook)
        } else {
            Vec::new()
        };

        // ── Step 6: Body ─────────────────────────────────────────────────
        stage(BuildStage::Export);
        let exported = if config.include_code {
            self.exporter.export(notebook)?
        } else {
            self.exporter.export(&notebook.without_code_cells())?
        };
        debug!(
            "Exporter '{}' returned {} bytes, {} resources",
            self.exporter.name(),
            exported.body.len(),
            exported.resources.len()
        );

        // ── Step 7: Render ───────────────────────────────────────────────
        stage(BuildStage::Render);
        let document = template.render(FrontMatter::from(&metadata), &exported.body);

        // ── Step 8: Write ────────────────────────────────────────────────
        stage(BuildStage::Write);
        std::fs::create_dir_all(output_dir)
            .map_err(|e| Nb2PaperError::write_failed(output_dir, e))?;

        let main_file = output_dir.join(&config.main_file_name);
        write_atomic(&main_file, &document)?;

        let bibliography_file = if citations.is_empty() {
            None
        } else {
            let bib = output_dir.join(BIBLIOGRAPHY_FILE);
            let content: String = citations.iter().map(|c| format!("{c}\n\n")).collect();
            write_atomic(&bib, &content)?;
            Some(bib)
        };

        let result = BuildResult {
            success: true,
            output_dir: output_dir.to_path_buf(),
            main_file,
            bibliography_file,
            figures,
            equation_count,
            citation_count: citations.len(),
            metadata,
        };

        info!(
            "Build complete: {} figures, {} equations, {} citations, {}ms",
            result.figures.len(),
            result.equation_count,
            result.citation_count,
            start.elapsed().as_millis()
        );

        if let Some(cb) = progress {
            cb.on_build_complete(&result);
        }

        Ok(result)
    }

    /// Resolve `input` (local path or HTTP/HTTPS URL), parse it and build.
    ///
    /// # Errors
    /// Everything [`Converter::build`] returns, plus unreadable, unparseable
    /// or undownloadable input.
    pub async fn convert(
        &self,
        input_str: impl AsRef<str>,
        output_dir: impl AsRef<Path>,
        config: &ConversionConfig,
    ) -> Result<BuildResult> {
        let input_str = input_str.as_ref();
        info!("Starting conversion: {}", input_str);

        let notebook = input::load_notebook(input_str, config.download_timeout_secs).await?;
        info!("Notebook has {} cells", notebook.cells.len());

        let this = self.clone();
        let output_dir: PathBuf = output_dir.as_ref().to_path_buf();
        let config = config.clone();
        tokio::task::spawn_blocking(move || this.build(&notebook, &output_dir, &config))
            .await
            .map_err(|e| Nb2PaperError::Internal(format!("Build task panicked: {}", e)))?
    }
}

/// Build an already-parsed notebook with the built-in templates and nbconvert.
pub fn build_paper(
    notebook: &Notebook,
    output_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<BuildResult> {
    Converter::default().build(notebook, output_dir.as_ref(), config)
}

/// Convert a notebook file or URL with the built-in templates and nbconvert.
///
/// This is the primary entry point for the library.
pub async fn convert(
    input_str: impl AsRef<str>,
    output_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<BuildResult> {
    Converter::default().convert(input_str, output_dir, config).await
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input_str: impl AsRef<str>,
    output_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<BuildResult> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Nb2PaperError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(input_str, output_dir, config))
}

/// Write via a sibling temp file and rename, so readers never see a
/// half-written document.
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp_path = path.with_file_name(format!(".{file_name}.tmp"));

    std::fs::write(&tmp_path, content).map_err(|e| Nb2PaperError::write_failed(path, e))?;
    std::fs::rename(&tmp_path, path).map_err(|e| Nb2PaperError::write_failed(path, e))?;
    Ok(())
}
