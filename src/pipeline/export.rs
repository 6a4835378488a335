//! Notebook → LaTeX body export.
//!
//! The body of the paper is produced by an external exporter behind the
//! [`NotebookExporter`] trait. Two implementations ship with the crate:
//!
//! * [`NbconvertExporter`] shells out to `jupyter nbconvert --to latex`.
//! * [`PlainExporter`] needs no external tools: narrative sources are copied
//!   verbatim and code sources are wrapped in a `verbatim` environment.

use crate::error::{Nb2PaperError, Result};
use crate::notebook::{CellKind, Notebook};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, info};

/// Body markup plus whatever side resources the exporter reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportOutput {
    pub body: String,
    pub resources: BTreeMap<String, String>,
}

/// Turns a notebook (or a filtered copy of it) into LaTeX body markup.
pub trait NotebookExporter: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Export `notebook`. Failures propagate to the caller unrecovered.
    fn export(&self, notebook: &Notebook) -> Result<ExportOutput>;
}

// ── nbconvert ────────────────────────────────────────────────────────────

/// Runs `jupyter nbconvert --to latex --stdout` on a temporary copy of the
/// notebook.
#[derive(Debug, Clone)]
pub struct NbconvertExporter {
    /// `jupyter` executable. Default: looked up on `PATH`.
    pub program: PathBuf,
    /// nbconvert LaTeX template name. Default: `article`.
    pub template: String,
}

impl Default for NbconvertExporter {
    fn default() -> Self {
        Self {
            program: PathBuf::from("jupyter"),
            template: "article".to_string(),
        }
    }
}

impl NbconvertExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    fn command_name(&self) -> String {
        self.program.display().to_string()
    }
}

impl NotebookExporter for NbconvertExporter {
    fn name(&self) -> &str {
        "nbconvert"
    }

    fn export(&self, notebook: &Notebook) -> Result<ExportOutput> {
        let mut tmp = tempfile::Builder::new()
            .prefix("nb2paper-")
            .suffix(".ipynb")
            .tempfile()
            .map_err(|e| Nb2PaperError::Internal(format!("tempfile: {e}")))?;
        tmp.write_all(notebook.to_json()?.as_bytes())
            .map_err(|e| Nb2PaperError::Internal(format!("tempfile write: {e}")))?;

        debug!(
            "Running {} nbconvert on {} ({} cells)",
            self.command_name(),
            tmp.path().display(),
            notebook.cells.len()
        );

        let output = Command::new(&self.program)
            .args(["nbconvert", "--to", "latex", "--template"])
            .arg(&self.template)
            .arg("--stdout")
            .arg(tmp.path())
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Nb2PaperError::ExporterNotFound {
                        command: self.command_name(),
                        hint: "Install Jupyter (pip install jupyter nbconvert) or use the plain exporter."
                            .to_string(),
                    }
                } else {
                    Nb2PaperError::ExportFailed {
                        command: self.command_name(),
                        message: e.to_string(),
                        stderr: String::new(),
                    }
                }
            })?;

        if !output.status.success() {
            return Err(Nb2PaperError::ExportFailed {
                command: self.command_name(),
                message: format!("exit code {:?}", output.status.code()),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let body = String::from_utf8_lossy(&output.stdout).into_owned();
        info!("nbconvert produced {} bytes of LaTeX", body.len());

        let mut resources = BTreeMap::new();
        resources.insert("output_extension".to_string(), ".tex".to_string());
        // `tmp` is dropped (and the file deleted) on return
        Ok(ExportOutput { body, resources })
    }
}

// ── Plain ────────────────────────────────────────────────────────────────

/// In-process exporter with no external dependencies.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainExporter;

impl NotebookExporter for PlainExporter {
    fn name(&self) -> &str {
        "plain"
    }

    fn export(&self, notebook: &Notebook) -> Result<ExportOutput> {
        let blocks: Vec<String> = notebook
            .cells
            .iter()
            .filter_map(|cell| match cell.kind {
                CellKind::Narrative => Some(cell.source.trim_end().to_string()),
                CellKind::Executable => Some(format!(
                    "\\begin{{verbatim}}\n{}\n\\end{{verbatim}}",
                    cell.source.trim_end()
                )),
                CellKind::Raw | CellKind::Unknown => None,
            })
            .filter(|block| !block.is_empty())
            .collect();

        Ok(ExportOutput {
            body: blocks.join("\n\n"),
            resources: BTreeMap::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notebook::Cell;

    #[test]
    fn plain_exporter_wraps_code() {
        let nb = Notebook::new(vec![
            Cell::narrative("Some *text*.\n"),
            Cell::executable("x = 1\n", vec![]),
            Cell::narrative(""),
        ]);
        let out = PlainExporter.export(&nb).unwrap();
        assert_eq!(
            out.body,
            "Some *text*.\n\n\\begin{verbatim}\nx = 1\n\\end{verbatim}"
        );
    }

    #[test]
    fn plain_exporter_on_filtered_copy_has_no_code() {
        let nb = Notebook::new(vec![
            Cell::narrative("text"),
            Cell::executable("secret()", vec![]),
        ]);
        let out = PlainExporter.export(&nb.without_code_cells()).unwrap();
        assert_eq!(out.body, "text");
    }

    #[test]
    fn missing_jupyter_is_exporter_not_found() {
        let exporter =
            NbconvertExporter::new().with_program("/definitely/not/a/real/jupyter-binary");
        let err = exporter
            .export(&Notebook::new(vec![Cell::narrative("x")]))
            .unwrap_err();
        assert!(
            matches!(err, Nb2PaperError::ExporterNotFound { .. }),
            "got: {err}"
        );
    }
}
