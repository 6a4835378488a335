//! Error types for the nb2paper library.
//!
//! Only one error type exists, [`Nb2PaperError`], and it is only ever
//! returned for conditions the caller has to act on: a notebook that cannot
//! be read, an unknown template, a failing exporter, an output directory that
//! cannot be written, or an external tool/service that refused to cooperate.
//!
//! The extractors in [`crate::pipeline`] never produce an error for malformed
//! notebook *content*. Missing front matter, equations, citations or figures
//! resolve to defaults and empty collections instead.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Nb2PaperError>;

/// All fatal errors returned by the nb2paper library.
#[derive(Debug, Error)]
pub enum Nb2PaperError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Notebook file was not found at the given path.
    #[error("Notebook not found: '{path}'\nCheck the path exists and is readable.")]
    NotebookNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file was read but is not a valid nbformat v4 document.
    #[error("'{source_name}' is not a valid notebook: {detail}")]
    InvalidNotebook { source_name: String, detail: String },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Template errors ───────────────────────────────────────────────────
    /// No template is registered under the requested name.
    #[error("Template '{name}' not found. Available templates: {}", available.join(", "))]
    TemplateNotFound {
        name: String,
        available: Vec<String>,
    },

    // ── Exporter errors ───────────────────────────────────────────────────
    /// The notebook exporter binary could not be started.
    #[error("Notebook exporter '{command}' not found.\n{hint}")]
    ExporterNotFound { command: String, hint: String },

    /// The notebook exporter ran but reported a failure.
    #[error("Notebook export with '{command}' failed: {message}\n{stderr}")]
    ExportFailed {
        command: String,
        message: String,
        stderr: String,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file or directory.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A directory the operation needs does not exist.
    #[error("Directory not found: '{path}'")]
    DirectoryNotFound { path: PathBuf },

    // ── External tools ────────────────────────────────────────────────────
    /// An external command-line tool (git, gh, pdflatex) is not installed.
    #[error("'{tool}' not found.\n{hint}")]
    ToolNotFound { tool: String, hint: String },

    /// An external command-line tool exited unsuccessfully.
    #[error("{tool} failed: {message}")]
    ToolFailed {
        tool: String,
        message: String,
        stderr: String,
    },

    // ── Remote services ───────────────────────────────────────────────────
    /// The remote service could not be reached.
    #[error("Cannot connect to service at '{url}': {reason}\nIs it running?")]
    ServiceUnavailable { url: String, reason: String },

    /// The remote service did not answer in time.
    #[error("Request to '{url}' timed out after {secs}s")]
    ServiceTimeout { url: String, secs: u64 },

    /// The remote service answered with a non-success status.
    #[error("Service at '{url}' returned HTTP {status}: {body}")]
    ServiceError {
        url: String,
        status: u16,
        body: String,
    },

    /// The remote service answered with a body we could not interpret.
    #[error("Unexpected response from '{url}': {detail}")]
    MalformedResponse { url: String, detail: String },

    /// A remote file path would land outside the local target directory.
    #[error("Refusing to write '{path}': not a relative path inside the output directory")]
    UnsafePath { path: String },

    /// The named collaboration project is not configured on the service.
    #[error("Project '{project}' not found")]
    ProjectNotFound { project: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Nb2PaperError {
    /// Wrap an I/O failure on `path` as [`Nb2PaperError::OutputWriteFailed`].
    pub(crate) fn write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Nb2PaperError::OutputWriteFailed {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_not_found_lists_every_name() {
        let e = Nb2PaperError::TemplateNotFound {
            name: "nature".into(),
            available: vec!["article".into(), "ieee".into(), "thesis".into()],
        };
        let msg = e.to_string();
        assert!(msg.contains("'nature'"), "got: {msg}");
        for name in ["article", "ieee", "thesis"] {
            assert!(msg.contains(name), "missing {name} in: {msg}");
        }
    }

    #[test]
    fn export_failed_display_includes_stderr() {
        let e = Nb2PaperError::ExportFailed {
            command: "jupyter".into(),
            message: "exit status 1".into(),
            stderr: "No module named nbconvert".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("jupyter"));
        assert!(msg.contains("No module named nbconvert"));
    }

    #[test]
    fn service_error_display() {
        let e = Nb2PaperError::ServiceError {
            url: "http://localhost:7105/run/list_projects".into(),
            status: 500,
            body: "boom".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("500"));
        assert!(msg.contains("list_projects"));
    }

    #[test]
    fn output_write_failed_keeps_source() {
        use std::error::Error as _;
        let e = Nb2PaperError::write_failed(
            "/nowhere/main.tex",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(e.to_string().contains("main.tex"));
        assert!(e.source().is_some());
    }
}
