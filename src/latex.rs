//! LaTeX compilation, locally through `pdflatex`/`bibtex` or remotely through
//! the docs service.
//!
//! Local compilation never returns `Err`: missing binaries, timeouts and
//! failed passes are reported in the [`CompileReport`] so callers can show
//! the captured logs.

use crate::error::Result;
use crate::service;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Default docs-service endpoint.
pub const DEFAULT_DOCS_URL: &str = "http://localhost:7070";

const PDFLATEX_TIMEOUT_SECS: u64 = 60;
const BIBTEX_TIMEOUT_SECS: u64 = 30;
const REMOTE_TIMEOUT_SECS: u64 = 120;
const VERSION_TIMEOUT_SECS: u64 = 5;

/// One external command run during a local build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileStep {
    /// Human label, e.g. `pdflatex (1st run)`.
    pub command: String,
    /// `None` when the process was killed by a signal.
    pub returncode: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Outcome of [`LatexCompiler::compile_local`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileReport {
    /// True iff the PDF exists after all passes.
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub steps: Vec<CompileStep>,
}

impl CompileReport {
    fn failed(error: impl Into<String>, steps: Vec<CompileStep>) -> Self {
        Self {
            success: false,
            pdf_path: None,
            error: Some(error.into()),
            steps,
        }
    }
}

/// Result of [`check_latex_installation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatexInstallation {
    pub installed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// `(platform, instruction)` pairs, only when pdflatex is missing.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub install_instructions: Vec<(String, String)>,
}

/// Compiles `.tex` files to PDF.
#[derive(Debug, Clone)]
pub struct LatexCompiler {
    docs_url: String,
    pdflatex: PathBuf,
    bibtex: PathBuf,
}

impl Default for LatexCompiler {
    fn default() -> Self {
        Self::new(DEFAULT_DOCS_URL)
    }
}

impl LatexCompiler {
    pub fn new(docs_url: impl Into<String>) -> Self {
        Self {
            docs_url: docs_url.into().trim_end_matches('/').to_string(),
            pdflatex: PathBuf::from("pdflatex"),
            bibtex: PathBuf::from("bibtex"),
        }
    }

    /// Use specific `pdflatex` and `bibtex` executables.
    pub fn with_programs(mut self, pdflatex: impl Into<PathBuf>, bibtex: impl Into<PathBuf>) -> Self {
        self.pdflatex = pdflatex.into();
        self.bibtex = bibtex.into();
        self
    }

    pub fn docs_url(&self) -> &str {
        &self.docs_url
    }

    /// Compile `tex_file` with `runs` pdflatex passes, running bibtex after
    /// the first pass when a `<stem>.bib` sits next to it.
    pub async fn compile_local(&self, tex_file: &Path, runs: u32) -> CompileReport {
        if !tex_file.is_file() {
            return CompileReport::failed("TeX file not found", Vec::new());
        }

        let dir = match tex_file.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let (Some(tex_name), Some(stem)) = (tex_file.file_name(), tex_file.file_stem()) else {
            return CompileReport::failed("TeX file not found", Vec::new());
        };
        let tex_name = tex_name.to_string_lossy().into_owned();
        let stem = stem.to_string_lossy().into_owned();

        info!("Compiling {} ({} passes)", tex_file.display(), runs.max(1));
        let mut steps = Vec::new();

        for pass in 1..=runs.max(1) {
            let step = self
                .run_step(
                    &self.pdflatex,
                    &["-interaction=nonstopmode", tex_name.as_str()],
                    &dir,
                    format!("pdflatex ({} run)", ordinal(pass)),
                    PDFLATEX_TIMEOUT_SECS,
                )
                .await;
            match step {
                Ok(step) => steps.push(step),
                Err(e) => return CompileReport::failed(e, steps),
            }

            if pass == 1 && dir.join(format!("{stem}.bib")).exists() {
                match self
                    .run_step(&self.bibtex, &[stem.as_str()], &dir, "bibtex".into(), BIBTEX_TIMEOUT_SECS)
                    .await
                {
                    Ok(step) => steps.push(step),
                    Err(e) => return CompileReport::failed(e, steps),
                }
            }
        }

        let pdf = dir.join(format!("{stem}.pdf"));
        let success = pdf.exists();
        if !success {
            warn!("No PDF produced for {}", tex_file.display());
        }
        CompileReport {
            success,
            pdf_path: success.then_some(pdf),
            error: None,
            steps,
        }
    }

    /// Ask the docs service to build `main_tex` inside `tex_dir`.
    ///
    /// Returns the service's JSON reply unchanged.
    pub async fn compile_remote(&self, tex_dir: &Path, main_tex: &str) -> Result<Value> {
        let url = service::tool_url(&self.docs_url, "latex_build");
        info!("Requesting remote LaTeX build of {} in {}", main_tex, tex_dir.display());
        let payload = serde_json::json!({
            "tex_dir": tex_dir.to_string_lossy(),
            "main_tex": main_tex,
        });
        service::post_json(&url, &payload, REMOTE_TIMEOUT_SECS).await
    }

    /// Run one command, mapping spawn failures and timeouts to a message.
    async fn run_step(
        &self,
        program: &Path,
        args: &[&str],
        dir: &Path,
        label: String,
        timeout_secs: u64,
    ) -> std::result::Result<CompileStep, String> {
        debug!("{}: {} {:?}", label, program.display(), args);
        let mut cmd = Command::new(program);
        cmd.args(args).current_dir(dir).kill_on_drop(true);
        let output = cmd.output();

        match tokio::time::timeout(Duration::from_secs(timeout_secs), output).await {
            Err(_) => Err("LaTeX compilation timeout".to_string()),
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => Err(format!(
                "{} not found. Install LaTeX (TeX Live, MiKTeX, or MacTeX)",
                program.display()
            )),
            Ok(Err(e)) => Err(e.to_string()),
            Ok(Ok(out)) => Ok(CompileStep {
                command: label,
                returncode: out.status.code(),
                stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
            }),
        }
    }
}

/// Probe for a working `pdflatex`.
pub async fn check_latex_installation() -> LatexInstallation {
    check_installation_with(Path::new("pdflatex")).await
}

async fn check_installation_with(program: &Path) -> LatexInstallation {
    let mut cmd = Command::new(program);
    cmd.arg("--version").kill_on_drop(true);
    let output = cmd.output();

    let not_installed = |error: String| LatexInstallation {
        installed: false,
        version: None,
        error: Some(error),
        install_instructions: Vec::new(),
    };

    match tokio::time::timeout(Duration::from_secs(VERSION_TIMEOUT_SECS), output).await {
        Err(_) => not_installed("pdflatex --version timed out".into()),
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => LatexInstallation {
            install_instructions: install_instructions(),
            ..not_installed("pdflatex not found".into())
        },
        Ok(Err(e)) => not_installed(e.to_string()),
        Ok(Ok(out)) if out.status.success() => {
            let stdout = String::from_utf8_lossy(&out.stdout);
            LatexInstallation {
                installed: true,
                version: Some(stdout.lines().next().unwrap_or_default().to_string()),
                error: None,
                install_instructions: Vec::new(),
            }
        }
        Ok(Ok(_)) => not_installed("pdflatex returned error".into()),
    }
}

fn install_instructions() -> Vec<(String, String)> {
    [
        ("macOS", "brew install --cask mactex"),
        ("Ubuntu/Debian", "sudo apt-get install texlive-full"),
        ("Windows", "Download MiKTeX from https://miktex.org/"),
    ]
    .into_iter()
    .map(|(p, i)| (p.to_string(), i.to_string()))
    .collect()
}

fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(4), "4th");
        assert_eq!(ordinal(12), "12th");
        assert_eq!(ordinal(22), "22nd");
    }

    #[test]
    fn docs_url_is_normalised() {
        assert_eq!(LatexCompiler::new("http://h:7070/").docs_url(), "http://h:7070");
    }

    #[tokio::test]
    async fn missing_tex_file_is_a_failed_report() {
        let report = LatexCompiler::default()
            .compile_local(Path::new("/no/such/paper.tex"), 3)
            .await;
        assert!(!report.success);
        assert_eq!(report.error.as_deref(), Some("TeX file not found"));
        assert!(report.steps.is_empty());
    }

    #[tokio::test]
    async fn missing_pdflatex_is_reported_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        let tex = dir.path().join("main.tex");
        std::fs::write(&tex, "\\documentclass{article}").unwrap();
        let report = LatexCompiler::default()
            .with_programs("nb2paper-no-such-pdflatex", "nb2paper-no-such-bibtex")
            .compile_local(&tex, 2)
            .await;
        assert!(!report.success);
        assert!(report.error.unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn missing_binary_yields_install_hints() {
        let status = check_installation_with(Path::new("nb2paper-no-such-pdflatex")).await;
        assert!(!status.installed);
        assert_eq!(status.install_instructions.len(), 3);
        assert_eq!(status.install_instructions[0].0, "macOS");
    }
}
