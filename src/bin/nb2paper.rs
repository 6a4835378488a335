//! CLI binary for nb2paper.
//!
//! A thin shim over the library crate: maps subcommands and flags to library
//! calls and prints results.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use nb2paper::latex::DEFAULT_DOCS_URL;
use nb2paper::overleaf::DEFAULT_OVERLEAF_URL;
use nb2paper::pipeline::input::load_notebook;
use nb2paper::{
    check_latex_installation, extract_equations, extract_figures, github, BuildProgressCallback,
    BuildResult, BuildStage, ConversionConfig, Converter, EquationKind, FigureFormat,
    LatexCompiler, NbconvertExporter, Notebook, NotebookExporter, OverleafClient, PlainExporter,
    ProgressCallback, TemplateRegistry,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner showing the current build stage, with one log line per figure.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Building");
        bar.set_message("Reading notebook…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl BuildProgressCallback for CliProgressCallback {
    fn on_stage(&self, stage: BuildStage) {
        self.bar.set_message(format!("{stage}…"));
    }

    fn on_figure_saved(&self, index: usize, path: &Path) {
        self.bar.println(format!(
            "  {} Figure {:>3}  {}",
            green("✓"),
            index,
            dim(&path.display().to_string())
        ));
    }

    fn on_build_complete(&self, result: &BuildResult) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {}",
            green("✔"),
            bold(&format!("Wrote {}", result.main_file.display()))
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Build a paper skeleton with the default article template
  nb2paper convert analysis.ipynb -o paper

  # IEEE two-column, keep code cells, compile afterwards
  nb2paper convert analysis.ipynb -o paper --template ieee --include-code --compile

  # Without Jupyter installed
  nb2paper convert analysis.ipynb -o paper --exporter plain

  # Inspect what would be extracted
  nb2paper equations analysis.ipynb --json
  nb2paper figures analysis.ipynb -o figs

  # Overleaf and GitHub
  nb2paper overleaf projects
  nb2paper overleaf sync paper --project thesis
  nb2paper github push paper --repo me/paper -m "First draft"

ENVIRONMENT VARIABLES:
  NB2PAPER_OVERLEAF_URL   Overleaf service endpoint (default http://localhost:7105)
  NB2PAPER_DOCS_URL       Docs service endpoint for remote builds (default http://localhost:7070)
  RUST_LOG                Overrides --verbose / --quiet log filtering
"#;

/// Convert Jupyter notebooks into LaTeX paper skeletons.
#[derive(Parser, Debug)]
#[command(
    name = "nb2paper",
    version,
    about = "Convert Jupyter notebooks into LaTeX paper skeletons",
    long_about = "Convert Jupyter notebooks (local files or URLs) into LaTeX papers: front matter \
from the first cells, numbered figures from PNG outputs, a bibliography from the References cell, \
and a choice of document templates. Includes helpers to compile with pdflatex and to publish to \
Overleaf or GitHub.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "NB2PAPER_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "NB2PAPER_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a LaTeX paper from a notebook.
    Convert(ConvertArgs),

    /// List the available templates.
    Templates {
        /// Output JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// List the equations found in a notebook.
    Equations {
        /// Local notebook path or HTTP/HTTPS URL.
        notebook: String,

        /// Output JSON records instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Save a notebook's PNG outputs as figure<N>.png.
    Figures {
        /// Local notebook path or HTTP/HTTPS URL.
        notebook: String,

        /// Directory to write the figures into.
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Compile a .tex file to PDF.
    Compile(CompileArgs),

    /// Check whether pdflatex is installed.
    CheckLatex {
        #[arg(long)]
        json: bool,
    },

    /// Talk to the Overleaf collaboration service.
    Overleaf {
        /// Service endpoint.
        #[arg(long, env = "NB2PAPER_OVERLEAF_URL", default_value = DEFAULT_OVERLEAF_URL)]
        url: String,

        #[command(subcommand)]
        action: OverleafCommand,
    },

    /// Publish to GitHub through git and gh.
    Github {
        #[command(subcommand)]
        action: GithubCommand,
    },
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Local notebook path or HTTP/HTTPS URL.
    notebook: String,

    /// Output directory for main.tex, references.bib and figures.
    #[arg(short, long)]
    output: PathBuf,

    /// Template name (see `nb2paper templates`).
    #[arg(short, long, default_value = "article")]
    template: String,

    /// Do not save figures.
    #[arg(long)]
    no_figures: bool,

    /// Requested figure format: pdf, png, svg.
    #[arg(long, default_value = "pdf")]
    figure_format: FigureFormat,

    /// Keep code cells in the exported body.
    #[arg(long)]
    include_code: bool,

    /// Do not write references.bib.
    #[arg(long)]
    no_citations: bool,

    /// Body exporter.
    #[arg(long, value_enum, default_value = "nbconvert")]
    exporter: ExporterArg,

    /// Run pdflatex on the result.
    #[arg(long)]
    compile: bool,

    /// Print the build result as JSON.
    #[arg(long)]
    json: bool,

    /// HTTP download timeout in seconds.
    #[arg(long, default_value_t = 120)]
    download_timeout: u64,
}

#[derive(Args, Debug)]
struct CompileArgs {
    /// The .tex file to compile.
    tex: PathBuf,

    /// Number of pdflatex passes.
    #[arg(long, default_value_t = 3)]
    runs: u32,

    /// Build through the docs service instead of a local pdflatex.
    #[arg(long)]
    remote: bool,

    /// Docs service endpoint.
    #[arg(long, env = "NB2PAPER_DOCS_URL", default_value = DEFAULT_DOCS_URL)]
    docs_url: String,

    #[arg(long)]
    json: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ExporterArg {
    Nbconvert,
    Plain,
}

#[derive(Subcommand, Debug)]
enum OverleafCommand {
    /// List configured projects.
    Projects,

    /// List files in a project.
    Files {
        #[arg(short, long, default_value = "default")]
        project: String,

        /// Extension filter, e.g. `.tex`; empty for all.
        #[arg(short, long, default_value = ".tex")]
        extension: String,
    },

    /// Show a project's status summary.
    Status {
        #[arg(short, long, default_value = "default")]
        project: String,
    },

    /// Download project files.
    Pull {
        #[arg(short, long, default_value = "default")]
        project: String,

        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Files to pull; defaults to every .tex and .bib file.
        files: Vec<String>,
    },

    /// Prepare a local LaTeX directory for upload.
    Sync {
        latex_dir: PathBuf,

        #[arg(short, long, default_value = "default")]
        project: String,

        #[arg(short, long)]
        message: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum GithubCommand {
    /// Commit a directory and push it.
    Push {
        dir: PathBuf,

        /// Repository as owner/name.
        #[arg(long)]
        repo: String,

        #[arg(short, long)]
        message: String,

        #[arg(short, long, default_value = "main")]
        branch: String,
    },

    /// Create a repository.
    Create {
        name: String,

        #[arg(short, long, default_value = "")]
        description: String,

        /// Make the repository public.
        #[arg(long)]
        public: bool,
    },

    /// Create a release.
    Release {
        /// Repository as owner/name.
        #[arg(long)]
        repo: String,

        version: String,

        #[arg(short, long, default_value = "")]
        notes: String,

        /// Checkout to run `gh` in.
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Convert(args) => run_convert(args, cli.quiet).await,
        Command::Templates { json } => run_templates(json),
        Command::Equations { notebook, json } => run_equations(&notebook, json).await,
        Command::Figures { notebook, output } => run_figures(&notebook, &output, cli.quiet).await,
        Command::Compile(args) => run_compile(args, cli.quiet).await,
        Command::CheckLatex { json } => run_check_latex(json).await,
        Command::Overleaf { url, action } => run_overleaf(OverleafClient::new(url), action).await,
        Command::Github { action } => run_github(action).await,
    }
}

// ── convert ──────────────────────────────────────────────────────────────

async fn run_convert(args: ConvertArgs, quiet: bool) -> Result<()> {
    let show_progress = !quiet && !args.json;

    let exporter: Arc<dyn NotebookExporter> = match args.exporter {
        ExporterArg::Nbconvert => Arc::new(NbconvertExporter::default()),
        ExporterArg::Plain => Arc::new(PlainExporter),
    };
    let converter = Converter::with_shared_exporter(TemplateRegistry::builtin(), exporter);

    let mut builder = ConversionConfig::builder()
        .template_name(&args.template)
        .save_figures(!args.no_figures)
        .figure_format(args.figure_format)
        .include_code(args.include_code)
        .extract_citations(!args.no_citations)
        .download_timeout_secs(args.download_timeout);
    if show_progress {
        let cb: ProgressCallback = CliProgressCallback::new();
        builder = builder.progress_callback(cb);
    }
    let config = builder.build().context("Invalid configuration")?;

    let result = converter
        .convert(&args.notebook, &args.output, &config)
        .await
        .context("Conversion failed")?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("Failed to serialise build result")?
        );
    } else if !quiet {
        eprintln!(
            "   {} figures  /  {} equations  /  {} citations  →  {}",
            result.figures.len(),
            result.equation_count,
            result.citation_count,
            bold(&result.output_dir.display().to_string()),
        );
        eprintln!("   {} {}", dim("title:"), result.metadata.title);
    }

    if args.compile {
        let report = LatexCompiler::default()
            .compile_local(&result.main_file, 3)
            .await;
        print_compile_report(&report, quiet);
        if !report.success {
            anyhow::bail!("LaTeX compilation failed");
        }
    }

    Ok(())
}

// ── templates / equations / figures ──────────────────────────────────────

fn run_templates(json: bool) -> Result<()> {
    let registry = TemplateRegistry::builtin();
    if json {
        let templates: Vec<_> = registry.iter().map(|(_, t)| t).collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&templates).context("Failed to serialise templates")?
        );
        return Ok(());
    }

    for (name, t) in registry.iter() {
        println!(
            "{:<15} {:<10} {}",
            bold(name),
            t.documentclass,
            dim(&t.documentclass_options.join(","))
        );
    }
    Ok(())
}

async fn open_notebook(input: &str) -> Result<Notebook> {
    load_notebook(input, 120)
        .await
        .with_context(|| format!("Failed to read notebook {input}"))
}

async fn run_equations(input: &str, json: bool) -> Result<()> {
    let notebook = open_notebook(input).await?;
    let equations = extract_equations(&notebook);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&equations).context("Failed to serialise equations")?
        );
        return Ok(());
    }

    for eq in &equations {
        let kind = match eq.kind {
            EquationKind::Display => cyan("display"),
            EquationKind::Inline => dim("inline "),
        };
        println!("[cell {:>3}] {}  {}", eq.cell, kind, eq.content);
    }
    eprintln!("{} equations", equations.len());
    Ok(())
}

async fn run_figures(input: &str, output: &Path, quiet: bool) -> Result<()> {
    let notebook = open_notebook(input).await?;
    let figures = extract_figures(&notebook, output, FigureFormat::Png)
        .with_context(|| format!("Failed to save figures into {}", output.display()))?;
    for path in &figures {
        println!("{}", path.display());
    }
    if !quiet {
        eprintln!("{} {} figures saved", green("✔"), figures.len());
    }
    Ok(())
}

// ── compile ──────────────────────────────────────────────────────────────

async fn run_compile(args: CompileArgs, quiet: bool) -> Result<()> {
    let compiler = LatexCompiler::new(&args.docs_url);

    if args.remote {
        let dir = args
            .tex
            .parent()
            .map(Path::to_path_buf)
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| PathBuf::from("."));
        let dir = std::fs::canonicalize(&dir)
            .with_context(|| format!("Failed to resolve {}", dir.display()))?;
        let main_tex = args
            .tex
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .context("TeX path has no file name")?;
        let reply = compiler
            .compile_remote(&dir, &main_tex)
            .await
            .context("Remote LaTeX build failed")?;
        println!(
            "{}",
            serde_json::to_string_pretty(&reply).context("Failed to serialise reply")?
        );
        return Ok(());
    }

    let report = compiler.compile_local(&args.tex, args.runs).await;
    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
    } else {
        print_compile_report(&report, quiet);
    }
    if !report.success {
        anyhow::bail!("LaTeX compilation failed");
    }
    Ok(())
}

fn print_compile_report(report: &nb2paper::CompileReport, quiet: bool) {
    if quiet && report.success {
        return;
    }
    for step in &report.steps {
        let ok = step.returncode == Some(0);
        eprintln!(
            "  {} {}  {}",
            if ok { green("✓") } else { red("✗") },
            step.command,
            dim(&format!("exit {}", step.returncode.map_or("-".to_string(), |c| c.to_string())))
        );
    }
    match (&report.pdf_path, &report.error) {
        (Some(pdf), _) => eprintln!("{} {}", green("✔"), bold(&pdf.display().to_string())),
        (None, Some(err)) => eprintln!("{} {}", red("✘"), red(err)),
        (None, None) => eprintln!("{} {}", red("✘"), red("no PDF produced")),
    }
}

async fn run_check_latex(json: bool) -> Result<()> {
    let status = check_latex_installation().await;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&status).context("Failed to serialise status")?
        );
        return Ok(());
    }

    if status.installed {
        println!("{} {}", green("✔"), status.version.unwrap_or_default());
    } else {
        println!(
            "{} {}",
            red("✘"),
            status.error.unwrap_or_else(|| "pdflatex not available".into())
        );
        for (platform, hint) in &status.install_instructions {
            println!("  {:<15} {}", bold(platform), hint);
        }
    }
    Ok(())
}

// ── overleaf / github ────────────────────────────────────────────────────

async fn run_overleaf(client: OverleafClient, action: OverleafCommand) -> Result<()> {
    match action {
        OverleafCommand::Projects => {
            let projects = client.list_projects().await.context("Failed to list projects")?;
            println!(
                "{}",
                serde_json::to_string_pretty(&projects).context("Failed to serialise projects")?
            );
        }
        OverleafCommand::Files { project, extension } => {
            let files = client
                .list_files(&project, &extension)
                .await
                .context("Failed to list files")?;
            for f in files {
                println!("{f}");
            }
        }
        OverleafCommand::Status { project } => {
            let status = client.status(&project).await.context("Failed to get status")?;
            println!(
                "{}",
                serde_json::to_string_pretty(&status).context("Failed to serialise status")?
            );
        }
        OverleafCommand::Pull {
            project,
            output,
            files,
        } => {
            let files = if files.is_empty() { None } else { Some(files) };
            let report = client
                .pull(&project, &output, files)
                .await
                .context("Failed to pull from Overleaf")?;
            for path in &report.files_pulled {
                println!("{}", path.display());
            }
            eprintln!("{} {} files pulled", green("✔"), report.count);
        }
        OverleafCommand::Sync {
            latex_dir,
            project,
            message,
        } => {
            let plan = client
                .prepare_sync(&latex_dir, &project, message.as_deref())
                .await
                .context("Failed to prepare sync")?;
            println!("{}", bold("Files ready for sync:"));
            for f in &plan.files_to_sync {
                println!("  {f}");
            }
            println!("{}", plan.instructions);
        }
    }
    Ok(())
}

async fn run_github(action: GithubCommand) -> Result<()> {
    match action {
        GithubCommand::Push {
            dir,
            repo,
            message,
            branch,
        } => {
            let pushed = github::push_to_github(&dir, &repo, &message, &branch)
                .await
                .context("Push failed")?;
            eprintln!(
                "{} pushed {} to {}",
                green("✔"),
                bold(&pushed.branch),
                pushed.repository
            );
        }
        GithubCommand::Create {
            name,
            description,
            public,
        } => {
            let created = github::create_github_repo(&name, &description, !public)
                .await
                .context("Repository creation failed")?;
            println!("{}", created.url);
        }
        GithubCommand::Release {
            repo,
            version,
            notes,
            dir,
        } => {
            let release = github::create_release(&repo, &version, &notes, dir.as_deref())
                .await
                .context("Release creation failed")?;
            println!("{}", release.url);
        }
    }
    Ok(())
}
