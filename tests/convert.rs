//! Integration tests for the notebook-to-paper build.
//!
//! A recording stub stands in for nbconvert so the tests need neither
//! Jupyter nor a network.

use nb2paper::notebook::PNG_MIME;
use nb2paper::pipeline::ExportOutput;
use nb2paper::{
    BuildProgressCallback, BuildResult, BuildStage, Cell, ConversionConfig, Converter,
    Nb2PaperError, Notebook, NotebookExporter, Output, Template, TemplateRegistry,
};
use pretty_assertions::assert_eq;
use std::path::Path;
use std::sync::{Arc, Mutex};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// 1×1 transparent PNG.
const PIXEL_PNG: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

/// Returns a fixed body and remembers how many cells it was handed.
#[derive(Default)]
struct StubExporter {
    seen_cells: Mutex<Vec<usize>>,
}

impl NotebookExporter for StubExporter {
    fn name(&self) -> &str {
        "stub"
    }

    fn export(&self, notebook: &Notebook) -> nb2paper::Result<ExportOutput> {
        self.seen_cells.lock().unwrap().push(notebook.cells.len());
        Ok(ExportOutput {
            body: "BODY".to_string(),
            ..Default::default()
        })
    }
}

struct FailingExporter;

impl NotebookExporter for FailingExporter {
    fn name(&self) -> &str {
        "failing"
    }

    fn export(&self, _notebook: &Notebook) -> nb2paper::Result<ExportOutput> {
        Err(Nb2PaperError::ExportFailed {
            command: "stub".into(),
            message: "boom".into(),
            stderr: "traceback".into(),
        })
    }
}

fn stub_converter() -> (Converter, Arc<StubExporter>) {
    let stub = Arc::new(StubExporter::default());
    let converter = Converter::with_shared_exporter(TemplateRegistry::builtin(), stub.clone());
    (converter, stub)
}

fn paper_notebook() -> Notebook {
    Notebook::new(vec![
        Cell::narrative(
            "# Paper Title: Wave Propagation\n\
             **Authors:** A. Author, B. Author\n\
             **Institution:** Some University\n\
             **Keywords:** acoustics, waves",
        ),
        Cell::narrative("ABSTRACT: We study waves.\nAcross two lines."),
        Cell::narrative("Energy is $$E=mc^2$$ and speed is $v$."),
        Cell::executable("plot()", vec![Output::display_data(PNG_MIME, PIXEL_PNG)]),
        Cell::executable(
            "plot_again()",
            vec![
                Output::stream("stdout", "done"),
                Output::display_data(PNG_MIME, PIXEL_PNG),
            ],
        ),
        Cell::narrative("## References\n[1] Smith et al.\n[2] Jones\nnot a citation"),
    ])
}

fn config() -> ConversionConfig {
    ConversionConfig::default()
}

// ── Output layout ────────────────────────────────────────────────────────────

#[test]
fn full_build_writes_expected_files() {
    let dir = tempfile::tempdir().unwrap();
    let (converter, _) = stub_converter();

    let result = converter
        .build(&paper_notebook(), dir.path(), &config())
        .unwrap();

    assert!(result.success);
    assert_eq!(result.main_file, dir.path().join("main.tex"));
    assert_eq!(
        result.figures,
        vec![dir.path().join("figure1.png"), dir.path().join("figure2.png")]
    );
    assert_eq!(result.equation_count, 2);
    assert_eq!(result.citation_count, 2);
    assert_eq!(result.metadata.title, "Wave Propagation");
    assert_eq!(result.metadata.keywords, vec!["acoustics", "waves"]);

    let bib = std::fs::read_to_string(dir.path().join("references.bib")).unwrap();
    assert_eq!(bib, "[1] Smith et al.\n\n[2] Jones\n\n");
    assert_eq!(result.bibliography_file, Some(dir.path().join("references.bib")));

    let png = std::fs::read(dir.path().join("figure1.png")).unwrap();
    assert_eq!(&png[1..4], b"PNG");
}

#[test]
fn main_tex_wraps_body_in_template() {
    let dir = tempfile::tempdir().unwrap();
    let (converter, _) = stub_converter();
    let config = ConversionConfig::builder()
        .template_name("ieee")
        .build()
        .unwrap();

    converter.build(&paper_notebook(), dir.path(), &config).unwrap();
    let tex = std::fs::read_to_string(dir.path().join("main.tex")).unwrap();

    assert!(tex.starts_with("\\documentclass[conference]{IEEEtran}\n"));
    assert!(tex.ends_with("BODY\n\\end{document}"));
    assert!(tex.contains("\\title{Wave Propagation}"));
    assert!(tex.contains("\\author{A. Author, B. Author}"));
    assert!(tex.contains("\\begin{abstract}\nWe study waves.\nAcross two lines.\n\\end{abstract}"));
    assert!(tex.contains("\\textbf{Keywords:} acoustics, waves\n\nBODY"));
}

#[test]
fn no_citations_means_no_bibliography_file() {
    let dir = tempfile::tempdir().unwrap();
    let (converter, _) = stub_converter();
    let notebook = Notebook::new(vec![
        Cell::narrative("# Title"),
        // Numbered lines without a references heading do not count.
        Cell::narrative("[1] Smith et al."),
    ]);

    let result = converter.build(&notebook, dir.path(), &config()).unwrap();

    assert_eq!(result.citation_count, 0);
    assert_eq!(result.bibliography_file, None);
    assert!(!dir.path().join("references.bib").exists());
}

#[test]
fn disabled_citation_extraction_skips_bibliography() {
    let dir = tempfile::tempdir().unwrap();
    let (converter, _) = stub_converter();
    let config = ConversionConfig::builder()
        .extract_citations(false)
        .build()
        .unwrap();

    let result = converter.build(&paper_notebook(), dir.path(), &config).unwrap();

    assert_eq!(result.citation_count, 0);
    assert!(!dir.path().join("references.bib").exists());
}

#[test]
fn disabled_figures_write_no_images() {
    let dir = tempfile::tempdir().unwrap();
    let (converter, _) = stub_converter();
    let config = ConversionConfig::builder().save_figures(false).build().unwrap();

    let result = converter.build(&paper_notebook(), dir.path(), &config).unwrap();

    assert!(result.figures.is_empty());
    assert!(!dir.path().join("figure1.png").exists());
}

#[test]
fn output_directory_is_created() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("nested").join("paper");
    let (converter, _) = stub_converter();

    converter
        .build(&Notebook::new(vec![Cell::narrative("text")]), &out, &config())
        .unwrap();

    assert!(out.join("main.tex").is_file());
}

// ── Exporter input ───────────────────────────────────────────────────────────

#[test]
fn code_cells_are_stripped_unless_requested() {
    let dir = tempfile::tempdir().unwrap();
    let (converter, stub) = stub_converter();

    converter.build(&paper_notebook(), dir.path(), &config()).unwrap();
    let with_code = ConversionConfig::builder().include_code(true).build().unwrap();
    converter.build(&paper_notebook(), dir.path(), &with_code).unwrap();

    assert_eq!(*stub.seen_cells.lock().unwrap(), vec![4, 6]);
}

#[test]
fn exporter_failure_propagates() {
    let dir = tempfile::tempdir().unwrap();
    let converter = Converter::new(TemplateRegistry::builtin(), FailingExporter);

    let err = converter
        .build(&paper_notebook(), dir.path(), &config())
        .unwrap_err();

    assert!(matches!(err, Nb2PaperError::ExportFailed { .. }));
    assert!(!dir.path().join("main.tex").exists());
}

// ── Templates ────────────────────────────────────────────────────────────────

#[test]
fn unknown_template_lists_every_registered_name() {
    let dir = tempfile::tempdir().unwrap();
    let mut registry = TemplateRegistry::builtin();
    registry.register("lab_report", Template::new("lab_report"));
    let converter = Converter::new(registry, StubExporter::default());
    let config = ConversionConfig::builder()
        .template_name("nature")
        .build()
        .unwrap();

    let err = converter
        .build(&paper_notebook(), dir.path(), &config)
        .unwrap_err()
        .to_string();

    for name in ["article", "twocolumn", "ieee", "acta_acustica", "thesis", "lab_report"] {
        assert!(err.contains(name), "missing '{name}' in: {err}");
    }
}

#[test]
fn custom_template_bypasses_registry() {
    let dir = tempfile::tempdir().unwrap();
    let converter = Converter::new(TemplateRegistry::new(), StubExporter::default());
    let template = Template::new("mine")
        .documentclass("memoir")
        .packages(["amsmath", "amsmath"]);
    let config = ConversionConfig::builder()
        .custom_template(template)
        .build()
        .unwrap();

    converter.build(&paper_notebook(), dir.path(), &config).unwrap();
    let tex = std::fs::read_to_string(dir.path().join("main.tex")).unwrap();

    assert!(tex.starts_with("\\documentclass{memoir}\n\\usepackage{amsmath}\n\\usepackage{amsmath}\n"));
}

// ── Progress ─────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Recorder {
    stages: Mutex<Vec<BuildStage>>,
    figures: Mutex<Vec<usize>>,
    completed: Mutex<Option<usize>>,
}

impl BuildProgressCallback for Recorder {
    fn on_stage(&self, stage: BuildStage) {
        self.stages.lock().unwrap().push(stage);
    }

    fn on_figure_saved(&self, index: usize, _path: &Path) {
        self.figures.lock().unwrap().push(index);
    }

    fn on_build_complete(&self, result: &BuildResult) {
        *self.completed.lock().unwrap() = Some(result.citation_count);
    }
}

#[test]
fn progress_events_follow_build_order() {
    let dir = tempfile::tempdir().unwrap();
    let (converter, _) = stub_converter();
    let recorder = Arc::new(Recorder::default());
    let config = ConversionConfig::builder()
        .progress_callback(recorder.clone())
        .build()
        .unwrap();

    converter.build(&paper_notebook(), dir.path(), &config).unwrap();

    assert_eq!(
        *recorder.stages.lock().unwrap(),
        vec![
            BuildStage::ResolveTemplate,
            BuildStage::ExtractMetadata,
            BuildStage::ExtractFigures,
            BuildStage::ExtractEquations,
            BuildStage::ExtractCitations,
            BuildStage::Export,
            BuildStage::Render,
            BuildStage::Write,
        ]
    );
    assert_eq!(*recorder.figures.lock().unwrap(), vec![1, 2]);
    assert_eq!(*recorder.completed.lock().unwrap(), Some(2));
}

// ── Async entry point ────────────────────────────────────────────────────────

#[tokio::test]
async fn convert_reads_notebook_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let nb_path = dir.path().join("paper.ipynb");
    std::fs::write(&nb_path, paper_notebook().to_json().unwrap()).unwrap();
    let out = dir.path().join("out");
    let (converter, _) = stub_converter();

    let result = converter
        .convert(nb_path.to_str().unwrap(), &out, &config())
        .await
        .unwrap();

    assert_eq!(result.figures.len(), 2);
    assert!(out.join("references.bib").is_file());
}

#[tokio::test]
async fn convert_rejects_unparseable_notebook() {
    let dir = tempfile::tempdir().unwrap();
    let nb_path = dir.path().join("broken.ipynb");
    std::fs::write(&nb_path, "{ not json").unwrap();
    let (converter, _) = stub_converter();

    let err = converter
        .convert(nb_path.to_str().unwrap(), dir.path().join("out"), &config())
        .await
        .unwrap_err();

    assert!(matches!(err, Nb2PaperError::InvalidNotebook { .. }));
}
