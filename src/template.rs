//! LaTeX document templates and the registry that holds them.
//!
//! A [`Template`] is a formatting preset: document class and options, an
//! ordered package list, a raw preamble and a column layout. Presets are
//! collected in a [`TemplateRegistry`] built once at start-up
//! ([`TemplateRegistry::builtin`]) and handed to whoever needs it; there is
//! no process-wide registry.
//!
//! Front-matter values and the body are inserted verbatim. Nothing is
//! escaped, so a title containing `&` or `%` produces invalid LaTeX.

use crate::error::{Nb2PaperError, Result};
use crate::output::Metadata;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Column layout of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    OneColumn,
    TwoColumn,
}

/// A LaTeX document preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub name: String,
    pub documentclass: String,
    pub documentclass_options: Vec<String>,
    /// Emitted in order; duplicates are kept.
    pub packages: Vec<String>,
    pub preamble: String,
    pub layout: Layout,
}

/// The values placed between `\begin{document}` and the body.
#[derive(Debug, Clone, Copy)]
pub struct FrontMatter<'a> {
    pub title: &'a str,
    pub authors: &'a str,
    pub abstract_text: &'a str,
    pub keywords: &'a [String],
}

impl<'a> From<&'a Metadata> for FrontMatter<'a> {
    fn from(m: &'a Metadata) -> Self {
        Self {
            title: &m.title,
            authors: &m.authors,
            abstract_text: &m.abstract_text,
            keywords: &m.keywords,
        }
    }
}

impl Template {
    /// A bare `article` template with no options, packages or preamble.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documentclass: "article".into(),
            documentclass_options: Vec::new(),
            packages: Vec::new(),
            preamble: String::new(),
            layout: Layout::OneColumn,
        }
    }

    pub fn documentclass(mut self, class: impl Into<String>) -> Self {
        self.documentclass = class.into();
        self
    }

    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.documentclass_options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn packages<I, S>(mut self, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.packages = packages.into_iter().map(Into::into).collect();
        self
    }

    pub fn preamble(mut self, preamble: impl Into<String>) -> Self {
        self.preamble = preamble.into();
        self
    }

    pub fn layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Render a complete document.
    ///
    /// Line order: `\documentclass`, one `\usepackage` per package, the
    /// preamble (if any), `\begin{document}`, title/author/date/maketitle,
    /// the abstract environment (if the abstract is non-empty), the keywords
    /// line plus a blank line (if there are keywords), the body, and
    /// `\end{document}`. Lines are joined with `\n`.
    pub fn render(&self, front: FrontMatter<'_>, body: &str) -> String {
        let mut doc: Vec<String> = Vec::with_capacity(self.packages.len() + 16);

        if self.documentclass_options.is_empty() {
            doc.push(format!("\\documentclass{{{}}}", self.documentclass));
        } else {
            doc.push(format!(
                "\\documentclass[{}]{{{}}}",
                self.documentclass_options.join(","),
                self.documentclass
            ));
        }

        for package in &self.packages {
            doc.push(format!("\\usepackage{{{package}}}"));
        }

        if !self.preamble.is_empty() {
            doc.push(self.preamble.clone());
        }

        doc.push("\\begin{document}".into());

        doc.push(format!("\\title{{{}}}", front.title));
        doc.push(format!("\\author{{{}}}", front.authors));
        doc.push("\\date{\\today}".into());
        doc.push("\\maketitle".into());

        if !front.abstract_text.is_empty() {
            doc.push("\\begin{abstract}".into());
            doc.push(front.abstract_text.to_string());
            doc.push("\\end{abstract}".into());
        }

        if !front.keywords.is_empty() {
            doc.push(format!(
                "\\textbf{{Keywords:}} {}",
                front.keywords.join(", ")
            ));
            doc.push(String::new());
        }

        doc.push(body.to_string());
        doc.push("\\end{document}".into());

        doc.join("\n")
    }
}

// ── Registry ─────────────────────────────────────────────────────────────

/// Name-keyed collection of templates, in registration order.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: IndexMap<String, Template>,
}

impl TemplateRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The five built-in presets: `article`, `twocolumn`, `ieee`,
    /// `acta_acustica` and `thesis`.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for template in builtin_templates() {
            registry.register(template.name.clone(), template);
        }
        registry
    }

    /// Add `template` under `name`, replacing any previous entry. Nothing
    /// about the template itself is validated.
    pub fn register(&mut self, name: impl Into<String>, template: Template) {
        self.templates.insert(name.into(), template);
    }

    /// Look up a template by name.
    ///
    /// # Errors
    /// [`Nb2PaperError::TemplateNotFound`] listing every registered name.
    pub fn get(&self, name: &str) -> Result<&Template> {
        self.templates
            .get(name)
            .ok_or_else(|| Nb2PaperError::TemplateNotFound {
                name: name.to_string(),
                available: self.list_names(),
            })
    }

    /// Registered names in insertion order.
    pub fn list_names(&self) -> Vec<String> {
        self.templates.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Template)> {
        self.templates.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

const COMMON_PACKAGES: [&str; 6] = ["amsmath", "amssymb", "graphicx", "hyperref", "cite", "geometry"];

fn builtin_templates() -> Vec<Template> {
    vec![
        Template::new("article")
            .options(["11pt", "a4paper"])
            .packages(COMMON_PACKAGES)
            .preamble(r"\geometry{margin=1in}"),
        Template::new("twocolumn")
            .options(["10pt", "twocolumn", "a4paper"])
            .packages(COMMON_PACKAGES.into_iter().chain(["multicol"]))
            .preamble(r"\geometry{margin=0.75in}")
            .layout(Layout::TwoColumn),
        Template::new("ieee")
            .documentclass("IEEEtran")
            .options(["conference"])
            .packages(["amsmath", "amssymb", "graphicx", "cite"])
            .layout(Layout::TwoColumn),
        Template::new("acta_acustica")
            .options(["10pt", "twocolumn", "a4paper"])
            .packages(
                COMMON_PACKAGES
                    .into_iter()
                    .chain(["tikz", "siunitx", "booktabs"]),
            )
            .preamble(
                r"
\geometry{margin=0.75in}
\usetikzlibrary{positioning,shapes,arrows}

% Equation interpretation environment
\newenvironment{interpretation}{\begin{quote}\small\textbf{Interpretation:}}{\end{quote}}
",
            )
            .layout(Layout::TwoColumn),
        Template::new("thesis")
            .documentclass("report")
            .options(["12pt", "a4paper"])
            .packages(
                COMMON_PACKAGES
                    .into_iter()
                    .chain(["tikz", "fancyhdr", "setspace"]),
            )
            .preamble(
                r"
\geometry{margin=1.25in}
\pagestyle{fancy}
\doublespacing
",
            ),
    ]
}
