//! Configuration types for notebook-to-paper builds.
//!
//! All build behaviour is controlled through [`ConversionConfig`], built via
//! its [`ConversionConfigBuilder`].

use crate::error::Nb2PaperError;
use crate::progress::ProgressCallback;
use crate::template::{Template, TemplateRegistry};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration for a notebook-to-paper build.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use nb2paper::{ConversionConfig, FigureFormat};
///
/// let config = ConversionConfig::builder()
///     .template_name("ieee")
///     .figure_format(FigureFormat::Png)
///     .include_code(true)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Which template renders the document. Default: `Named("article")`.
    pub template: TemplateSelector,

    /// Save `image/png` outputs as `figure<N>.png`. Default: true.
    pub save_figures: bool,

    /// Requested figure format. Default: [`FigureFormat::Pdf`].
    ///
    /// Only PNG payloads are recognised; they are always written as `.png`.
    pub figure_format: FigureFormat,

    /// Keep executable cells in the exported body. Default: false.
    pub include_code: bool,

    /// Collect the references cell into `references.bib`. Default: true.
    pub extract_citations: bool,

    /// File name of the rendered document. Default: `main.tex`.
    pub main_file_name: String,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Optional progress callback. Default: None.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            template: TemplateSelector::default(),
            save_figures: true,
            figure_format: FigureFormat::default(),
            include_code: false,
            extract_citations: true,
            main_file_name: "main.tex".to_string(),
            download_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("template", &self.template)
            .field("save_figures", &self.save_figures)
            .field("figure_format", &self.figure_format)
            .field("include_code", &self.include_code)
            .field("extract_citations", &self.extract_citations)
            .field("main_file_name", &self.main_file_name)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn BuildProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn template(mut self, selector: TemplateSelector) -> Self {
        self.config.template = selector;
        self
    }

    pub fn template_name(mut self, name: impl Into<String>) -> Self {
        self.config.template = TemplateSelector::Named(name.into());
        self
    }

    pub fn custom_template(mut self, template: Template) -> Self {
        self.config.template = TemplateSelector::Custom(template);
        self
    }

    pub fn save_figures(mut self, v: bool) -> Self {
        self.config.save_figures = v;
        self
    }

    pub fn figure_format(mut self, format: FigureFormat) -> Self {
        self.config.figure_format = format;
        self
    }

    pub fn include_code(mut self, v: bool) -> Self {
        self.config.include_code = v;
        self
    }

    pub fn extract_citations(mut self, v: bool) -> Self {
        self.config.extract_citations = v;
        self
    }

    pub fn main_file_name(mut self, name: impl Into<String>) -> Self {
        self.config.main_file_name = name.into();
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Nb2PaperError> {
        let name = &self.config.main_file_name;
        if name.trim().is_empty() {
            return Err(Nb2PaperError::InvalidConfig(
                "main file name must not be empty".into(),
            ));
        }
        if name.contains('/') || name.contains('\\') || name == "." || name == ".." {
            return Err(Nb2PaperError::InvalidConfig(format!(
                "main file name must be a bare file name, got '{name}'"
            )));
        }
        if let TemplateSelector::Named(ref t) = self.config.template {
            if t.trim().is_empty() {
                return Err(Nb2PaperError::InvalidConfig(
                    "template name must not be empty".into(),
                ));
            }
        }
        Ok(self.config)
    }
}

impl fmt::Debug for ConversionConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// A template chosen by registry name or supplied directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateSelector {
    /// Looked up in the [`TemplateRegistry`] at build time.
    Named(String),
    /// Used as-is; the registry is not consulted.
    Custom(Template),
}

impl Default for TemplateSelector {
    fn default() -> Self {
        TemplateSelector::Named("article".to_string())
    }
}

impl TemplateSelector {
    /// Resolve to a concrete template.
    ///
    /// # Errors
    /// [`Nb2PaperError::TemplateNotFound`] for an unregistered name.
    pub fn resolve<'a>(&'a self, registry: &'a TemplateRegistry) -> Result<&'a Template, Nb2PaperError> {
        match self {
            TemplateSelector::Named(name) => registry.get(name),
            TemplateSelector::Custom(template) => Ok(template),
        }
    }
}

impl From<&str> for TemplateSelector {
    fn from(name: &str) -> Self {
        TemplateSelector::Named(name.to_string())
    }
}

impl From<Template> for TemplateSelector {
    fn from(template: Template) -> Self {
        TemplateSelector::Custom(template)
    }
}

/// Figure format requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FigureFormat {
    #[default]
    Pdf,
    Png,
    Svg,
}

impl fmt::Display for FigureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FigureFormat::Pdf => "pdf",
            FigureFormat::Png => "png",
            FigureFormat::Svg => "svg",
        })
    }
}

impl std::str::FromStr for FigureFormat {
    type Err = Nb2PaperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(FigureFormat::Pdf),
            "png" => Ok(FigureFormat::Png),
            "svg" => Ok(FigureFormat::Svg),
            other => Err(Nb2PaperError::InvalidConfig(format!(
                "unknown figure format '{other}' (expected pdf, png or svg)"
            ))),
        }
    }
}
