//! In-memory notebook model (nbformat v4).
//!
//! A [`Notebook`] is an ordered sequence of [`Cell`]s. Narrative cells carry
//! formatted text; executable cells additionally carry their [`Output`]s,
//! each a mapping from a media type (`image/png`, `text/plain`, …) to a
//! payload.
//!
//! nbformat stores multi-line strings either as a single string or as a list
//! of line fragments. Both shapes are accepted on input and joined without a
//! separator; on output a single string is written, which is equally valid.
//!
//! Fields the model does not interpret (cell ids, execution counts, notebook
//! metadata) are preserved so a filtered copy can be handed back to an
//! external exporter unchanged.

use crate::error::{Nb2PaperError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Media type of the only raster payload the figure extractor recognises.
pub const PNG_MIME: &str = "image/png";

/// A parsed notebook document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notebook {
    pub cells: Vec<Cell>,

    #[serde(default)]
    pub metadata: Map<String, Value>,

    #[serde(default = "default_nbformat")]
    pub nbformat: u32,

    #[serde(default = "default_nbformat_minor")]
    pub nbformat_minor: u32,
}

fn default_nbformat() -> u32 {
    4
}

fn default_nbformat_minor() -> u32 {
    5
}

/// The kind of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellKind {
    /// Formatted text (a Markdown cell).
    #[serde(rename = "markdown")]
    Narrative,
    /// Source code with computed outputs (a code cell).
    #[serde(rename = "code")]
    Executable,
    /// Raw cell; ignored by every extractor.
    #[serde(rename = "raw")]
    Raw,
    /// Any cell type this model does not know about.
    #[serde(other)]
    #[serde(rename = "unknown")]
    Unknown,
}

/// One unit of a notebook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    #[serde(rename = "cell_type")]
    pub kind: CellKind,

    #[serde(default, with = "multiline")]
    pub source: String,

    /// Present for executable cells only; nbformat rejects `outputs` on
    /// other cell kinds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<Output>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Cell {
    /// A narrative (Markdown) cell.
    pub fn narrative(source: impl Into<String>) -> Self {
        let mut extra = Map::new();
        extra.insert("metadata".into(), Value::Object(Map::new()));
        Self {
            kind: CellKind::Narrative,
            source: source.into(),
            outputs: None,
            extra,
        }
    }

    /// An executable (code) cell with the given outputs.
    pub fn executable(source: impl Into<String>, outputs: Vec<Output>) -> Self {
        let mut extra = Map::new();
        extra.insert("metadata".into(), Value::Object(Map::new()));
        extra.insert("execution_count".into(), Value::Null);
        Self {
            kind: CellKind::Executable,
            source: source.into(),
            outputs: Some(outputs),
            extra,
        }
    }

    pub fn is_narrative(&self) -> bool {
        self.kind == CellKind::Narrative
    }

    pub fn is_executable(&self) -> bool {
        self.kind == CellKind::Executable
    }

    /// Outputs of this cell in order; empty for non-executable cells.
    pub fn outputs(&self) -> &[Output] {
        self.outputs.as_deref().unwrap_or(&[])
    }
}

/// One output of an executable cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Output {
    pub output_type: String,

    /// Media-type → payload mapping. Absent for `stream` and `error` outputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Output {
    /// A `display_data` output carrying a single payload.
    pub fn display_data(mime: impl Into<String>, payload: impl Into<String>) -> Self {
        let mut data = Map::new();
        data.insert(mime.into(), Value::String(payload.into()));
        let mut extra = Map::new();
        extra.insert("metadata".into(), Value::Object(Map::new()));
        Self {
            output_type: "display_data".into(),
            data: Some(data),
            extra,
        }
    }

    /// A `stream` output (stdout/stderr text, no media mapping).
    pub fn stream(name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut extra = Map::new();
        extra.insert("name".into(), Value::String(name.into()));
        extra.insert("text".into(), Value::String(text.into()));
        Self {
            output_type: "stream".into(),
            data: None,
            extra,
        }
    }

    /// Whether this output carries a payload under `mime`.
    pub fn has(&self, mime: &str) -> bool {
        self.data.as_ref().is_some_and(|d| d.contains_key(mime))
    }

    /// The textual payload for `mime`, joining list-of-lines payloads.
    ///
    /// Returns `None` when the key is absent or the payload is not text
    /// (e.g. an `application/json` object).
    pub fn text(&self, mime: &str) -> Option<String> {
        match self.data.as_ref()?.get(mime)? {
            Value::String(s) => Some(s.clone()),
            Value::Array(parts) => parts
                .iter()
                .map(|p| p.as_str())
                .collect::<Option<Vec<_>>>()
                .map(|v| v.concat()),
            _ => None,
        }
    }
}

impl Notebook {
    /// An empty notebook with nbformat 4.5 headers.
    pub fn new(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            metadata: Map::new(),
            nbformat: default_nbformat(),
            nbformat_minor: default_nbformat_minor(),
        }
    }

    /// Parse nbformat JSON. `source_name` only labels the error.
    pub fn from_json_str(json: &str, source_name: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Nb2PaperError::InvalidNotebook {
            source_name: source_name.to_string(),
            detail: e.to_string(),
        })
    }

    /// Read and parse a notebook file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Nb2PaperError::NotebookNotFound {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::PermissionDenied => Nb2PaperError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => Nb2PaperError::InvalidNotebook {
                source_name: path.display().to_string(),
                detail: e.to_string(),
            },
        })?;
        Self::from_json_str(&json, &path.display().to_string())
    }

    /// Serialise back to nbformat JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Nb2PaperError::Internal(format!("notebook serialisation: {e}")))
    }

    /// A copy of this notebook with every executable cell removed.
    pub fn without_code_cells(&self) -> Self {
        Self {
            cells: self
                .cells
                .iter()
                .filter(|c| !c.is_executable())
                .cloned()
                .collect(),
            metadata: self.metadata.clone(),
            nbformat: self.nbformat,
            nbformat_minor: self.nbformat_minor,
        }
    }
}

/// (De)serialise nbformat multi-line strings.
mod multiline {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MultilineText {
        One(String),
        Many(Vec<String>),
    }

    pub fn deserialize<'de, D>(d: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match MultilineText::deserialize(d)? {
            MultilineText::One(s) => s,
            MultilineText::Many(parts) => parts.concat(),
        })
    }

    pub fn serialize<S>(value: &str, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"{
      "cells": [
        {"cell_type": "markdown", "metadata": {}, "source": ["# Title\n", "**Authors:** A. Author"]},
        {"cell_type": "code", "execution_count": 1, "metadata": {},
         "outputs": [
           {"output_type": "stream", "name": "stdout", "text": ["hi\n"]},
           {"output_type": "display_data", "metadata": {},
            "data": {"image/png": "iVBORw0KGgo=\n", "text/plain": ["<Figure>"]}}
         ],
         "source": "plot()"},
        {"cell_type": "raw", "metadata": {}, "source": "raw stuff"},
        {"cell_type": "mystery", "metadata": {}, "source": ""}
      ],
      "metadata": {"kernelspec": {"name": "python3"}},
      "nbformat": 4,
      "nbformat_minor": 5
    }"##;

    #[test]
    fn parses_list_and_string_sources() {
        let nb = Notebook::from_json_str(SAMPLE, "sample").unwrap();
        assert_eq!(nb.cells.len(), 4);
        assert_eq!(nb.cells[0].source, "# Title\n**Authors:** A. Author");
        assert_eq!(nb.cells[1].source, "plot()");
        assert_eq!(nb.cells[0].kind, CellKind::Narrative);
        assert_eq!(nb.cells[1].kind, CellKind::Executable);
        assert_eq!(nb.cells[2].kind, CellKind::Raw);
        assert_eq!(nb.cells[3].kind, CellKind::Unknown);
    }

    #[test]
    fn output_payload_access() {
        let nb = Notebook::from_json_str(SAMPLE, "sample").unwrap();
        let outputs = nb.cells[1].outputs();
        assert_eq!(outputs.len(), 2);
        assert!(!outputs[0].has(PNG_MIME));
        assert!(outputs[1].has(PNG_MIME));
        assert_eq!(outputs[1].text("text/plain").as_deref(), Some("<Figure>"));
        assert!(nb.cells[0].outputs().is_empty());
    }

    #[test]
    fn without_code_cells_keeps_order() {
        let nb = Notebook::from_json_str(SAMPLE, "sample").unwrap();
        let filtered = nb.without_code_cells();
        let kinds: Vec<CellKind> = filtered.cells.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![CellKind::Narrative, CellKind::Raw, CellKind::Unknown]
        );
        assert_eq!(filtered.metadata, nb.metadata);
    }

    #[test]
    fn reserialised_notebook_keeps_outputs_on_code_cells_only() {
        let nb = Notebook::new(vec![
            Cell::narrative("text"),
            Cell::executable("x = 1", vec![]),
        ]);
        let json: Value = serde_json::from_str(&nb.to_json().unwrap()).unwrap();
        assert!(json["cells"][0].get("outputs").is_none());
        assert_eq!(json["cells"][1]["outputs"], Value::Array(vec![]));
        assert_eq!(json["nbformat"], 4);
    }

    #[test]
    fn invalid_json_is_reported_with_source_name() {
        let err = Notebook::from_json_str("{not json", "broken.ipynb").unwrap_err();
        assert!(err.to_string().contains("broken.ipynb"));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = Notebook::open("/definitely/not/here.ipynb").unwrap_err();
        assert!(matches!(err, Nb2PaperError::NotebookNotFound { .. }));
    }
}
