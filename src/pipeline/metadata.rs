//! Front-matter extraction from the first two narrative cells.
//!
//! Cell 0 is scanned for four fields, each with its own pattern and each
//! independent of the others:
//!
//! | Field       | Pattern (line-local)                         |
//! |-------------|----------------------------------------------|
//! | title       | `# …` or `# Paper Title: …`                  |
//! | authors     | `**Author:** …` / `**Authors:** …`           |
//! | institution | `**Institution:** …`                         |
//! | keywords    | `**Keywords:** a, b, c` (split on commas)    |
//!
//! Cell 1 is scanned for `ABSTRACT:`; everything after the marker, across
//! lines, becomes the abstract. Cells past index 1 are never looked at.

use crate::notebook::Notebook;
use crate::output::Metadata;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static RE_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^#+[ \t]+(?:Paper Title:)?[ \t]*(.+)$").unwrap());

static RE_AUTHORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*Authors?:\*\*[ \t]*(.+)").unwrap());

static RE_INSTITUTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*Institution:\*\*[ \t]*(.+)").unwrap());

static RE_KEYWORDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*Keywords:\*\*[ \t]*(.+)").unwrap());

static RE_ABSTRACT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)ABSTRACT:\s*(.+)").unwrap());

/// Extract the front-matter record. Never fails; unmatched fields keep
/// their [`Metadata::default`] values.
pub fn extract_metadata(notebook: &Notebook) -> Metadata {
    let mut metadata = Metadata::default();

    if let Some(first) = notebook.cells.first().filter(|c| c.is_narrative()) {
        let source = first.source.as_str();

        if let Some(title) = capture(&RE_TITLE, source) {
            metadata.title = title;
        }
        if let Some(authors) = capture(&RE_AUTHORS, source) {
            metadata.authors = authors;
        }
        if let Some(institution) = capture(&RE_INSTITUTION, source) {
            metadata.institution = institution;
        }
        if let Some(keywords) = capture(&RE_KEYWORDS, source) {
            metadata.keywords = keywords.split(',').map(|k| k.trim().to_string()).collect();
        }
    }

    if let Some(second) = notebook.cells.get(1).filter(|c| c.is_narrative()) {
        if let Some(abstract_text) = capture(&RE_ABSTRACT, &second.source) {
            metadata.abstract_text = abstract_text;
        }
    }

    debug!(
        "Front matter: title={:?}, {} keywords, abstract {} chars",
        metadata.title,
        metadata.keywords.len(),
        metadata.abstract_text.len()
    );
    metadata
}

/// First capture group of the first match, trimmed.
fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notebook::{Cell, Notebook};
    use pretty_assertions::assert_eq;

    fn nb(cells: Vec<Cell>) -> Notebook {
        Notebook::new(cells)
    }

    #[test]
    fn empty_notebook_yields_defaults() {
        assert_eq!(extract_metadata(&nb(vec![])), Metadata::default());
    }

    #[test]
    fn full_front_matter() {
        let first = Cell::narrative(
            "# Paper Title: Sound in Rooms\n\
             **Authors:** Ada Lovelace, Alan Turing\n\
             **Institution:** Analytical Engine Lab\n\
             **Keywords:** acoustics, rooms ,  reverb\n",
        );
        let second = Cell::narrative("ABSTRACT:\n  We measure rooms.\n\nAnd more.  \n");
        let m = extract_metadata(&nb(vec![first, second]));
        assert_eq!(m.title, "Sound in Rooms");
        assert_eq!(m.authors, "Ada Lovelace, Alan Turing");
        assert_eq!(m.institution, "Analytical Engine Lab");
        assert_eq!(m.keywords, vec!["acoustics", "rooms", "reverb"]);
        assert_eq!(m.abstract_text, "We measure rooms.\n\nAnd more.");
    }

    #[test]
    fn title_without_label_and_singular_author() {
        let first = Cell::narrative("Intro text\n## A Heading\n**Author:** Solo");
        let m = extract_metadata(&nb(vec![first]));
        assert_eq!(m.title, "A Heading");
        assert_eq!(m.authors, "Solo");
        assert_eq!(m.institution, "");
        assert!(m.keywords.is_empty());
    }

    #[test]
    fn fields_are_independent() {
        let first = Cell::narrative("**Keywords:** a, b,");
        let m = extract_metadata(&nb(vec![first]));
        assert_eq!(m.title, "Untitled");
        assert_eq!(m.keywords, vec!["a", "b", ""]);
    }

    #[test]
    fn executable_first_cell_is_ignored() {
        let first = Cell::executable("# Not A Title", vec![]);
        let second = Cell::narrative("ABSTRACT: still read");
        let m = extract_metadata(&nb(vec![first, second]));
        assert_eq!(m.title, "Untitled");
        assert_eq!(m.abstract_text, "still read");
    }

    #[test]
    fn abstract_marker_is_case_sensitive_and_only_in_cell_one() {
        let cells = vec![
            Cell::narrative("ABSTRACT: in cell zero"),
            Cell::narrative("abstract: lower case"),
            Cell::narrative("ABSTRACT: in cell two"),
        ];
        let m = extract_metadata(&nb(cells));
        assert_eq!(m.abstract_text, "");
    }

    #[test]
    fn bare_heading_marker_is_not_a_title() {
        let m = extract_metadata(&nb(vec![Cell::narrative("#\nbody")]));
        assert_eq!(m.title, "Untitled");
    }
}
