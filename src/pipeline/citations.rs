//! Reference-list extraction.
//!
//! Only narrative cells containing `References` or `REFERENCES` are looked
//! at. Within such a cell, every line that starts with `[<digits>]` is kept
//! verbatim (trimmed).

use crate::notebook::Notebook;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

const REFERENCE_MARKERS: [&str; 2] = ["References", "REFERENCES"];

static RE_CITATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[\d+\]").unwrap());

/// Extract raw citation lines in cell order, then line order.
pub fn extract_citations(notebook: &Notebook) -> Vec<String> {
    let citations: Vec<String> = notebook
        .cells
        .iter()
        .filter(|cell| cell.is_narrative())
        .filter(|cell| REFERENCE_MARKERS.iter().any(|m| cell.source.contains(m)))
        .flat_map(|cell| cell.source.split('\n'))
        .filter(|line| RE_CITATION.is_match(line))
        .map(|line| line.trim().to_string())
        .collect();

    debug!("Found {} citations", citations.len());
    citations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notebook::Cell;
    use pretty_assertions::assert_eq;

    #[test]
    fn lines_from_references_cell() {
        let nb = Notebook::new(vec![Cell::narrative(
            "## References\n[1] Smith et al.\n[2] Jones\nNot a citation",
        )]);
        assert_eq!(extract_citations(&nb), vec!["[1] Smith et al.", "[2] Jones"]);
    }

    #[test]
    fn cell_without_heading_contributes_nothing() {
        let nb = Notebook::new(vec![Cell::narrative("[1] Smith et al.\n[2] Jones")]);
        assert!(extract_citations(&nb).is_empty());
    }

    #[test]
    fn upper_case_marker_and_crlf_lines() {
        let nb = Notebook::new(vec![Cell::narrative(
            "REFERENCES\r\n[10] Knuth, TAOCP   \r\n",
        )]);
        assert_eq!(extract_citations(&nb), vec!["[10] Knuth, TAOCP"]);
    }

    #[test]
    fn indented_and_non_numeric_brackets_are_skipped() {
        let nb = Notebook::new(vec![Cell::narrative(
            "References\n  [1] indented\n[a] letters\n[] empty\n[3]tight",
        )]);
        assert_eq!(extract_citations(&nb), vec!["[3]tight"]);
    }

    #[test]
    fn lower_case_marker_does_not_qualify() {
        let nb = Notebook::new(vec![Cell::narrative("references\n[1] Smith")]);
        assert!(extract_citations(&nb).is_empty());
    }

    #[test]
    fn executable_cells_are_ignored() {
        let nb = Notebook::new(vec![
            Cell::executable("# References\n[1] in code", vec![]),
            Cell::narrative("References\n[2] in text"),
        ]);
        assert_eq!(extract_citations(&nb), vec!["[2] in text"]);
    }
}
