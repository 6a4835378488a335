//! Math extraction from narrative cells.
//!
//! Display spans are `$$…$$` (may cross lines); inline spans are `$…$`
//! (single line, non-greedy). Both use `$`, so the inline pattern also hits
//! pieces of display spans. An inline hit is dropped when:
//!
//! * its inner content is empty, which is what the bare `$$` delimiters of a
//!   display span produce (whitespace-only content such as `$ $` is not
//!   empty and still yields a record whose trimmed content is `""`); or
//! * the exact matched text (delimiters included) occurs between a `$$` and
//!   a later `$$` in the same cell.
//!
//! The second rule is a textual heuristic and both over- and
//! under-suppresses on nested or adjacent delimiters. It is kept as is:
//! callers depend on the current output.

use crate::notebook::Notebook;
use crate::output::{Equation, EquationKind};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use tracing::debug;

static RE_DISPLAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\$\$(.*?)\$\$").unwrap());

static RE_INLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$(.*?)\$").unwrap());

/// Extract every equation in cell order, then match order within a cell.
///
/// Display records of a cell come before its inline records.
pub fn extract_equations(notebook: &Notebook) -> Vec<Equation> {
    let mut equations = Vec::new();

    for (cell_idx, cell) in notebook.cells.iter().enumerate() {
        if !cell.is_narrative() {
            continue;
        }
        let source = cell.source.as_str();
        let mut suppressed: HashMap<&str, bool> = HashMap::new();

        for caps in RE_DISPLAY.captures_iter(source) {
            equations.push(Equation {
                kind: EquationKind::Display,
                content: caps[1].trim().to_string(),
                cell: cell_idx,
            });
        }

        for caps in RE_INLINE.captures_iter(source) {
            let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if inner.as_str().is_empty() {
                continue;
            }
            let matched = whole.as_str();
            if *suppressed
                .entry(matched)
                .or_insert_with(|| inside_display(source, matched))
            {
                continue;
            }
            equations.push(Equation {
                kind: EquationKind::Inline,
                content: inner.as_str().trim().to_string(),
                cell: cell_idx,
            });
        }
    }

    debug!("Found {} equations", equations.len());
    equations
}

/// Whether `matched` appears wrapped in `$$ … $$` somewhere in `source`.
///
/// A pattern that fails to compile (size limit on very long matches) counts
/// as not wrapped.
fn inside_display(source: &str, matched: &str) -> bool {
    match Regex::new(&format!(r"(?s)\$\$.*?{}.*?\$\$", regex::escape(matched))) {
        Ok(re) => re.is_match(source),
        Err(e) => {
            debug!("Display-span check skipped for {} byte match: {}", matched.len(), e);
            false
        }
    }
}
