//! Figure extraction: base64 PNG outputs → `figure<N>.png` files.
//!
//! Numbering is 1-based and runs across the whole notebook, so the second
//! image is `figure2.png` whether it came from the same cell or a later one.

use crate::config::FigureFormat;
use crate::error::{Nb2PaperError, Result};
use crate::notebook::{Notebook, PNG_MIME};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Decode and save every PNG output of every executable cell.
///
/// `output_dir` is created (with parents) if missing. `format` is accepted
/// for callers that ask for pdf/svg figures, but only `image/png` payloads
/// are recognised and they are written unchanged as `.png`.
///
/// A payload that is not valid base64 is skipped with a warning and does not
/// consume a figure number.
///
/// # Errors
/// [`Nb2PaperError::OutputWriteFailed`] when the directory or a file cannot
/// be written.
pub fn extract_figures(
    notebook: &Notebook,
    output_dir: &Path,
    format: FigureFormat,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .map_err(|e| Nb2PaperError::write_failed(output_dir, e))?;

    if format != FigureFormat::Png {
        debug!("Requested figure format {format}; saving PNG payloads as-is");
    }

    let mut figures = Vec::new();
    let mut figure_count = 0usize;

    for (cell_idx, cell) in notebook.cells.iter().enumerate() {
        if !cell.is_executable() {
            continue;
        }
        for output in cell.outputs() {
            let Some(payload) = output.text(PNG_MIME) else {
                continue;
            };

            let bytes = match decode_payload(&payload) {
                Ok(b) => b,
                Err(e) => {
                    warn!("Cell {}: skipping undecodable image payload: {}", cell_idx, e);
                    continue;
                }
            };

            figure_count += 1;
            let path = output_dir.join(format!("figure{}.png", figure_count));
            std::fs::write(&path, &bytes).map_err(|e| Nb2PaperError::write_failed(&path, e))?;
            debug!("Saved {} ({} bytes) from cell {}", path.display(), bytes.len(), cell_idx);
            figures.push(path);
        }
    }

    info!("Extracted {} figures to {}", figures.len(), output_dir.display());
    Ok(figures)
}

/// nbformat wraps long base64 payloads; drop whitespace before decoding.
fn decode_payload(payload: &str) -> std::result::Result<Vec<u8>, base64::DecodeError> {
    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD.decode(compact)
}
