//! Where a notebook comes from: a file on disk or an `http(s)` URL.
//!
//! Remote notebooks are fetched into memory and parsed directly; nothing is
//! staged on disk. Local files go through [`Notebook::open`], which owns the
//! mapping from I/O failures to [`Nb2PaperError`] variants.

use crate::error::{Nb2PaperError, Result};
use crate::notebook::Notebook;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotebookSource {
    File(PathBuf),
    Url(String),
}

impl NotebookSource {
    /// Classify a user-supplied argument. Blank input is rejected.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(Nb2PaperError::InvalidInput {
                input: input.to_string(),
            });
        }
        if is_url(trimmed) {
            Ok(Self::Url(trimmed.to_string()))
        } else {
            Ok(Self::File(PathBuf::from(input)))
        }
    }

    /// Read and parse the notebook. `timeout_secs` bounds a download.
    pub async fn load(&self, timeout_secs: u64) -> Result<Notebook> {
        match self {
            Self::File(path) => {
                debug!("Reading notebook {}", path.display());
                Notebook::open(path)
            }
            Self::Url(url) => {
                let json = fetch_text(url, timeout_secs).await?;
                Notebook::from_json_str(&json, url)
            }
        }
    }
}

pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Parse `input` as a [`NotebookSource`] and load it.
pub async fn load_notebook(input: &str, timeout_secs: u64) -> Result<Notebook> {
    NotebookSource::parse(input)?.load(timeout_secs).await
}

async fn fetch_text(url: &str, timeout_secs: u64) -> Result<String> {
    info!("Fetching notebook from {}", url);
    let failed = |reason: String| Nb2PaperError::DownloadFailed {
        url: url.to_string(),
        reason,
    };

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| failed(e.to_string()))?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            Nb2PaperError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            failed(e.to_string())
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(failed(format!("HTTP {status}")));
    }

    let text = response.text().await.map_err(|e| failed(e.to_string()))?;
    debug!("Fetched {} bytes from {}", text.len(), url);
    Ok(text)
}
