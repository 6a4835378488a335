//! JSON-over-HTTP calls to the local helper services.
//!
//! Both the docs service (remote LaTeX builds) and the collaboration service
//! expose tools as `POST <base>/run/<tool>` taking and returning a JSON
//! object.

use crate::error::{Nb2PaperError, Result};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Join a base URL and a tool name into `<base>/run/<tool>`.
pub(crate) fn tool_url(base: &str, tool: &str) -> String {
    format!("{}/run/{}", base.trim_end_matches('/'), tool)
}

/// POST `body` to `url` and decode the JSON reply.
///
/// Connection failures, timeouts, non-2xx statuses and non-JSON replies each
/// map to their own [`Nb2PaperError`] variant.
pub(crate) async fn post_json(url: &str, body: &Value, timeout_secs: u64) -> Result<Value> {
    debug!("POST {}", url);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| Nb2PaperError::Internal(format!("Failed to build HTTP client: {}", e)))?;

    let response = client.post(url).json(body).send().await.map_err(|e| {
        if e.is_timeout() {
            Nb2PaperError::ServiceTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            Nb2PaperError::ServiceUnavailable {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Nb2PaperError::ServiceError {
            url: url.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| Nb2PaperError::MalformedResponse {
            url: url.to_string(),
            detail: e.to_string(),
        })
}
