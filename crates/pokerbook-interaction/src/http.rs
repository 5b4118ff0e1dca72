//! Shared HTTP plumbing for the remote adapters.

use pokerbook_core::{LedgerError, Result};
use reqwest::{Client, Response};
use std::time::Duration;

/// Upper bound for any single request to a remote service.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

pub fn build_client(service: &'static str) -> Result<Client> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| LedgerError::external(service, format!("failed to build HTTP client: {e}")))
}

/// Maps a transport error, keeping the timeout case recognisable.
pub fn request_error(service: &'static str, err: reqwest::Error) -> LedgerError {
    if err.is_timeout() {
        LedgerError::external(service, "request timed out")
    } else {
        LedgerError::external(service, format!("request failed: {err}"))
    }
}

/// Passes successful responses through and turns the rest into errors that
/// carry the status and body.
pub async fn ensure_success(service: &'static str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_string());
    Err(LedgerError::external(
        service,
        format!("HTTP {status}: {}", truncate(&body, 300)),
    ))
}

pub async fn parse_json<T: serde::de::DeserializeOwned>(
    service: &'static str,
    response: Response,
) -> Result<T> {
    response
        .json()
        .await
        .map_err(|e| LedgerError::external(service, format!("invalid response: {e}")))
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
