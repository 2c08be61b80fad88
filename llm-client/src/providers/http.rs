//! JSON round trips shared by the HTTP providers.

use reqwest::RequestBuilder;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::{LlmError, Result};

/// `{"error": {"message": ...}}`, the error body all supported APIs use.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Send `request` and decode a successful JSON answer into `T`.
///
/// Non-2xx answers become typed errors carrying the API's own message when
/// the body has one.
pub(crate) async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
    let response = request
        .header("Content-Type", "application/json")
        .send()
        .await
        .map_err(|e| LlmError::ApiError {
            message: format!("Request failed: {}", e),
            status_code: None,
        })?;

    let status = response.status();
    if !status.is_success() {
        let retry_after = retry_after_secs(response.headers());
        let body = response.text().await.unwrap_or_default();
        return Err(LlmError::from_status(
            status.as_u16(),
            error_message(body),
            retry_after,
        ));
    }

    response.json().await.map_err(|e| LlmError::ApiError {
        message: format!("Failed to parse response: {}", e),
        status_code: None,
    })
}

fn error_message(body: String) -> String {
    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => body,
    }
}

/// Seconds from a `Retry-After` header, when the server sent one
fn retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}
