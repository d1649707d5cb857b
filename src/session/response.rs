//! Response handling shared by the session manager and the resource clients:
//! JSON decoding, empty-body success, and sanitized error bodies.

use crate::session::SessionError;
use reqwest::Response;
use serde::de::DeserializeOwned;

/// Maximum number of error body characters surfaced to the user.
const MAX_ERROR_CHARS: usize = 200;

/// Parses JSON responses and surfaces HTTP errors with sanitized bodies.
pub async fn handle_json_response<T: DeserializeOwned>(response: Response) -> Result<T, SessionError> {
    let status = response.status();
    if status.is_success() {
        response
            .json::<T>()
            .await
            .map_err(|err| SessionError::Decode(err.to_string()))
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(SessionError::from_status(status, sanitize_body(&body)))
    }
}

/// Accepts any 2xx (204 included) and discards the body.
pub async fn handle_empty_response(response: Response) -> Result<(), SessionError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(SessionError::from_status(status, sanitize_body(&body)))
    }
}

/// Trims and truncates an error body for display.
#[must_use]
pub fn sanitize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Request failed.".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}
