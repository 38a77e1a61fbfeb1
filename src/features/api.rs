//! Shared HTTP plumbing for feature collaborators.

use std::time::Duration;

use reqwest::{Client, Response};
use thiserror::Error;

/// Errors from the remote services behind feature effects.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    /// The identity service answered with an error code such as `EMAIL_EXISTS`.
    #[error("Request rejected: {code}")]
    Rejected { code: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

/// HTTP client with the configured request timeout.
pub fn http_client(timeout: Duration) -> Result<Client, ApiError> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// Pass successful responses through; turn the rest into [`ApiError::Status`].
pub(crate) async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to read error body".to_string());
    tracing::debug!(status = %status, error = %message, "API error response");
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}
