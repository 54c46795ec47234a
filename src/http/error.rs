//! Error types for the HTTP transport.
//!
//! [`HttpError`] is the single failure type every resource operation returns.
//! Resource functions never wrap or reinterpret it: whatever the transport
//! reports is what the caller sees.

use thiserror::Error;

/// Failures surfaced by an [`HttpClient`](super::HttpClient).
#[derive(Debug, Error)]
pub enum HttpError {
    /// The server returned HTTP 404 for the requested path.
    #[error("not found: {path}")]
    NotFound { path: String },

    /// The server rejected the credentials (HTTP 401) or the caller lacks
    /// access to the resource (HTTP 403).
    #[error("unauthorized (status {status}): {message}")]
    Unauthorized { status: u16, message: String },

    /// The server rejected the request body or parameters (HTTP 400/422).
    #[error("validation failed (status {status}): {message}")]
    Validation { status: u16, message: String },

    /// Any other non-success status.
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Failure below HTTP: DNS, refused connection, timeout.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body did not have the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A wire record carried a field the client could not interpret.
    #[error("malformed record: {0}")]
    MalformedRecord(String),
}

impl HttpError {
    /// Maps a non-success status and response body onto the matching variant.
    pub fn from_status(status: u16, path: &str, message: String) -> Self {
        match status {
            404 => HttpError::NotFound {
                path: path.to_string(),
            },
            401 | 403 => HttpError::Unauthorized { status, message },
            400 | 422 => HttpError::Validation { status, message },
            _ => HttpError::Api { status, message },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, HttpError::NotFound { .. })
    }
}
