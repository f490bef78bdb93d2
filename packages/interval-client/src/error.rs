//! Error types for the interval client.

use serde_json::Value;
use thiserror::Error;

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Interval client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network error (connection failed, timeout)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an error body
    #[error("API error ({status} {code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
        details: Option<Value>,
    },

    /// Unexpected response format
    #[error("Decode error: {0}")]
    Decode(String),

    /// The snapshot event stream broke
    #[error("Event stream error: {0}")]
    EventStream(String),
}

impl ClientError {
    /// Stable error code for `Api` errors, e.g. `transaction_not_found`.
    pub fn code(&self) -> Option<&str> {
        match self {
            ClientError::Api { code, .. } => Some(code),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// At most the first 200 characters of `text`, for error messages.
pub(crate) fn preview(text: &str) -> String {
    text.chars().take(200).collect()
}
