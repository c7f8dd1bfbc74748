use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::types::ErrorDetail;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// The request never produced an HTTP response.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("API error {status}: {message}")]
    Api {
        status: u16,
        message: String,
        details: Vec<ErrorDetail>,
        code: Option<String>,
    },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(429)
    }
}

/// Build an `Api` error from a failed response body.
///
/// The message is `message`, else `error`, else a generic text naming the
/// status. Each field is read on its own, so a malformed `details` never
/// hides the message.
pub(crate) fn api_error(status: u16, body: &[u8]) -> ClientError {
    let parsed: Value = serde_json::from_slice(body).unwrap_or(Value::Null);
    let text = |key: &str| parsed.get(key).and_then(Value::as_str).map(String::from);

    let details = parsed
        .get("details")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| ErrorDetail::deserialize(item).ok())
                .collect()
        })
        .unwrap_or_default();

    ClientError::Api {
        status,
        message: text("message")
            .or_else(|| text("error"))
            .unwrap_or_else(|| format!("Request failed with status {}", status)),
        details,
        code: text("code"),
    }
}
