//! API Error Types
//!
//! Errors raised while talking to the hunting club API. Server failures
//! keep the `detail` message of the response body, which is what forms
//! show to the user.

use serde_json::Value;
use thiserror::Error;

use crate::storage::StorageError;

/// API client error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// The server answered 401; the session has been cleared
    #[error("Not authenticated: {}", .detail.as_deref().unwrap_or("session expired"))]
    Unauthorized { detail: Option<String> },

    /// The server answered with another non-success status
    #[error("API error {status}: {}", .detail.as_deref().unwrap_or("no details"))]
    Server { status: u16, detail: Option<String> },

    /// The API could not be reached
    #[error("API unavailable at {0}")]
    Unavailable(String),

    /// The request timed out
    #[error("Request timeout")]
    Timeout,

    /// Any other transport failure
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The response body did not have the expected shape
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// The configured base URL is not usable
    #[error("Invalid API URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    /// Reading or writing the persisted session failed
    #[error("Session storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// Message reported by the server, if any
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { detail } | ApiError::Server { detail, .. } => {
                detail.as_deref()
            }
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    /// HTTP status, for server-reported failures
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The single message a form shows: the server's detail or a fallback
    pub fn user_message(&self, fallback: &str) -> String {
        self.detail().unwrap_or(fallback).to_string()
    }
}

/// Extract the human-readable message from an error body
///
/// Accepts `{"detail": "text"}`, validation errors shaped as
/// `{"detail": [{"msg": "text", ...}]}` (first message wins), and the
/// `message` / `error` keys used by other servers.
pub fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;

    let detail = value
        .get("detail")
        .or_else(|| value.get("message"))
        .or_else(|| value.get("error"))?;

    match detail {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Object(map) => map.get("msg").and_then(Value::as_str).map(str::to_string),
            _ => None,
        }),
        Value::Object(map) => map
            .get("msg")
            .or_else(|| map.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
