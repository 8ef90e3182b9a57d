//! Backend error types and message extraction

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::session::SessionError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// 401 from the backend; the session has been cleared
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// Any other non-success status
    #[error("{message} (HTTP {status})")]
    Status { status: u16, message: String },

    #[error("invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl ApiError {
    /// Message suitable for a notification
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Unauthorized { message } | ApiError::Status { message, .. } => {
                message.clone()
            }
            other => other.to_string(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }
}

/// Classify a non-success response
pub fn status_error(status: StatusCode, body: &str) -> ApiError {
    let fallback = status.canonical_reason().unwrap_or("request failed");
    let message = extract_error_message(body, fallback);
    if status == StatusCode::UNAUTHORIZED {
        ApiError::Unauthorized { message }
    } else {
        ApiError::Status {
            status: status.as_u16(),
            message,
        }
    }
}

const MESSAGE_KEYS: [&str; 4] = ["detail", "message", "error", "non_field_errors"];

/// Best-effort human-readable message from an error body
///
/// Understands `{"detail": ...}`, `{"message": ...}`, `{"error": ...}`,
/// `{"non_field_errors": [...]}` and per-field validation maps such as
/// `{"email": ["Enter a valid email address."]}`. Anything else falls back to
/// the raw text when it is short, or to `fallback`.
pub fn extract_error_message(body: &str, fallback: &str) -> String {
    let trimmed = body.trim();
    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => message_from_json(&value).unwrap_or_else(|| fallback.to_string()),
        Err(_) if !trimmed.is_empty() && trimmed.len() <= 200 && !trimmed.starts_with('<') => {
            trimmed.to_string()
        }
        Err(_) => fallback.to_string(),
    }
}

fn message_from_json(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(message_from_json),
        Value::Object(map) => {
            for key in MESSAGE_KEYS {
                if let Some(msg) = map.get(key).and_then(message_from_json) {
                    return Some(msg);
                }
            }
            map.iter()
                .find_map(|(field, v)| message_from_json(v).map(|msg| format!("{}: {}", field, msg)))
        }
        _ => None,
    }
}
