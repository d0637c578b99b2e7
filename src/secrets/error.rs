//! Errors raised by the persistence collaborator when a save does not go through.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use super::types::SecretString;

/// Response-wrapping details Vault returns instead of data when a request is
/// held by a control group.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WrapInfo {
    pub token: SecretString,
    pub accessor: String,
    #[serde(default)]
    pub ttl: u64,
    pub creation_time: DateTime<Utc>,
    #[serde(default)]
    pub creation_path: String,
}

/// A failed save.
///
/// Mirrors the shape the console's error helpers understand: a top-level
/// message, the backend's own `errors` list, and (for control-group deferrals)
/// the wrap info needed to resume the request later.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct PersistenceError {
    pub message: String,
    pub errors: Vec<String>,
    pub status: Option<u16>,
    pub wrap_info: Option<WrapInfo>,
}

impl PersistenceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), errors: Vec::new(), status: None, wrap_info: None }
    }

    /// Error built from a non-2xx backend response.
    pub fn from_response(status: u16, errors: Vec<String>) -> Self {
        Self {
            message: format!("Request failed with status {}", status),
            errors,
            status: Some(status),
            wrap_info: None,
        }
    }

    /// Error for a write held by a control group. `message` is the sentinel the
    /// interceptor matches on.
    pub fn control_group(message: impl Into<String>, wrap_info: WrapInfo) -> Self {
        Self { message: message.into(), errors: Vec::new(), status: None, wrap_info: Some(wrap_info) }
    }
}

/// Message used when an error carries nothing presentable.
pub const FALLBACK_ERROR_MESSAGE: &str = "An error occurred, please try again";

/// Turns a failed save into the text shown under the form.
pub trait ErrorHumanizer: Send + Sync {
    fn to_message(&self, error: &PersistenceError) -> String;
}

/// Backend `errors` joined with `", "`, else the message, else a fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultErrorHumanizer;

impl ErrorHumanizer for DefaultErrorHumanizer {
    fn to_message(&self, error: &PersistenceError) -> String {
        if !error.errors.is_empty() {
            return error.errors.join(", ");
        }
        if !error.message.trim().is_empty() {
            return error.message.clone();
        }
        FALLBACK_ERROR_MESSAGE.to_string()
    }
}
