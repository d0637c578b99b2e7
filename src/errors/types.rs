//! # Error Types
//!
//! Error types for the KV console core using `thiserror`.

/// Custom result type for console operations
pub type Result<T> = std::result::Result<T, ConsoleError>;

/// Main error type for the KV console core
#[derive(thiserror::Error, Debug)]
pub enum ConsoleError {
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Draft or configuration validation errors
    #[error("Validation error: {message}")]
    Validation { message: String, field: Option<String> },

    /// HTTP transport errors talking to the secrets backend
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// Workflow operation refused in the current phase
    #[error("Operation '{operation}' not allowed while {phase}")]
    InvalidPhase { operation: String, phase: String },

    /// Internal errors
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ConsoleError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into(), source: None }
    }

    /// Create a configuration error with source
    pub fn config_with_source<S: Into<String>>(
        message: S,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Config { message: message.into(), source: Some(source) }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation { message: message.into(), field: None }
    }

    /// Create a validation error with field information
    pub fn validation_field<S: Into<String>, F: Into<String>>(message: S, field: F) -> Self {
        Self::Validation { message: message.into(), field: Some(field.into()) }
    }

    /// Create an invalid phase error
    pub fn invalid_phase<O: Into<String>, P: Into<String>>(operation: O, phase: P) -> Self {
        Self::InvalidPhase { operation: operation.into(), phase: phase.into() }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal { message: message.into(), source: None }
    }
}

impl From<reqwest::Error> for ConsoleError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport { message: error.to_string(), source: Some(error) }
    }
}

impl From<validator::ValidationErrors> for ConsoleError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                let error_messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string())
                    })
                    .collect();
                format!("{}: {}", field, error_messages.join(", "))
            })
            .collect();
        fields.sort();

        Self::validation(format!("Validation failed: {}", fields.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = ConsoleError::config("Test configuration error");
        assert!(matches!(error, ConsoleError::Config { .. }));
        assert_eq!(error.to_string(), "Configuration error: Test configuration error");
    }

    #[test]
    fn test_validation_error_with_field() {
        let error = ConsoleError::validation_field("Path can't be blank.", "path");
        if let ConsoleError::Validation { field, .. } = error {
            assert_eq!(field, Some("path".to_string()));
        } else {
            panic!("expected validation error");
        }
    }

    #[test]
    fn test_invalid_phase_display() {
        let error = ConsoleError::invalid_phase("cancel", "persisting");
        assert_eq!(error.to_string(), "Operation 'cancel' not allowed while persisting");
    }

    #[test]
    fn test_reqwest_error_becomes_transport() {
        let builder_error = reqwest::Client::builder()
            .user_agent("bad\nagent")
            .build()
            .unwrap_err();
        let console_error: ConsoleError = builder_error.into();
        assert!(matches!(console_error, ConsoleError::Transport { source: Some(_), .. }));
    }
}
