//! # Structured Logging
//!
//! Subscriber setup and span macros for the submission workflow, built on the
//! tracing ecosystem. Secret payloads and control-group tokens are never passed
//! as span or event fields; only paths, versions and phases are.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::ObservabilityConfig;
use crate::errors::{ConsoleError, Result};

/// Create a tracing span for one submission attempt.
///
/// ```rust,ignore
/// let span = submission_span!("app/db-creds");
/// let span = submission_span!("app/db-creds", backend = "kv");
/// ```
#[macro_export]
macro_rules! submission_span {
    ($path:expr) => {
        tracing::info_span!(
            "secret_version_submit",
            path = %$path,
            attempt_id = %uuid::Uuid::new_v4(),
            phase = tracing::field::Empty
        )
    };
    ($path:expr, $($field:tt)*) => {
        tracing::info_span!(
            "secret_version_submit",
            path = %$path,
            attempt_id = %uuid::Uuid::new_v4(),
            phase = tracing::field::Empty,
            $($field)*
        )
    };
}

/// Create a tracing span for a call to the secrets backend.
#[macro_export]
macro_rules! backend_span {
    ($operation:expr, $path:expr) => {
        tracing::debug_span!(
            "secrets_backend",
            operation = %$operation,
            path = %$path,
            operation_id = %uuid::Uuid::new_v4()
        )
    };
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level. Installing twice is not an
/// error: the first subscriber stays in place (integration tests rely on this).
pub fn init_logging(config: &ObservabilityConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level).map_err(|e| {
            ConsoleError::config_with_source(
                format!("Invalid log level '{}'", config.log_level),
                Box::new(e),
            )
        })?,
    };

    let installed = if config.json_logging {
        tracing::subscriber::set_global_default(
            fmt().with_env_filter(filter).json().with_current_span(true).finish(),
        )
    } else {
        tracing::subscriber::set_global_default(fmt().with_env_filter(filter).finish())
    };

    if installed.is_err() {
        // Subscriber already set elsewhere; ignore.
        return Ok(());
    }

    tracing::debug!(
        service_name = %config.service_name,
        log_level = %config.log_level,
        json_logging = config.json_logging,
        "Logging initialized"
    );
    Ok(())
}

/// Log configuration at startup
pub fn log_config_info(config: &crate::config::AppConfig) {
    tracing::info!(
        vault_address = %config.vault.address,
        vault_namespace = ?config.vault.namespace,
        token_configured = config.vault.token.is_some(),
        parent_route = %config.console.parent_route,
        details_route = %config.console.details_route,
        "KV console configuration"
    );
}
