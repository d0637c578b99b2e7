//! # Configuration Settings
//!
//! Defines the configuration structure for the KV console core.

use crate::errors::{ConsoleError, Result};
use crate::secrets::SecretString;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

/// Route the workflow navigates to after a new version is saved.
pub const DEFAULT_PARENT_ROUTE: &str = "vault.cluster.secrets.backend.kv.secret";

/// Route the workflow navigates to when the form is cancelled.
pub const DEFAULT_DETAILS_ROUTE: &str = "vault.cluster.secrets.backend.kv.secret.details";

/// Alert shown whenever persistence fails, whatever the failure kind.
pub const DEFAULT_SUBMIT_FAILURE_ALERT: &str = "There was an error submitting this form.";

/// Summary shown when the draft fails its own validation without supplying one.
pub const DEFAULT_INVALID_FORM_MESSAGE: &str = "There is an error with this form.";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct AppConfig {
    /// Form workflow configuration
    #[validate(nested)]
    pub console: ConsoleConfig,

    /// Vault connection used by the HTTP persistence transport
    #[validate(nested)]
    pub vault: VaultConfig,

    /// Logging configuration
    #[validate(nested)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Load every section from the environment and validate the result.
    pub fn from_env() -> Result<Self> {
        let config = Self {
            console: ConsoleConfig::from_env(),
            vault: VaultConfig::from_env()?,
            observability: ObservabilityConfig::from_env(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(ConsoleError::from)?;
        self.validate_custom()
    }

    fn validate_custom(&self) -> Result<()> {
        if self.console.parent_route == self.console.details_route {
            return Err(ConsoleError::validation(
                "Parent and details routes cannot be the same",
            ));
        }

        if !self.vault.address.starts_with("http://") && !self.vault.address.starts_with("https://")
        {
            return Err(ConsoleError::validation(
                "Vault address must start with 'http://' or 'https://'",
            ));
        }

        Ok(())
    }
}

/// Route names and user-facing messages of the version form
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ConsoleConfig {
    /// Route entered after a successful save; re-queries the latest version
    #[validate(length(min = 1, message = "Parent route cannot be empty"))]
    pub parent_route: String,

    /// Route entered when the form is cancelled
    #[validate(length(min = 1, message = "Details route cannot be empty"))]
    pub details_route: String,

    /// Alert banner text for any persistence failure
    #[validate(length(min = 1, message = "Submit failure alert cannot be empty"))]
    pub submit_failure_alert: String,

    /// Fallback summary when validation fails without a message of its own
    #[validate(length(min = 1, message = "Invalid form message cannot be empty"))]
    pub invalid_form_message: String,

    /// Base path of the UI, used to build control-group authorization links
    pub ui_base_path: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            parent_route: DEFAULT_PARENT_ROUTE.to_string(),
            details_route: DEFAULT_DETAILS_ROUTE.to_string(),
            submit_failure_alert: DEFAULT_SUBMIT_FAILURE_ALERT.to_string(),
            invalid_form_message: DEFAULT_INVALID_FORM_MESSAGE.to_string(),
            ui_base_path: "/ui".to_string(),
        }
    }
}

impl ConsoleConfig {
    /// Create ConsoleConfig from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            parent_route: std::env::var("KV_CONSOLE_PARENT_ROUTE")
                .unwrap_or(defaults.parent_route),
            details_route: std::env::var("KV_CONSOLE_DETAILS_ROUTE")
                .unwrap_or(defaults.details_route),
            submit_failure_alert: defaults.submit_failure_alert,
            invalid_form_message: defaults.invalid_form_message,
            ui_base_path: std::env::var("KV_CONSOLE_UI_BASE_PATH")
                .unwrap_or(defaults.ui_base_path),
        }
    }
}

/// Vault connection configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VaultConfig {
    /// Vault server address, e.g. `https://vault.example.com:8200`
    #[validate(length(min = 1, message = "Vault address cannot be empty"))]
    pub address: String,

    /// Client token sent as `X-Vault-Token`
    pub token: Option<SecretString>,

    /// Enterprise namespace sent as `X-Vault-Namespace`
    pub namespace: Option<String>,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300, message = "Timeout must be between 1 and 300 seconds"))]
    pub timeout_seconds: u64,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            address: "http://127.0.0.1:8200".to_string(),
            token: None,
            namespace: None,
            timeout_seconds: 30,
        }
    }
}

impl VaultConfig {
    /// Create VaultConfig from the standard `VAULT_*` environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let timeout_seconds = match std::env::var("KV_CONSOLE_VAULT_TIMEOUT_SECONDS") {
            Ok(raw) => raw
                .parse::<u64>()
                .map_err(|e| ConsoleError::config(format!("Invalid Vault timeout: {}", e)))?,
            Err(_) => defaults.timeout_seconds,
        };

        Ok(Self {
            address: std::env::var("VAULT_ADDR").unwrap_or(defaults.address),
            token: std::env::var("VAULT_TOKEN").ok().map(SecretString::new),
            namespace: std::env::var("VAULT_NAMESPACE").ok().filter(|ns| !ns.is_empty()),
            timeout_seconds,
        })
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ObservabilityConfig {
    /// Service name attached to log output
    #[validate(length(min = 1, message = "Service name cannot be empty"))]
    pub service_name: String,

    /// Log level (trace, debug, info, warn, error)
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "kv-console".to_string(),
            log_level: "info".to_string(),
            json_logging: false,
        }
    }
}

impl ObservabilityConfig {
    /// Create ObservabilityConfig from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let json_logging = std::env::var("KV_CONSOLE_JSON_LOGGING")
            .map(|s| s.to_lowercase() == "true" || s == "1")
            .unwrap_or(defaults.json_logging);

        Self {
            service_name: std::env::var("KV_CONSOLE_SERVICE_NAME")
                .unwrap_or(defaults.service_name),
            log_level: std::env::var("KV_CONSOLE_LOG_LEVEL").unwrap_or(defaults.log_level),
            json_logging,
        }
    }
}
