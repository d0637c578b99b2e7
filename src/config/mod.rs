//! # Configuration Management
//!
//! Route names, user-facing messages, Vault connection settings and logging
//! options. Every section has sane defaults and can be overridden through the
//! environment (`KV_CONSOLE_*` plus the standard `VAULT_*` variables).

pub mod settings;

pub use settings::{
    AppConfig, ConsoleConfig, ObservabilityConfig, VaultConfig, DEFAULT_DETAILS_ROUTE,
    DEFAULT_INVALID_FORM_MESSAGE, DEFAULT_PARENT_ROUTE, DEFAULT_SUBMIT_FAILURE_ALERT,
};
