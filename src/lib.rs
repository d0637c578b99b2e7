//! # kv-console
//!
//! Workflow core for creating new versions of Vault KV v2 secrets: validate the
//! draft, persist it, and classify failures, including writes held by a
//! control group. Also builds the breadcrumb trail of the version diff view.
//!
//! ## Architecture
//!
//! ```text
//! submit(event) → ValidationGate → SecretPersistence → Notifier + Navigator
//!                       ↓                  ↓
//!                  field errors   ControlGroupInterceptor → ControlGroupService
//! ```
//!
//! Every collaborator is a trait injected through
//! [`workflow::SubmissionServices`]; the crate ships a Vault HTTP transport,
//! an in-process control-group token store and log-backed host services.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use kv_console::config::AppConfig;
//! use kv_console::control_group::ControlGroupTokenStore;
//! use kv_console::secrets::{DefaultErrorHumanizer, KvSecretDraft, VaultKvPersistence};
//! use kv_console::workflow::{
//!     FormSubmitEvent, SubmissionController, SubmissionServices, TracingNavigator,
//!     TracingNotifier, VersionContext,
//! };
//!
//! # async fn run() -> kv_console::Result<()> {
//! let config = AppConfig::from_env()?;
//! let draft = KvSecretDraft::new("kv", "app/db").with_data(serde_json::json!({"user": "app"}))?;
//! let services = SubmissionServices {
//!     persistence: Arc::new(VaultKvPersistence::new(config.vault.clone())?),
//!     control_group: Arc::new(ControlGroupTokenStore::default()),
//!     humanizer: Arc::new(DefaultErrorHumanizer),
//!     navigator: Arc::new(TracingNavigator),
//!     notifier: Arc::new(TracingNotifier),
//! };
//! let controller =
//!     SubmissionController::new(draft, VersionContext::default(), services, config.console);
//! let outcome = controller.submit(&mut FormSubmitEvent::new()).await;
//! # let _ = outcome;
//! # Ok(())
//! # }
//! ```

pub mod breadcrumbs;
pub mod cli;
pub mod config;
pub mod control_group;
pub mod errors;
pub mod observability;
pub mod secrets;
pub mod workflow;

// Re-export commonly used types and traits
pub use config::AppConfig;
pub use errors::{ConsoleError, Result};
pub use observability::init_logging;
pub use workflow::{SubmissionController, SubmitOutcome};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
