//! # Observability Infrastructure
//!
//! Structured logging for the KV console core. Events are emitted through
//! `tracing`; the subscriber (plain or JSON) is installed by [`init_logging`].

pub mod logging;

pub use logging::{init_logging, log_config_info};
