//! # Error Handling
//!
//! Error types for the KV console core. Workflow failures that the user sees
//! (validation, control-group deferral, persistence failure) are not errors of
//! this type: they are folded into form state. `ConsoleError` covers the
//! crate's own failures: configuration, transport setup and misuse.

pub mod types;

pub use types::{ConsoleError, Result};
