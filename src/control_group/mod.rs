//! Control-group handling.
//!
//! A control group holds a sensitive write until someone approves it out of
//! band. Vault answers such a write with wrap info instead of data; the
//! persistence layer turns that into a [`PersistenceError`] whose message is
//! [`CONTROL_GROUP_SENTINEL`]. The [`interceptor`] recognizes that error, hands
//! it to a [`ControlGroupService`] to keep the token for later, and produces the
//! message shown to the user. [`store`] is the in-process service.

pub mod interceptor;
pub mod store;

pub use interceptor::{ControlGroupInterceptor, SubmissionError};
pub use store::{ControlGroupToken, ControlGroupTokenStore};

use crate::secrets::PersistenceError;

/// Exact message of a write intercepted by a control group.
pub const CONTROL_GROUP_SENTINEL: &str = "Control Group encountered";

/// Follow-up text describing how to get a held request authorized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlGroupLog {
    pub content: String,
}

/// Keeps control-group tokens so the held action can be resumed later,
/// possibly from a different view than the one that triggered it.
pub trait ControlGroupService: Send + Sync {
    /// Persist the token carried by `error`.
    fn save_token_from_error(&self, error: &PersistenceError);

    /// Build the user-facing follow-up message for `error`.
    fn log_from_error(&self, error: &PersistenceError) -> ControlGroupLog;
}

/// True when `error` is a control-group deferral. Exact match only.
pub fn is_control_group_error(error: &PersistenceError) -> bool {
    error.message == CONTROL_GROUP_SENTINEL
}
