//! Form workflow for creating a new secret version.
//!
//! - [`submission`]: the controller and its state machine
//! - [`validation`]: turns a draft's self-validation into form state
//! - [`staleness`]: the "outdated version" advisory
//! - [`collaborators`]: navigation, notification and submit-event seams

pub mod collaborators;
pub mod staleness;
pub mod submission;
pub mod validation;

pub use collaborators::{
    FormSubmitEvent, Navigator, Notifier, SubmitEvent, TracingNavigator, TracingNotifier,
};
pub use staleness::{is_stale, VersionContext};
pub use submission::{
    FormSnapshot, SubmissionController, SubmissionPhase, SubmissionServices, SubmitOutcome,
};
pub use validation::{ValidationGate, ValidationOutcome};
