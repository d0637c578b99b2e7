//! Classifies failed saves into what the form shows.

use std::sync::Arc;

use tracing::{debug, info};

use super::{is_control_group_error, ControlGroupService};
use crate::secrets::{ErrorHumanizer, PersistenceError, SecretString};

/// The outcome of a failed save, as surfaced by the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    /// The write was held by a control group. The token has been stored.
    ControlGroupDeferral { token: Option<SecretString>, message: String },
    /// Any other failure, humanized.
    Generic { message: String },
}

impl SubmissionError {
    /// Text shown under the form.
    pub fn message(&self) -> &str {
        match self {
            SubmissionError::ControlGroupDeferral { message, .. } => message,
            SubmissionError::Generic { message } => message,
        }
    }

    pub fn is_control_group(&self) -> bool {
        matches!(self, SubmissionError::ControlGroupDeferral { .. })
    }
}

/// Routes save failures through the control-group service when they are
/// deferrals, and through the humanizer otherwise.
#[derive(Clone)]
pub struct ControlGroupInterceptor {
    service: Arc<dyn ControlGroupService>,
    humanizer: Arc<dyn ErrorHumanizer>,
}

impl ControlGroupInterceptor {
    pub fn new(service: Arc<dyn ControlGroupService>, humanizer: Arc<dyn ErrorHumanizer>) -> Self {
        Self { service, humanizer }
    }

    pub fn intercept(&self, error: &PersistenceError) -> SubmissionError {
        if !is_control_group_error(error) {
            debug!(status = ?error.status, "Save failed");
            return SubmissionError::Generic { message: self.humanizer.to_message(error) };
        }

        info!(
            accessor = error.wrap_info.as_ref().map(|w| w.accessor.as_str()).unwrap_or("unknown"),
            "Save deferred by control group"
        );
        self.service.save_token_from_error(error);
        let log = self.service.log_from_error(error);

        SubmissionError::ControlGroupDeferral {
            token: error.wrap_info.as_ref().map(|w| w.token.clone()),
            message: log.content,
        }
    }
}
