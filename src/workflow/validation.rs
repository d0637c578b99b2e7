//! Normalizes a draft's self-validation into form state.

use serde::Serialize;
use tracing::warn;

use crate::secrets::{FieldState, SecretDraft};

/// Result of one validation pass. Recomputed on every submit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    pub is_valid: bool,
    pub field_state: Option<FieldState>,
    pub summary_message: Option<String>,
}

/// Runs the draft's validation. Never fails: a draft that cannot validate
/// itself is treated as invalid.
#[derive(Debug, Clone)]
pub struct ValidationGate {
    fallback_summary: String,
}

impl ValidationGate {
    /// `fallback_summary` is used when the draft reports failure without a
    /// summary of its own, or when validation itself errors.
    pub fn new(fallback_summary: impl Into<String>) -> Self {
        Self { fallback_summary: fallback_summary.into() }
    }

    pub fn validate<D: SecretDraft>(&self, draft: &D) -> ValidationOutcome {
        match draft.validate() {
            Ok(report) if report.is_valid => {
                ValidationOutcome { is_valid: true, field_state: None, summary_message: None }
            }
            Ok(report) => ValidationOutcome {
                is_valid: false,
                field_state: Some(report.state),
                summary_message: Some(
                    report.invalid_form_message.unwrap_or_else(|| self.fallback_summary.clone()),
                ),
            },
            Err(e) => {
                warn!(path = %draft.path(), error = %e, "Draft validation failed to run");
                ValidationOutcome {
                    is_valid: false,
                    field_state: None,
                    summary_message: Some(self.fallback_summary.clone()),
                }
            }
        }
    }
}

impl Default for ValidationGate {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_INVALID_FORM_MESSAGE)
    }
}
