//! The "create new version" submission workflow.
//!
//! [`SubmissionController`] owns the draft for one form session and runs the
//! save sequence:
//!
//! ```text
//! Idle -> Validating -> Rejected
//!                    -> Persisting -> Succeeded
//!                                  -> Failed
//! ```
//!
//! Validation is synchronous; the persistence call is the only suspension
//! point. At most one submit is in flight per controller: a second trigger
//! while a save is pending returns [`SubmitOutcome::InFlight`] without
//! reaching persistence. Form state lives in a `watch` channel so hosts can
//! re-render on change.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn, Instrument};

use super::collaborators::{Navigator, Notifier, SubmitEvent};
use super::staleness::{is_stale, VersionContext};
use super::validation::{ValidationGate, ValidationOutcome};
use crate::config::ConsoleConfig;
use crate::control_group::{ControlGroupInterceptor, ControlGroupService, SubmissionError};
use crate::errors::{ConsoleError, Result};
use crate::secrets::{ErrorHumanizer, FieldState, SecretDraft, SecretPersistence};

/// Where the form is in the save sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Validating,
    Rejected,
    Persisting,
    Succeeded,
    Failed,
}

impl SubmissionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionPhase::Idle => "idle",
            SubmissionPhase::Validating => "validating",
            SubmissionPhase::Rejected => "rejected",
            SubmissionPhase::Persisting => "persisting",
            SubmissionPhase::Succeeded => "succeeded",
            SubmissionPhase::Failed => "failed",
        }
    }

    /// True while a submit is running.
    pub fn is_busy(&self) -> bool {
        matches!(self, SubmissionPhase::Validating | SubmissionPhase::Persisting)
    }
}

impl fmt::Display for SubmissionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observable form state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSnapshot {
    pub phase: SubmissionPhase,
    /// Active save failure, if the last attempt failed.
    pub submission_error: Option<SubmissionError>,
    /// Field messages from the last rejected attempt.
    pub field_errors: Option<FieldState>,
    /// Banner text for the last rejected or failed attempt.
    pub invalid_form_alert: Option<String>,
    /// Whether the JSON editor is shown instead of key/value inputs.
    pub show_json_view: bool,
}

impl FormSnapshot {
    /// Text shown under the form for the active failure.
    pub fn error_message(&self) -> Option<&str> {
        self.submission_error.as_ref().map(SubmissionError::message)
    }
}

/// Result of one call to [`SubmissionController::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Another submit was still pending; nothing was done.
    InFlight,
    /// The draft failed validation; persistence was not contacted.
    Rejected(ValidationOutcome),
    /// The new version was written.
    Saved { path: String, version: u64 },
    /// Persistence failed.
    Failed(SubmissionError),
}

/// Collaborators injected into the controller.
pub struct SubmissionServices<D: SecretDraft> {
    pub persistence: Arc<dyn SecretPersistence<D>>,
    pub control_group: Arc<dyn ControlGroupService>,
    pub humanizer: Arc<dyn ErrorHumanizer>,
    pub navigator: Arc<dyn Navigator>,
    pub notifier: Arc<dyn Notifier>,
}

impl<D: SecretDraft> Clone for SubmissionServices<D> {
    fn clone(&self) -> Self {
        Self {
            persistence: Arc::clone(&self.persistence),
            control_group: Arc::clone(&self.control_group),
            humanizer: Arc::clone(&self.humanizer),
            navigator: Arc::clone(&self.navigator),
            notifier: Arc::clone(&self.notifier),
        }
    }
}

/// Drives one form session's submissions.
pub struct SubmissionController<D: SecretDraft> {
    draft: RwLock<D>,
    context: VersionContext,
    persistence: Arc<dyn SecretPersistence<D>>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    gate: ValidationGate,
    interceptor: ControlGroupInterceptor,
    config: ConsoleConfig,
    state: watch::Sender<FormSnapshot>,
    in_flight: AtomicBool,
}

/// Marks a submit as in flight; releasing it (also on drop of a cancelled
/// future) clears the flag and returns a busy phase to `Idle`.
struct InFlightGuard<'a, D: SecretDraft> {
    controller: &'a SubmissionController<D>,
}

impl<'a, D: SecretDraft> InFlightGuard<'a, D> {
    fn acquire(controller: &'a SubmissionController<D>) -> Option<Self> {
        controller
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { controller })
    }
}

impl<D: SecretDraft> Drop for InFlightGuard<'_, D> {
    fn drop(&mut self) {
        self.controller.state.send_if_modified(|state| {
            if state.phase.is_busy() {
                warn!(phase = %state.phase, "Submit abandoned before completion");
                state.phase = SubmissionPhase::Idle;
                true
            } else {
                false
            }
        });
        self.controller.in_flight.store(false, Ordering::Release);
    }
}

impl<D: SecretDraft> SubmissionController<D> {
    pub fn new(
        draft: D,
        context: VersionContext,
        services: SubmissionServices<D>,
        config: ConsoleConfig,
    ) -> Self {
        let (state, _) = watch::channel(FormSnapshot::default());
        let interceptor = ControlGroupInterceptor::new(services.control_group, services.humanizer);

        Self {
            draft: RwLock::new(draft),
            context,
            persistence: services.persistence,
            navigator: services.navigator,
            notifier: services.notifier,
            gate: ValidationGate::new(config.invalid_form_message.clone()),
            interceptor,
            config,
            state,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Validate and, if valid, persist the draft.
    pub async fn submit<E: SubmitEvent + ?Sized>(&self, event: &mut E) -> SubmitOutcome {
        event.prevent_default();

        let Some(_guard) = InFlightGuard::acquire(self) else {
            debug!("Submit already in flight; ignoring trigger");
            return SubmitOutcome::InFlight;
        };

        let draft = self.draft();
        let span = crate::submission_span!(draft.path());
        self.run(draft).instrument(span).await
    }

    async fn run(&self, draft: D) -> SubmitOutcome {
        self.update(|state| {
            state.phase = SubmissionPhase::Validating;
            state.submission_error = None;
            state.field_errors = None;
            state.invalid_form_alert = None;
        });
        tracing::Span::current().record("phase", SubmissionPhase::Validating.as_str());

        let outcome = self.gate.validate(&draft);
        if !outcome.is_valid {
            debug!(fields = ?outcome.field_state.as_ref().map(|f| f.keys().collect::<Vec<_>>()), "Draft rejected");
            self.update(|state| {
                state.phase = SubmissionPhase::Rejected;
                state.field_errors = outcome.field_state.clone();
                state.invalid_form_alert = outcome.summary_message.clone();
            });
            return SubmitOutcome::Rejected(outcome);
        }

        self.update(|state| state.phase = SubmissionPhase::Persisting);
        tracing::Span::current().record("phase", SubmissionPhase::Persisting.as_str());

        match self.persistence.save(&draft).await {
            Ok(saved) => {
                self.draft
                    .write()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .mark_persisted(saved.version);
                self.update(|state| {
                    state.phase = SubmissionPhase::Succeeded;
                    state.submission_error = None;
                    state.field_errors = None;
                    state.invalid_form_alert = None;
                });
                info!(version = saved.version, "Created new secret version");

                self.notifier
                    .success(&format!("Successfully created new version of {}.", draft.path()));
                // The parent route re-queries the latest version instead of
                // trusting local state.
                self.navigator.transition_to(&self.config.parent_route);

                SubmitOutcome::Saved { path: draft.path().to_string(), version: saved.version }
            }
            Err(error) => {
                let submission_error = self.interceptor.intercept(&error);
                self.update(|state| {
                    state.phase = SubmissionPhase::Failed;
                    state.submission_error = Some(submission_error.clone());
                    state.invalid_form_alert = Some(self.config.submit_failure_alert.clone());
                });
                SubmitOutcome::Failed(submission_error)
            }
        }
    }

    /// Leave the form for the secret's details view.
    ///
    /// Refused while a save is persisting: abandoning the view then would
    /// leave no way to learn the write's outcome.
    pub fn cancel(&self) -> Result<()> {
        let phase = self.phase();
        if phase == SubmissionPhase::Persisting {
            return Err(ConsoleError::invalid_phase("cancel", phase.as_str()));
        }
        self.navigator.transition_to(&self.config.details_route);
        Ok(())
    }

    /// Whether the cancel affordance should be enabled.
    pub fn can_cancel(&self) -> bool {
        self.phase() != SubmissionPhase::Persisting
    }

    /// Switch between the JSON editor and key/value inputs.
    pub fn toggle_auxiliary_view(&self) {
        self.update(|state| state.show_json_view = !state.show_json_view);
    }

    /// Whether to show the "editing an outdated version" advisory.
    pub fn is_stale(&self) -> bool {
        let is_new = self.draft.read().unwrap_or_else(|poisoned| poisoned.into_inner()).is_new();
        is_stale(&self.context, is_new)
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.state.borrow().phase
    }

    pub fn current_error(&self) -> Option<String> {
        self.state.borrow().error_message().map(str::to_string)
    }

    pub fn field_errors(&self) -> Option<FieldState> {
        self.state.borrow().field_errors.clone()
    }

    pub fn invalid_form_alert(&self) -> Option<String> {
        self.state.borrow().invalid_form_alert.clone()
    }

    pub fn show_json_view(&self) -> bool {
        self.state.borrow().show_json_view
    }

    /// Receive a notification on every state change.
    pub fn subscribe(&self) -> watch::Receiver<FormSnapshot> {
        self.state.subscribe()
    }

    /// Apply a user edit to the draft. Refused while a submit is running so the
    /// record being saved is the record that was validated.
    pub fn edit_draft<F: FnOnce(&mut D)>(&self, edit: F) -> Result<()> {
        // Check under the write lock: a submit takes the in-flight flag before
        // it reads the draft, so either it sees this edit or this edit sees it.
        let mut draft = self.draft.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        if self.in_flight.load(Ordering::Acquire) {
            let phase = self.phase();
            let phase = if phase.is_busy() { phase } else { SubmissionPhase::Validating };
            return Err(ConsoleError::invalid_phase("edit_draft", phase.as_str()));
        }
        edit(&mut *draft);
        Ok(())
    }

    /// A copy of the draft as it stands.
    pub fn draft(&self) -> D {
        self.draft.read().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }

    fn update<F: FnOnce(&mut FormSnapshot)>(&self, apply: F) {
        self.state.send_if_modified(|state| {
            let before = state.clone();
            apply(state);
            *state != before
        });
    }
}
