//! Host-side collaborators the form talks to: navigation, notifications and
//! the triggering UI event.

use tracing::info;

/// Moves the host to another route. Fire-and-forget.
pub trait Navigator: Send + Sync {
    fn transition_to(&self, route: &str);
}

/// Shows transient user notifications.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
}

/// The UI event that triggered a submit.
pub trait SubmitEvent {
    /// Suppress the native form submission so the save is dispatched once.
    fn prevent_default(&mut self);
}

/// Plain submit event for hosts without native form semantics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormSubmitEvent {
    default_prevented: bool,
}

impl FormSubmitEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

impl SubmitEvent for FormSubmitEvent {
    fn prevent_default(&mut self) {
        self.default_prevented = true;
    }
}

/// Navigator that only records the transition in the log. Used by the CLI,
/// where there is no router to hand the route to.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn transition_to(&self, route: &str) {
        info!(route = %route, "Transition");
    }
}

/// Notifier that writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        info!(notification = "success", "{}", message);
    }
}
