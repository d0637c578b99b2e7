//! Shared fakes for workflow integration tests.
//!
//! Every collaborator records how it was called so tests can assert on call
//! counts and arguments. [`RecordingPersistence`] can hold a save open until
//! the test releases it, for exercising the in-flight guard.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::Notify;

use kv_console::config::ConsoleConfig;
use kv_console::control_group::{ControlGroupLog, ControlGroupService, CONTROL_GROUP_SENTINEL};
use kv_console::secrets::{
    ErrorHumanizer, KvSecretDraft, PersistenceError, SavedVersion, SecretDraft,
    SecretPersistence, SecretString, WrapInfo,
};
use kv_console::workflow::{
    Navigator, Notifier, SubmissionController, SubmissionServices, VersionContext,
};

pub const FOLLOW_UP_MESSAGE: &str = "Ask an approver to authorize the request.";

pub struct RecordingPersistence {
    result: Mutex<Result<SavedVersion, PersistenceError>>,
    calls: AtomicUsize,
    paths: Mutex<Vec<String>>,
    hold: AtomicBool,
    pub started: Notify,
    release: Notify,
}

impl RecordingPersistence {
    pub fn returning(result: Result<SavedVersion, PersistenceError>) -> Arc<Self> {
        Arc::new(Self {
            result: Mutex::new(result),
            calls: AtomicUsize::new(0),
            paths: Mutex::new(Vec::new()),
            hold: AtomicBool::new(false),
            started: Notify::new(),
            release: Notify::new(),
        })
    }

    /// Like [`returning`](Self::returning), but each save waits for [`release`](Self::release).
    pub fn held(result: Result<SavedVersion, PersistenceError>) -> Arc<Self> {
        let persistence = Self::returning(result);
        persistence.hold.store(true, Ordering::SeqCst);
        persistence
    }

    pub fn release(&self) {
        self.release.notify_one();
    }

    pub fn stop_holding(&self) {
        self.hold.store(false, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }
}

#[async_trait]
impl SecretPersistence<KvSecretDraft> for RecordingPersistence {
    async fn save(&self, draft: &KvSecretDraft) -> Result<SavedVersion, PersistenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.paths.lock().unwrap().push(draft.path().to_string());
        self.started.notify_one();
        if self.hold.load(Ordering::SeqCst) {
            self.release.notified().await;
        }
        self.result.lock().unwrap().clone()
    }
}

#[derive(Default)]
pub struct RecordingHost {
    pub routes: Mutex<Vec<String>>,
    pub notifications: Mutex<Vec<String>>,
}

impl Navigator for RecordingHost {
    fn transition_to(&self, route: &str) {
        self.routes.lock().unwrap().push(route.to_string());
    }
}

impl Notifier for RecordingHost {
    fn success(&self, message: &str) {
        self.notifications.lock().unwrap().push(message.to_string());
    }
}

#[derive(Default)]
pub struct RecordingControlGroup {
    pub saved: AtomicUsize,
    pub logged: AtomicUsize,
}

impl ControlGroupService for RecordingControlGroup {
    fn save_token_from_error(&self, _error: &PersistenceError) {
        self.saved.fetch_add(1, Ordering::SeqCst);
    }

    fn log_from_error(&self, _error: &PersistenceError) -> ControlGroupLog {
        self.logged.fetch_add(1, Ordering::SeqCst);
        ControlGroupLog { content: FOLLOW_UP_MESSAGE.to_string() }
    }
}

/// Humanizer whose output is easy to tell apart from the raw message.
pub struct PrefixHumanizer;

impl ErrorHumanizer for PrefixHumanizer {
    fn to_message(&self, error: &PersistenceError) -> String {
        format!("humanized: {}", error.message)
    }
}

pub struct Harness {
    pub persistence: Arc<RecordingPersistence>,
    pub host: Arc<RecordingHost>,
    pub control_group: Arc<RecordingControlGroup>,
}

impl Harness {
    pub fn new(persistence: Arc<RecordingPersistence>) -> Self {
        Self {
            persistence,
            host: Arc::new(RecordingHost::default()),
            control_group: Arc::new(RecordingControlGroup::default()),
        }
    }

    pub fn controller(
        &self,
        draft: KvSecretDraft,
        context: VersionContext,
    ) -> SubmissionController<KvSecretDraft> {
        let services = SubmissionServices {
            persistence: self.persistence.clone(),
            control_group: self.control_group.clone(),
            humanizer: Arc::new(PrefixHumanizer),
            navigator: self.host.clone(),
            notifier: self.host.clone(),
        };
        SubmissionController::new(draft, context, services, ConsoleConfig::default())
    }

    pub fn routes(&self) -> Vec<String> {
        self.host.routes.lock().unwrap().clone()
    }

    pub fn notifications(&self) -> Vec<String> {
        self.host.notifications.lock().unwrap().clone()
    }
}

pub fn valid_draft(path: &str) -> KvSecretDraft {
    KvSecretDraft::new("kv", path)
        .with_data(serde_json::json!({"username": "app", "password": "hunter2"}))
        .unwrap()
}

pub fn control_group_error() -> PersistenceError {
    PersistenceError::control_group(
        CONTROL_GROUP_SENTINEL,
        WrapInfo {
            token: SecretString::new("hvs.CAESIwrapped"),
            accessor: "Bfo1Cu1ugUT3Dp1KDuUTmr8f".to_string(),
            ttl: 86400,
            creation_time: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
            creation_path: "kv/data/app/db-creds".to_string(),
        },
    )
}
