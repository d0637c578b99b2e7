//! The in-progress record behind the "create new version" form.
//!
//! The workflow only needs a handful of capabilities from a draft (its path,
//! whether it has been persisted yet, and a self-check), so those are expressed
//! as the [`SecretDraft`] trait. [`KvSecretDraft`] is the KV v2 implementation
//! used by the Vault transport and the CLI.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};
use validator::{Validate, ValidationError};

use crate::errors::{ConsoleError, Result};

/// Longest secret path the form accepts.
pub const MAX_PATH_LENGTH: usize = 768;

/// Field name to the list of messages for that field.
pub type FieldState = BTreeMap<String, Vec<String>>;

/// What a draft reports about itself when asked to validate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub state: FieldState,
    pub invalid_form_message: Option<String>,
}

impl ValidationReport {
    pub fn valid() -> Self {
        Self { is_valid: true, state: FieldState::new(), invalid_form_message: None }
    }

    /// Build a failing report, counting messages for the summary line.
    pub fn invalid(state: FieldState) -> Self {
        let count: usize = state.values().map(Vec::len).sum();
        let invalid_form_message = if count <= 1 {
            "There is an error with this form.".to_string()
        } else {
            format!("There are {} errors with this form.", count)
        };
        Self { is_valid: false, state, invalid_form_message: Some(invalid_form_message) }
    }
}

/// Capabilities the submission workflow needs from the record it saves.
pub trait SecretDraft: Clone + Send + Sync + 'static {
    /// Secret path relative to the mount, e.g. `app/db-creds`.
    fn path(&self) -> &str;

    /// True until the first successful persist.
    fn is_new(&self) -> bool;

    /// Run the record's own validation rules.
    fn validate(&self) -> Result<ValidationReport>;

    /// Record a successful save. After this `is_new` must return false.
    fn mark_persisted(&mut self, version: u64);
}

/// A new version of a KV v2 secret.
#[derive(Clone, Validate)]
pub struct KvSecretDraft {
    backend: String,

    #[validate(
        length(min = 1, message = "Path can't be blank."),
        custom(function = "path_is_well_formed")
    )]
    path: String,

    #[validate(custom(function = "keys_are_not_blank"))]
    secret_data: Map<String, Value>,

    cas: Option<u64>,
    version: Option<u64>,
    is_new: bool,
}

impl KvSecretDraft {
    /// Start a new version of `path` under the `backend` mount.
    pub fn new(backend: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            path: path.into(),
            secret_data: Map::new(),
            cas: None,
            version: None,
            is_new: true,
        }
    }

    /// Replace the payload with `data`, which must be a JSON object.
    pub fn with_data(mut self, data: Value) -> Result<Self> {
        match data {
            Value::Object(map) => {
                self.secret_data = map;
                Ok(self)
            }
            other => Err(ConsoleError::validation_field(
                format!("Secret data must be a JSON object, got {}", json_kind(&other)),
                "secretData",
            )),
        }
    }

    /// Require the backend's current version to equal `version` when writing.
    pub fn with_cas(mut self, version: u64) -> Self {
        self.cas = Some(version);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.secret_data.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.secret_data.remove(key)
    }

    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }

    pub fn backend(&self) -> &str {
        &self.backend
    }

    pub fn secret_data(&self) -> &Map<String, Value> {
        &self.secret_data
    }

    pub fn cas(&self) -> Option<u64> {
        self.cas
    }

    /// Version assigned by the backend, once saved.
    pub fn version(&self) -> Option<u64> {
        self.version
    }
}

impl SecretDraft for KvSecretDraft {
    fn path(&self) -> &str {
        &self.path
    }

    fn is_new(&self) -> bool {
        self.is_new
    }

    fn validate(&self) -> Result<ValidationReport> {
        match Validate::validate(self) {
            Ok(()) => Ok(ValidationReport::valid()),
            Err(errors) => {
                let state: FieldState = errors
                    .field_errors()
                    .into_iter()
                    .map(|(field, field_errors)| {
                        let messages = field_errors
                            .iter()
                            .map(|e| {
                                e.message
                                    .as_ref()
                                    .map_or_else(|| e.code.to_string(), |m| m.to_string())
                            })
                            .collect();
                        (field_name(&field), messages)
                    })
                    .collect();
                Ok(ValidationReport::invalid(state))
            }
        }
    }

    fn mark_persisted(&mut self, version: u64) {
        self.version = Some(version);
        self.is_new = false;
    }
}

impl fmt::Debug for KvSecretDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Keys only; values are secret material.
        f.debug_struct("KvSecretDraft")
            .field("backend", &self.backend)
            .field("path", &self.path)
            .field("keys", &self.secret_data.keys().collect::<Vec<_>>())
            .field("cas", &self.cas)
            .field("version", &self.version)
            .field("is_new", &self.is_new)
            .finish()
    }
}

// Form field names are camelCase on the wire.
fn field_name(field: &str) -> String {
    match field {
        "secret_data" => "secretData".to_string(),
        other => other.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn path_is_well_formed(path: &str) -> std::result::Result<(), ValidationError> {
    if path.len() > MAX_PATH_LENGTH {
        return Err(ValidationError::new("too_long").with_message(Cow::from(format!(
            "Path can't be longer than {} characters.",
            MAX_PATH_LENGTH
        ))));
    }
    if path.ends_with('/') {
        return Err(ValidationError::new("trailing_slash")
            .with_message(Cow::from("Path can't end in forward slash '/'.")));
    }
    Ok(())
}

fn keys_are_not_blank(data: &Map<String, Value>) -> std::result::Result<(), ValidationError> {
    if data.keys().any(|key| key.trim().is_empty()) {
        return Err(ValidationError::new("blank_key")
            .with_message(Cow::from("Secret keys can't be blank.")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn report(draft: &KvSecretDraft) -> ValidationReport {
        SecretDraft::validate(draft).unwrap()
    }

    #[test]
    fn test_new_draft_is_new() {
        let draft = KvSecretDraft::new("kv", "app/db-creds");
        assert!(draft.is_new());
        assert_eq!(draft.version(), None);
    }

    #[test]
    fn test_valid_draft() {
        let draft = KvSecretDraft::new("kv", "app/db-creds")
            .with_data(json!({ "username": "admin" }))
            .unwrap();
        assert_eq!(report(&draft), ValidationReport::valid());
    }

    #[test]
    fn test_blank_path_is_invalid() {
        let result = report(&KvSecretDraft::new("kv", ""));
        assert!(!result.is_valid);
        assert_eq!(result.state["path"], vec!["Path can't be blank.".to_string()]);
        assert_eq!(result.invalid_form_message.as_deref(), Some("There is an error with this form."));
    }

    #[test]
    fn test_trailing_slash_is_invalid() {
        let result = report(&KvSecretDraft::new("kv", "app/"));
        assert!(!result.is_valid);
        assert_eq!(result.state["path"], vec!["Path can't end in forward slash '/'.".to_string()]);
    }

    #[test]
    fn test_overlong_path_is_invalid() {
        let result = report(&KvSecretDraft::new("kv", "a".repeat(MAX_PATH_LENGTH + 1)));
        assert!(!result.is_valid);
        assert!(result.state["path"][0].starts_with("Path can't be longer than"));
    }

    #[test]
    fn test_multiple_errors_are_counted() {
        let mut draft = KvSecretDraft::new("kv", "app/");
        draft.insert(" ", json!("x"));
        let result = report(&draft);
        assert_eq!(result.state.len(), 2);
        assert!(result.state.contains_key("secretData"));
        assert_eq!(
            result.invalid_form_message.as_deref(),
            Some("There are 2 errors with this form.")
        );
    }

    #[test]
    fn test_non_object_data_is_rejected() {
        let result = KvSecretDraft::new("kv", "app").with_data(json!(["a", "b"]));
        assert!(matches!(result, Err(ConsoleError::Validation { .. })));
    }

    #[test]
    fn test_mark_persisted() {
        let mut draft = KvSecretDraft::new("kv", "app").with_cas(3);
        draft.mark_persisted(4);
        assert!(!draft.is_new());
        assert_eq!(draft.version(), Some(4));
    }

    #[test]
    fn test_debug_hides_values() {
        let draft = KvSecretDraft::new("kv", "app")
            .with_data(json!({ "password": "hunter2" }))
            .unwrap();
        let debug = format!("{:?}", draft);
        assert!(debug.contains("password"));
        assert!(!debug.contains("hunter2"));
    }
}
