//! Persistence collaborator: writes a draft as a new secret version.
//!
//! The workflow depends only on [`SecretPersistence`]. [`VaultKvPersistence`]
//! is the KV v2 implementation, talking to Vault over HTTP the same way the
//! console's data adapter does.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn, Instrument};

use super::draft::{KvSecretDraft, SecretDraft};
use super::error::{PersistenceError, WrapInfo};
use crate::config::VaultConfig;
use crate::control_group::CONTROL_GROUP_SENTINEL;
use crate::errors::Result;

/// What the backend reports for an accepted write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedVersion {
    pub version: u64,
}

/// Saves drafts. Implementations must not retry on their own: a failed save is
/// surfaced to the user, who decides whether to resubmit.
#[async_trait]
pub trait SecretPersistence<D: SecretDraft>: Send + Sync {
    async fn save(&self, draft: &D) -> std::result::Result<SavedVersion, PersistenceError>;
}

#[derive(Debug, Deserialize)]
struct KvWriteResponse {
    data: Option<KvWriteData>,
    wrap_info: Option<WrapInfo>,
}

#[derive(Debug, Deserialize)]
struct KvWriteData {
    version: u64,
}

#[derive(Debug, Deserialize)]
struct VaultErrorBody {
    #[serde(default)]
    errors: Vec<String>,
}

/// KV v2 writer for `POST /v1/{mount}/data/{path}`.
#[derive(Debug, Clone)]
pub struct VaultKvPersistence {
    client: Client,
    config: VaultConfig,
}

impl VaultKvPersistence {
    pub fn new(config: VaultConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self { client, config })
    }

    /// `{addr}/v1/{mount}/data/{path}`, each path segment percent-encoded so
    /// `#`, `?` and spaces stay part of the secret name.
    fn data_url(&self, draft: &KvSecretDraft) -> std::result::Result<Url, PersistenceError> {
        let mut url = Url::parse(&self.config.address).map_err(|e| {
            PersistenceError::new(format!("Invalid Vault address '{}': {}", self.config.address, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                PersistenceError::new(format!(
                    "Vault address '{}' cannot carry a path",
                    self.config.address
                ))
            })?
            .pop_if_empty()
            .push("v1")
            .extend(draft.backend().split('/').filter(|s| !s.is_empty()))
            .push("data")
            .extend(draft.path().trim_start_matches('/').split('/'));
        Ok(url)
    }

    fn request_body(draft: &KvSecretDraft) -> Value {
        let mut options = Map::new();
        if let Some(cas) = draft.cas() {
            options.insert("cas".to_string(), json!(cas));
        }
        json!({ "data": draft.secret_data(), "options": options })
    }

    async fn write(
        &self,
        draft: &KvSecretDraft,
    ) -> std::result::Result<SavedVersion, PersistenceError> {
        let url = self.data_url(draft)?;
        debug!(url = %url, cas = ?draft.cas(), "Writing new secret version");

        let mut request = self.client.post(url).json(&Self::request_body(draft));
        if let Some(token) = &self.config.token {
            request = request.header("X-Vault-Token", token.expose_secret());
        }
        if let Some(namespace) = &self.config.namespace {
            request = request.header("X-Vault-Namespace", namespace);
        }

        let response =
            request.send().await.map_err(|e| PersistenceError::new(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PersistenceError::new(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            return Err(Self::error_from_body(status, &body));
        }

        let parsed: KvWriteResponse = serde_json::from_str(&body)
            .map_err(|e| PersistenceError::new(format!("Unexpected response from Vault: {}", e)))?;

        match (parsed.data, parsed.wrap_info) {
            (Some(data), _) => Ok(SavedVersion { version: data.version }),
            (None, Some(wrap_info)) => {
                warn!(
                    accessor = %wrap_info.accessor,
                    creation_path = %wrap_info.creation_path,
                    "Write held by control group"
                );
                Err(PersistenceError::control_group(CONTROL_GROUP_SENTINEL, wrap_info))
            }
            (None, None) => Err(PersistenceError::new("Vault response did not include a version")),
        }
    }

    fn error_from_body(status: StatusCode, body: &str) -> PersistenceError {
        let errors = serde_json::from_str::<VaultErrorBody>(body)
            .map(|parsed| parsed.errors)
            .unwrap_or_else(|_| {
                if body.trim().is_empty() {
                    Vec::new()
                } else {
                    vec![body.trim().to_string()]
                }
            });
        PersistenceError::from_response(status.as_u16(), errors)
    }
}

#[async_trait]
impl SecretPersistence<KvSecretDraft> for VaultKvPersistence {
    async fn save(
        &self,
        draft: &KvSecretDraft,
    ) -> std::result::Result<SavedVersion, PersistenceError> {
        let span = crate::backend_span!("save", draft.path());
        self.write(draft).instrument(span).await
    }
}
