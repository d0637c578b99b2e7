//! Secret records and their persistence.
//!
//! - [`draft`]: the record being submitted ([`SecretDraft`], [`KvSecretDraft`])
//! - [`persistence`]: the save collaborator ([`SecretPersistence`]) and its
//!   Vault KV v2 implementation
//! - [`error`]: the error a failed save produces, including control-group wrap
//!   info, and the humanizer that turns it into display text
//! - [`types`]: [`SecretString`], a redacting wrapper for tokens
//!
//! # Security Considerations
//!
//! - Secret values are never logged; drafts print their keys only
//! - Tokens are held in [`SecretString`] and zeroed on drop

pub mod draft;
pub mod error;
pub mod persistence;
pub mod types;

pub use draft::{FieldState, KvSecretDraft, SecretDraft, ValidationReport, MAX_PATH_LENGTH};
pub use error::{
    DefaultErrorHumanizer, ErrorHumanizer, PersistenceError, WrapInfo, FALLBACK_ERROR_MESSAGE,
};
pub use persistence::{SavedVersion, SecretPersistence, VaultKvPersistence};
pub use types::SecretString;
