//! In-process control-group token store.
//!
//! Tokens are keyed by accessor and outlive any single form session: the user
//! may come back from the control-group view once the request is approved and
//! pick the token up there. The store never replaces a token with one that was
//! created earlier for the same accessor.

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, warn};

use super::{ControlGroupLog, ControlGroupService};
use crate::secrets::{PersistenceError, SecretString, WrapInfo};

/// A stored control-group token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlGroupToken {
    pub accessor: String,
    pub token: SecretString,
    pub creation_path: String,
    pub creation_time: DateTime<Utc>,
    pub ttl: u64,
}

impl From<&WrapInfo> for ControlGroupToken {
    fn from(wrap: &WrapInfo) -> Self {
        Self {
            accessor: wrap.accessor.clone(),
            token: wrap.token.clone(),
            creation_path: wrap.creation_path.clone(),
            creation_time: wrap.creation_time,
            ttl: wrap.ttl,
        }
    }
}

impl ControlGroupToken {
    /// When the wrapping token lapses. `None` for a TTL too large to represent,
    /// which is treated as never expiring.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let ttl = i64::try_from(self.ttl).ok().and_then(TimeDelta::try_seconds)?;
        self.creation_time.checked_add_signed(ttl)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.ttl > 0 && self.expires_at().is_some_and(|expires_at| now >= expires_at)
    }
}

/// [`ControlGroupService`] backed by a concurrent map.
pub struct ControlGroupTokenStore {
    tokens: DashMap<String, ControlGroupToken>,
    ui_base_path: String,
}

impl ControlGroupTokenStore {
    /// `ui_base_path` prefixes the authorization link, e.g. `/ui`.
    pub fn new(ui_base_path: impl Into<String>) -> Self {
        Self { tokens: DashMap::new(), ui_base_path: ui_base_path.into() }
    }

    /// Insert `token` unless a fresher one is already stored for its accessor.
    /// Returns whether the store changed.
    pub fn store(&self, token: ControlGroupToken) -> bool {
        match self.tokens.entry(token.accessor.clone()) {
            Entry::Occupied(mut existing) => {
                if token.creation_time < existing.get().creation_time {
                    debug!(accessor = %token.accessor, "Ignoring older control group token");
                    return false;
                }
                existing.insert(token);
                true
            }
            Entry::Vacant(slot) => {
                slot.insert(token);
                true
            }
        }
    }

    pub fn token_for_accessor(&self, accessor: &str) -> Option<ControlGroupToken> {
        self.tokens.get(accessor).map(|entry| entry.value().clone())
    }

    /// Drop the token once the held request has been resumed or abandoned.
    pub fn delete_token(&self, accessor: &str) -> bool {
        self.tokens.remove(accessor).is_some()
    }

    /// Drop tokens whose wrapping TTL has elapsed. Returns how many were removed.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let before = self.tokens.len();
        self.tokens.retain(|_, token| !token.is_expired(now));
        before - self.tokens.len()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    fn authorization_url(&self, accessor: &str) -> String {
        format!(
            "{}/vault/access/control-groups/{}",
            self.ui_base_path.trim_end_matches('/'),
            accessor
        )
    }
}

impl Default for ControlGroupTokenStore {
    fn default() -> Self {
        Self::new("/ui")
    }
}

impl ControlGroupService for ControlGroupTokenStore {
    fn save_token_from_error(&self, error: &PersistenceError) {
        let purged = self.purge_expired(Utc::now());
        if purged > 0 {
            debug!(purged, "Dropped expired control group tokens");
        }

        match &error.wrap_info {
            Some(wrap) => {
                if self.store(ControlGroupToken::from(wrap)) {
                    debug!(accessor = %wrap.accessor, "Stored control group token");
                }
            }
            None => warn!("Control group error carried no wrap info; nothing to store"),
        }
    }

    fn log_from_error(&self, error: &PersistenceError) -> ControlGroupLog {
        let Some(wrap) = &error.wrap_info else {
            return ControlGroupLog { content: error.message.clone() };
        };

        let url = self.authorization_url(&wrap.accessor);
        let lines = [
            format!("A Control Group was encountered at {}.", wrap.creation_path),
            format!("The Control Group Token is {}.", wrap.token.expose_secret()),
            format!("The Accessor is {}.", wrap.accessor),
            format!("Visit {} to see details of the Control Group or to authorize.", url),
        ];
        ControlGroupLog { content: lines.join("\n") }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control_group::CONTROL_GROUP_SENTINEL;
    use chrono::TimeZone;

    fn wrap(accessor: &str, token: &str, at: DateTime<Utc>) -> WrapInfo {
        WrapInfo {
            token: SecretString::new(token),
            accessor: accessor.to_string(),
            ttl: 3600,
            creation_time: at,
            creation_path: "kv/data/app/db-creds".to_string(),
        }
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_save_token_from_error() {
        let store = ControlGroupTokenStore::default();
        let error = PersistenceError::control_group(CONTROL_GROUP_SENTINEL, wrap("acc", "t1", at(10)));

        store.save_token_from_error(&error);

        let stored = store.token_for_accessor("acc").unwrap();
        assert_eq!(stored.token.expose_secret(), "t1");
        assert_eq!(stored.creation_path, "kv/data/app/db-creds");
    }

    #[test]
    fn test_saving_same_error_twice_is_harmless() {
        let store = ControlGroupTokenStore::default();
        let error = PersistenceError::control_group(CONTROL_GROUP_SENTINEL, wrap("acc", "t1", at(10)));

        store.save_token_from_error(&error);
        store.save_token_from_error(&error);

        assert_eq!(store.len(), 1);
        assert_eq!(store.token_for_accessor("acc").unwrap().token.expose_secret(), "t1");
    }

    #[test]
    fn test_older_token_never_replaces_fresher() {
        let store = ControlGroupTokenStore::default();
        assert!(store.store(ControlGroupToken::from(&wrap("acc", "fresh", at(12)))));
        assert!(!store.store(ControlGroupToken::from(&wrap("acc", "stale", at(9)))));
        assert_eq!(store.token_for_accessor("acc").unwrap().token.expose_secret(), "fresh");

        assert!(store.store(ControlGroupToken::from(&wrap("acc", "newer", at(13)))));
        assert_eq!(store.token_for_accessor("acc").unwrap().token.expose_secret(), "newer");
    }

    #[test]
    fn test_missing_wrap_info_stores_nothing() {
        let store = ControlGroupTokenStore::default();
        store.save_token_from_error(&PersistenceError::new(CONTROL_GROUP_SENTINEL));
        assert!(store.is_empty());
    }

    #[test]
    fn test_log_from_error_content() {
        let store = ControlGroupTokenStore::new("/ui/");
        let error = PersistenceError::control_group(CONTROL_GROUP_SENTINEL, wrap("acc-9", "t9", at(10)));

        let log = store.log_from_error(&error);

        assert_eq!(
            log.content,
            "A Control Group was encountered at kv/data/app/db-creds.\n\
             The Control Group Token is t9.\n\
             The Accessor is acc-9.\n\
             Visit /ui/vault/access/control-groups/acc-9 to see details of the Control Group or to authorize."
        );
    }

    #[test]
    fn test_log_from_error_without_wrap_info_uses_message() {
        let store = ControlGroupTokenStore::default();
        let log = store.log_from_error(&PersistenceError::new(CONTROL_GROUP_SENTINEL));
        assert_eq!(log.content, CONTROL_GROUP_SENTINEL);
    }

    #[test]
    fn test_huge_ttl_never_expires() {
        let store = ControlGroupTokenStore::default();
        let mut token = ControlGroupToken::from(&wrap("acc", "t", at(1)));
        token.ttl = 10_000_000_000_000_000;
        assert_eq!(token.expires_at(), None);
        store.store(token);

        token = ControlGroupToken::from(&wrap("max", "t", at(1)));
        token.ttl = u64::MAX;
        assert!(!token.is_expired(Utc::now()));
        store.store(token);

        assert_eq!(store.purge_expired(Utc::now()), 0);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_saving_a_token_purges_expired_ones() {
        let store = ControlGroupTokenStore::default();
        store.store(ControlGroupToken::from(&wrap("old", "t", at(1))));

        let mut fresh = wrap("new", "t2", Utc::now());
        fresh.ttl = 86400;
        store.save_token_from_error(&PersistenceError::control_group(CONTROL_GROUP_SENTINEL, fresh));

        assert!(store.token_for_accessor("old").is_none());
        assert!(store.token_for_accessor("new").is_some());
    }

    #[test]
    fn test_delete_and_purge() {
        let store = ControlGroupTokenStore::default();
        store.store(ControlGroupToken::from(&wrap("a", "t", at(1))));
        store.store(ControlGroupToken::from(&wrap("b", "t", at(10))));

        assert!(store.delete_token("a"));
        assert!(!store.delete_token("a"));

        assert_eq!(store.purge_expired(at(10)), 0);
        assert_eq!(store.purge_expired(at(11)), 1);
        assert!(store.is_empty());
    }
}
