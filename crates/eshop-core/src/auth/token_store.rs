use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::storage::{StorageBackend, AUTH_TOKEN_KEY, TOKEN_EXPIRY_KEY};

/// The opaque bearer token issued at sign-in, with its optional expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub value: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            expires_at: None,
        }
    }

    pub fn with_expiry(value: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            expires_at: Some(expires_at),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at.map(|at| Utc::now() > at).unwrap_or(false)
    }

    /// First characters of the token, safe to put in logs
    pub fn preview(&self) -> String {
        let shown: String = self.value.chars().take(10).collect();
        format!("{shown}...")
    }
}

/// Holds the current credential in a durable and a tab-scoped backend.
///
/// Both backends are written on `save` and cleared on `clear`. A read
/// that only finds the credential in the tab-scoped backend copies it
/// back into the durable one. Backend failures are logged and never
/// surfaced: the store degrades to whichever backend still works.
#[derive(Clone)]
pub struct TokenStore {
    durable: Arc<dyn StorageBackend>,
    tab: Arc<dyn StorageBackend>,
}

impl TokenStore {
    pub fn new(durable: Arc<dyn StorageBackend>, tab: Arc<dyn StorageBackend>) -> Self {
        Self { durable, tab }
    }

    /// The durable backend, shared with other client-side state
    pub fn durable(&self) -> &Arc<dyn StorageBackend> {
        &self.durable
    }

    pub fn save(&self, credential: &Credential) {
        for backend in [&self.durable, &self.tab] {
            Self::write(backend.as_ref(), credential);
        }
        debug!(token = %credential.preview(), "Credential saved");
    }

    pub fn read(&self) -> Option<Credential> {
        if let Some(credential) = Self::load(self.durable.as_ref()) {
            return Some(credential);
        }

        let credential = Self::load(self.tab.as_ref())?;
        debug!("Credential found only in tab storage, repairing durable storage");
        Self::write(self.durable.as_ref(), &credential);
        Some(credential)
    }

    pub fn clear(&self) {
        for backend in [&self.durable, &self.tab] {
            for key in [AUTH_TOKEN_KEY, TOKEN_EXPIRY_KEY] {
                if let Err(e) = backend.remove(key) {
                    warn!(backend = backend.name(), key, error = %e, "Failed to clear credential");
                }
            }
        }
        debug!("Credential cleared");
    }

    fn write(backend: &dyn StorageBackend, credential: &Credential) {
        if let Err(e) = backend.set(AUTH_TOKEN_KEY, &credential.value) {
            warn!(backend = backend.name(), error = %e, "Failed to store credential");
            return;
        }
        let expiry = match credential.expires_at {
            Some(at) => backend.set(TOKEN_EXPIRY_KEY, &at.to_rfc3339()),
            None => backend.remove(TOKEN_EXPIRY_KEY),
        };
        if let Err(e) = expiry {
            warn!(backend = backend.name(), error = %e, "Failed to store credential expiry");
        }
    }

    fn load(backend: &dyn StorageBackend) -> Option<Credential> {
        let value = match backend.get(AUTH_TOKEN_KEY) {
            Ok(value) => value?,
            Err(e) => {
                warn!(backend = backend.name(), error = %e, "Failed to read credential");
                return None;
            }
        };
        if !is_usable(&value) {
            return None;
        }

        let expires_at = match backend.get(TOKEN_EXPIRY_KEY) {
            Ok(Some(raw)) if is_usable(&raw) => match DateTime::parse_from_rfc3339(&raw) {
                Ok(at) => Some(at.with_timezone(&Utc)),
                Err(e) => {
                    warn!(backend = backend.name(), error = %e, "Ignoring unparsable token expiry");
                    None
                }
            },
            Ok(_) => None,
            Err(e) => {
                warn!(backend = backend.name(), error = %e, "Failed to read token expiry");
                None
            }
        };

        Some(Credential { value, expires_at })
    }
}

/// Browsers stringify a stored `null` token, so treat that like absence
fn is_usable(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty() && trimmed != "null" && trimmed != "undefined"
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::storage::MemoryBackend;

    fn store() -> (TokenStore, Arc<MemoryBackend>, Arc<MemoryBackend>) {
        let durable = Arc::new(MemoryBackend::new());
        let tab = Arc::new(MemoryBackend::new());
        (TokenStore::new(durable.clone(), tab.clone()), durable, tab)
    }

    #[test]
    fn test_save_then_read() {
        let (store, durable, tab) = store();
        let credential = Credential::new("token-1");
        store.save(&credential);

        assert_eq!(store.read(), Some(credential));
        assert_eq!(durable.get(AUTH_TOKEN_KEY).unwrap().as_deref(), Some("token-1"));
        assert_eq!(tab.get(AUTH_TOKEN_KEY).unwrap().as_deref(), Some("token-1"));
    }

    #[test]
    fn test_save_keeps_expiry() {
        let (store, _, _) = store();
        let at = Utc::now() + Duration::hours(24);
        let credential = Credential::with_expiry("token-1", at);
        store.save(&credential);

        let read = store.read().unwrap();
        assert_eq!(read.value, "token-1");
        // RFC 3339 keeps sub-second precision
        assert_eq!(read.expires_at, Some(at));
    }

    #[test]
    fn test_replacing_credential_drops_old_expiry() {
        let (store, _, _) = store();
        store.save(&Credential::with_expiry("old", Utc::now() + Duration::hours(1)));
        store.save(&Credential::new("new"));

        assert_eq!(store.read(), Some(Credential::new("new")));
    }

    #[test]
    fn test_clear_then_read_is_absent() {
        let (store, durable, tab) = store();
        store.save(&Credential::new("token-1"));
        store.clear();
        assert_eq!(store.read(), None);

        // Clearing empty storage is fine too
        store.clear();
        assert_eq!(store.read(), None);
        assert_eq!(durable.get(AUTH_TOKEN_KEY).unwrap(), None);
        assert_eq!(tab.get(AUTH_TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_read_repairs_durable_from_tab() {
        let (store, durable, tab) = store();
        tab.set(AUTH_TOKEN_KEY, "tab-token").unwrap();

        assert_eq!(store.read(), Some(Credential::new("tab-token")));
        assert_eq!(durable.get(AUTH_TOKEN_KEY).unwrap().as_deref(), Some("tab-token"));

        // Second read is served by the durable backend without any writes
        let writes = durable.write_count();
        assert_eq!(store.read(), Some(Credential::new("tab-token")));
        assert_eq!(durable.write_count(), writes);
    }

    #[test]
    fn test_null_and_empty_values_are_absent() {
        let (store, durable, tab) = store();
        durable.set(AUTH_TOKEN_KEY, "null").unwrap();
        assert_eq!(store.read(), None);

        durable.set(AUTH_TOKEN_KEY, "").unwrap();
        tab.set(AUTH_TOKEN_KEY, "tab-token").unwrap();
        assert_eq!(store.read(), Some(Credential::new("tab-token")));
        assert_eq!(durable.get(AUTH_TOKEN_KEY).unwrap().as_deref(), Some("tab-token"));
    }

    #[test]
    fn test_save_degrades_when_durable_unavailable() {
        let (store, durable, tab) = store();
        durable.set_unavailable(true);
        store.save(&Credential::new("token-1"));

        assert_eq!(tab.get(AUTH_TOKEN_KEY).unwrap().as_deref(), Some("token-1"));
        assert_eq!(store.read(), Some(Credential::new("token-1")));
    }

    #[test]
    fn test_unparsable_expiry_is_ignored() {
        let (store, durable, _) = store();
        durable.set(AUTH_TOKEN_KEY, "token-1").unwrap();
        durable.set(TOKEN_EXPIRY_KEY, "tomorrow").unwrap();

        assert_eq!(store.read(), Some(Credential::new("token-1")));
    }

    #[test]
    fn test_credential_expiry() {
        assert!(!Credential::new("t").is_expired());
        assert!(Credential::with_expiry("t", Utc::now() - Duration::seconds(1)).is_expired());
        assert!(!Credential::with_expiry("t", Utc::now() + Duration::minutes(5)).is_expired());
        assert_eq!(Credential::new("abcdefghijklmnop").preview(), "abcdefghij...");
    }
}
