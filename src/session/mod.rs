//! Session credential: the bearer token and cached user of the logged-in
//! account.
//!
//! DESIGN
//! ======
//! The credential is persisted under two well-known keys, `token` and
//! `user`, mirroring the two local-storage slots of the browser client.
//! Stores are injected into the gateway as `Arc<dyn SessionStore>` so the
//! request path never touches ambient global state and tests can swap in
//! `MemorySessionStore`.
//!
//! A credential exists only while `token` is present. The `user` slot can
//! be rewritten on its own (profile updates) without touching the token.

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

pub mod file;

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use file::FileSessionStore;

/// Key holding the bearer token.
pub const TOKEN_KEY: &str = "token";
/// Key holding the cached user record.
pub const USER_KEY: &str = "user";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("not logged in; run `collab-exercises login` first")]
    NotAuthenticated,
    #[error("session storage failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("session data is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("session store lock poisoned")]
    Poisoned,
}

impl crate::error::ErrorCode for SessionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotAuthenticated => "E_NOT_AUTHENTICATED",
            Self::Io(_) => "E_SESSION_IO",
            Self::Corrupt(_) => "E_SESSION_CORRUPT",
            Self::Poisoned => "E_SESSION_POISONED",
        }
    }
}

/// Denormalized user snapshot cached next to the token.
///
/// Only `name` and `email` are relied upon; everything else the server sent
/// is kept in `extra` so a profile refresh does not drop fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    #[serde(default, deserialize_with = "crate::types::null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "crate::types::null_default")]
    pub email: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SessionUser {
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self { name: name.into(), email: email.into(), extra: Map::new() }
    }

    /// Server-side identifier, accepting both `_id` and `id`.
    #[must_use]
    pub fn id(&self) -> Option<String> {
        ["_id", "id"].iter().find_map(|key| match self.extra.get(*key)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }
}

/// The active login: opaque bearer token plus cached user.
#[derive(Debug, Clone, PartialEq)]
pub struct Credential {
    pub token: String,
    pub user: SessionUser,
}

/// On-disk/in-memory layout of the two session keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct StoredSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUser>,
}

impl StoredSession {
    pub(crate) fn credential(&self) -> Option<Credential> {
        let token = self.token.as_deref().filter(|t| !t.is_empty())?;
        Some(Credential { token: token.to_owned(), user: self.user.clone().unwrap_or_default() })
    }
}

// =============================================================================
// STORE TRAIT
// =============================================================================

/// Persistence for the single active credential.
pub trait SessionStore: Send + Sync {
    /// Current credential, or `None` when logged out.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn load(&self) -> Result<Option<Credential>, SessionError>;

    /// Replace any existing credential.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn save(&self, credential: &Credential) -> Result<(), SessionError>;

    /// Rewrite the cached user, leaving the token untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn update_user(&self, user: &SessionUser) -> Result<(), SessionError>;

    /// Forget both keys. Clearing an empty store succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn clear(&self) -> Result<(), SessionError>;

    /// Bearer token of the current credential.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn token(&self) -> Result<Option<String>, SessionError> {
        Ok(self.load()?.map(|credential| credential.token))
    }
}

/// Load the credential or fail with `NotAuthenticated`.
///
/// # Errors
///
/// Returns `SessionError::NotAuthenticated` when no token is stored, or the
/// store's own error if it cannot be read.
pub fn require_credential(store: &dyn SessionStore) -> Result<Credential, SessionError> {
    store.load()?.ok_or(SessionError::NotAuthenticated)
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// Process-local store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: Mutex<StoredSession>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_credential(credential: Credential) -> Self {
        let stored = StoredSession { token: Some(credential.token), user: Some(credential.user) };
        Self { inner: Mutex::new(stored) }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Credential>, SessionError> {
        let inner = self.inner.lock().map_err(|_| SessionError::Poisoned)?;
        Ok(inner.credential())
    }

    fn save(&self, credential: &Credential) -> Result<(), SessionError> {
        let mut inner = self.inner.lock().map_err(|_| SessionError::Poisoned)?;
        inner.token = Some(credential.token.clone());
        inner.user = Some(credential.user.clone());
        Ok(())
    }

    fn update_user(&self, user: &SessionUser) -> Result<(), SessionError> {
        let mut inner = self.inner.lock().map_err(|_| SessionError::Poisoned)?;
        inner.user = Some(user.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        let mut inner = self.inner.lock().map_err(|_| SessionError::Poisoned)?;
        *inner = StoredSession::default();
        Ok(())
    }
}
