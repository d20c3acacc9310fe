//! JSON-file session store.
//!
//! Layout:
//!
//! ```text
//! <data_dir>/collab-exercises/session.json
//! { "token": "<bearer>", "user": { "name": ..., "email": ..., ... } }
//! ```

#[cfg(test)]
#[path = "file_test.rs"]
mod tests;

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{Credential, SessionError, SessionStore, SessionUser, StoredSession};

const APP_DIR: &str = "collab-exercises";
const SESSION_FILE: &str = "session.json";

/// Session store backed by a single JSON file.
#[derive(Clone, Debug)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Platform data directory location, e.g. `~/.local/share/collab-exercises/session.json`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|base| base.join(APP_DIR).join(SESSION_FILE))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_stored(&self) -> Result<StoredSession, SessionError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(StoredSession::default()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(StoredSession::default());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    fn write_stored(&self, stored: &StoredSession) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let rendered = serde_json::to_string_pretty(stored)?;
        let mut file = open_private(&self.path)?;
        file.write_all(rendered.as_bytes())?;
        Ok(())
    }
}

/// Open for writing, owner-only from creation. A file left over with wider
/// permissions is narrowed before anything is written to it.
#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
    let file = OpenOptions::new().write(true).create(true).truncate(true).mode(0o600).open(path)?;
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().write(true).create(true).truncate(true).open(path)
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Credential>, SessionError> {
        Ok(self.read_stored()?.credential())
    }

    fn save(&self, credential: &Credential) -> Result<(), SessionError> {
        let stored = StoredSession { token: Some(credential.token.clone()), user: Some(credential.user.clone()) };
        self.write_stored(&stored)?;
        debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    fn update_user(&self, user: &SessionUser) -> Result<(), SessionError> {
        let mut stored = self.read_stored()?;
        stored.user = Some(user.clone());
        self.write_stored(&stored)
    }

    fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "session cleared");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
