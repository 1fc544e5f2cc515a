//! Session identity storage.
//!
//! # Design
//! The identity is a user id plus a display name, trusted until the server
//! rejects it. It lives behind `SessionStore` so the client never touches a
//! global: hosts inject a `MemorySession` for a single process or a
//! `FileSession` to keep the identity across restarts.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::warn;

use crate::error::SessionError;

/// The locally held stand-in for an authentication token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub username: String,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
        }
    }
}

/// Read/write/clear access to the session identity.
pub trait SessionStore: Send + Sync {
    fn identity(&self) -> Option<Identity>;

    fn remember(&self, identity: &Identity) -> Result<(), SessionError>;

    /// Forget both the user id and the display name.
    fn clear(&self) -> Result<(), SessionError>;

    fn user_id(&self) -> Option<String> {
        self.identity().map(|identity| identity.user_id)
    }

    fn username(&self) -> Option<String> {
        self.identity().map(|identity| identity.username)
    }
}

/// Process-local session store.
#[derive(Debug, Default)]
pub struct MemorySession {
    identity: RwLock<Option<Identity>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identity(identity: Identity) -> Self {
        Self {
            identity: RwLock::new(Some(identity)),
        }
    }
}

impl SessionStore for MemorySession {
    fn identity(&self) -> Option<Identity> {
        self.identity
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn remember(&self, identity: &Identity) -> Result<(), SessionError> {
        *self.identity.write().unwrap_or_else(PoisonError::into_inner) = Some(identity.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.identity.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Session store persisted as a small JSON file.
///
/// A missing file means no identity. A file that cannot be read or parsed
/// is logged and treated the same way.
#[derive(Debug, Clone)]
pub struct FileSession {
    path: PathBuf,
}

impl FileSession {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<local data dir>/photo-client/session.json`, or the working
    /// directory when the platform has no local data dir.
    pub fn default_location() -> Self {
        let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("photo-client/session.json");
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSession {
    fn identity(&self) -> Option<Identity> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cannot read session file");
                return None;
            }
        };
        match serde_json::from_str(&json) {
            Ok(identity) => Some(identity),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring corrupt session file");
                None
            }
        }
    }

    /// Written to a sibling temp file and renamed into place, so readers
    /// see either the old identity or the new one.
    fn remember(&self, identity: &Identity) -> Result<(), SessionError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;
        let json = serde_json::to_vec_pretty(identity)?;
        let mut staged = NamedTempFile::new_in(dir)?;
        staged.write_all(&json)?;
        staged.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_session_lifecycle() {
        let session = MemorySession::new();
        assert!(session.identity().is_none());

        session.remember(&Identity::new("7", "ansel")).unwrap();
        assert_eq!(session.user_id().as_deref(), Some("7"));
        assert_eq!(session.username().as_deref(), Some("ansel"));

        session.clear().unwrap();
        assert!(session.user_id().is_none());
        assert!(session.username().is_none());
    }

    #[test]
    fn file_session_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/session.json");

        FileSession::new(&path)
            .remember(&Identity::new("12", "dorothea"))
            .unwrap();

        let reopened = FileSession::new(&path);
        assert_eq!(reopened.identity(), Some(Identity::new("12", "dorothea")));
    }

    #[test]
    fn file_session_uses_storage_key_names() {
        let dir = tempfile::tempdir().unwrap();
        let session = FileSession::new(dir.path().join("session.json"));
        session.remember(&Identity::new("3", "vivian")).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(session.path()).unwrap()).unwrap();
        assert_eq!(raw["userId"], "3");
        assert_eq!(raw["username"], "vivian");
    }

    #[test]
    fn file_session_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let session = FileSession::new(dir.path().join("absent.json"));
        assert!(session.identity().is_none());
        assert!(session.clear().is_ok(), "clearing nothing is not an error");
    }

    #[test]
    fn file_session_corrupt_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();
        assert!(FileSession::new(&path).identity().is_none());
    }

    #[test]
    fn file_session_clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let session = FileSession::new(dir.path().join("session.json"));
        session.remember(&Identity::new("1", "robert")).unwrap();
        session.clear().unwrap();
        assert!(!session.path().exists());
        assert!(session.identity().is_none());
    }

    #[test]
    fn file_session_readers_never_see_a_partial_write() {
        let dir = tempfile::tempdir().unwrap();
        let session = FileSession::new(dir.path().join("session.json"));
        session.remember(&Identity::new("1", "first")).unwrap();

        std::thread::scope(|scope| {
            let writer = scope.spawn(|| {
                for n in 0..200 {
                    let name = "x".repeat(n % 64);
                    session.remember(&Identity::new(n.to_string(), name)).unwrap();
                }
            });
            while !writer.is_finished() {
                assert!(session.identity().is_some(), "identity vanished mid-write");
            }
        });

        let leftovers: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1, "only session.json remains");
    }
}
