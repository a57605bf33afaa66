//! Local persistence of the session cache
//!
//! The cached session only lets a restarted client paint the last known
//! user immediately. The server cookie stays authoritative; see
//! [`crate::store::AuthStore::needs_revalidation`].

use crate::error::StorageError;
use crate::session::Session;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Where the store keeps its cached session
pub trait SessionStorage: Send + Sync {
    /// Read the cached session, `None` when nothing was stored
    fn load(&self) -> Result<Option<Session>, StorageError>;

    /// Replace the cached session
    fn save(&self, session: &Session) -> Result<(), StorageError>;
}

/// In-process storage, lost on exit
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slot: Mutex<Option<Session>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a session already cached, as after a previous run
    pub fn with_session(session: Session) -> Self {
        Self {
            slot: Mutex::new(Some(session)),
        }
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self) -> Result<Option<Session>, StorageError> {
        Ok(self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, session: &Session) -> Result<(), StorageError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }
}

/// JSON file named after the store namespace
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Store `<dir>/<namespace>.json`
    pub fn in_dir(dir: impl AsRef<Path>, namespace: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{namespace}.json")),
        }
    }

    /// Store under the platform data directory
    pub fn platform(namespace: &str) -> Result<Self, StorageError> {
        let dirs = ProjectDirs::from("dev", "Portal", "portal")
            .ok_or(StorageError::PlatformDirsNotFound)?;
        Ok(Self::in_dir(dirs.data_dir(), namespace))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SessionStorage for FileStorage {
    fn load(&self) -> Result<Option<Session>, StorageError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(self.io_error(err)),
        };
        debug!(path = %self.path.display(), "loaded cached session");
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn save(&self, session: &Session) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let content = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, content).map_err(|e| self.io_error(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_http::UserSummary;
    use tempfile::TempDir;

    fn signed_in() -> Session {
        let mut session = Session::default();
        session.authenticate(UserSummary {
            email: "a@b.com".to_string(),
            role: "USER".to_string(),
            masked_name: "A**".to_string(),
            authenticated: true,
        });
        session
    }

    #[test]
    fn test_file_storage_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::in_dir(temp_dir.path().join("nested"), "auth");

        assert!(storage.load().unwrap().is_none());

        storage.save(&signed_in()).unwrap();
        assert_eq!(storage.path(), temp_dir.path().join("nested").join("auth.json"));
        assert_eq!(storage.load().unwrap(), Some(signed_in()));

        storage.save(&Session::default()).unwrap();
        assert!(!storage.load().unwrap().unwrap().is_authenticated());
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::in_dir(temp_dir.path(), "auth");
        std::fs::write(storage.path(), "{not json").unwrap();

        assert!(matches!(storage.load(), Err(StorageError::Corrupt(_))));
    }

    #[test]
    fn test_memory_storage() {
        assert!(MemoryStorage::new().load().unwrap().is_none());

        let storage = MemoryStorage::with_session(signed_in());
        assert!(storage.load().unwrap().unwrap().is_authenticated());

        storage.save(&Session::default()).unwrap();
        assert_eq!(storage.load().unwrap(), Some(Session::default()));
    }
}
