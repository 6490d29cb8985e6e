//! Durable storage for the single in-flight session record.
//!
//! The store holds at most one [`SyncSession`]. Missing and unparsable
//! records both read as "no session" - a corrupt file must never take the
//! console down, it just forfeits the recovered cool-down.

use crate::error::StoreError;
use crate::session::SyncSession;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Key-value style persistence for the session record, injectable so tests
/// can run against an in-memory fake.
pub trait SessionStore: Send + Sync {
    /// Latest persisted session; `None` when absent or unreadable.
    fn load(&self) -> Option<SyncSession>;

    fn save(&self, session: &SyncSession) -> Result<(), StoreError>;

    /// Remove the persisted session. Idempotent; failures are logged, not
    /// raised.
    fn clear(&self);
}

/// Session store backed by a single JSON file.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under the platform data directory
    /// (e.g. `~/.local/share/edusync/session.json`).
    pub fn default_location() -> Self {
        let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::new(base.join("edusync").join("session.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Option<SyncSession> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return None,
        };
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "stored session unparsable, treating as absent");
                None
            }
        }
    }

    fn save(&self, session: &SyncSession) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string(session)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }

    fn clear(&self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "failed to clear persisted session");
            }
        }
    }
}

/// In-memory session store for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: Mutex<Option<SyncSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Option<SyncSession> {
        self.inner.lock().expect("session store lock poisoned").clone()
    }

    fn save(&self, session: &SyncSession) -> Result<(), StoreError> {
        *self.inner.lock().expect("session store lock poisoned") = Some(session.clone());
        Ok(())
    }

    fn clear(&self) {
        *self.inner.lock().expect("session store lock poisoned") = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));

        assert!(store.load().is_none());

        let session = SyncSession::begin(1_700_000_000_000);
        store.save(&session).unwrap();
        assert_eq!(store.load(), Some(session));

        store.clear();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_file_store_corrupt_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json at all").unwrap();

        let store = FileSessionStore::new(&path);
        assert!(store.load().is_none());
    }

    #[test]
    fn test_file_store_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("nested/deeper/session.json"));
        store.save(&SyncSession::begin(1)).unwrap();
        assert!(store.load().is_some());
    }

    #[test]
    fn test_file_store_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));
        store.clear();
        store.clear();
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemorySessionStore::new();
        assert!(store.load().is_none());

        let session = SyncSession::begin(42);
        store.save(&session).unwrap();
        assert_eq!(store.load(), Some(session));

        store.clear();
        assert!(store.load().is_none());
    }
}
