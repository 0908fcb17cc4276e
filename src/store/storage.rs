//! Session Storage
//!
//! Key/value string storage scoped to one client session. The file-backed
//! implementation keeps one file per key inside a session directory; the
//! in-memory implementation shares its map between clones so a "reload" can
//! be simulated by building a second store over the same storage.

use crate::types::AppResult;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

const ITEM_EXTENSION: &str = "json";

/// Storage backend for persisted store snapshots
pub trait SessionStorage: Send + Sync {
    /// Read the value stored under `key`, `None` when absent
    fn get_item(&self, key: &str) -> AppResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set_item(&self, key: &str, value: &str) -> AppResult<()>;

    /// Remove `key`; removing a missing key is not an error
    fn remove_item(&self, key: &str) -> AppResult<()>;
}

/// File-backed session storage
pub struct FileSessionStorage {
    session_dir: PathBuf,
}

impl FileSessionStorage {
    /// Create storage rooted at a session directory
    pub fn with_path(session_dir: PathBuf) -> Self {
        Self { session_dir }
    }

    /// Create storage for the session configured in `config`
    pub fn from_config(config: &crate::config::Config) -> Self {
        let session_dir = config.session_path();
        info!("Session storage at {:?}", session_dir);
        Self::with_path(session_dir)
    }

    /// Drop every item of this session
    pub fn clear(&self) -> AppResult<()> {
        match std::fs::remove_dir_all(&self.session_dir) {
            Ok(()) => {
                info!("Cleared session storage at {:?}", self.session_dir);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn item_path(&self, key: &str) -> PathBuf {
        // ':' is not allowed in Windows file names
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
            .collect();
        self.session_dir.join(format!("{}.{}", name, ITEM_EXTENSION))
    }
}

impl SessionStorage for FileSessionStorage {
    fn get_item(&self, key: &str) -> AppResult<Option<String>> {
        let path = self.item_path(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No stored item for {}", key);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> AppResult<()> {
        std::fs::create_dir_all(&self.session_dir)?;
        let path = self.item_path(key);
        // Replaced atomically via rename
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        debug!("Stored {} bytes under {}", value.len(), key);
        Ok(())
    }

    fn remove_item(&self, key: &str) -> AppResult<()> {
        match std::fs::remove_file(self.item_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process session storage; clones share the same items
#[derive(Clone, Default)]
pub struct MemorySessionStorage {
    items: Arc<Mutex<HashMap<String, String>>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.items
            .lock()
            .map_err(|_| crate::types::AppError::Internal("session storage lock poisoned".to_string()))
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get_item(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> AppResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> AppResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}
