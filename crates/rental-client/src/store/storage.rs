//! Key/value persistence for store snapshots.
//!
//! Snapshots are written as `{"state": ..., "version": N}`. A snapshot with
//! a different version is ignored on load.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};

/// Blocking key/value storage. Stores call it on the blocking pool.
pub trait Storage: Send + Sync {
    fn load(&self, key: &str) -> StoreResult<Option<String>>;
    fn save(&self, key: &str, value: &str) -> StoreResult<()>;
    fn remove(&self, key: &str) -> StoreResult<()>;
}

#[derive(Debug, Serialize, Deserialize)]
struct Versioned<T> {
    state: T,
    version: u32,
}

/// Reads a versioned snapshot. Missing, outdated or unreadable snapshots
/// come back as `None`; only I/O failures are errors.
pub fn load_versioned<T: DeserializeOwned>(
    storage: &dyn Storage,
    key: &str,
    version: u32,
) -> StoreResult<Option<T>> {
    let Some(raw) = storage.load(key)? else {
        debug!(key, "No persisted snapshot");
        return Ok(None);
    };

    let snapshot: Versioned<T> = match serde_json::from_str(&raw) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!(key, error = %e, "Ignoring unreadable snapshot");
            return Ok(None);
        }
    };

    if snapshot.version != version {
        warn!(key, found = snapshot.version, expected = version, "Ignoring snapshot from another version");
        return Ok(None);
    }
    Ok(Some(snapshot.state))
}

pub fn save_versioned<T: Serialize>(
    storage: &dyn Storage,
    key: &str,
    version: u32,
    state: &T,
) -> StoreResult<()> {
    let raw = serde_json::to_string(&Versioned { state, version })?;
    storage.save(key, &raw)
}

/// [`save_versioned`] on the blocking pool. Store tasks await this so a
/// slow disk never stalls the runtime thread they share with the pages.
pub async fn save_versioned_blocking<T>(
    storage: Arc<dyn Storage>,
    key: &'static str,
    version: u32,
    state: T,
) -> StoreResult<()>
where
    T: Serialize + Send + 'static,
{
    tokio::task::spawn_blocking(move || save_versioned(storage.as_ref(), key, version, &state))
        .await
        .map_err(|e| StoreError::Io(format!("persist task failed: {e}")))?
}

// =============================================================================
// File Storage
// =============================================================================

/// One `<key>.json` file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStorage { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Storage for FileStorage {
    fn load(&self, key: &str) -> StoreResult<Option<String>> {
        match fs::read_to_string(self.path(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes through a temp file so a crash never leaves half a snapshot.
    fn save(&self, key: &str, value: &str) -> StoreResult<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path(key);
        let tmp = self.dir.join(format!("{}.json.tmp", key));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// Memory Storage
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> StoreResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Io("memory storage lock poisoned".into()))
    }
}

impl Storage for MemoryStorage {
    fn load(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> StoreResult<()> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.entries()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Snapshot {
        collapsed: bool,
    }

    #[test]
    fn test_file_storage_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("data"));
        assert_eq!(storage.load("app-storage").unwrap(), None);

        save_versioned(&storage, "app-storage", 1, &Snapshot { collapsed: true }).unwrap();
        assert!(dir.path().join("data").join("app-storage.json").exists());

        let loaded: Option<Snapshot> = load_versioned(&storage, "app-storage", 1).unwrap();
        assert_eq!(loaded, Some(Snapshot { collapsed: true }));

        storage.remove("app-storage").unwrap();
        storage.remove("app-storage").unwrap();
        assert_eq!(storage.load("app-storage").unwrap(), None);
    }

    #[test]
    fn test_version_mismatch_is_ignored() {
        let storage = MemoryStorage::new();
        save_versioned(&storage, "auth-storage", 0, &Snapshot { collapsed: false }).unwrap();
        let loaded: Option<Snapshot> = load_versioned(&storage, "auth-storage", 1).unwrap();
        assert_eq!(loaded, None);
    }

    #[test]
    fn test_corrupt_snapshot_is_ignored() {
        let storage = MemoryStorage::new();
        storage.save("auth-storage", "{not json").unwrap();
        let loaded: Option<Snapshot> = load_versioned(&storage, "auth-storage", 1).unwrap();
        assert_eq!(loaded, None);
    }

    #[test]
    fn test_snapshot_shape() {
        let storage = MemoryStorage::new();
        save_versioned(&storage, "k", 3, &Snapshot { collapsed: true }).unwrap();
        let raw: serde_json::Value = serde_json::from_str(&storage.load("k").unwrap().unwrap()).unwrap();
        assert_eq!(raw["version"], 3);
        assert_eq!(raw["state"]["collapsed"], true);
    }
}
