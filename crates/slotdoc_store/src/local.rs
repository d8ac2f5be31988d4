//! Local fallback persistence.

use crate::error::{StoreError, StoreResult};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

/// On-device key/value persistence.
///
/// Holds the last good document and record so a client can still show
/// something when the slot store is unreachable. It is read-through only:
/// nothing here is ever treated as newer than what the slot store returns.
pub trait LocalCache: Send + Sync {
    /// Returns the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be persisted.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Removes `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the change cannot be persisted.
    fn remove(&self, key: &str) -> StoreResult<()>;
}

/// A process-local cache that forgets everything on drop.
#[derive(Debug, Default)]
pub struct InMemoryLocalCache {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryLocalCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl LocalCache for InMemoryLocalCache {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}

/// A cache persisted as a single JSON object file.
///
/// The whole map is rewritten (temp file + rename) on every change, which
/// is fine for the handful of small keys it holds.
#[derive(Debug)]
pub struct FileLocalCache {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileLocalCache {
    /// Opens the cache file at `path`, creating parent directories.
    ///
    /// A missing file starts an empty cache. An unreadable file is logged
    /// and replaced on the next write, matching how browsers treat broken
    /// local storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or the
    /// file exists but cannot be read.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let entries = match fs::read(path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "local cache unreadable, starting empty");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path: path.to_path_buf(),
            entries: RwLock::new(entries),
        })
    }

    /// Returns the path of the cache file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> StoreResult<()> {
        let bytes =
            serde_json::to_vec_pretty(entries).map_err(|e| StoreError::Corrupted(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl LocalCache for FileLocalCache {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut entries = self.entries.write();
        let mut updated = entries.clone();
        updated.insert(key.to_string(), value.to_string());
        self.persist(&updated)?;
        *entries = updated;
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let mut entries = self.entries.write();
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut updated = entries.clone();
        updated.remove(key);
        self.persist(&updated)?;
        *entries = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn memory_cache_basics() {
        let cache = InMemoryLocalCache::new();
        assert!(cache.is_empty());
        cache.set("doc", "[]").unwrap();
        assert_eq!(cache.get("doc").unwrap().as_deref(), Some("[]"));
        cache.remove("doc").unwrap();
        cache.remove("doc").unwrap();
        assert!(cache.get("doc").unwrap().is_none());
    }

    #[test]
    fn file_cache_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("local.json");
        {
            let cache = FileLocalCache::open(&path).unwrap();
            cache.set("last_document", "[1]").unwrap();
            cache.set("last_record", "{}").unwrap();
            cache.remove("last_record").unwrap();
        }
        let cache = FileLocalCache::open(&path).unwrap();
        assert_eq!(cache.get("last_document").unwrap().as_deref(), Some("[1]"));
        assert!(cache.get("last_record").unwrap().is_none());
    }

    #[test]
    fn failed_persist_leaves_memory_unchanged() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("local.json");
        let cache = FileLocalCache::open(&path).unwrap();
        cache.set("doc", "old").unwrap();

        // A directory where the temp file goes makes every persist fail.
        fs::create_dir(path.with_extension("tmp")).unwrap();
        assert!(cache.set("doc", "new").is_err());
        assert!(cache.remove("doc").is_err());
        assert_eq!(cache.get("doc").unwrap().as_deref(), Some("old"));

        let reopened = FileLocalCache::open(&path).unwrap();
        assert_eq!(reopened.get("doc").unwrap().as_deref(), Some("old"));
    }

    #[test]
    fn file_cache_recovers_from_garbage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("local.json");
        fs::write(&path, b"{{{{").unwrap();

        let cache = FileLocalCache::open(&path).unwrap();
        assert!(cache.get("anything").unwrap().is_none());
        cache.set("k", "v").unwrap();

        let reopened = FileLocalCache::open(&path).unwrap();
        assert_eq!(reopened.get("k").unwrap().as_deref(), Some("v"));
    }
}
