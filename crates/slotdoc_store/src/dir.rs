//! Directory-backed slot store.

use crate::error::{StoreError, StoreResult};
use crate::feed::{ChangeFeed, SlotChange};
use crate::slot::{SlotEntry, SlotStore};
use parking_lot::Mutex;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use tracing::debug;

/// A slot store that keeps each slot in `<dir>/<slot>.json`.
///
/// Writes go to a temporary file that is synced and then renamed over the
/// slot file, so a reader never observes a half-written slot.
///
/// # Example
///
/// ```no_run
/// use slotdoc_store::{DirSlotStore, SlotStore};
/// use std::path::Path;
///
/// let store = DirSlotStore::open(Path::new("slots")).unwrap();
/// store.write("broadcaster", "1", "{}").unwrap();
/// ```
#[derive(Debug)]
pub struct DirSlotStore {
    dir: PathBuf,
    write_lock: Mutex<u64>,
    feed: ChangeFeed,
}

impl DirSlotStore {
    /// Opens a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: &Path) -> StoreResult<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            write_lock: Mutex::new(0),
            feed: ChangeFeed::new(),
        })
    }

    /// Returns the root directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the file that holds `slot`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidSlotName`] for names that are empty or
    /// contain anything besides ASCII letters, digits, `-` and `_`.
    pub fn slot_path(&self, slot: &str) -> StoreResult<PathBuf> {
        let valid = !slot.is_empty()
            && slot
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidSlotName(slot.to_string()));
        }
        Ok(self.dir.join(format!("{slot}.json")))
    }
}

impl SlotStore for DirSlotStore {
    fn write(&self, slot: &str, version: &str, content: &str) -> StoreResult<()> {
        let path = self.slot_path(slot)?;
        let tmp = path.with_extension("json.tmp");
        let entry = SlotEntry::new(version, content);
        let bytes =
            serde_json::to_vec_pretty(&entry).map_err(|e| StoreError::Corrupted(e.to_string()))?;

        let mut sequence = self.write_lock.lock();
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &path)?;
        *sequence += 1;
        debug!(slot, bytes = content.len(), "slot file written");

        self.feed.emit(SlotChange {
            slot: slot.to_string(),
            version: version.to_string(),
            sequence: *sequence,
        });
        Ok(())
    }

    fn read(&self, slot: &str) -> StoreResult<Option<SlotEntry>> {
        let path = self.slot_path(slot)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StoreError::Corrupted(format!("{}: {e}", path.display())))
    }

    fn subscribe(&self) -> Receiver<SlotChange> {
        self.feed.subscribe()
    }
}
