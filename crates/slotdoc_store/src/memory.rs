//! In-memory slot store for testing.

use crate::error::{StoreError, StoreResult};
use crate::feed::{ChangeFeed, SlotChange};
use crate::slot::{SlotEntry, SlotStore};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::Receiver;
use std::time::Instant;

/// One confirmed write, as seen by [`InMemorySlotStore::write_log`].
#[derive(Debug, Clone)]
pub struct WriteLogEntry {
    /// Slot that was written.
    pub slot: String,
    /// Byte length of the content.
    pub len: usize,
    /// When the write was confirmed.
    pub at: Instant,
}

/// An in-memory slot store.
///
/// Suitable for unit and integration tests. Besides plain storage it can
/// simulate the failure modes the transport has to survive:
/// - [`reject_writes_to`](Self::reject_writes_to) makes one slot refuse writes
/// - [`set_available`](Self::set_available) takes the whole store offline
///
/// # Example
///
/// ```rust
/// use slotdoc_store::{InMemorySlotStore, SlotStore};
///
/// let store = InMemorySlotStore::new();
/// store.reject_writes_to("global");
/// assert!(store.write("global", "1", "{}").is_err());
/// assert!(store.write("broadcaster", "1", "{}").is_ok());
/// ```
#[derive(Debug)]
pub struct InMemorySlotStore {
    slots: RwLock<HashMap<String, SlotEntry>>,
    rejected: RwLock<HashSet<String>>,
    log: RwLock<Vec<WriteLogEntry>>,
    available: AtomicBool,
    sequence: AtomicU64,
    feed: ChangeFeed,
}

impl Default for InMemorySlotStore {
    fn default() -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            rejected: RwLock::new(HashSet::new()),
            log: RwLock::new(Vec::new()),
            available: AtomicBool::new(true),
            sequence: AtomicU64::new(0),
            feed: ChangeFeed::new(),
        }
    }
}

impl InMemorySlotStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a slot without notifying subscribers or touching the log.
    ///
    /// Useful for reproducing data written by another client.
    pub fn seed(&self, slot: &str, entry: SlotEntry) {
        self.slots.write().insert(slot.to_string(), entry);
    }

    /// Removes a slot's content.
    pub fn clear_slot(&self, slot: &str) {
        self.slots.write().remove(slot);
    }

    /// Makes every future write to `slot` fail.
    pub fn reject_writes_to(&self, slot: &str) {
        self.rejected.write().insert(slot.to_string());
    }

    /// Lets writes to `slot` succeed again.
    pub fn accept_writes_to(&self, slot: &str) {
        self.rejected.write().remove(slot);
    }

    /// Toggles whether the store can be reached at all.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Returns all confirmed writes in order.
    #[must_use]
    pub fn write_log(&self) -> Vec<WriteLogEntry> {
        self.log.read().clone()
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("in-memory store is offline".into()))
        }
    }
}

impl SlotStore for InMemorySlotStore {
    fn write(&self, slot: &str, version: &str, content: &str) -> StoreResult<()> {
        self.check_available()?;
        if self.rejected.read().contains(slot) {
            return Err(StoreError::WriteRejected {
                slot: slot.to_string(),
                reason: "slot is read-only for this client".into(),
            });
        }

        self.slots
            .write()
            .insert(slot.to_string(), SlotEntry::new(version, content));
        self.log.write().push(WriteLogEntry {
            slot: slot.to_string(),
            len: content.len(),
            at: Instant::now(),
        });

        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        self.feed.emit(SlotChange {
            slot: slot.to_string(),
            version: version.to_string(),
            sequence,
        });
        Ok(())
    }

    fn read(&self, slot: &str) -> StoreResult<Option<SlotEntry>> {
        self.check_available()?;
        Ok(self.slots.read().get(slot).cloned())
    }

    fn subscribe(&self) -> Receiver<SlotChange> {
        self.feed.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read() {
        let store = InMemorySlotStore::new();
        assert!(store.read("broadcaster").unwrap().is_none());

        store.write("broadcaster", "1", "{\"a\":1}").unwrap();
        let entry = store.read("broadcaster").unwrap().unwrap();
        assert_eq!(entry, SlotEntry::new("1", "{\"a\":1}"));
    }

    #[test]
    fn overwrite_replaces_content() {
        let store = InMemorySlotStore::new();
        store.write("global", "1", "old").unwrap();
        store.write("global", "1", "new").unwrap();
        assert_eq!(store.read("global").unwrap().unwrap().content, "new");
        assert_eq!(store.write_log().len(), 2);
    }

    #[test]
    fn rejected_slot() {
        let store = InMemorySlotStore::new();
        store.reject_writes_to("global");

        let err = store.write("global", "1", "x").unwrap_err();
        assert!(matches!(err, StoreError::WriteRejected { ref slot, .. } if slot == "global"));
        assert!(store.read("global").unwrap().is_none());
        assert!(store.write_log().is_empty());

        store.accept_writes_to("global");
        store.write("global", "1", "x").unwrap();
    }

    #[test]
    fn offline_store() {
        let store = InMemorySlotStore::new();
        store.write("broadcaster", "1", "x").unwrap();
        store.set_available(false);

        assert!(matches!(
            store.read("broadcaster"),
            Err(StoreError::Unavailable(_))
        ));
        assert!(store.write("broadcaster", "1", "y").is_err());

        store.set_available(true);
        assert_eq!(store.read("broadcaster").unwrap().unwrap().content, "x");
    }

    #[test]
    fn subscribers_see_confirmed_writes_only() {
        let store = InMemorySlotStore::new();
        let rx = store.subscribe();
        store.reject_writes_to("global");

        store.write("broadcaster", "1", "x").unwrap();
        let _ = store.write("global", "1", "y");

        let change = rx.try_recv().unwrap();
        assert_eq!(change.slot, "broadcaster");
        assert_eq!(change.sequence, 1);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn seed_is_silent() {
        let store = InMemorySlotStore::new();
        let rx = store.subscribe();
        store.seed("broadcaster", SlotEntry::new("1", "seeded"));

        assert_eq!(store.read("broadcaster").unwrap().unwrap().content, "seeded");
        assert!(rx.try_recv().is_err());
        assert!(store.write_log().is_empty());
    }
}
