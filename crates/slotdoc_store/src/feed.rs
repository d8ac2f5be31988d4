//! Change notifications for slot writes.
//!
//! Glue layers subscribe here and hand the new content to the transport.
//! The transport itself never registers callbacks.

use parking_lot::RwLock;
use std::sync::mpsc::{self, Receiver, Sender};

/// A notification that a slot was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotChange {
    /// Slot that changed.
    pub slot: String,
    /// Version label of the new content.
    pub version: String,
    /// Monotonic write sequence within this store.
    pub sequence: u64,
}

/// Distributes [`SlotChange`] events to subscribers.
///
/// - Emits only after a write is confirmed
/// - Preserves write order
/// - Prunes subscribers whose receiver was dropped
#[derive(Debug, Default)]
pub struct ChangeFeed {
    subscribers: RwLock<Vec<Sender<SlotChange>>>,
}

impl ChangeFeed {
    /// Creates a new change feed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to all future changes.
    pub fn subscribe(&self) -> Receiver<SlotChange> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.write().push(tx);
        rx
    }

    /// Sends `change` to every live subscriber.
    pub fn emit(&self, change: SlotChange) {
        let mut subscribers = self.subscribers.write();
        subscribers.retain(|tx| tx.send(change.clone()).is_ok());
    }

    /// Returns the number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}
