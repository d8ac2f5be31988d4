//! Slot store trait definition.

use crate::error::StoreResult;
use crate::feed::SlotChange;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::Receiver;

/// The content of one slot as last confirmed by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotEntry {
    /// Version label supplied by the writer.
    pub version: String,
    /// Opaque content string (a serialized record).
    pub content: String,
}

impl SlotEntry {
    /// Creates a new slot entry.
    pub fn new(version: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            content: content.into(),
        }
    }
}

/// A remote key/value configuration store with a few named slots.
///
/// Slot stores are **opaque string stores**. The segmented transport owns
/// record formats and the per-slot size budget; stores only persist and
/// return strings.
///
/// # Invariants
///
/// - `write` returns `Ok` only once the content is durable
/// - `read` returns exactly the last content confirmed for that slot
/// - Subscribers are notified after a successful write, never before
pub trait SlotStore: Send + Sync {
    /// Replaces the content of `slot`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or rejects the write.
    fn write(&self, slot: &str, version: &str, content: &str) -> StoreResult<()>;

    /// Reads the content of `slot`, or `None` if it was never written.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or its data is corrupt.
    fn read(&self, slot: &str) -> StoreResult<Option<SlotEntry>>;

    /// Subscribes to successful writes.
    fn subscribe(&self) -> Receiver<SlotChange>;
}
