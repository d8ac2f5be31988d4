//! # slotdoc Store
//!
//! Storage collaborators for slotdoc.
//!
//! Two kinds of store sit underneath the segmented transport, and both are
//! **opaque string stores**. They never interpret the records they hold.
//!
//! - A [`SlotStore`] is the remote system of record: a handful of named
//!   slots, each holding one content string and a version label.
//! - A [`LocalCache`] is on-device key/value persistence used as a
//!   read-through fallback. It is never the source of truth.
//!
//! ## Design Principles
//!
//! - Stores do not enforce the per-slot byte budget; the transport does
//! - A write is only durable once the store returns `Ok`
//! - Implementations must be `Send + Sync`
//!
//! ## Available Implementations
//!
//! - [`InMemorySlotStore`] - test double with failure injection
//! - [`DirSlotStore`] - one JSON file per slot in a directory
//! - [`InMemoryLocalCache`] / [`FileLocalCache`] - fallback persistence
//!
//! ## Example
//!
//! ```rust
//! use slotdoc_store::{InMemorySlotStore, SlotStore};
//!
//! let store = InMemorySlotStore::new();
//! store.write("broadcaster", "1", "{}").unwrap();
//! assert_eq!(store.read("broadcaster").unwrap().unwrap().content, "{}");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod dir;
mod error;
mod feed;
mod local;
mod memory;
mod slot;

pub use dir::DirSlotStore;
pub use error::{StoreError, StoreResult};
pub use feed::{ChangeFeed, SlotChange};
pub use local::{FileLocalCache, InMemoryLocalCache, LocalCache};
pub use memory::{InMemorySlotStore, WriteLogEntry};
pub use slot::{SlotEntry, SlotStore};
