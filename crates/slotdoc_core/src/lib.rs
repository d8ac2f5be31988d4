//! # slotdoc Core
//!
//! Segmented storage of compressed JSON documents in size-limited
//! configuration slots.
//!
//! This crate provides:
//! - Document validation and normalization
//! - Slot record formats (primary and secondary)
//! - The segmented transport: one slot when the record fits the budget,
//!   two when it does not, and an explicit error beyond that
//! - A single-flight decode cache
//! - [`ConfigSession`], which ties the transport to a slot store and a
//!   local fallback cache
//! - [`DocumentLibrary`] for named documents kept on the device
//!
//! ## Example
//!
//! ```rust
//! use slotdoc_core::{ConfigSession, Selection, TransportConfig};
//! use slotdoc_store::{InMemoryLocalCache, InMemorySlotStore};
//! use std::sync::Arc;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let session = ConfigSession::new(
//!     TransportConfig::default(),
//!     Arc::new(InMemorySlotStore::new()),
//!     Arc::new(InMemoryLocalCache::new()),
//! );
//!
//! session
//!     .publish(Selection::custom("Mine", r#"[{"id":"imp"}]"#))
//!     .await
//!     .unwrap();
//!
//! let loaded = session.load().await.unwrap().unwrap();
//! assert_eq!(loaded.document.as_deref(), Some("[\n  {\n    \"id\": \"imp\"\n  }\n]"));
//! # });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod config;
mod document;
mod error;
mod library;
mod record;
mod session;
mod transport;

pub use cache::DecodeCache;
pub use config::{TransportConfig, DEFAULT_SECONDARY_WRITE_DELAY, DEFAULT_SLOT_BUDGET};
pub use document::{normalize, NormalizedDocument};
pub use error::{CoreError, CoreResult};
pub use library::{DocumentLibrary, LIBRARY_KEY};
pub use record::{SecondaryRecord, StorageRecord, CUSTOM_SELECTION};
pub use session::{
    ConfigSession, LoadOrigin, LoadedConfig, PublishReport, SecondaryStatus, Selection,
    LAST_DOCUMENT_KEY, LAST_RECORD_KEY,
};
pub use transport::{Placement, PlacementMeta, Transport};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
