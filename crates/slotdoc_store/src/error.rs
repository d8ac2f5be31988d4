//! Error types for store operations.

use std::io;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while talking to a slot store or local cache.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The store cannot be reached at all.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store refused a write to one slot.
    #[error("write to slot {slot} rejected: {reason}")]
    WriteRejected {
        /// Slot that was being written.
        slot: String,
        /// Reason reported by the store.
        reason: String,
    },

    /// Persisted data could not be parsed.
    #[error("store data corrupted: {0}")]
    Corrupted(String),

    /// The slot name cannot be used by this store.
    #[error("invalid slot name: {0:?}")]
    InvalidSlotName(String),
}

impl StoreError {
    /// Returns true if the same call may succeed later.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StoreError::Unavailable(_) | StoreError::WriteRejected { .. } | StoreError::Io(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_errors() {
        assert!(StoreError::Unavailable("offline".into()).is_transient());
        assert!(StoreError::WriteRejected {
            slot: "global".into(),
            reason: "rate limited".into()
        }
        .is_transient());
        assert!(!StoreError::Corrupted("bad json".into()).is_transient());
    }

    #[test]
    fn error_display() {
        let err = StoreError::WriteRejected {
            slot: "global".into(),
            reason: "forbidden".into(),
        };
        assert_eq!(err.to_string(), "write to slot global rejected: forbidden");
    }
}
