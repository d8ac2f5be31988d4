//! Error types for slotdoc core.

use slotdoc_store::StoreError;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors surfaced by the transport and session.
///
/// A secondary-slot write that fails after the primary succeeded is not an
/// error; it is reported through `SecondaryStatus::Failed`.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The document is not a JSON array of objects with an `id`.
    #[error("malformed document: {message}")]
    MalformedDocument {
        /// What is wrong with the document.
        message: String,
    },

    /// A custom document was submitted without a name.
    #[error("custom document name must not be empty")]
    MissingName,

    /// Decoding or decompression failed.
    #[error("codec error: {0}")]
    Codec(#[from] slotdoc_codec::CodecError),

    /// A slot store call failed.
    #[error("slot {slot}: {source}")]
    Store {
        /// Slot being read or written.
        slot: String,
        /// Underlying store error.
        #[source]
        source: StoreError,
    },

    /// The local fallback cache failed.
    #[error("local cache error: {0}")]
    LocalCache(#[source] StoreError),

    /// The record does not fit the slot budget even after splitting.
    #[error("document too large: {size} bytes across {segments} segment(s) exceeds the {budget}-byte slot budget")]
    DocumentTooLarge {
        /// Largest serialized slot content, in bytes.
        size: usize,
        /// Per-slot budget.
        budget: usize,
        /// Segments tried.
        segments: usize,
    },

    /// The primary record names a second segment that cannot be read.
    #[error("partial data: primary record expects a second segment in slot {slot}, which is unavailable")]
    PartialData {
        /// Slot that should hold the second segment.
        slot: String,
    },

    /// A slot holds content that is not a valid record.
    #[error("invalid record in slot {slot}: {message}")]
    InvalidRecord {
        /// Slot the content came from.
        slot: String,
        /// Parse failure description.
        message: String,
    },

    /// A custom-document record carries no encoded payload.
    #[error("record has no encoded payload")]
    MissingPayload,

    /// A background decode task did not complete.
    #[error("decode task failed: {0}")]
    TaskFailed(String),
}

impl CoreError {
    /// Creates a malformed document error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedDocument {
            message: message.into(),
        }
    }

    /// Wraps a store error with the slot it concerns.
    pub fn store(slot: impl Into<String>, source: StoreError) -> Self {
        Self::Store {
            slot: slot.into(),
            source,
        }
    }

    /// Returns true if retrying the same call may succeed.
    ///
    /// Codec failures and malformed input need a different input, so they
    /// are never retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            CoreError::Store { source, .. } => source.is_transient(),
            CoreError::PartialData { .. } => true,
            _ => false,
        }
    }

    /// Returns true for failures that the local fallback can cover on read.
    pub fn is_recoverable_on_read(&self) -> bool {
        matches!(
            self,
            CoreError::Codec(_)
                | CoreError::PartialData { .. }
                | CoreError::MissingPayload
                | CoreError::TaskFailed(_)
        )
    }
}
