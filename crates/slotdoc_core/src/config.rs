//! Transport configuration.

use std::time::Duration;

/// Default per-slot byte budget.
pub const DEFAULT_SLOT_BUDGET: usize = 5000;

/// Default pause between the primary and secondary writes.
pub const DEFAULT_SECONDARY_WRITE_DELAY: Duration = Duration::from_millis(300);

/// Configuration for the segmented transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Maximum serialized size of one slot's content, in bytes.
    pub slot_budget: usize,

    /// Pause before writing the secondary slot, to stay under the store's
    /// rate limit.
    pub secondary_write_delay: Duration,

    /// Slot holding the primary record.
    pub primary_slot: String,

    /// Slot holding the second segment, when there is one.
    pub secondary_slot: String,

    /// Version label passed to the store with every write.
    pub slot_version: String,

    /// Prefix that partitions decode-cache keys per document kind.
    pub cache_namespace: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            slot_budget: DEFAULT_SLOT_BUDGET,
            secondary_write_delay: DEFAULT_SECONDARY_WRITE_DELAY,
            primary_slot: "broadcaster".into(),
            secondary_slot: "global".into(),
            slot_version: "1".into(),
            cache_namespace: "default".into(),
        }
    }
}

impl TransportConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-slot byte budget.
    #[must_use]
    pub fn slot_budget(mut self, bytes: usize) -> Self {
        self.slot_budget = bytes;
        self
    }

    /// Sets the delay between primary and secondary writes.
    #[must_use]
    pub fn secondary_write_delay(mut self, delay: Duration) -> Self {
        self.secondary_write_delay = delay;
        self
    }

    /// Sets the primary and secondary slot names.
    #[must_use]
    pub fn slots(mut self, primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        self.primary_slot = primary.into();
        self.secondary_slot = secondary.into();
        self
    }

    /// Sets the version label used for writes.
    #[must_use]
    pub fn slot_version(mut self, version: impl Into<String>) -> Self {
        self.slot_version = version.into();
        self
    }

    /// Sets the decode-cache namespace.
    #[must_use]
    pub fn cache_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.cache_namespace = namespace.into();
        self
    }
}
