//! Saved custom documents.
//!
//! Named, normalized documents kept in the local cache under a single key
//! as a JSON object of `name -> document text`. The library lives only on
//! this device; nothing here is ever written to a slot.

use crate::document::{normalize, NormalizedDocument};
use crate::error::{CoreError, CoreResult};
use serde_json::{Map, Value};
use slotdoc_store::LocalCache;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Local cache key holding the library.
pub const LIBRARY_KEY: &str = "slotdoc_saved_documents_v1";

/// A named collection of normalized documents.
pub struct DocumentLibrary {
    local: Arc<dyn LocalCache>,
}

impl std::fmt::Debug for DocumentLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentLibrary").finish_non_exhaustive()
    }
}

impl DocumentLibrary {
    /// Opens the library stored in `local`.
    pub fn new(local: Arc<dyn LocalCache>) -> Self {
        Self { local }
    }

    /// Normalizes `raw` and saves it under `name`, replacing any document
    /// already saved with that name.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingName`], [`CoreError::MalformedDocument`],
    /// or [`CoreError::LocalCache`] if the library cannot be persisted.
    pub fn save(&self, name: &str, raw: &str) -> CoreResult<NormalizedDocument> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::MissingName);
        }
        let document = normalize(raw)?;

        let mut entries = self.load();
        entries.insert(name.to_string(), document.as_str().to_string());
        self.persist(&entries)?;
        debug!(name, entries = entries.len(), "document saved to library");
        Ok(document)
    }

    /// Returns the document saved under `name`.
    pub fn get(&self, name: &str) -> Option<String> {
        self.load().remove(name.trim())
    }

    /// Deletes the document saved under `name`. Returns false if there was
    /// none.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::LocalCache`] if the library cannot be persisted.
    pub fn delete(&self, name: &str) -> CoreResult<bool> {
        let mut entries = self.load();
        if entries.remove(name.trim()).is_none() {
            return Ok(false);
        }
        self.persist(&entries)?;
        Ok(true)
    }

    /// Saved names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.load().into_keys().collect()
    }

    fn load(&self) -> BTreeMap<String, String> {
        let raw = match self.local.get(LIBRARY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return BTreeMap::new(),
            Err(err) => {
                warn!(error = %err, "library unreadable, treating as empty");
                return BTreeMap::new();
            }
        };

        match serde_json::from_str::<Map<String, Value>>(&raw) {
            Ok(map) => map
                .into_iter()
                .filter_map(|(name, value)| match value {
                    Value::String(text) => Some((name, text)),
                    _ => None,
                })
                .collect(),
            Err(err) => {
                warn!(error = %err, "library is corrupt, treating as empty");
                BTreeMap::new()
            }
        }
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> CoreResult<()> {
        let json = serde_json::to_string(entries).map_err(|e| CoreError::malformed(e.to_string()))?;
        self.local
            .set(LIBRARY_KEY, &json)
            .map_err(CoreError::LocalCache)
    }
}
