//! Single-flight decode cache.
//!
//! Keys are the exact encoded text prefixed with a namespace. The first
//! request for a key starts one decode task; every request for that key
//! made while the task runs waits on the same outcome, success or failure.
//! A failed decode is evicted once its waiters have been told, so the next
//! request tries again.
//!
//! The map lock only guards lookup and insertion of entries and is never
//! held across an await, so different keys decode in parallel. The decode
//! task is detached from the requesting future, so a caller that gives up
//! does not strand the others.

use crate::error::{CoreError, CoreResult};
use parking_lot::Mutex;
use slotdoc_codec::{decompress_with, CodecError, Compressor, GzipCompressor};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Outcome of one decode, shared by every request that waited on it.
#[derive(Debug, Clone)]
enum DecodeFailure {
    Codec(CodecError),
    Task(String),
}

impl From<DecodeFailure> for CoreError {
    fn from(failure: DecodeFailure) -> Self {
        match failure {
            DecodeFailure::Codec(err) => CoreError::Codec(err),
            DecodeFailure::Task(message) => CoreError::TaskFailed(message),
        }
    }
}

type Outcome = Option<Result<String, DecodeFailure>>;

enum Entry {
    Ready(String),
    Pending {
        generation: u64,
        outcome: watch::Receiver<Outcome>,
    },
}

type Entries = Arc<Mutex<HashMap<String, Entry>>>;

/// Memoizes decode results keyed by encoded text.
pub struct DecodeCache {
    namespace: String,
    compressor: Arc<dyn Compressor>,
    entries: Entries,
    generations: AtomicU64,
}

impl std::fmt::Debug for DecodeCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodeCache")
            .field("namespace", &self.namespace)
            .field("algorithm", &self.compressor.algorithm())
            .field("entries", &self.entries.lock().len())
            .finish()
    }
}

impl DecodeCache {
    /// Creates an empty cache decoding with `compressor`.
    pub fn new(namespace: impl Into<String>, compressor: Arc<dyn Compressor>) -> Self {
        Self {
            namespace: namespace.into(),
            compressor,
            entries: Arc::new(Mutex::new(HashMap::new())),
            generations: AtomicU64::new(0),
        }
    }

    /// Creates an empty cache decoding with gzip.
    pub fn with_gzip(namespace: impl Into<String>) -> Self {
        Self::new(namespace, Arc::new(GzipCompressor::new()))
    }

    /// The compressor used for decodes.
    pub fn compressor(&self) -> &Arc<dyn Compressor> {
        &self.compressor
    }

    /// The cache key for `encoded`.
    pub fn key_for(&self, encoded: &str) -> String {
        format!("${}:{}", self.namespace, encoded)
    }

    /// Returns the decoded document for `encoded`, decoding at most once.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns the codec error of a failed decode. Every request that
    /// waited on that decode receives the same error, and the entry is
    /// evicted before any of them returns.
    pub async fn get_or_decode(&self, encoded: &str) -> CoreResult<String> {
        let key = self.key_for(encoded);
        let mut outcome = {
            let mut entries = self.entries.lock();
            let pending = match entries.get(&key) {
                Some(Entry::Ready(text)) => {
                    debug!(namespace = %self.namespace, "decode cache hit");
                    return Ok(text.clone());
                }
                Some(Entry::Pending { outcome, .. }) => Some(outcome.clone()),
                None => None,
            };
            match pending {
                Some(outcome) => outcome,
                None => {
                    let generation = self.generations.fetch_add(1, Ordering::Relaxed);
                    let (tx, rx) = watch::channel(None);
                    entries.insert(
                        key.clone(),
                        Entry::Pending {
                            generation,
                            outcome: rx.clone(),
                        },
                    );
                    self.spawn_decode(key, generation, encoded.to_owned(), tx);
                    rx
                }
            }
        };

        let shared = match outcome.wait_for(Option::is_some).await {
            Ok(value) => value.clone(),
            Err(_) => None,
        };
        match shared {
            Some(Ok(text)) => Ok(text),
            Some(Err(failure)) => Err(failure.into()),
            None => Err(CoreError::TaskFailed(
                "decode task ended without a result".into(),
            )),
        }
    }

    fn spawn_decode(
        &self,
        key: String,
        generation: u64,
        encoded: String,
        tx: watch::Sender<Outcome>,
    ) {
        let entries = Arc::clone(&self.entries);
        let compressor = Arc::clone(&self.compressor);
        tokio::spawn(async move {
            debug!(encoded_len = encoded.len(), "decoding payload");
            let joined = tokio::task::spawn_blocking(move || {
                decompress_with(compressor.as_ref(), &encoded)
            })
            .await;
            let result = match joined {
                Ok(Ok(text)) => Ok(text),
                Ok(Err(err)) => Err(DecodeFailure::Codec(err)),
                Err(err) => Err(DecodeFailure::Task(err.to_string())),
            };

            {
                let mut entries = entries.lock();
                let current = matches!(
                    entries.get(&key),
                    Some(Entry::Pending { generation: g, .. }) if *g == generation
                );
                if current {
                    match &result {
                        Ok(text) => {
                            entries.insert(key, Entry::Ready(text.clone()));
                        }
                        Err(failure) => {
                            entries.remove(&key);
                            warn!(error = ?failure, "decode failed, cache entry evicted");
                        }
                    }
                }
            }

            // Receivers may all be gone; the map is already settled.
            let _ = tx.send(Some(result));
        });
    }

    /// Returns true if a finished decode for `encoded` is cached.
    pub fn contains(&self, encoded: &str) -> bool {
        self.entries
            .lock()
            .get(&self.key_for(encoded))
            .is_some_and(|entry| matches!(entry, Entry::Ready(_)))
    }

    /// Drops the entry for `encoded`. Returns true if one existed.
    pub fn evict(&self, encoded: &str) -> bool {
        self.entries.lock().remove(&self.key_for(encoded)).is_some()
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Number of entries, finished or in flight.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
