//! Publish and load sessions.
//!
//! A [`ConfigSession`] is the explicit context that owns everything the
//! read and write paths share: the transport, the decode cache, the slot
//! store and the local fallback cache. Nothing here is global; create one
//! session per store at startup and pass it by reference.

use crate::cache::DecodeCache;
use crate::config::TransportConfig;
use crate::document::normalize;
use crate::error::{CoreError, CoreResult};
use crate::record::{SecondaryRecord, StorageRecord};
use crate::transport::{PlacementMeta, Transport};
use parking_lot::Mutex;
use slotdoc_codec::{fingerprint, Compressor, GzipCompressor};
use slotdoc_store::{LocalCache, SlotChange, SlotStore};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Local cache key for the last reconstructed or published document.
pub const LAST_DOCUMENT_KEY: &str = "slotdoc_last_document_v1";

/// Local cache key for the last sanitized primary record.
pub const LAST_RECORD_KEY: &str = "slotdoc_last_record_v1";

/// What to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// A built-in document, referenced by name only.
    Builtin(String),
    /// A custom document carried in the slots.
    Custom {
        /// Display name.
        name: String,
        /// Raw document text; normalized before placement.
        document: String,
    },
}

impl Selection {
    /// Selects a built-in document.
    pub fn builtin(name: impl Into<String>) -> Self {
        Self::Builtin(name.into())
    }

    /// Selects a custom document.
    pub fn custom(name: impl Into<String>, document: impl Into<String>) -> Self {
        Self::Custom {
            name: name.into(),
            document: document.into(),
        }
    }
}

/// Outcome of the secondary slot write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecondaryStatus {
    /// The document fit in the primary slot.
    NotNeeded,
    /// The second segment was written.
    Written,
    /// The primary slot was written but the second segment was not. The
    /// published document is incomplete until a publish succeeds.
    Failed {
        /// Slot that could not be written.
        slot: String,
        /// Store error description.
        reason: String,
    },
}

impl SecondaryStatus {
    /// Returns true unless the secondary write failed.
    pub fn is_complete(&self) -> bool {
        !matches!(self, SecondaryStatus::Failed { .. })
    }
}

/// Result of a publish whose primary write succeeded.
#[derive(Debug, Clone)]
pub struct PublishReport {
    /// Record written to the primary slot.
    pub record: StorageRecord,
    /// Version stamp of the record.
    pub version: u64,
    /// Fingerprint of the normalized document (custom documents only).
    pub fingerprint: Option<String>,
    /// Number of slots the document occupies.
    pub segments: usize,
    /// Serialized size of the primary slot content.
    pub primary_bytes: usize,
    /// Serialized size of the secondary slot content, if any.
    pub secondary_bytes: Option<usize>,
    /// Secondary write outcome.
    pub secondary: SecondaryStatus,
}

impl PublishReport {
    /// Returns true if every slot the document needs was written.
    pub fn is_complete(&self) -> bool {
        self.secondary.is_complete()
    }
}

/// Where a loaded configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOrigin {
    /// Reconstructed from the slot store.
    Store,
    /// Served from the local fallback cache.
    LocalFallback {
        /// Why the store could not be used.
        reason: String,
    },
}

/// A configuration read back from the slots or the fallback cache.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The primary record (sanitized when served from the fallback).
    pub record: StorageRecord,
    /// The custom document text, if the record selects one and it could
    /// be recovered.
    pub document: Option<String>,
    /// Source of this configuration.
    pub origin: LoadOrigin,
}

impl LoadedConfig {
    /// Returns true if this came from the local fallback cache.
    pub fn is_fallback(&self) -> bool {
        matches!(self.origin, LoadOrigin::LocalFallback { .. })
    }

    /// Compares the document against the fingerprint in the record.
    ///
    /// Returns `None` when either side is missing.
    pub fn fingerprint_matches(&self) -> Option<bool> {
        let expected = self.record.fingerprint.as_deref()?;
        let document = self.document.as_deref()?;
        Some(fingerprint(document) == expected)
    }
}

/// Owns the collaborators for publishing and loading one configuration.
pub struct ConfigSession {
    transport: Transport,
    cache: DecodeCache,
    store: Arc<dyn SlotStore>,
    local: Arc<dyn LocalCache>,
    last_version: Mutex<u64>,
    publishing: tokio::sync::Mutex<()>,
}

impl std::fmt::Debug for ConfigSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigSession")
            .field("transport", &self.transport)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl ConfigSession {
    /// Creates a session using gzip.
    pub fn new(
        config: TransportConfig,
        store: Arc<dyn SlotStore>,
        local: Arc<dyn LocalCache>,
    ) -> Self {
        Self::with_compressor(config, Arc::new(GzipCompressor::new()), store, local)
    }

    /// Creates a session using an explicit compressor for both directions.
    pub fn with_compressor(
        config: TransportConfig,
        compressor: Arc<dyn Compressor>,
        store: Arc<dyn SlotStore>,
        local: Arc<dyn LocalCache>,
    ) -> Self {
        let cache = DecodeCache::new(config.cache_namespace.clone(), Arc::clone(&compressor));
        Self {
            transport: Transport::with_compressor(config, compressor),
            cache,
            store,
            local,
            last_version: Mutex::new(0),
            publishing: tokio::sync::Mutex::new(()),
        }
    }

    /// The transport configuration.
    pub fn config(&self) -> &TransportConfig {
        self.transport.config()
    }

    /// The segmented transport.
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// The decode cache.
    pub fn cache(&self) -> &DecodeCache {
        &self.cache
    }

    /// Subscribes to slot writes.
    ///
    /// Feed the changed contents to [`ConfigSession::apply_change`].
    pub fn subscribe(&self) -> Receiver<SlotChange> {
        self.store.subscribe()
    }

    /// Publishes `selection`.
    ///
    /// Custom documents are normalized and placed, then the primary slot is
    /// written. When the document needs a second segment, the session waits
    /// for the configured delay and writes the secondary slot. A failed
    /// secondary write is reported in [`PublishReport::secondary`], not as
    /// an error.
    ///
    /// Publishes on one session run one at a time: a second call waits until
    /// the first has written both slots, so the slots never pair one
    /// publish's primary with another's secondary.
    ///
    /// # Errors
    ///
    /// - [`CoreError::MissingName`] for an empty name
    /// - [`CoreError::MalformedDocument`] for an invalid document
    /// - [`CoreError::DocumentTooLarge`] if two slots are not enough
    /// - [`CoreError::Store`] if the primary write fails
    pub async fn publish(&self, selection: Selection) -> CoreResult<PublishReport> {
        let _publishing = self.publishing.lock().await;
        let now = now_ms();
        match selection {
            Selection::Builtin(name) => self.publish_builtin(name, now),
            Selection::Custom { name, document } => {
                self.publish_custom(name, &document, now).await
            }
        }
    }

    fn publish_builtin(&self, name: String, now: u64) -> CoreResult<PublishReport> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(CoreError::MissingName);
        }

        let version = self.next_version(now);
        let record = StorageRecord {
            version: Some(version),
            ..StorageRecord::builtin(name, now)
        };
        self.forget_document();
        self.remember_record(&record);

        let json = record.to_json()?;
        self.write_slot(&self.config().primary_slot, &json)?;
        info!(selected = %record.selected, version, "published built-in selection");

        Ok(PublishReport {
            version,
            fingerprint: None,
            segments: 1,
            primary_bytes: json.len(),
            secondary_bytes: None,
            secondary: SecondaryStatus::NotNeeded,
            record,
        })
    }

    async fn publish_custom(&self, name: String, raw: &str, now: u64) -> CoreResult<PublishReport> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(CoreError::MissingName);
        }

        let document = normalize(raw)?;
        let version = self.next_version(now);
        let meta = PlacementMeta::new(name, now).with_version(version);
        let placement = self.transport.place_document(document, &meta)?;
        self.remember_document(placement.document.as_str());
        self.remember_record(&placement.primary);

        let config = self.config();
        self.write_slot(&config.primary_slot, placement.primary_json())?;

        let secondary = match placement.secondary_json() {
            None => SecondaryStatus::NotNeeded,
            Some(content) => {
                tokio::time::sleep(config.secondary_write_delay).await;
                match self.write_slot(&config.secondary_slot, content) {
                    Ok(()) => SecondaryStatus::Written,
                    Err(err) => {
                        warn!(
                            slot = %config.secondary_slot,
                            error = %err,
                            "second segment not written; published document is incomplete"
                        );
                        SecondaryStatus::Failed {
                            slot: config.secondary_slot.clone(),
                            reason: err.to_string(),
                        }
                    }
                }
            }
        };

        info!(
            version,
            segments = placement.segments(),
            primary_bytes = placement.primary_json().len(),
            "published custom document"
        );

        Ok(PublishReport {
            version,
            fingerprint: placement.primary.fingerprint.clone(),
            segments: placement.segments(),
            primary_bytes: placement.primary_json().len(),
            secondary_bytes: placement.secondary_json().map(str::len),
            secondary,
            record: placement.primary,
        })
    }

    /// Reads the current configuration from the slot store.
    ///
    /// Falls back to the local cache when the store is unreachable, the
    /// primary slot is empty or unreadable, or the document cannot be
    /// decoded. Returns `Ok(None)` if nothing was ever published and there
    /// is no fallback either.
    ///
    /// # Errors
    ///
    /// Returns the store or decode error when no fallback can cover it.
    pub async fn load(&self) -> CoreResult<Option<LoadedConfig>> {
        let config = self.config();
        let primary = match self.store.read(&config.primary_slot) {
            Ok(Some(entry)) => entry.content,
            Ok(None) => {
                debug!(slot = %config.primary_slot, "primary slot is empty");
                return Ok(self.fallback_record("primary slot is empty"));
            }
            Err(err) => {
                let err = CoreError::store(&config.primary_slot, err);
                return match self.fallback_record(&err.to_string()) {
                    Some(loaded) => Ok(Some(loaded)),
                    None => Err(err),
                };
            }
        };

        let record = match StorageRecord::from_json(&config.primary_slot, &primary) {
            Ok(record) => record,
            Err(err) => {
                return match self.fallback_record(&err.to_string()) {
                    Some(loaded) => Ok(Some(loaded)),
                    None => Err(err),
                };
            }
        };

        let secondary = if record.is_custom() && record.has_second_segment() {
            self.read_secondary()
        } else {
            None
        };

        self.resolve(record, secondary).await.map(Some)
    }

    /// Handles new slot content pushed by the store.
    ///
    /// This is the whole read path minus the store reads: it parses the
    /// records, reassembles and decodes the document, and updates the
    /// local fallback.
    ///
    /// # Errors
    ///
    /// Same as [`ConfigSession::load`].
    pub async fn apply_change(
        &self,
        primary_content: &str,
        secondary_content: Option<&str>,
    ) -> CoreResult<LoadedConfig> {
        let config = self.config();
        let record = match StorageRecord::from_json(&config.primary_slot, primary_content) {
            Ok(record) => record,
            Err(err) => return self.fallback_record(&err.to_string()).ok_or(err),
        };

        let secondary = secondary_content.and_then(|content| {
            SecondaryRecord::from_json(&config.secondary_slot, content)
                .map_err(|err| warn!(error = %err, "ignoring unreadable second segment"))
                .ok()
        });

        self.resolve(record, secondary).await
    }

    async fn resolve(
        &self,
        record: StorageRecord,
        secondary: Option<SecondaryRecord>,
    ) -> CoreResult<LoadedConfig> {
        if !record.is_custom() {
            self.remember_record(&record);
            return Ok(LoadedConfig {
                record,
                document: None,
                origin: LoadOrigin::Store,
            });
        }

        match self.decode(&record, secondary.as_ref()).await {
            Ok(document) => {
                self.remember_document(&document);
                self.remember_record(&record);
                Ok(LoadedConfig {
                    record,
                    document: Some(document),
                    origin: LoadOrigin::Store,
                })
            }
            Err(err) if err.is_recoverable_on_read() => self.fallback_document(record, err),
            Err(err) => Err(err),
        }
    }

    async fn decode(
        &self,
        record: &StorageRecord,
        secondary: Option<&SecondaryRecord>,
    ) -> CoreResult<String> {
        let encoded = self.transport.assemble(record, secondary)?;
        self.cache.get_or_decode(&encoded).await
    }

    fn read_secondary(&self) -> Option<SecondaryRecord> {
        let slot = &self.config().secondary_slot;
        match self.store.read(slot) {
            Ok(Some(entry)) => SecondaryRecord::from_json(slot, &entry.content)
                .map_err(|err| warn!(error = %err, "ignoring unreadable second segment"))
                .ok(),
            Ok(None) => None,
            Err(err) => {
                warn!(slot = %slot, error = %err, "second segment could not be read");
                None
            }
        }
    }

    /// Serves the last good document for a record that failed to decode.
    fn fallback_document(&self, record: StorageRecord, err: CoreError) -> CoreResult<LoadedConfig> {
        let Some(document) = self.local_get(LAST_DOCUMENT_KEY).filter(|d| !d.is_empty()) else {
            return Err(err);
        };
        warn!(error = %err, "using locally cached document");
        Ok(LoadedConfig {
            record: record.sanitized(),
            document: Some(document),
            origin: LoadOrigin::LocalFallback {
                reason: err.to_string(),
            },
        })
    }

    /// Serves the last sanitized record (and its document) when the primary
    /// slot cannot be used at all.
    fn fallback_record(&self, reason: &str) -> Option<LoadedConfig> {
        let stored = self.local_get(LAST_RECORD_KEY)?;
        let record = match StorageRecord::from_json(LAST_RECORD_KEY, &stored) {
            Ok(record) => record,
            Err(err) => {
                warn!(error = %err, "discarding unreadable local record");
                return None;
            }
        };
        let document = if record.is_custom() {
            self.local_get(LAST_DOCUMENT_KEY).filter(|d| !d.is_empty())
        } else {
            None
        };
        warn!(reason, "using locally cached configuration");
        Some(LoadedConfig {
            record,
            document,
            origin: LoadOrigin::LocalFallback {
                reason: reason.to_string(),
            },
        })
    }

    fn write_slot(&self, slot: &str, content: &str) -> CoreResult<()> {
        self.store
            .write(slot, &self.config().slot_version, content)
            .map_err(|err| CoreError::store(slot, err))?;
        debug!(slot, bytes = content.len(), "slot written");
        Ok(())
    }

    /// Next version stamp: `now`, or one past the previous stamp if the
    /// clock has not moved forward.
    fn next_version(&self, now: u64) -> u64 {
        let mut last = self.last_version.lock();
        let version = if now > *last { now } else { *last + 1 };
        *last = version;
        version
    }

    fn local_get(&self, key: &str) -> Option<String> {
        self.local
            .get(key)
            .map_err(|err| warn!(key, error = %err, "local cache read failed"))
            .ok()
            .flatten()
    }

    fn remember_document(&self, document: &str) {
        if let Err(err) = self.local.set(LAST_DOCUMENT_KEY, document) {
            warn!(error = %err, "could not persist document locally");
        }
    }

    fn forget_document(&self) {
        if let Err(err) = self.local.remove(LAST_DOCUMENT_KEY) {
            warn!(error = %err, "could not clear local document");
        }
    }

    fn remember_record(&self, record: &StorageRecord) {
        let result = record
            .sanitized()
            .to_json()
            .and_then(|json| self.local.set(LAST_RECORD_KEY, &json).map_err(CoreError::LocalCache));
        if let Err(err) = result {
            warn!(error = %err, "could not persist record locally");
        }
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotdoc_store::{InMemoryLocalCache, InMemorySlotStore, StoreError};
    use std::time::Duration;

    const DOC: &str = r#"[{"id":"imp"},{"id":"washerwoman"}]"#;

    fn session() -> (ConfigSession, Arc<InMemorySlotStore>, Arc<InMemoryLocalCache>) {
        let store = Arc::new(InMemorySlotStore::new());
        let local = Arc::new(InMemoryLocalCache::new());
        let config = TransportConfig::new().secondary_write_delay(Duration::ZERO);
        let session = ConfigSession::new(config, store.clone(), local.clone());
        (session, store, local)
    }

    /// Session whose budget forces [`wide_document`] into two slots.
    fn split_session() -> (ConfigSession, Arc<InMemorySlotStore>, Arc<InMemoryLocalCache>) {
        let store = Arc::new(InMemorySlotStore::new());
        let local = Arc::new(InMemoryLocalCache::new());
        let config = TransportConfig::new()
            .slot_budget(1500)
            .secondary_write_delay(Duration::ZERO);
        let session = ConfigSession::new(config, store.clone(), local.clone());
        (session, store, local)
    }

    /// 160 entries with pseudo-random hex ids, so gzip cannot shrink it
    /// below the 1500-byte budget.
    fn wide_document() -> String {
        hex_document(160)
    }

    fn hex_document(count: usize) -> String {
        let mut state: u64 = 0x9e37_79b9_7f4a_7c15;
        let ids: Vec<String> = (0..count)
            .map(|_| {
                state = state
                    .wrapping_mul(6_364_136_223_846_793_005)
                    .wrapping_add(1_442_695_040_888_963_407);
                format!(r#"{{"id":"{:016x}"}}"#, state)
            })
            .collect();
        format!("[{}]", ids.join(","))
    }

    #[test]
    fn versions_are_monotonic() {
        let (session, _, _) = session();
        assert_eq!(session.next_version(100), 100);
        assert_eq!(session.next_version(100), 101);
        assert_eq!(session.next_version(50), 102);
        assert_eq!(session.next_version(500), 500);
    }

    #[tokio::test]
    async fn publish_and_load_custom() {
        let (session, store, local) = session();
        let report = session.publish(Selection::custom("Mine", DOC)).await.unwrap();

        assert_eq!(report.segments, 1);
        assert_eq!(report.secondary, SecondaryStatus::NotNeeded);
        assert!(report.is_complete());
        assert_eq!(store.write_log().len(), 1);

        let loaded = session.load().await.unwrap().unwrap();
        assert_eq!(loaded.origin, LoadOrigin::Store);
        let expected = normalize(DOC).unwrap();
        assert_eq!(loaded.document.as_deref(), Some(expected.as_str()));
        assert_eq!(loaded.fingerprint_matches(), Some(true));
        assert_eq!(
            local.get(LAST_DOCUMENT_KEY).unwrap().as_deref(),
            Some(expected.as_str())
        );
    }

    #[tokio::test]
    async fn publish_builtin_clears_local_document() {
        let (session, store, local) = session();
        session.publish(Selection::custom("Mine", DOC)).await.unwrap();
        let report = session
            .publish(Selection::builtin("trouble_brewing.json"))
            .await
            .unwrap();

        assert_eq!(report.record.selected, "trouble_brewing.json");
        assert!(local.get(LAST_DOCUMENT_KEY).unwrap().is_none());
        let content = store.read("broadcaster").unwrap().unwrap().content;
        assert!(!content.contains("compressedBase64"));

        let loaded = session.load().await.unwrap().unwrap();
        assert!(loaded.document.is_none());
        assert!(!loaded.record.is_custom());
    }

    #[tokio::test]
    async fn rejects_missing_name_and_bad_documents() {
        let (session, store, _) = session();
        assert!(matches!(
            session.publish(Selection::custom("  ", DOC)).await,
            Err(CoreError::MissingName)
        ));
        assert!(matches!(
            session.publish(Selection::custom("x", "[{}]")).await,
            Err(CoreError::MalformedDocument { .. })
        ));
        assert!(matches!(
            session.publish(Selection::builtin("")).await,
            Err(CoreError::MissingName)
        ));
        assert!(store.write_log().is_empty());
    }

    #[tokio::test]
    async fn split_publish_writes_primary_first() {
        let (session, store, _) = split_session();
        let report = session
            .publish(Selection::custom("Wide", wide_document()))
            .await
            .unwrap();

        assert_eq!(report.segments, 2);
        assert_eq!(report.secondary, SecondaryStatus::Written);
        let log = store.write_log();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].slot, "broadcaster");
        assert_eq!(log[1].slot, "global");

        let loaded = session.load().await.unwrap().unwrap();
        assert_eq!(
            loaded.document.as_deref(),
            Some(normalize(&wide_document()).unwrap().as_str())
        );
    }

    #[tokio::test]
    async fn secondary_failure_is_reported_not_raised() {
        let (session, store, _) = split_session();
        store.reject_writes_to("global");

        let report = session
            .publish(Selection::custom("Wide", wide_document()))
            .await
            .unwrap();
        assert!(!report.is_complete());
        assert!(matches!(report.secondary, SecondaryStatus::Failed { ref slot, .. } if slot == "global"));
        assert!(store.read("broadcaster").unwrap().is_some());
    }

    #[tokio::test]
    async fn oversized_publish_keeps_previous_fallback() {
        let (session, store, local) = split_session();
        session.publish(Selection::custom("Small", DOC)).await.unwrap();

        let err = session
            .publish(Selection::custom("Huge", hex_document(500)))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::DocumentTooLarge { segments: 2, .. }));
        assert_eq!(store.write_log().len(), 1);
        assert_eq!(
            local.get(LAST_DOCUMENT_KEY).unwrap().as_deref(),
            Some(normalize(DOC).unwrap().as_str())
        );

        store.set_available(false);
        let loaded = session.load().await.unwrap().unwrap();
        assert!(loaded.is_fallback());
        assert_eq!(loaded.record.custom_name.as_deref(), Some("Small"));
        assert_eq!(loaded.fingerprint_matches(), Some(true));
    }

    #[tokio::test]
    async fn concurrent_publishes_do_not_interleave_slots() {
        let store = Arc::new(InMemorySlotStore::new());
        let config = TransportConfig::new()
            .slot_budget(1500)
            .secondary_write_delay(Duration::from_millis(20));
        let session = ConfigSession::new(config, store.clone(), Arc::new(InMemoryLocalCache::new()));

        let (a, b) = tokio::join!(
            session.publish(Selection::custom("First", hex_document(150))),
            session.publish(Selection::custom("Second", wide_document())),
        );
        assert_eq!(a.unwrap().segments, 2);
        assert_eq!(b.unwrap().segments, 2);

        let slots: Vec<String> = store.write_log().into_iter().map(|w| w.slot).collect();
        assert_eq!(slots, vec!["broadcaster", "global", "broadcaster", "global"]);

        let reader = ConfigSession::new(
            TransportConfig::new().slot_budget(1500),
            store.clone(),
            Arc::new(InMemoryLocalCache::new()),
        );
        let loaded = reader.load().await.unwrap().unwrap();
        assert_eq!(loaded.record.custom_name.as_deref(), Some("Second"));
        assert_eq!(loaded.fingerprint_matches(), Some(true));
    }

    #[tokio::test]
    async fn primary_failure_is_an_error() {
        let (session, store, _) = session();
        store.reject_writes_to("broadcaster");
        let err = session.publish(Selection::custom("Mine", DOC)).await.unwrap_err();
        assert!(matches!(err, CoreError::Store { ref slot, .. } if slot == "broadcaster"));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn partial_data_falls_back_to_local_document() {
        let (session, store, _) = split_session();
        store.reject_writes_to("global");
        session
            .publish(Selection::custom("Wide", wide_document()))
            .await
            .unwrap();

        let loaded = session.load().await.unwrap().unwrap();
        assert!(loaded.is_fallback());
        assert!(loaded.document.is_some());
        assert!(loaded.record.payload.is_none());
    }

    #[tokio::test]
    async fn partial_data_without_fallback_is_an_error() {
        let (publisher, store, _) = split_session();
        store.reject_writes_to("global");
        publisher
            .publish(Selection::custom("Wide", wide_document()))
            .await
            .unwrap();

        let reader = ConfigSession::new(
            TransportConfig::new().slot_budget(1500),
            store.clone(),
            Arc::new(InMemoryLocalCache::new()),
        );
        let err = reader.load().await.unwrap_err();
        assert!(matches!(err, CoreError::PartialData { .. }));
    }

    #[tokio::test]
    async fn unavailable_store_uses_local_record() {
        let (session, store, _) = session();
        session.publish(Selection::custom("Mine", DOC)).await.unwrap();
        store.set_available(false);

        let loaded = session.load().await.unwrap().unwrap();
        assert!(matches!(loaded.origin, LoadOrigin::LocalFallback { .. }));
        assert_eq!(loaded.record.custom_name.as_deref(), Some("Mine"));
        assert!(loaded.document.is_some());
    }

    #[tokio::test]
    async fn unavailable_store_without_fallback_is_an_error() {
        let (session, store, _) = session();
        store.set_available(false);
        let err = session.load().await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::Store {
                source: StoreError::Unavailable(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn nothing_published_loads_none() {
        let (session, _, _) = session();
        assert!(session.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn apply_change_decodes_pushed_content() {
        let (publisher, store, _) = session();
        publisher.publish(Selection::custom("Mine", DOC)).await.unwrap();
        let content = store.read("broadcaster").unwrap().unwrap().content;

        let (reader, _, _) = session();
        let loaded = reader.apply_change(&content, None).await.unwrap();
        assert_eq!(loaded.origin, LoadOrigin::Store);
        assert_eq!(loaded.fingerprint_matches(), Some(true));

        // Same content again is served from the decode cache.
        reader.apply_change(&content, None).await.unwrap();
        assert_eq!(reader.cache().len(), 1);
    }

    #[tokio::test]
    async fn apply_change_rejects_garbage_without_fallback() {
        let (session, _, _) = session();
        let err = session.apply_change("not json", None).await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidRecord { .. }));
    }
}
