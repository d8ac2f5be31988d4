//! Segmented transport.
//!
//! Places a compressed document into at most two slots and puts it back
//! together. The encoded text is split purely by position; neither half is
//! decodable on its own, and readers must concatenate primary then
//! secondary before decoding.

use crate::config::TransportConfig;
use crate::document::{normalize, NormalizedDocument};
use crate::error::{CoreError, CoreResult};
use crate::record::{SecondaryRecord, StorageRecord, CUSTOM_SELECTION};
use slotdoc_codec::{compress_with, decompress_with, CompressedRecord, Compressor, GzipCompressor};
use std::sync::Arc;
use tracing::debug;

/// Metadata stamped on a placed record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementMeta {
    /// Display name of the custom document.
    pub name: String,
    /// Wall-clock publish time in milliseconds.
    pub timestamp_ms: u64,
    /// Version stamp. Defaults to the timestamp.
    pub version: u64,
}

impl PlacementMeta {
    /// Creates metadata whose version equals its timestamp.
    pub fn new(name: impl Into<String>, timestamp_ms: u64) -> Self {
        Self {
            name: name.into(),
            timestamp_ms,
            version: timestamp_ms,
        }
    }

    /// Overrides the version stamp.
    #[must_use]
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }
}

/// The slot contents produced for one document.
#[derive(Debug, Clone)]
pub struct Placement {
    /// Normalized document that was placed.
    pub document: NormalizedDocument,
    /// Compression diagnostics for the full payload.
    pub compressed: CompressedRecord,
    /// Record for the primary slot.
    pub primary: StorageRecord,
    /// Record for the secondary slot, when the payload was split.
    pub secondary: Option<SecondaryRecord>,
    primary_json: String,
    secondary_json: Option<String>,
}

impl Placement {
    /// Serialized primary slot content.
    pub fn primary_json(&self) -> &str {
        &self.primary_json
    }

    /// Serialized secondary slot content, if any.
    pub fn secondary_json(&self) -> Option<&str> {
        self.secondary_json.as_deref()
    }

    /// Number of slots used (1 or 2).
    pub fn segments(&self) -> usize {
        if self.secondary.is_some() {
            2
        } else {
            1
        }
    }
}

/// Splits documents across the primary and secondary slots.
#[derive(Clone)]
pub struct Transport {
    config: TransportConfig,
    compressor: Arc<dyn Compressor>,
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("config", &self.config)
            .field("algorithm", &self.compressor.algorithm())
            .finish()
    }
}

impl Transport {
    /// Creates a transport using gzip.
    pub fn new(config: TransportConfig) -> Self {
        Self::with_compressor(config, Arc::new(GzipCompressor::new()))
    }

    /// Creates a transport using an explicit compressor.
    pub fn with_compressor(config: TransportConfig, compressor: Arc<dyn Compressor>) -> Self {
        Self { config, compressor }
    }

    /// The transport configuration.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// The compressor shared with readers.
    pub fn compressor(&self) -> &Arc<dyn Compressor> {
        &self.compressor
    }

    /// Normalizes `raw` and places it.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MalformedDocument`] before any compression work
    /// if `raw` is not a valid document, otherwise see
    /// [`Transport::place_document`].
    pub fn place(&self, raw: &str, meta: &PlacementMeta) -> CoreResult<Placement> {
        let document = normalize(raw)?;
        self.place_document(document, meta)
    }

    /// Places an already normalized document.
    ///
    /// The whole payload stays in the primary record when the serialized
    /// record fits the slot budget. Otherwise the payload is cut at
    /// `ceil(len / 2)`; the first part stays in the primary record and the
    /// rest becomes the secondary record.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DocumentTooLarge`] if either slot's content
    /// still exceeds the budget after the split.
    pub fn place_document(
        &self,
        document: NormalizedDocument,
        meta: &PlacementMeta,
    ) -> CoreResult<Placement> {
        let compressed = compress_with(self.compressor.as_ref(), document.as_str())?;
        debug!(
            original = compressed.original_byte_length,
            compressed = compressed.compressed_byte_length,
            encoded = compressed.encoded_text.len(),
            "document compressed"
        );

        let mut primary = StorageRecord {
            selected: CUSTOM_SELECTION.to_string(),
            custom_name: Some(meta.name.clone()),
            timestamp_ms: Some(meta.timestamp_ms),
            version: Some(meta.version),
            fingerprint: Some(document.fingerprint()),
            document_length: Some(document.length()),
            second_segment: Some(false),
            payload: Some(compressed.encoded_text.clone()),
        };

        let budget = self.config.slot_budget;
        let single_json = primary.to_json()?;
        if single_json.len() <= budget {
            debug!(size = single_json.len(), budget, "placed in one slot");
            return Ok(Placement {
                document,
                compressed,
                primary,
                secondary: None,
                primary_json: single_json,
                secondary_json: None,
            });
        }

        // Base-91 output is ASCII, so any byte index is a char boundary.
        let encoded = &compressed.encoded_text;
        let (head, tail) = encoded.split_at(encoded.len().div_ceil(2));
        primary.second_segment = Some(true);
        primary.payload = Some(head.to_string());
        let secondary = SecondaryRecord::new(tail);

        let primary_json = primary.to_json()?;
        let secondary_json = secondary.to_json()?;
        let largest = primary_json.len().max(secondary_json.len());
        if largest > budget {
            return Err(CoreError::DocumentTooLarge {
                size: largest,
                budget,
                segments: 2,
            });
        }

        debug!(
            single = single_json.len(),
            primary = primary_json.len(),
            secondary = secondary_json.len(),
            budget,
            "placed in two slots"
        );
        Ok(Placement {
            document,
            compressed,
            primary,
            secondary: Some(secondary),
            primary_json,
            secondary_json: Some(secondary_json),
        })
    }

    /// Decodes the document held by `primary` and, when flagged,
    /// `secondary`.
    ///
    /// # Errors
    ///
    /// See [`Transport::assemble`]; decode failures surface as
    /// [`CoreError::Codec`].
    pub fn reconstruct(
        &self,
        primary: &StorageRecord,
        secondary: Option<&SecondaryRecord>,
    ) -> CoreResult<String> {
        let encoded = self.assemble(primary, secondary)?;
        Ok(decompress_with(self.compressor.as_ref(), &encoded)?)
    }

    /// Rebuilds the full encoded payload without decoding it.
    ///
    /// A record without the second-segment flag is complete and any
    /// secondary record is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingPayload`] if the primary record has no
    /// payload, or [`CoreError::PartialData`] if it is flagged as split and
    /// the secondary record is missing or empty.
    pub fn assemble(
        &self,
        primary: &StorageRecord,
        secondary: Option<&SecondaryRecord>,
    ) -> CoreResult<String> {
        let head = primary.payload().ok_or(CoreError::MissingPayload)?;
        if !primary.has_second_segment() {
            return Ok(head.to_string());
        }

        let tail = secondary
            .map(|s| s.payload.as_str())
            .filter(|p| !p.is_empty())
            .ok_or_else(|| CoreError::PartialData {
                slot: self.config.secondary_slot.clone(),
            })?;

        let mut encoded = String::with_capacity(head.len() + tail.len());
        encoded.push_str(head);
        encoded.push_str(tail);
        Ok(encoded)
    }
}
