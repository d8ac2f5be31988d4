//! Slot record formats.
//!
//! Field names are fixed by the readers already deployed against the slot
//! store and must not change. `compressedBase64` holds base-91 text; the
//! name predates the encoding switch.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

/// `selectedScript` value marking a custom document.
pub const CUSTOM_SELECTION: &str = "__custom__";

/// The record written to the primary slot.
///
/// Built-in selections carry only `selectedScript`, `_timestamp` and
/// `scriptVersion`. Custom documents carry everything. Records are never
/// edited in place; every publish builds a new one.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StorageRecord {
    /// Built-in document name, or [`CUSTOM_SELECTION`].
    #[serde(rename = "selectedScript", default)]
    pub selected: String,

    /// Display name of a custom document.
    #[serde(rename = "customName", default, skip_serializing_if = "Option::is_none")]
    pub custom_name: Option<String>,

    /// Wall-clock time of the publish, in milliseconds since the epoch.
    #[serde(rename = "_timestamp", default, skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<u64>,

    /// Monotonic version stamp.
    #[serde(rename = "scriptVersion", default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,

    /// Fingerprint of the normalized document.
    #[serde(rename = "scriptHash", default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,

    /// Normalized document length in UTF-16 code units.
    #[serde(rename = "customJsonLength", default, skip_serializing_if = "Option::is_none")]
    pub document_length: Option<usize>,

    /// Whether the payload continues in the secondary slot.
    #[serde(rename = "hasGlobalPart", default, skip_serializing_if = "Option::is_none")]
    pub second_segment: Option<bool>,

    /// Encoded payload, or its first segment.
    #[serde(rename = "compressedBase64", default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
}

impl StorageRecord {
    /// Creates a record selecting a built-in document.
    pub fn builtin(name: impl Into<String>, timestamp_ms: u64) -> Self {
        Self {
            selected: name.into(),
            timestamp_ms: Some(timestamp_ms),
            version: Some(timestamp_ms),
            ..Self::default()
        }
    }

    /// Returns true if this record carries a custom document.
    pub fn is_custom(&self) -> bool {
        self.selected == CUSTOM_SELECTION
    }

    /// Returns true if the payload continues in the secondary slot.
    ///
    /// An absent flag means the record is complete.
    pub fn has_second_segment(&self) -> bool {
        self.second_segment.unwrap_or(false)
    }

    /// Returns the encoded payload (or first segment), if any.
    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref().filter(|p| !p.is_empty())
    }

    /// Serializes the record to the JSON stored in a slot.
    ///
    /// # Errors
    ///
    /// Serialization of this type does not fail in practice; the error is
    /// reported as an invalid record for completeness.
    pub fn to_json(&self) -> CoreResult<String> {
        serde_json::to_string(self).map_err(|e| CoreError::InvalidRecord {
            slot: String::new(),
            message: e.to_string(),
        })
    }

    /// Parses slot content read from `slot`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidRecord`] if the content is not a JSON
    /// object of this shape.
    pub fn from_json(slot: &str, content: &str) -> CoreResult<Self> {
        serde_json::from_str(content).map_err(|e| CoreError::InvalidRecord {
            slot: slot.to_string(),
            message: e.to_string(),
        })
    }

    /// Size of the serialized record in bytes.
    ///
    /// # Errors
    ///
    /// See [`StorageRecord::to_json`].
    pub fn serialized_len(&self) -> CoreResult<usize> {
        self.to_json().map(|json| json.len())
    }

    /// The form kept in the local fallback cache.
    ///
    /// Drops the payload. Built-in records also lose every custom-only
    /// field; custom records get explicit defaults so change detection
    /// can compare them field by field.
    pub fn sanitized(&self) -> Self {
        let timestamp_ms = self.timestamp_ms;
        let version = self.version.or(timestamp_ms);
        if !self.is_custom() {
            return Self {
                selected: self.selected.clone(),
                timestamp_ms,
                version,
                ..Self::default()
            };
        }
        Self {
            selected: self.selected.clone(),
            custom_name: Some(self.custom_name.clone().unwrap_or_default()),
            timestamp_ms,
            version,
            fingerprint: self.fingerprint.clone(),
            document_length: self.document_length,
            second_segment: Some(self.has_second_segment()),
            payload: None,
        }
    }
}

/// The record written to the secondary slot: just the second segment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SecondaryRecord {
    /// Second segment of the encoded payload.
    #[serde(rename = "compressedBase64", default)]
    pub payload: String,
}

impl SecondaryRecord {
    /// Creates a secondary record holding `payload`.
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    /// Serializes the record to the JSON stored in a slot.
    ///
    /// # Errors
    ///
    /// See [`StorageRecord::to_json`].
    pub fn to_json(&self) -> CoreResult<String> {
        serde_json::to_string(self).map_err(|e| CoreError::InvalidRecord {
            slot: String::new(),
            message: e.to_string(),
        })
    }

    /// Parses slot content read from `slot`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidRecord`] if the content is not JSON.
    pub fn from_json(slot: &str, content: &str) -> CoreResult<Self> {
        serde_json::from_str(content).map_err(|e| CoreError::InvalidRecord {
            slot: slot.to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom_record() -> StorageRecord {
        StorageRecord {
            selected: CUSTOM_SELECTION.into(),
            custom_name: Some("Trouble Brewing".into()),
            timestamp_ms: Some(1_700_000_000_000),
            version: Some(1_700_000_000_000),
            fingerprint: Some("c21".into()),
            document_length: Some(42),
            second_segment: Some(false),
            payload: Some("GB".into()),
        }
    }

    #[test]
    fn custom_record_wire_shape() {
        let json = custom_record().to_json().unwrap();
        assert_eq!(
            json,
            concat!(
                r#"{"selectedScript":"__custom__","customName":"Trouble Brewing","#,
                r#""_timestamp":1700000000000,"scriptVersion":1700000000000,"#,
                r#""scriptHash":"c21","customJsonLength":42,"hasGlobalPart":false,"#,
                r#""compressedBase64":"GB"}"#
            )
        );
    }

    #[test]
    fn builtin_record_wire_shape() {
        let json = StorageRecord::builtin("trouble_brewing.json", 5).to_json().unwrap();
        assert_eq!(
            json,
            r#"{"selectedScript":"trouble_brewing.json","_timestamp":5,"scriptVersion":5}"#
        );
    }

    #[test]
    fn parses_record_without_flag() {
        let record = StorageRecord::from_json(
            "broadcaster",
            r#"{"selectedScript":"__custom__","compressedBase64":"abc","extra":1}"#,
        )
        .unwrap();
        assert!(record.is_custom());
        assert!(!record.has_second_segment());
        assert_eq!(record.payload(), Some("abc"));
    }

    #[test]
    fn rejects_non_object_content() {
        let err = StorageRecord::from_json("broadcaster", "42").unwrap_err();
        assert!(matches!(err, CoreError::InvalidRecord { ref slot, .. } if slot == "broadcaster"));
    }

    #[test]
    fn empty_payload_counts_as_missing() {
        let mut record = custom_record();
        record.payload = Some(String::new());
        assert!(record.payload().is_none());
    }

    #[test]
    fn sanitized_custom_drops_payload_only() {
        let mut record = custom_record();
        record.second_segment = Some(true);
        let sanitized = record.sanitized();
        assert!(sanitized.payload.is_none());
        assert_eq!(sanitized.fingerprint.as_deref(), Some("c21"));
        assert_eq!(sanitized.second_segment, Some(true));
        assert_eq!(sanitized.custom_name.as_deref(), Some("Trouble Brewing"));
    }

    #[test]
    fn sanitized_builtin_drops_custom_fields() {
        let mut record = StorageRecord::builtin("sects.json", 9);
        record.fingerprint = Some("stale".into());
        record.second_segment = Some(true);
        let sanitized = record.sanitized();
        assert_eq!(sanitized, StorageRecord::builtin("sects.json", 9));
    }

    #[test]
    fn sanitized_fills_version_from_timestamp() {
        let record = StorageRecord {
            selected: CUSTOM_SELECTION.into(),
            timestamp_ms: Some(77),
            ..StorageRecord::default()
        };
        let sanitized = record.sanitized();
        assert_eq!(sanitized.version, Some(77));
        assert_eq!(sanitized.custom_name.as_deref(), Some(""));
        assert_eq!(sanitized.second_segment, Some(false));
    }

    #[test]
    fn secondary_record_shape() {
        let record = SecondaryRecord::new("tail");
        assert_eq!(record.to_json().unwrap(), r#"{"compressedBase64":"tail"}"#);
        assert_eq!(SecondaryRecord::from_json("global", "{}").unwrap().payload, "");
    }
}
