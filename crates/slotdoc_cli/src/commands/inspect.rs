//! Inspect command implementation.

use super::{slot_dir, CliResult};
use serde::Serialize;
use slotdoc_codec::fingerprint;
use slotdoc_core::{CoreError, SecondaryRecord, StorageRecord, Transport, TransportConfig};
use slotdoc_store::{DirSlotStore, SlotStore};
use std::path::Path;

/// Slot inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Slot directory.
    pub path: String,
    /// Per-slot byte budget.
    pub budget: usize,
    /// Primary slot.
    pub primary: SlotStats,
    /// Secondary slot.
    pub secondary: SlotStats,
    /// Selected document name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<String>,
    /// Custom document name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_name: Option<String>,
    /// Version stamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
    /// Whether the primary record is flagged as split.
    pub segmented: bool,
    /// Outcome of decoding and checking the fingerprint.
    pub status: DocumentStatus,
}

/// Size information for one slot.
#[derive(Debug, Default, Serialize)]
pub struct SlotStats {
    /// Slot name.
    pub slot: String,
    /// Whether the slot has content.
    pub present: bool,
    /// Serialized content size in bytes.
    pub bytes: usize,
    /// Length of the encoded payload segment it carries.
    pub payload_len: usize,
    /// Whether the content fits the budget.
    pub within_budget: bool,
}

/// What decoding the slots produced.
#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "detail")]
pub enum DocumentStatus {
    /// Nothing has been published.
    Empty,
    /// A built-in selection; there is no document to decode.
    Builtin,
    /// Decoded, and the fingerprint matches.
    Ok,
    /// Decoded, but the fingerprint differs from the record.
    FingerprintMismatch {
        /// Fingerprint stored in the record.
        expected: String,
        /// Fingerprint of the decoded text.
        actual: String,
    },
    /// The record expects a second segment that is missing.
    Partial,
    /// The slots could not be decoded.
    Invalid(String),
}

/// Runs the inspect command.
pub fn run(dir: &Path, config: TransportConfig, format: &str) -> CliResult<()> {
    let store = DirSlotStore::open(&slot_dir(dir))?;
    let result = analyze(&store, &config, &store.dir().display().to_string())?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

/// Reads both slots and checks the document they hold.
pub fn analyze(
    store: &dyn SlotStore,
    config: &TransportConfig,
    path: &str,
) -> CliResult<InspectResult> {
    let budget = config.slot_budget;
    let primary_raw = store.read(&config.primary_slot)?.map(|entry| entry.content);
    let secondary_raw = store.read(&config.secondary_slot)?.map(|entry| entry.content);

    let mut result = InspectResult {
        path: path.to_string(),
        budget,
        primary: slot_stats(&config.primary_slot, primary_raw.as_deref(), budget),
        secondary: slot_stats(&config.secondary_slot, secondary_raw.as_deref(), budget),
        selected: None,
        custom_name: None,
        version: None,
        segmented: false,
        status: DocumentStatus::Empty,
    };

    let Some(primary_raw) = primary_raw else {
        return Ok(result);
    };

    let record = match StorageRecord::from_json(&config.primary_slot, &primary_raw) {
        Ok(record) => record,
        Err(err) => {
            result.status = DocumentStatus::Invalid(err.to_string());
            return Ok(result);
        }
    };
    result.primary.payload_len = record.payload().map_or(0, str::len);
    result.selected = Some(record.selected.clone());
    result.custom_name = record.custom_name.clone();
    result.version = record.version;
    result.segmented = record.has_second_segment();

    let secondary = secondary_raw
        .as_deref()
        .and_then(|raw| SecondaryRecord::from_json(&config.secondary_slot, raw).ok());
    result.secondary.payload_len = secondary.as_ref().map_or(0, |s| s.payload.len());

    if !record.is_custom() {
        result.status = DocumentStatus::Builtin;
        return Ok(result);
    }

    let transport = Transport::new(config.clone());
    result.status = match transport.reconstruct(&record, secondary.as_ref()) {
        Ok(document) => {
            let actual = fingerprint(&document);
            match record.fingerprint {
                Some(expected) if expected != actual => {
                    DocumentStatus::FingerprintMismatch { expected, actual }
                }
                _ => DocumentStatus::Ok,
            }
        }
        Err(CoreError::PartialData { .. }) => DocumentStatus::Partial,
        Err(err) => DocumentStatus::Invalid(err.to_string()),
    };

    Ok(result)
}

fn slot_stats(slot: &str, content: Option<&str>, budget: usize) -> SlotStats {
    let bytes = content.map_or(0, str::len);
    SlotStats {
        slot: slot.to_string(),
        present: content.is_some(),
        bytes,
        payload_len: 0,
        within_budget: bytes <= budget,
    }
}

fn print_text_output(result: &InspectResult) {
    println!("slotdoc Slot Inspection");
    println!("=======================");
    println!();
    println!("Path:   {}", result.path);
    println!("Budget: {} bytes per slot", result.budget);
    println!();
    println!("Slots:");
    for stats in [&result.primary, &result.secondary] {
        if stats.present {
            println!(
                "  {:<12} {:>5} bytes, payload {:>5} chars{}",
                stats.slot,
                stats.bytes,
                stats.payload_len,
                if stats.within_budget { "" } else { "  OVER BUDGET" }
            );
        } else {
            println!("  {:<12} (empty)", stats.slot);
        }
    }

    if let Some(selected) = &result.selected {
        println!();
        println!("Record:");
        println!("  Selected:  {selected}");
        if let Some(name) = &result.custom_name {
            println!("  Name:      {name}");
        }
        if let Some(version) = result.version {
            println!("  Version:   {version}");
        }
        println!("  Segmented: {}", if result.segmented { "yes" } else { "no" });
    }

    println!();
    match &result.status {
        DocumentStatus::Empty => println!("Status: nothing published"),
        DocumentStatus::Builtin => println!("Status: built-in selection"),
        DocumentStatus::Ok => println!("Status: ok, fingerprint matches"),
        DocumentStatus::FingerprintMismatch { expected, actual } => {
            println!("Status: fingerprint mismatch (record {expected}, document {actual})")
        }
        DocumentStatus::Partial => println!("Status: partial, second segment missing"),
        DocumentStatus::Invalid(reason) => println!("Status: invalid, {reason}"),
    }
}
