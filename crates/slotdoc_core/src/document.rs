//! Document validation and normalization.
//!
//! A document is a JSON array of objects, each with a truthy `id`. The
//! normalized form is the 2-space pretty print of the parsed value with
//! member order preserved, so the same input always yields the same text
//! (and therefore the same fingerprint). Members whose names are array
//! indices ("0", "17", ...) come first in ascending order, which is where
//! JavaScript engines enumerate them.

use crate::error::{CoreError, CoreResult};
use serde_json::Value;
use slotdoc_codec::{fingerprint, utf16_len};

/// A validated document in normalized text form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDocument {
    text: String,
    entries: usize,
}

impl NormalizedDocument {
    /// The normalized text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of elements in the top-level array.
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Change fingerprint of the normalized text.
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.text)
    }

    /// Length in UTF-16 code units, as recorded in slot records.
    pub fn length(&self) -> usize {
        utf16_len(&self.text)
    }

    /// Consumes the document and returns its text.
    pub fn into_string(self) -> String {
        self.text
    }
}

impl AsRef<str> for NormalizedDocument {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

/// Validates `raw` and returns its normalized form.
///
/// # Errors
///
/// Returns [`CoreError::MalformedDocument`] if the trimmed input is empty,
/// is not JSON, is not an array, or has an element that is not an object
/// with a truthy `id` (the error names the first such element, 1-based).
pub fn normalize(raw: &str) -> CoreResult<NormalizedDocument> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CoreError::malformed("document is empty"));
    }

    let mut parsed: Value = serde_json::from_str(trimmed)
        .map_err(|e| CoreError::malformed(format!("document is not valid JSON: {e}")))?;

    let Value::Array(items) = &parsed else {
        return Err(CoreError::malformed("document must be a JSON array"));
    };

    if let Some(index) = items.iter().position(|item| !has_truthy_id(item)) {
        return Err(CoreError::malformed(format!(
            "entry {} is missing an id",
            index + 1
        )));
    }
    let entries = items.len();

    order_index_keys(&mut parsed);
    let text = serde_json::to_string_pretty(&parsed)
        .map_err(|e| CoreError::malformed(format!("document cannot be serialized: {e}")))?;

    Ok(NormalizedDocument { text, entries })
}

/// Moves array-index member names ahead of the rest, ascending.
fn order_index_keys(value: &mut Value) {
    match value {
        Value::Array(items) => items.iter_mut().for_each(order_index_keys),
        Value::Object(map) => {
            let mut members: Vec<(String, Value)> = std::mem::take(map).into_iter().collect();
            for (_, member) in &mut members {
                order_index_keys(member);
            }
            members.sort_by_key(|(name, _)| match array_index(name) {
                Some(index) => (0, index),
                None => (1, 0),
            });
            *map = members.into_iter().collect();
        }
        _ => {}
    }
}

/// Parses a canonical array index: decimal, no leading zeros, below 2^32 - 1.
fn array_index(name: &str) -> Option<u32> {
    if name.is_empty()
        || !name.bytes().all(|b| b.is_ascii_digit())
        || (name.len() > 1 && name.starts_with('0'))
    {
        return None;
    }
    name.parse::<u32>().ok().filter(|&index| index != u32::MAX)
}

fn has_truthy_id(item: &Value) -> bool {
    item.as_object()
        .and_then(|object| object.get("id"))
        .is_some_and(is_truthy)
}

/// JavaScript truthiness, which existing documents were validated against.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
