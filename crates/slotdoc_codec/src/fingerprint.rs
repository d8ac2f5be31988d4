//! Change fingerprint.
//!
//! A 32-bit polynomial rolling hash over UTF-16 code units, rendered in
//! lowercase hex. It answers "did the document change?" cheaply. It is not
//! collision resistant: two different documents can share a fingerprint,
//! so never use it for integrity or authentication.

/// Compute the fingerprint of `text`.
///
/// `hash = hash * 31 + unit (mod 2^32)` for every UTF-16 code unit.
/// The empty string maps to `"0"`.
pub fn fingerprint(text: &str) -> String {
    let hash = text
        .encode_utf16()
        .fold(0u32, |acc, unit| acc.wrapping_mul(31).wrapping_add(u32::from(unit)));
    format!("{hash:x}")
}

/// Length of `text` in UTF-16 code units.
///
/// Document lengths stored in slot records are measured this way so they
/// agree with readers that count string length in UTF-16.
pub fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}
