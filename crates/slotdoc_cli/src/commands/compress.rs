//! Compress command implementation.

use super::{read_text, CliResult};
use serde::Serialize;
use slotdoc_codec::{compress, fingerprint, utf16_len};
use std::path::Path;

/// Compression diagnostics for one document.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressReport {
    /// UTF-8 byte length of the input.
    pub original_byte_length: usize,
    /// Length in UTF-16 code units.
    pub utf16_length: usize,
    /// gzip output size.
    pub compressed_byte_length: usize,
    /// Base-91 text length.
    pub encoded_length: usize,
    /// Encoded length over original length.
    pub expansion_ratio: f64,
    /// Text encoding tag.
    pub encoding: String,
    /// Compression algorithm tag.
    pub algo: String,
    /// Change fingerprint of the input.
    pub fingerprint: String,
    /// The encoded text, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoded_text: Option<String>,
}

/// Builds the report for `text`.
pub fn analyze(text: &str, with_text: bool) -> CliResult<CompressReport> {
    let record = compress(text)?;
    Ok(CompressReport {
        original_byte_length: record.original_byte_length,
        utf16_length: utf16_len(text),
        compressed_byte_length: record.compressed_byte_length,
        encoded_length: record.encoded_text.len(),
        expansion_ratio: record.expansion_ratio(),
        fingerprint: fingerprint(text),
        encoding: record.encoding,
        algo: record.algo,
        encoded_text: with_text.then_some(record.encoded_text),
    })
}

/// Runs the compress command.
pub fn run(input: Option<&Path>, with_text: bool) -> CliResult<()> {
    let text = read_text(input)?;
    let report = analyze(&text, with_text)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
