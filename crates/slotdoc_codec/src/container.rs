//! Compressed-document container: gzip wrapped in base-91 text.

use crate::base91;
use crate::compressor::{Compressor, GzipCompressor};
use crate::error::{CodecError, CodecResult};
use serde::{Deserialize, Serialize};

/// Text encoding tag written into every record.
pub const ENCODING_TAG: &str = "base91";

/// The self-describing result of compressing a document.
///
/// `compressed_byte_length` is the size of the gzip buffer before text
/// encoding. Base-91 preserves bit content, not byte length, so it cannot
/// be recovered from `encoded_text.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressedRecord {
    /// The base-91 text.
    pub encoded_text: String,
    /// UTF-8 byte length of the source document.
    pub original_byte_length: usize,
    /// Byte length of the compressed buffer.
    pub compressed_byte_length: usize,
    /// Text encoding tag (always [`ENCODING_TAG`] when written by this crate).
    pub encoding: String,
    /// Compression algorithm tag.
    pub algo: String,
}

impl CompressedRecord {
    /// Ratio of encoded text length to original byte length.
    pub fn expansion_ratio(&self) -> f64 {
        if self.original_byte_length == 0 {
            return 0.0;
        }
        self.encoded_text.len() as f64 / self.original_byte_length as f64
    }

    /// Restore the document using the default gzip compressor.
    ///
    /// # Errors
    ///
    /// Fails if the tags name a format this build cannot read, or if the
    /// payload does not decompress to UTF-8 text.
    pub fn decompress(&self) -> CodecResult<String> {
        self.decompress_with(&GzipCompressor::new())
    }

    /// Restore the document with an explicit compressor.
    ///
    /// # Errors
    ///
    /// Same as [`CompressedRecord::decompress`].
    pub fn decompress_with(&self, compressor: &dyn Compressor) -> CodecResult<String> {
        if self.encoding != ENCODING_TAG || self.algo != compressor.algorithm() {
            return Err(CodecError::UnsupportedFormat {
                encoding: self.encoding.clone(),
                algo: self.algo.clone(),
            });
        }
        decompress_with(compressor, &self.encoded_text)
    }
}

/// Compress `text` with gzip and encode it as base-91.
///
/// # Errors
///
/// Returns an error only if the compressor fails.
pub fn compress(text: &str) -> CodecResult<CompressedRecord> {
    compress_with(&GzipCompressor::new(), text)
}

/// Compress `text` with an explicit compressor.
///
/// # Errors
///
/// Returns an error only if the compressor fails.
pub fn compress_with(compressor: &dyn Compressor, text: &str) -> CodecResult<CompressedRecord> {
    let raw = text.as_bytes();
    let packed = compressor.compress(raw)?;
    Ok(CompressedRecord {
        encoded_text: base91::encode(&packed),
        original_byte_length: raw.len(),
        compressed_byte_length: packed.len(),
        encoding: ENCODING_TAG.to_string(),
        algo: compressor.algorithm().to_string(),
    })
}

/// Decode base-91 text and decompress it back to the document.
///
/// # Errors
///
/// Returns [`CodecError::DecompressionFailed`] if the text was not produced
/// by [`compress`] (the lenient base-91 layer turns it into garbage bytes,
/// which gzip then rejects), or [`CodecError::InvalidUtf8`].
pub fn decompress(encoded: &str) -> CodecResult<String> {
    decompress_with(&GzipCompressor::new(), encoded)
}

/// Decode and decompress with an explicit compressor.
///
/// # Errors
///
/// Same as [`decompress`].
pub fn decompress_with(compressor: &dyn Compressor, encoded: &str) -> CodecResult<String> {
    let packed = base91::decode(encoded);
    let raw = compressor.decompress(&packed)?;
    String::from_utf8(raw).map_err(|_| CodecError::InvalidUtf8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Stores bytes as-is so decoded output can be steered in tests.
    struct Identity;

    impl Compressor for Identity {
        fn algorithm(&self) -> &'static str {
            "identity"
        }

        fn compress(&self, data: &[u8]) -> CodecResult<Vec<u8>> {
            Ok(data.to_vec())
        }

        fn decompress(&self, data: &[u8]) -> CodecResult<Vec<u8>> {
            Ok(data.to_vec())
        }
    }

    #[test]
    fn record_lengths() {
        let text = "[\n  {\n    \"id\": \"imp\"\n  }\n]";
        let record = compress(text).unwrap();
        assert_eq!(record.original_byte_length, text.len());
        assert_eq!(
            record.compressed_byte_length,
            base91::decode(&record.encoded_text).len()
        );
        assert_eq!(record.encoding, "base91");
        assert_eq!(record.algo, "gzip");
    }

    #[test]
    fn record_serializes_camel_case() {
        let record = compress("x").unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("encodedText").is_some());
        assert!(json.get("originalByteLength").is_some());
        assert!(json.get("compressedByteLength").is_some());
    }

    #[test]
    fn foreign_text_is_an_explicit_failure() {
        let err = decompress("NotProducedByTheEncoder").unwrap_err();
        assert!(matches!(err, CodecError::DecompressionFailed { .. }));
    }

    #[test]
    fn invalid_utf8_is_reported() {
        let encoded = base91::encode(&[0xff, 0xfe, 0xfd]);
        assert_eq!(
            decompress_with(&Identity, &encoded),
            Err(CodecError::InvalidUtf8)
        );
    }

    #[test]
    fn record_rejects_unknown_tags() {
        let mut record = compress("abc").unwrap();
        record.algo = "brotli".into();
        assert!(matches!(
            record.decompress(),
            Err(CodecError::UnsupportedFormat { .. })
        ));

        let mut record = compress("abc").unwrap();
        record.encoding = "base64".into();
        assert!(record.decompress().is_err());
    }

    #[test]
    fn record_decompress_matches_free_function() {
        let record = compress_with(&Identity, "plain").unwrap();
        assert_eq!(record.algo, "identity");
        assert_eq!(record.decompress_with(&Identity).unwrap(), "plain");
    }

    proptest! {
        #[test]
        fn text_roundtrip(text in ".{0,400}") {
            let record = compress(&text).unwrap();
            prop_assert_eq!(decompress(&record.encoded_text).unwrap(), text);
        }
    }
}
