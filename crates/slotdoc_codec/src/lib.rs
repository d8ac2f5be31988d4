//! # slotdoc Codec
//!
//! Storable text encoding for slotdoc.
//!
//! This crate turns a UTF-8 document into a compact string made only of
//! printable characters, and back:
//!
//! ```text
//! text → UTF-8 bytes → gzip → base-91 text
//! ```
//!
//! ## Components
//!
//! - [`base91`] - bit-packing codec over a fixed 91-symbol alphabet
//! - [`CompressedRecord`] - self-describing result of [`compress`]
//! - [`fingerprint`] - order-sensitive change detector
//!
//! ## Lenient decode
//!
//! [`base91::decode`] silently skips characters outside the alphabet.
//! Only text produced by [`base91::encode`] is guaranteed to round-trip;
//! any other input still decodes to *some* bytes. Stray characters added by
//! transport layers (whitespace, line breaks) are therefore harmless, while
//! real corruption is caught one level up when gzip rejects the stream.
//!
//! ## Usage
//!
//! ```
//! use slotdoc_codec::{compress, decompress};
//!
//! let record = compress("[{\"id\":\"imp\"}]").unwrap();
//! assert_eq!(record.encoding, "base91");
//! assert_eq!(decompress(&record.encoded_text).unwrap(), "[{\"id\":\"imp\"}]");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod base91;
mod compressor;
mod container;
mod error;
mod fingerprint;

pub use compressor::{Compressor, GzipCompressor};
pub use container::{
    compress, compress_with, decompress, decompress_with, CompressedRecord, ENCODING_TAG,
};
pub use error::{CodecError, CodecResult};
pub use fingerprint::{fingerprint, utf16_len};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_short_document() {
        let text = "[{\"id\":\"imp\"},{\"id\":\"washerwoman\"}]";
        let record = compress(text).unwrap();
        assert_eq!(decompress(&record.encoded_text).unwrap(), text);
    }

    #[test]
    fn roundtrip_non_ascii_document() {
        let text = "[{\"id\":\"洗衣婦\",\"name\":\"Lavandière 🧺\"}]";
        let record = compress(text).unwrap();
        assert_eq!(record.original_byte_length, text.len());
        assert_eq!(decompress(&record.encoded_text).unwrap(), text);
    }

    #[test]
    fn roundtrip_empty_document() {
        let record = compress("").unwrap();
        assert_eq!(record.original_byte_length, 0);
        assert!(!record.encoded_text.is_empty());
        assert_eq!(decompress(&record.encoded_text).unwrap(), "");
    }
}
