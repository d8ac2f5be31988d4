//! Generic byte compressor seam.

use crate::error::{CodecError, CodecResult};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{Read, Write};

/// A deterministic, exact-inverse byte compressor.
///
/// The container never looks inside the compressed bytes; it only needs
/// `decompress(compress(x)) == x`. The [`algorithm`](Compressor::algorithm)
/// tag is stored alongside every payload so a different primitive can be
/// introduced later without misreading old data.
pub trait Compressor: Send + Sync {
    /// Tag recorded in `CompressedRecord::algo`.
    fn algorithm(&self) -> &'static str;

    /// Compress `data`.
    ///
    /// # Errors
    ///
    /// Returns an error if the primitive fails to produce a stream.
    fn compress(&self, data: &[u8]) -> CodecResult<Vec<u8>>;

    /// Decompress a stream produced by [`compress`](Compressor::compress).
    ///
    /// # Errors
    ///
    /// Returns an error if `data` is not a complete, valid stream.
    fn decompress(&self, data: &[u8]) -> CodecResult<Vec<u8>>;
}

/// gzip (RFC 1952) via `flate2`.
#[derive(Debug, Clone, Copy)]
pub struct GzipCompressor {
    level: Compression,
}

impl GzipCompressor {
    /// Algorithm tag written into records.
    pub const ALGORITHM: &'static str = "gzip";

    /// Create a compressor at the default level.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a compressor at an explicit level (0-9).
    #[must_use]
    pub fn with_level(level: u32) -> Self {
        Self {
            level: Compression::new(level.min(9)),
        }
    }
}

impl Default for GzipCompressor {
    fn default() -> Self {
        Self {
            level: Compression::default(),
        }
    }
}

impl Compressor for GzipCompressor {
    fn algorithm(&self) -> &'static str {
        Self::ALGORITHM
    }

    fn compress(&self, data: &[u8]) -> CodecResult<Vec<u8>> {
        let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2 + 32), self.level);
        encoder
            .write_all(data)
            .map_err(|e| CodecError::compression_failed(e.to_string()))?;
        encoder
            .finish()
            .map_err(|e| CodecError::compression_failed(e.to_string()))
    }

    fn decompress(&self, data: &[u8]) -> CodecResult<Vec<u8>> {
        if data.is_empty() {
            return Err(CodecError::decompression_failed("empty gzip stream"));
        }
        let mut decoder = GzDecoder::new(data);
        let mut out = Vec::with_capacity(data.len() * 4);
        decoder
            .read_to_end(&mut out)
            .map_err(|e| CodecError::decompression_failed(e.to_string()))?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gzip_roundtrip() {
        let gz = GzipCompressor::new();
        let data = b"role role role role role role".repeat(20);
        let packed = gz.compress(&data).unwrap();
        assert!(packed.len() < data.len());
        // gzip magic
        assert_eq!(&packed[..2], &[0x1f, 0x8b]);
        assert_eq!(gz.decompress(&packed).unwrap(), data);
    }

    #[test]
    fn gzip_is_deterministic() {
        let gz = GzipCompressor::with_level(9);
        let data = b"[{\"id\":\"imp\"}]";
        assert_eq!(gz.compress(data).unwrap(), gz.compress(data).unwrap());
    }

    #[test]
    fn gzip_rejects_foreign_bytes() {
        let gz = GzipCompressor::new();
        assert!(matches!(
            gz.decompress(b"definitely not gzip"),
            Err(CodecError::DecompressionFailed { .. })
        ));
        assert!(gz.decompress(&[]).is_err());
    }

    #[test]
    fn gzip_rejects_truncated_stream() {
        let gz = GzipCompressor::new();
        let packed = gz.compress(&b"truncate me please".repeat(10)).unwrap();
        assert!(gz.decompress(&packed[..packed.len() / 2]).is_err());
    }
}
