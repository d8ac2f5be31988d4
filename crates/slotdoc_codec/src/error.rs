//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while compressing or restoring a document.
///
/// The base-91 layer itself never fails; every error here comes from the
/// compression primitive or from interpreting its output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The compressor could not produce output.
    #[error("compression failed: {message}")]
    CompressionFailed {
        /// Description of the compression error.
        message: String,
    },

    /// The payload is not a stream produced by the matching compressor.
    #[error("decompression failed: {message}")]
    DecompressionFailed {
        /// Description of the decompression error.
        message: String,
    },

    /// The decompressed bytes are not valid UTF-8.
    #[error("decoded document is not valid UTF-8")]
    InvalidUtf8,

    /// A record names an encoding or algorithm this build cannot read.
    #[error("unsupported record format: encoding={encoding}, algo={algo}")]
    UnsupportedFormat {
        /// Text encoding tag found in the record.
        encoding: String,
        /// Compression algorithm tag found in the record.
        algo: String,
    },
}

impl CodecError {
    /// Create a compression failed error.
    pub fn compression_failed(message: impl Into<String>) -> Self {
        Self::CompressionFailed {
            message: message.into(),
        }
    }

    /// Create a decompression failed error.
    pub fn decompression_failed(message: impl Into<String>) -> Self {
        Self::DecompressionFailed {
            message: message.into(),
        }
    }
}
