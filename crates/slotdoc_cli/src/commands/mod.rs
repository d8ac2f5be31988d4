//! CLI command implementations.

pub mod compress;
pub mod decode;
pub mod encode;
pub mod inspect;
pub mod load;
pub mod publish;
pub mod saved;

use slotdoc_core::{ConfigSession, CoreError, TransportConfig};
use slotdoc_store::{DirSlotStore, FileLocalCache, StoreError};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

/// Errors reported by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A core operation failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Opening or reading a store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A codec operation failed.
    #[error("codec error: {0}")]
    Codec(#[from] slotdoc_codec::CodecError),

    /// Output could not be rendered as JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The input was not UTF-8 text.
    #[error("input is not valid UTF-8")]
    NotUtf8,

    /// Nothing is published and there is no local copy.
    #[error("nothing has been published to {0}")]
    NothingPublished(String),

    /// A saved document does not exist.
    #[error("no saved document named {0:?}")]
    UnknownSaved(String),
}

/// Directory holding the slot files.
pub fn slot_dir(dir: &Path) -> PathBuf {
    dir.join("slots")
}

/// File backing the local fallback cache.
pub fn local_cache_path(dir: &Path) -> PathBuf {
    dir.join("local.json")
}

/// Opens the local fallback cache under `dir`.
pub fn open_local(dir: &Path) -> CliResult<Arc<FileLocalCache>> {
    Ok(Arc::new(FileLocalCache::open(&local_cache_path(dir))?))
}

/// Opens a session over the slot files and local cache under `dir`.
pub fn open_session(dir: &Path, config: TransportConfig) -> CliResult<ConfigSession> {
    let store = Arc::new(DirSlotStore::open(&slot_dir(dir))?);
    Ok(ConfigSession::new(config, store, open_local(dir)?))
}

/// Reads `input`, or stdin when it is `None` or `-`.
pub fn read_input(input: Option<&Path>) -> CliResult<Vec<u8>> {
    match input {
        Some(path) if path != Path::new("-") => Ok(std::fs::read(path)?),
        _ => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Reads `input` as UTF-8 text.
pub fn read_text(input: Option<&Path>) -> CliResult<String> {
    String::from_utf8(read_input(input)?).map_err(|_| CliError::NotUtf8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn layout_under_dir() {
        let dir = Path::new("/tmp/slotdoc");
        assert_eq!(slot_dir(dir), Path::new("/tmp/slotdoc/slots"));
        assert_eq!(local_cache_path(dir), Path::new("/tmp/slotdoc/local.json"));
    }

    #[test]
    fn reads_file_input() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.json");
        std::fs::write(&path, "[]").unwrap();
        assert_eq!(read_text(Some(path.as_path())).unwrap(), "[]");

        std::fs::write(&path, [0xff, 0xfe]).unwrap();
        assert!(matches!(read_text(Some(path.as_path())), Err(CliError::NotUtf8)));
    }
}
