//! Destinations for finished deck archives.
//!
//! In the browser this is a client-side download; natively it is a file in
//! a directory. Either way the core only hands over bytes and a filename.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use memory::MemorySink;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileSink;

use crate::assets::BoxFuture;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Host capability for saving a finished archive.
pub trait DeckSink {
    /// Persist `bytes` under `filename`, replacing any previous file.
    fn save(&self, filename: &str, bytes: &[u8]) -> BoxFuture<'_, StorageResult<()>>;
}

/// Reduce a deck name to a safe archive filename (`<name>.zip`).
pub fn archive_filename(deck_name: &str) -> String {
    let safe: String = deck_name
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if safe.is_empty() {
        "deck.zip".to_string()
    } else {
        format!("{}.zip", safe)
    }
}
