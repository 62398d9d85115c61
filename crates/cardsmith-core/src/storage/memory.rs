//! In-memory archive sink.

use super::{DeckSink, StorageError, StorageResult};
use crate::assets::BoxFuture;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory sink for testing and ephemeral use.
#[derive(Default)]
pub struct MemorySink {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemorySink {
    /// Create a new empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes saved under `filename`, if any.
    pub fn get(&self, filename: &str) -> Option<Vec<u8>> {
        self.files.read().ok()?.get(filename).cloned()
    }

    /// Filenames saved so far.
    pub fn filenames(&self) -> Vec<String> {
        self.files
            .read()
            .map(|files| files.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl DeckSink for MemorySink {
    fn save(&self, filename: &str, bytes: &[u8]) -> BoxFuture<'_, StorageResult<()>> {
        let filename = filename.to_string();
        let bytes = bytes.to_vec();
        Box::pin(async move {
            let mut files = self.files.write().map_err(|e| {
                StorageError::Other(format!("Lock error: {}", e))
            })?;
            files.insert(filename, bytes);
            Ok(())
        })
    }
}
