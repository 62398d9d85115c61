//! File-based archive sink for native platforms.

use super::{DeckSink, StorageError, StorageResult};
use crate::assets::BoxFuture;
use std::fs;
use std::path::PathBuf;

/// Writes archives into a directory.
pub struct FileSink {
    /// Directory receiving archives.
    base_path: PathBuf,
}

impl FileSink {
    /// Create a sink writing into `base_path`.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create output directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Sink writing to the user's downloads folder, or the home directory
    /// when there is none.
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::download_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;
        Self::new(base)
    }

    /// Path an archive with this filename is written to.
    pub fn path_for(&self, filename: &str) -> PathBuf {
        let safe: String = filename
            .chars()
            .map(|c| if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') { c } else { '_' })
            .collect();
        self.base_path.join(safe)
    }

    /// Get the base path.
    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }
}

impl DeckSink for FileSink {
    fn save(&self, filename: &str, bytes: &[u8]) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.path_for(filename);
        let bytes = bytes.to_vec();

        Box::pin(async move {
            fs::write(&path, bytes).map_err(|e| {
                StorageError::Io(format!("Failed to write {}: {}", path.display(), e))
            })?;
            log::info!("Saved deck archive to {}", path.display());
            Ok(())
        })
    }
}
