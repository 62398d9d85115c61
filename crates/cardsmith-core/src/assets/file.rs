//! Filesystem-backed asset resolver for native platforms.

use super::{AssetError, AssetResolver, AssetResult, BoxFuture, ImageFormat, ResolvedAsset, ASSET_SCHEME};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Resolves `asset://<relative path>` references against a directory.
pub struct FileAssetResolver {
    base_path: PathBuf,
}

impl FileAssetResolver {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }

    /// Map a reference to a path inside the base directory. References that
    /// would escape it are rejected.
    fn asset_path(&self, reference: &str) -> Option<PathBuf> {
        let relative = Path::new(reference.strip_prefix(ASSET_SCHEME)?);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        safe.then(|| self.base_path.join(relative))
    }
}

impl AssetResolver for FileAssetResolver {
    fn handles(&self, reference: &str) -> bool {
        reference.starts_with(ASSET_SCHEME)
    }

    fn resolve(&self, reference: &str) -> BoxFuture<'_, AssetResult<ResolvedAsset>> {
        let path = self.asset_path(reference);
        let reference = reference.to_string();

        Box::pin(async move {
            let path = path.ok_or_else(|| AssetError::NotFound(reference.clone()))?;
            if !path.exists() {
                return Err(AssetError::NotFound(reference));
            }
            let bytes = fs::read(&path)
                .map_err(|e| AssetError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
            let mime = path
                .extension()
                .and_then(|e| e.to_str())
                .and_then(ImageFormat::from_extension)
                .map(|f| f.mime_type().to_string());
            Ok(ResolvedAsset::new(bytes, mime))
        })
    }
}
