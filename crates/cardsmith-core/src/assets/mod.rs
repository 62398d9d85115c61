//! Image payloads and the external services that produce them.
//!
//! Card fields hold images either inline as `data:` URLs or as opaque
//! references that only the host can resolve. The core never fetches
//! anything itself; it goes through [`AssetResolver`] and [`ColorSampler`].

mod color;
mod format;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use color::{seed_background_color, ColorSampler, FALLBACK_BACKGROUND};
pub use format::{ImageFormat, OCTET_STREAM};

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileAssetResolver;

use base64::{engine::general_purpose::STANDARD, Engine};
use percent_encoding::percent_decode_str;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Scheme used for host-resolved asset references.
pub const ASSET_SCHEME: &str = "asset://";

/// Asset errors.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Asset not found: {0}")]
    NotFound(String),
    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Asset error: {0}")]
    Other(String),
}

/// Result type for asset operations.
pub type AssetResult<T> = Result<T, AssetError>;

/// Boxed future for host callbacks. The editor is single-threaded, so no
/// `Send` bound is required.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Raw bytes of an image plus the MIME type, when the source knows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    pub bytes: Vec<u8>,
    pub mime: Option<String>,
}

impl ResolvedAsset {
    pub fn new(bytes: Vec<u8>, mime: Option<String>) -> Self {
        Self { bytes, mime }
    }

    /// Best-known format: declared MIME first, then magic bytes.
    pub fn format(&self) -> Option<ImageFormat> {
        self.mime
            .as_deref()
            .and_then(ImageFormat::from_mime)
            .or_else(|| ImageFormat::from_magic_bytes(&self.bytes))
    }
}

/// Host capability that turns an opaque image reference into bytes.
pub trait AssetResolver {
    /// Whether `reference` is something this resolver understands.
    fn handles(&self, reference: &str) -> bool;

    /// Fetch the bytes behind `reference`.
    fn resolve(&self, reference: &str) -> BoxFuture<'_, AssetResult<ResolvedAsset>>;
}

/// Resolver for decks that only contain inline images.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAssets;

impl AssetResolver for NoAssets {
    fn handles(&self, _reference: &str) -> bool {
        false
    }

    fn resolve(&self, reference: &str) -> BoxFuture<'_, AssetResult<ResolvedAsset>> {
        let reference = reference.to_string();
        Box::pin(async move { Err(AssetError::NotFound(reference)) })
    }
}

/// In-memory resolver for `asset://` references.
#[derive(Debug, Default)]
pub struct MemoryAssetResolver {
    assets: HashMap<String, ResolvedAsset>,
}

impl MemoryAssetResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an asset under `asset://<name>` and return the reference.
    pub fn insert(&mut self, name: &str, asset: ResolvedAsset) -> String {
        let reference = format!("{}{}", ASSET_SCHEME, name);
        self.assets.insert(reference.clone(), asset);
        reference
    }
}

impl AssetResolver for MemoryAssetResolver {
    fn handles(&self, reference: &str) -> bool {
        reference.starts_with(ASSET_SCHEME)
    }

    fn resolve(&self, reference: &str) -> BoxFuture<'_, AssetResult<ResolvedAsset>> {
        let result = self
            .assets
            .get(reference)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(reference.to_string()));
        Box::pin(async move { result })
    }
}

/// A decoded `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl DataUrl {
    pub fn new(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            bytes,
        }
    }

    /// Whether `value` is an inline image.
    pub fn is_image(value: &str) -> bool {
        value.starts_with("data:image/")
    }

    /// Decode a `data:[<mime>][;<param>]*[;base64],<payload>` URL. Payloads
    /// without the base64 marker are percent-decoded. Media type parameters
    /// such as `charset` are dropped.
    pub fn parse(value: &str) -> AssetResult<Self> {
        let invalid = |reason: &str| AssetError::InvalidDataUrl(reason.to_string());
        let rest = value.strip_prefix("data:").ok_or_else(|| invalid("missing data: prefix"))?;
        let (header, payload) = rest.split_once(',').ok_or_else(|| invalid("missing payload separator"))?;

        let (mime, is_base64) = match header.strip_suffix(";base64") {
            Some(mime) => (mime, true),
            None => (header, false),
        };
        let mime = mime.split(';').next().unwrap_or_default().trim();
        let mime = if mime.is_empty() { "text/plain" } else { mime };

        let bytes = if is_base64 {
            STANDARD
                .decode(payload.trim())
                .map_err(|e| AssetError::InvalidDataUrl(e.to_string()))?
        } else {
            percent_decode_str(payload).collect()
        };
        Ok(Self::new(mime, bytes))
    }

    /// Encode as a base64 `data:` URL.
    pub fn encode(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }

    /// Encode `bytes` as a data URL for an archive path, inferring the MIME
    /// type from its extension or, failing that, its contents.
    pub fn for_attachment(path: &str, bytes: Vec<u8>) -> Self {
        let format = path
            .rsplit_once('.')
            .and_then(|(_, ext)| ImageFormat::from_extension(ext))
            .or_else(|| ImageFormat::from_magic_bytes(&bytes));
        let mime = format.map(|f| f.mime_type()).unwrap_or(OCTET_STREAM);
        Self::new(mime, bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url_roundtrip() {
        let url = DataUrl::new("image/png", vec![0x89, 0x50, 0x4E, 0x47, 1, 2, 3]);
        let encoded = url.encode();
        assert!(encoded.starts_with("data:image/png;base64,"));
        assert!(DataUrl::is_image(&encoded));
        assert_eq!(DataUrl::parse(&encoded).unwrap(), url);
    }

    #[test]
    fn test_data_url_plain_payload() {
        let url = DataUrl::parse("data:image/svg+xml,<svg/>").unwrap();
        assert_eq!(url.mime, "image/svg+xml");
        assert_eq!(url.bytes, b"<svg/>");
    }

    #[test]
    fn test_data_url_percent_encoded_payload() {
        let url = DataUrl::parse(
            "data:image/svg+xml;charset=utf-8,%3Csvg%20xmlns%3D%22http%3A%2F%2Fwww.w3.org%2F2000%2Fsvg%22%2F%3E",
        )
        .unwrap();
        assert_eq!(url.mime, "image/svg+xml");
        assert_eq!(url.bytes, br#"<svg xmlns="http://www.w3.org/2000/svg"/>"#);
    }

    #[test]
    fn test_data_url_rejects_garbage() {
        assert!(matches!(DataUrl::parse("hello"), Err(AssetError::InvalidDataUrl(_))));
        assert!(matches!(DataUrl::parse("data:image/png;base64"), Err(AssetError::InvalidDataUrl(_))));
        assert!(matches!(
            DataUrl::parse("data:image/png;base64,@@@"),
            Err(AssetError::InvalidDataUrl(_))
        ));
    }

    #[test]
    fn test_attachment_mime() {
        assert_eq!(DataUrl::for_attachment("images/0-art.jpg", vec![1]).mime, "image/jpeg");
        assert_eq!(DataUrl::for_attachment("images/0-art.bin", b"GIF89a".to_vec()).mime, "image/gif");
        assert_eq!(DataUrl::for_attachment("images/0-art", vec![0, 1]).mime, OCTET_STREAM);
    }

    #[test]
    fn test_memory_resolver() {
        let mut resolver = MemoryAssetResolver::new();
        let reference = resolver.insert("logo", ResolvedAsset::new(vec![1, 2, 3], Some("image/png".into())));
        assert!(resolver.handles(&reference));
        assert!(!resolver.handles("Some text"));

        let asset = pollster::block_on(resolver.resolve(&reference)).unwrap();
        assert_eq!(asset.bytes, vec![1, 2, 3]);
        assert_eq!(asset.format(), Some(ImageFormat::Png));

        let missing = pollster::block_on(resolver.resolve("asset://nope"));
        assert!(matches!(missing, Err(AssetError::NotFound(_))));
    }

    #[test]
    fn test_no_assets() {
        assert!(!NoAssets.handles("asset://x"));
        assert!(pollster::block_on(NoAssets.resolve("asset://x")).is_err());
    }
}
