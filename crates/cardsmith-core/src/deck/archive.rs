//! Zip encoding and decoding of decks.

use super::{Deck, DeckError, DeckImport, DeckManifest, DeckResult, DECK_FORMAT_VERSION};
use crate::assets::{AssetResolver, DataUrl, ResolvedAsset};
use crate::document::CardRecord;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::io::{Cursor, Read, Write};
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Name of the manifest entry.
pub const MANIFEST_NAME: &str = "deck.json";

/// Directory holding image attachments.
pub const IMAGES_DIR: &str = "images/";

/// Key of the per-card attachment table inside each manifest card.
const ATTACHMENTS_KEY: &str = "attachments";

/// One image field moved out of a card into the archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Attachment {
    path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mime: Option<String>,
}

/// Encode a deck as a zip archive.
///
/// Inline images are decoded directly; references are fetched through
/// `resolver`. Any failure aborts the export and no bytes are returned.
pub async fn export_deck(deck: &Deck, resolver: &dyn AssetResolver) -> DeckResult<Vec<u8>> {
    match build_archive(deck, resolver).await {
        Ok(bytes) => {
            log::info!(
                "Exported deck '{}' ({} cards, {} bytes)",
                deck.name,
                deck.cards.len(),
                bytes.len()
            );
            Ok(bytes)
        }
        Err(e) => {
            log::error!("Failed to export deck '{}': {}", deck.name, e);
            Err(DeckError::Export(e))
        }
    }
}

async fn build_archive(deck: &Deck, resolver: &dyn AssetResolver) -> Result<Vec<u8>, String> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let mut used_paths = HashSet::new();
    let mut cards = Vec::with_capacity(deck.cards.len());

    for (index, card) in deck.cards.iter().enumerate() {
        let mut card = card.clone();
        let mut attachments = BTreeMap::new();
        for (field_id, value) in card.data.iter_mut() {
            let Some(asset) = load_image(value, resolver)
                .await
                .map_err(|e| format!("card {} field '{}': {}", index, field_id, e))?
            else {
                continue;
            };

            let ext = attachment_extension(&asset);
            let path = unique_path(&mut used_paths, index, field_id, &ext);
            zip.start_file(path.as_str(), entry_options(CompressionMethod::Stored)).map_err(|e| e.to_string())?;
            zip.write_all(&asset.bytes).map_err(|e| e.to_string())?;
            log::debug!("Stored {} ({} bytes)", path, asset.bytes.len());
            let mime = asset
                .mime
                .clone()
                .or_else(|| asset.format().map(|f| f.mime_type().to_string()));
            attachments.insert(field_id.clone(), Attachment { path: path.clone(), mime });
            *value = path;
        }

        let mut record = card.to_record_value().map_err(|e| e.to_string())?;
        if let Some(obj) = record.as_object_mut() {
            let table = serde_json::to_value(&attachments).map_err(|e| e.to_string())?;
            obj.insert(ATTACHMENTS_KEY.to_string(), table);
        }
        cards.push(record);
    }

    let manifest = DeckManifest {
        deck_name: deck.name.clone(),
        version: DECK_FORMAT_VERSION.to_string(),
        style: deck.style.clone(),
        cards,
    };
    let json = serde_json::to_string_pretty(&manifest).map_err(|e| e.to_string())?;
    zip.start_file(MANIFEST_NAME, entry_options(CompressionMethod::Deflated)).map_err(|e| e.to_string())?;
    zip.write_all(json.as_bytes()).map_err(|e| e.to_string())?;

    let cursor = zip.finish().map_err(|e| e.to_string())?;
    Ok(cursor.into_inner())
}

/// Images are already compressed; only the manifest is deflated.
fn entry_options(method: CompressionMethod) -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(method)
}

/// Bytes of an image-bearing field, or `None` for plain content.
async fn load_image(value: &str, resolver: &dyn AssetResolver) -> Result<Option<ResolvedAsset>, String> {
    if value.is_empty() {
        return Ok(None);
    }
    if DataUrl::is_image(value) {
        let url = DataUrl::parse(value).map_err(|e| e.to_string())?;
        return Ok(Some(ResolvedAsset::new(url.bytes, Some(url.mime))));
    }
    if resolver.handles(value) {
        let asset = resolver.resolve(value).await.map_err(|e| e.to_string())?;
        return Ok(Some(asset));
    }
    Ok(None)
}

/// Extension for a stored image: the known format's, else the MIME
/// subtype (`image/bmp` is stored as `.bmp`), else `bin`.
fn attachment_extension(asset: &ResolvedAsset) -> String {
    if let Some(format) = asset.format() {
        return format.extension().to_string();
    }
    let subtype: String = asset
        .mime
        .as_deref()
        .and_then(|mime| mime.split_once('/'))
        .map(|(_, sub)| {
            sub.chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
                .collect()
        })
        .unwrap_or_default();
    if subtype.is_empty() {
        "bin".to_string()
    } else {
        subtype.to_ascii_lowercase()
    }
}

fn unique_path(used: &mut HashSet<String>, index: usize, field_id: &str, ext: &str) -> String {
    let stem: String = field_id
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    let mut path = format!("{}{}-{}.{}", IMAGES_DIR, index, stem, ext);
    let mut n = 2;
    while !used.insert(path.clone()) {
        path = format!("{}{}-{}-{}.{}", IMAGES_DIR, index, stem, n, ext);
        n += 1;
    }
    path
}

/// Whether a field value looks like an archive-relative attachment path.
/// Only consulted for cards written without an attachment table.
fn is_attachment_path(value: &str) -> bool {
    value.len() > IMAGES_DIR.len()
        && value.starts_with(IMAGES_DIR)
        && !value.contains(char::is_whitespace)
        && value.contains('.')
}

/// Decode a zip archive into a deck.
///
/// A missing or unreadable manifest fails the import. A missing attachment
/// only empties the field that referenced it. Fields are restored from each
/// card's attachment table; cards without one (hand-written manifests) fall
/// back to treating `images/...` paths as attachments.
pub fn import_deck(bytes: &[u8]) -> DeckResult<DeckImport> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| DeckError::InvalidArchive(e.to_string()))?;

    let manifest = read_manifest(&mut archive)?;
    if manifest.version != DECK_FORMAT_VERSION {
        log::warn!(
            "Deck '{}' was written with format {}, reading as {}",
            manifest.deck_name,
            manifest.version,
            DECK_FORMAT_VERSION
        );
    }

    let mut missing = Vec::new();
    let mut cards = Vec::with_capacity(manifest.cards.len());
    for (index, mut value) in manifest.cards.into_iter().enumerate() {
        let invalid =
            |e: &dyn std::fmt::Display| DeckError::InvalidManifest(format!("card {}: {}", index, e));
        let attachments: Option<BTreeMap<String, Attachment>> =
            match value.as_object_mut().and_then(|obj| obj.remove(ATTACHMENTS_KEY)) {
                Some(table) => Some(serde_json::from_value(table).map_err(|e| invalid(&e))?),
                None => None,
            };
        let mut card = CardRecord::from_value(value).map_err(|e| invalid(&e))?.migrate();

        for (field_id, value) in card.data.iter_mut() {
            let attachment = match &attachments {
                Some(table) => match table.get(field_id) {
                    Some(attachment) if attachment.path == *value => attachment.clone(),
                    _ => continue,
                },
                None if is_attachment_path(value) => Attachment {
                    path: value.clone(),
                    mime: None,
                },
                None => continue,
            };
            match read_entry(&mut archive, &attachment.path)? {
                Some(bytes) => {
                    let url = match attachment.mime {
                        Some(mime) => DataUrl::new(mime, bytes),
                        None => DataUrl::for_attachment(&attachment.path, bytes),
                    };
                    *value = url.encode();
                }
                None => {
                    log::warn!("Deck archive is missing {}, leaving field empty", attachment.path);
                    value.clear();
                    missing.push(attachment.path);
                }
            }
        }
        cards.push(card);
    }

    log::info!("Imported deck '{}' ({} cards)", manifest.deck_name, cards.len());
    Ok(DeckImport {
        deck: Deck {
            name: manifest.deck_name,
            style: manifest.style,
            cards,
        },
        missing,
    })
}

fn read_manifest<R: Read + std::io::Seek>(archive: &mut ZipArchive<R>) -> DeckResult<DeckManifest> {
    let mut file = match archive.by_name(MANIFEST_NAME) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Err(DeckError::MissingManifest),
        Err(e) => return Err(DeckError::InvalidArchive(e.to_string())),
    };
    let mut json = String::new();
    file.read_to_string(&mut json)
        .map_err(|e| DeckError::InvalidManifest(e.to_string()))?;
    serde_json::from_str(&json).map_err(|e| DeckError::InvalidManifest(e.to_string()))
}

fn read_entry<R: Read + std::io::Seek>(archive: &mut ZipArchive<R>, path: &str) -> DeckResult<Option<Vec<u8>>> {
    let mut file = match archive.by_name(path) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(DeckError::InvalidArchive(e.to_string())),
    };
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| DeckError::InvalidArchive(format!("{}: {}", path, e)))?;
    Ok(Some(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{MemoryAssetResolver, NoAssets};
    use crate::document::CardDocument;
    use crate::transform::TransformValues;
    use serde_json::json;

    const PNG: [u8; 12] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13];

    fn png_url() -> String {
        DataUrl::new("image/png", PNG.to_vec()).encode()
    }

    fn sample_deck() -> Deck {
        let card = CardDocument::new("Goblin")
            .with_field("art", png_url())
            .with_field("flavor", "Sneaky little thing")
            .with_transform("art", TransformValues::new(120.0, 90.0).at(0.0, -30.0).rotated(12.0));
        Deck::new("Starter")
            .with_style(json!({"font": "Serif", "palette": ["#000", "#fff"]}))
            .with_card(card)
    }

    fn archive_entries(bytes: &[u8]) -> Vec<String> {
        let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
        names.sort();
        names
    }

    fn zip_with(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, bytes) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(bytes).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_roundtrip_inline_image() {
        let deck = sample_deck();
        let bytes = pollster::block_on(export_deck(&deck, &NoAssets)).unwrap();
        assert_eq!(archive_entries(&bytes), vec!["deck.json", "images/0-art.png"]);

        let imported = import_deck(&bytes).unwrap();
        assert!(imported.missing.is_empty());
        assert_eq!(imported.deck.name, "Starter");
        assert_eq!(imported.deck.style, deck.style);

        let card = &imported.deck.cards[0];
        let art = DataUrl::parse(card.field("art").unwrap()).unwrap();
        assert_eq!(art.bytes, PNG.to_vec());
        assert_eq!(art.mime, "image/png");
        assert_eq!(card, &deck.cards[0]);
    }

    #[test]
    fn test_manifest_rewrites_image_fields() {
        let bytes = pollster::block_on(export_deck(&sample_deck(), &NoAssets)).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let manifest = read_manifest(&mut archive).unwrap();

        assert_eq!(manifest.deck_name, "Starter");
        assert_eq!(manifest.version, DECK_FORMAT_VERSION);
        assert_eq!(manifest.cards[0]["data"]["art"], "images/0-art.png");
        assert_eq!(manifest.cards[0]["data"]["flavor"], "Sneaky little thing");
        assert_eq!(manifest.cards[0]["transforms"]["art"]["rotate"], 12.0);
        assert_eq!(
            manifest.cards[0]["attachments"],
            json!({"art": {"path": "images/0-art.png", "mime": "image/png"}})
        );
    }

    #[test]
    fn test_export_resolves_references() {
        let mut resolver = MemoryAssetResolver::new();
        let jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0, 1, 2];
        let reference = resolver.insert("portrait", ResolvedAsset::new(jpeg.clone(), None));
        let deck = Deck::new("Refs")
            .with_card(CardDocument::new("A"))
            .with_card(CardDocument::new("B").with_field("portrait", reference));

        let bytes = pollster::block_on(export_deck(&deck, &resolver)).unwrap();
        assert!(archive_entries(&bytes).contains(&"images/1-portrait.jpg".to_string()));

        let imported = import_deck(&bytes).unwrap();
        let portrait = DataUrl::parse(imported.deck.cards[1].field("portrait").unwrap()).unwrap();
        assert_eq!(portrait.mime, "image/jpeg");
        assert_eq!(portrait.bytes, jpeg);
    }

    #[test]
    fn test_export_fails_on_unresolvable_reference() {
        let resolver = MemoryAssetResolver::new();
        let deck = Deck::new("Broken").with_card(CardDocument::new("A").with_field("art", "asset://gone"));
        let err = pollster::block_on(export_deck(&deck, &resolver)).unwrap_err();
        assert!(matches!(err, DeckError::Export(_)));
        assert!(err.to_string().starts_with("failed to export deck"));
    }

    #[test]
    fn test_export_fails_on_corrupt_inline_image() {
        let deck = Deck::new("Broken")
            .with_card(CardDocument::new("A").with_field("art", "data:image/png;base64,###"));
        let err = pollster::block_on(export_deck(&deck, &NoAssets)).unwrap_err();
        assert!(matches!(err, DeckError::Export(_)));
    }

    #[test]
    fn test_colliding_field_names_get_distinct_paths() {
        let deck = Deck::new("Collide").with_card(
            CardDocument::new("A")
                .with_field("art one", png_url())
                .with_field("art_one", png_url()),
        );
        let bytes = pollster::block_on(export_deck(&deck, &NoAssets)).unwrap();
        let entries = archive_entries(&bytes);
        assert_eq!(entries.len(), 3);
        assert!(entries.contains(&"images/0-art_one.png".to_string()));
        assert!(entries.contains(&"images/0-art_one-2.png".to_string()));

        let imported = import_deck(&bytes).unwrap();
        assert_eq!(imported.deck.cards[0], deck.cards[0]);
    }

    #[test]
    fn test_import_missing_manifest() {
        let bytes = zip_with(&[("images/0-art.png", &PNG[..])]);
        let err = import_deck(&bytes).unwrap_err();
        assert!(matches!(err, DeckError::MissingManifest));
        assert_eq!(err.to_string(), "invalid deck file: missing manifest");
    }

    #[test]
    fn test_import_not_a_zip() {
        assert!(matches!(import_deck(b"definitely not a zip"), Err(DeckError::InvalidArchive(_))));
    }

    #[test]
    fn test_import_invalid_manifest_json() {
        let bytes = zip_with(&[("deck.json", &b"{ nope"[..])]);
        assert!(matches!(import_deck(&bytes), Err(DeckError::InvalidManifest(_))));
    }

    #[test]
    fn test_import_missing_attachment_degrades_per_field() {
        let manifest = json!({
            "deckName": "Partial",
            "version": "1.0",
            "style": {},
            "cards": [{
                "schemaVersion": 1,
                "id": "c1",
                "name": "A",
                "data": {"title": "A", "art": "images/0-art.png", "back": "images/0-back.png"}
            }]
        });
        let json = serde_json::to_vec(&manifest).unwrap();
        let bytes = zip_with(&[("deck.json", json.as_slice()), ("images/0-back.png", &PNG[..])]);

        let imported = import_deck(&bytes).unwrap();
        let card = &imported.deck.cards[0];
        assert_eq!(card.field("art"), Some(""));
        assert!(card.field("back").unwrap().starts_with("data:image/png;base64,"));
        assert_eq!(imported.missing, vec!["images/0-art.png".to_string()]);
    }

    #[test]
    fn test_import_migrates_legacy_cards() {
        let manifest = json!({
            "deckName": "Old",
            "version": "0.9",
            "cards": [{
                "title": "Relic",
                "fields": {"cost": "2"},
                "images": {"art": "images/0-art.png"}
            }]
        });
        let json = serde_json::to_vec(&manifest).unwrap();
        let bytes = zip_with(&[("deck.json", json.as_slice()), ("images/0-art.png", &PNG[..])]);

        let imported = import_deck(&bytes).unwrap();
        let card = &imported.deck.cards[0];
        assert_eq!(card.name, "Relic");
        assert_eq!(card.field("cost"), Some("2"));
        assert_eq!(DataUrl::parse(card.field("art").unwrap()).unwrap().bytes, PNG.to_vec());
        assert_eq!(imported.deck.style, json!({}));
    }

    #[test]
    fn test_plain_text_that_looks_like_a_path_is_kept() {
        let deck = Deck::new("Text").with_card(CardDocument::new("A").with_field("rules", "images/ are nice"));
        let bytes = pollster::block_on(export_deck(&deck, &NoAssets)).unwrap();
        let imported = import_deck(&bytes).unwrap();
        assert_eq!(imported.deck.cards[0].field("rules"), Some("images/ are nice"));
        assert!(imported.missing.is_empty());
    }

    #[test]
    fn test_text_field_shaped_like_attachment_path_survives() {
        let deck = Deck::new("Credits").with_card(
            CardDocument::new("A")
                .with_field("art", png_url())
                .with_field("credits", "images/logo.png"),
        );
        let bytes = pollster::block_on(export_deck(&deck, &NoAssets)).unwrap();
        let imported = import_deck(&bytes).unwrap();
        assert!(imported.missing.is_empty());
        assert_eq!(imported.deck.cards[0].field("credits"), Some("images/logo.png"));
        assert_eq!(imported.deck.cards[0], deck.cards[0]);
    }

    #[test]
    fn test_unknown_image_type_keeps_mime() {
        let bmp = "data:image/bmp;base64,Qk0AAAAA";
        let deck = Deck::new("Bitmap").with_card(CardDocument::new("A").with_field("art", bmp));
        let bytes = pollster::block_on(export_deck(&deck, &NoAssets)).unwrap();
        assert!(archive_entries(&bytes).contains(&"images/0-art.bmp".to_string()));

        let imported = import_deck(&bytes).unwrap();
        assert_eq!(imported.deck.cards[0].field("art"), Some(bmp));
    }

    #[test]
    fn test_percent_encoded_svg_roundtrip() {
        let svg = "data:image/svg+xml,%3Csvg%20xmlns%3D%22http%3A%2F%2Fwww.w3.org%2F2000%2Fsvg%22%2F%3E";
        let deck = Deck::new("Vector").with_card(CardDocument::new("A").with_field("art", svg));
        let bytes = pollster::block_on(export_deck(&deck, &NoAssets)).unwrap();
        assert!(archive_entries(&bytes).contains(&"images/0-art.svg".to_string()));

        let imported = import_deck(&bytes).unwrap();
        let art = DataUrl::parse(imported.deck.cards[0].field("art").unwrap()).unwrap();
        assert_eq!(art.mime, "image/svg+xml");
        assert_eq!(art.bytes, br#"<svg xmlns="http://www.w3.org/2000/svg"/>"#.to_vec());
    }
}
