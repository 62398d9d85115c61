//! Deck archives.
//!
//! A deck travels as a zip file: `deck.json` holds the manifest and every
//! image field is stored as its own entry under `images/`, with the card
//! field rewritten to point at that entry.
//!
//! ```text
//! deck.json                 {deckName, version, style, cards}
//! images/0-art.png
//! images/3-portrait.jpg
//! ```

mod archive;
mod transfer;

pub use archive::{export_deck, import_deck, IMAGES_DIR, MANIFEST_NAME};
pub use transfer::DeckTransfer;

use crate::document::CardDocument;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Archive format version written into the manifest.
pub const DECK_FORMAT_VERSION: &str = "1.0";

/// Deck errors.
#[derive(Debug, Error)]
pub enum DeckError {
    #[error("failed to export deck: {0}")]
    Export(String),
    #[error("invalid deck file: missing manifest")]
    MissingManifest,
    #[error("invalid deck file: {0}")]
    InvalidArchive(String),
    #[error("invalid deck manifest: {0}")]
    InvalidManifest(String),
    #[error("another deck import or export is already running")]
    Busy,
}

/// Result type for deck operations.
pub type DeckResult<T> = Result<T, DeckError>;

/// An ordered list of cards sharing one style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    pub name: String,
    /// Deck-wide style, opaque to the core.
    #[serde(default = "empty_style")]
    pub style: serde_json::Value,
    #[serde(default)]
    pub cards: Vec<CardDocument>,
}

fn empty_style() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl Deck {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            style: empty_style(),
            cards: Vec::new(),
        }
    }

    pub fn with_style(mut self, style: serde_json::Value) -> Self {
        self.style = style;
        self
    }

    pub fn with_card(mut self, card: CardDocument) -> Self {
        self.cards.push(card);
        self
    }

    /// Total copies across all cards (cards without a count count once).
    pub fn total_copies(&self) -> u64 {
        self.cards.iter().map(|c| u64::from(c.count.unwrap_or(1))).sum()
    }
}

/// Result of reading an archive.
#[derive(Debug, Clone, PartialEq)]
pub struct DeckImport {
    pub deck: Deck,
    /// Attachment paths referenced by cards but absent from the archive.
    /// The affected fields are left empty.
    pub missing: Vec<String>,
}

/// `deck.json` contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeckManifest {
    pub deck_name: String,
    pub version: String,
    #[serde(default = "empty_style")]
    pub style: serde_json::Value,
    #[serde(default)]
    pub cards: Vec<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deck_json_defaults() {
        let deck: Deck = serde_json::from_str(r#"{"name": "Empty"}"#).unwrap();
        assert_eq!(deck.style, serde_json::json!({}));
        assert!(deck.cards.is_empty());
    }

    #[test]
    fn test_total_copies() {
        let deck = Deck::new("Starter")
            .with_card(CardDocument::new("A").with_count(Some(3)))
            .with_card(CardDocument::new("B"));
        assert_eq!(deck.total_copies(), 4);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(DeckError::MissingManifest.to_string(), "invalid deck file: missing manifest");
        assert_eq!(
            DeckError::Export("disk full".into()).to_string(),
            "failed to export deck: disk full"
        );
    }
}
