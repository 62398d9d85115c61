//! Cardsmith Core Library
//!
//! Platform-agnostic core of the Cardsmith card designer: element transforms,
//! pointer gestures, undo/redo and the deck archive format.

pub mod assets;
pub mod config;
pub mod deck;
pub mod document;
pub mod editor;
pub mod geometry;
pub mod history;
pub mod interaction;
pub mod storage;
pub mod transform;
pub mod viewport;

pub use assets::{AssetError, AssetResolver, ColorSampler, DataUrl, ImageFormat, ResolvedAsset};
pub use config::{ConfigError, EditorConfig};
pub use deck::{export_deck, import_deck, Deck, DeckError, DeckImport, DeckTransfer};
pub use document::{CardDocument, CardRecord};
pub use editor::CardEditor;
pub use geometry::{clamp_center, projected_extent};
pub use history::History;
pub use interaction::{
    ElementMetrics, GestureKind, GestureOutcome, InteractionOptions, InteractionState, ResizeMode,
    TransformController,
};
pub use storage::{DeckSink, StorageError};
pub use transform::{Bounds, TransformValues};
pub use viewport::CardViewport;
