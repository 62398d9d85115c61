//! Single-flight import/export.

use super::{export_deck, import_deck, Deck, DeckError, DeckImport, DeckResult};
use crate::assets::AssetResolver;
use crate::storage::{archive_filename, DeckSink};
use std::cell::Cell;

/// Runs deck imports and exports one at a time.
///
/// A second request while one is in flight is refused with
/// [`DeckError::Busy`] instead of queued.
#[derive(Debug, Default)]
pub struct DeckTransfer {
    busy: Cell<bool>,
}

/// Clears the busy flag when the transfer ends, however it ends.
struct BusyGuard<'a> {
    busy: &'a Cell<bool>,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.busy.set(false);
    }
}

impl DeckTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a transfer is currently running.
    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    fn begin(&self) -> DeckResult<BusyGuard<'_>> {
        if self.busy.replace(true) {
            log::warn!("Deck transfer already in progress");
            return Err(DeckError::Busy);
        }
        Ok(BusyGuard { busy: &self.busy })
    }

    /// Encode `deck` into archive bytes.
    pub async fn export(&self, deck: &Deck, resolver: &dyn AssetResolver) -> DeckResult<Vec<u8>> {
        let _guard = self.begin()?;
        export_deck(deck, resolver).await
    }

    /// Encode `deck` and hand it to `sink` as `<deck name>.zip`.
    ///
    /// Returns the filename used.
    pub async fn export_to(
        &self,
        deck: &Deck,
        resolver: &dyn AssetResolver,
        sink: &dyn DeckSink,
    ) -> DeckResult<String> {
        let _guard = self.begin()?;
        let bytes = export_deck(deck, resolver).await?;
        let filename = archive_filename(&deck.name);
        sink.save(&filename, &bytes).await.map_err(|e| {
            log::error!("Failed to save {}: {}", filename, e);
            DeckError::Export(e.to_string())
        })?;
        Ok(filename)
    }

    /// Decode archive bytes into a deck.
    pub fn import(&self, bytes: &[u8]) -> DeckResult<DeckImport> {
        let _guard = self.begin()?;
        import_deck(bytes)
    }
}
