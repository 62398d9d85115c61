//! Card editing with undo/redo.

use crate::assets::{seed_background_color, ColorSampler};
use crate::config::EditorConfig;
use crate::document::CardDocument;
use crate::history::History;
use crate::interaction::GestureOutcome;
use crate::transform::TransformValues;
use kurbo::Point;

/// The card being edited plus its history.
///
/// Every committed edit replaces the whole document and records the
/// previous one, so undo simply swaps documents back.
#[derive(Debug, Clone)]
pub struct CardEditor {
    document: CardDocument,
    history: History<CardDocument>,
    /// Document as it was when the running gesture started.
    gesture_base: Option<CardDocument>,
}

impl Default for CardEditor {
    fn default() -> Self {
        Self::new(CardDocument::default())
    }
}

impl CardEditor {
    pub fn new(document: CardDocument) -> Self {
        Self {
            document,
            history: History::default(),
            gesture_base: None,
        }
    }

    /// Editor whose history depth comes from `config`.
    pub fn with_config(document: CardDocument, config: &EditorConfig) -> Self {
        Self {
            document,
            history: History::new(config.history_depth),
            gesture_base: None,
        }
    }

    pub fn document(&self) -> &CardDocument {
        &self.document
    }

    pub fn into_document(self) -> CardDocument {
        self.document
    }

    pub fn history(&self) -> &History<CardDocument> {
        &self.history
    }

    /// Replace the document, recording the old one. Returns false (and
    /// records nothing) when the edit changes nothing.
    fn commit(&mut self, next: CardDocument) -> bool {
        if next == self.document {
            return false;
        }
        let previous = std::mem::replace(&mut self.document, next);
        self.history.record(previous);
        true
    }

    pub fn set_field(&mut self, element_id: &str, value: impl Into<String>) -> bool {
        let next = self.document.with_field(element_id, value);
        self.commit(next)
    }

    /// Set an image element's source (a `data:` URL or a host reference).
    pub fn set_image(&mut self, element_id: &str, src: impl Into<String>) -> bool {
        self.set_field(element_id, src)
    }

    pub fn set_border(&mut self, color: Option<String>, width: Option<f64>) -> bool {
        let next = self.document.with_border(color, width);
        self.commit(next)
    }

    pub fn set_count(&mut self, count: Option<u32>) -> bool {
        let next = self.document.with_count(count);
        self.commit(next)
    }

    pub fn commit_transform(&mut self, element_id: &str, values: TransformValues) -> bool {
        let next = self.document.with_transform(element_id, values);
        self.commit(next)
    }

    /// Show intermediate gesture values without touching history.
    ///
    /// The first preview of a gesture remembers the document it started
    /// from, so [`begin_gesture`](Self::begin_gesture) is optional.
    pub fn preview_transform(&mut self, element_id: &str, values: TransformValues) {
        if self.gesture_base.is_none() {
            self.gesture_base = Some(self.document.clone());
        }
        self.document = self.document.with_transform(element_id, values);
    }

    /// Remember the document before a gesture starts previewing.
    pub fn begin_gesture(&mut self) {
        self.gesture_base = Some(self.document.clone());
    }

    /// Commit a finished gesture as a single history entry.
    ///
    /// Returns whether anything was recorded.
    pub fn finish_gesture(&mut self, element_id: &str, outcome: &GestureOutcome) -> bool {
        let base = self
            .gesture_base
            .take()
            .unwrap_or_else(|| self.document.clone());
        self.document = base;
        if !outcome.changed() {
            return false;
        }
        log::debug!("Committing {} on {}", outcome.kind, element_id);
        self.commit_transform(element_id, outcome.last.clone())
    }

    /// Drop any previewed gesture values.
    pub fn cancel_gesture(&mut self) {
        if let Some(base) = self.gesture_base.take() {
            self.document = base;
        }
    }

    pub fn undo(&mut self) -> bool {
        self.cancel_gesture();
        match self.history.undo(self.document.clone()) {
            Some(previous) => {
                self.document = previous;
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        self.cancel_gesture();
        match self.history.redo(self.document.clone()) {
            Some(next) => {
                self.document = next;
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Give an image element a background color sampled from its pixels.
    ///
    /// Sampling failures fall back to white rather than failing the edit.
    pub fn seed_background(
        &mut self,
        element_id: &str,
        sampler: &dyn ColorSampler,
        bytes: &[u8],
        at: Point,
    ) -> bool {
        let color = seed_background_color(sampler, bytes, at);
        let mut values = self
            .document
            .transform(element_id)
            .cloned()
            .unwrap_or_default();
        values.background_color = Some(color);
        self.commit_transform(element_id, values)
    }
}
