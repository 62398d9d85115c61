//! Pan/zoom view over a card.
//!
//! Card coordinates are logical units relative to the card center, the same
//! space [`TransformValues`] live in. The viewport maps them onto screen
//! pixels so pointer positions can be fed to the interaction controller.

use crate::interaction::ElementMetrics;
use crate::transform::TransformValues;
use kurbo::{Affine, Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// View transform for the card being edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardViewport {
    /// Screen position of the card center.
    pub offset: Vec2,
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for CardViewport {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
            min_zoom: 0.1,
            max_zoom: 8.0,
        }
    }
}

impl CardViewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Card to screen transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Screen to card transform.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.offset)
    }

    pub fn screen_to_card(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    pub fn card_to_screen(&self, card_point: Point) -> Point {
        self.transform() * card_point
    }

    /// Pan by a delta in screen pixels.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Zoom by `factor`, keeping `screen_point` over the same card point.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        let new_zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        let card_point = self.screen_to_card(screen_point);
        self.zoom = new_zoom;
        let moved = self.card_to_screen(card_point);
        self.offset += screen_point - moved;
    }

    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.zoom = 1.0;
    }

    /// Zoom and center so the whole card fits inside `viewport`, leaving
    /// `padding` pixels on every side.
    pub fn fit_card(&mut self, card_size: Size, viewport: Size, padding: f64) {
        if card_size.width <= 0.0 || card_size.height <= 0.0 {
            self.reset();
            return;
        }

        let available = Size::new(
            (viewport.width - padding * 2.0).max(1.0),
            (viewport.height - padding * 2.0).max(1.0),
        );
        let zoom_x = available.width / card_size.width;
        let zoom_y = available.height / card_size.height;
        self.zoom = zoom_x.min(zoom_y).clamp(self.min_zoom, self.max_zoom);
        self.offset = Vec2::new(viewport.width / 2.0, viewport.height / 2.0);
    }

    /// Metrics for starting a gesture on an element.
    ///
    /// The pixel size is the element's unscaled size; `measured_height` is
    /// used for auto-sized elements that carry no height of their own.
    pub fn element_metrics(&self, values: &TransformValues, measured_height: f64) -> ElementMetrics {
        let height = values.height.unwrap_or(measured_height);
        ElementMetrics::new(
            self.card_to_screen(Point::new(values.x, values.y)),
            Size::new(values.width, height),
        )
    }
}
