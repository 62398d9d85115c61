//! Per-element placement values and the bounds they are constrained to.

use serde::{Deserialize, Serialize};

/// Placement of one card element, in logical (unscaled) card coordinates.
///
/// `x`/`y` locate the element's center relative to the card center.
/// `rotate` is in degrees, clockwise positive, and is never normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformValues {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    /// Absent for auto-sized text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default)]
    pub rotate: f64,
    /// Uniform multiplier used by scale-resized elements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    /// Fill shown behind partially transparent content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
}

impl Default for TransformValues {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: Some(100.0),
            rotate: 0.0,
            scale: None,
            background_color: None,
        }
    }
}

impl TransformValues {
    /// Create values for a box of the given size centered on the card.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height: Some(height),
            ..Self::default()
        }
    }

    /// Create values for an auto-height element (text).
    pub fn auto_height(width: f64) -> Self {
        Self {
            width,
            height: None,
            ..Self::default()
        }
    }

    /// Move the center.
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Set the rotation in degrees.
    pub fn rotated(mut self, degrees: f64) -> Self {
        self.rotate = degrees;
        self
    }

    /// Set the uniform scale.
    pub fn scaled(mut self, scale: f64) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Effective scale (1 when unset).
    pub fn effective_scale(&self) -> f64 {
        self.scale.unwrap_or(1.0)
    }
}

/// Axis-aligned region that an element's projected center must stay inside.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Create bounds from explicit edges.
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    /// Bounds of a `width × height` area centered on the origin.
    pub fn centered(width: f64, height: f64) -> Self {
        Self::new(-width / 2.0, width / 2.0, -height / 2.0, height / 2.0)
    }

    /// Shrink every edge by `margin` (e.g. a card's safe area).
    pub fn inset(self, margin: f64) -> Self {
        Self::new(
            self.min_x + margin,
            self.max_x - margin,
            self.min_y + margin,
            self.max_y - margin,
        )
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_field_names() {
        let values = TransformValues::new(120.0, 80.0).at(5.0, -5.0).rotated(30.0);
        let json = serde_json::to_value(&values).unwrap();
        assert_eq!(json["width"], 120.0);
        assert_eq!(json["rotate"], 30.0);
        assert!(json.get("scale").is_none());
        assert!(json.get("backgroundColor").is_none());

        let with_bg = TransformValues {
            background_color: Some("#ff0000".to_string()),
            ..values
        };
        let json = serde_json::to_value(&with_bg).unwrap();
        assert_eq!(json["backgroundColor"], "#ff0000");
    }

    #[test]
    fn test_missing_optional_fields() {
        let values: TransformValues =
            serde_json::from_str(r#"{"x": 1, "y": 2, "width": 50}"#).unwrap();
        assert_eq!(values.height, None);
        assert_eq!(values.rotate, 0.0);
        assert_eq!(values.effective_scale(), 1.0);
    }

    #[test]
    fn test_bounds_helpers() {
        let bounds = Bounds::centered(300.0, 400.0);
        assert_eq!(bounds, Bounds::new(-150.0, 150.0, -200.0, 200.0));
        let safe = bounds.inset(10.0);
        assert_eq!(safe.width(), 280.0);
        assert_eq!(safe.height(), 380.0);
    }
}
