//! Background color seeding from image pixels.

use super::AssetResult;
use kurbo::Point;

/// Color used when sampling fails.
pub const FALLBACK_BACKGROUND: &str = "#ffffff";

/// Host capability that reads a color out of an image.
pub trait ColorSampler {
    /// Color of the image at a logical coordinate, as a CSS color string.
    fn sample(&self, bytes: &[u8], at: Point) -> AssetResult<String>;
}

/// Pick a background color for an element from its image.
///
/// Sampling failures never interrupt editing: they are logged and the
/// fallback color is returned instead.
pub fn seed_background_color(sampler: &dyn ColorSampler, bytes: &[u8], at: Point) -> String {
    match sampler.sample(bytes, at) {
        Ok(color) => color,
        Err(e) => {
            log::warn!("Color sampling failed, using {}: {}", FALLBACK_BACKGROUND, e);
            FALLBACK_BACKGROUND.to_string()
        }
    }
}
