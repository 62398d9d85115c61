//! Stateless geometry for constrained dragging.

use crate::transform::Bounds;
use kurbo::Vec2;

/// Axis-aligned extent of a `width × height` box scaled by `scale` and then
/// rotated by `rotate_degrees` about its center.
pub fn projected_extent(width: f64, height: f64, scale: f64, rotate_degrees: f64) -> (f64, f64) {
    let w = width * scale;
    let h = height * scale;
    let theta = rotate_degrees.to_radians();
    let cos = theta.cos().abs();
    let sin = theta.sin().abs();
    (w * cos + h * sin, w * sin + h * cos)
}

/// Clamp a proposed center so that a box with the given projected extent
/// stays inside `bounds`.
///
/// When the extent is larger than the bounds on an axis there is no valid
/// position, and that axis snaps to 0.
pub fn clamp_center(
    proposed_x: f64,
    proposed_y: f64,
    proj_w: f64,
    proj_h: f64,
    bounds: &Bounds,
) -> (f64, f64) {
    let x = clamp_axis(proposed_x, bounds.min_x + proj_w / 2.0, bounds.max_x - proj_w / 2.0);
    let y = clamp_axis(proposed_y, bounds.min_y + proj_h / 2.0, bounds.max_y - proj_h / 2.0);
    (x, y)
}

fn clamp_axis(value: f64, lo: f64, hi: f64) -> f64 {
    if lo > hi { 0.0 } else { value.clamp(lo, hi) }
}

/// Rotate a screen-space delta into the local frame of an element rotated
/// by `rotate_degrees`.
pub fn rotate_into_local(delta: Vec2, rotate_degrees: f64) -> Vec2 {
    let theta = (-rotate_degrees).to_radians();
    let (sin, cos) = theta.sin_cos();
    Vec2::new(delta.x * cos - delta.y * sin, delta.x * sin + delta.y * cos)
}

/// Bearing of `point` around `center`, in degrees (clockwise positive in
/// screen space).
pub fn bearing_degrees(center: kurbo::Point, point: kurbo::Point) -> f64 {
    (point.y - center.y).atan2(point.x - center.x).to_degrees()
}
