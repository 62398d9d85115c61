//! Gesture kinds and the per-gesture session snapshot.

use crate::transform::TransformValues;
use kurbo::{Point, Size, Vec2};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Which edges a resize handle moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Edges {
    pub north: bool,
    pub south: bool,
    pub east: bool,
    pub west: bool,
}

impl Edges {
    pub const N: Self = Self::new(true, false, false, false);
    pub const S: Self = Self::new(false, true, false, false);
    pub const E: Self = Self::new(false, false, true, false);
    pub const W: Self = Self::new(false, false, false, true);
    pub const NE: Self = Self::new(true, false, true, false);
    pub const NW: Self = Self::new(true, false, false, true);
    pub const SE: Self = Self::new(false, true, true, false);
    pub const SW: Self = Self::new(false, true, false, true);

    const fn new(north: bool, south: bool, east: bool, west: bool) -> Self {
        Self {
            north,
            south,
            east,
            west,
        }
    }

    /// Handles on the right or bottom grow a scale-resized element when
    /// dragged outward along positive axes.
    pub fn is_growing(&self) -> bool {
        self.east || self.south
    }

    pub fn is_vertical(&self) -> bool {
        self.north || self.south
    }

    pub fn is_horizontal(&self) -> bool {
        self.east || self.west
    }
}

/// The kind of gesture a pointer-down starts.
///
/// Serializes as its handle name (`"drag"`, `"rotate"`, `"resize-se"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureKind {
    /// Moving the element body.
    Drag,
    /// Rotation handle.
    Rotate,
    /// Edge or corner resize handle.
    Resize(Edges),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown gesture kind: {0}")]
pub struct GestureParseError(pub String);

impl FromStr for GestureKind {
    type Err = GestureParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "drag" => return Ok(GestureKind::Drag),
            "rotate" => return Ok(GestureKind::Rotate),
            _ => {}
        }
        let err = || GestureParseError(s.to_string());
        let spec = s.strip_prefix("resize-").ok_or_else(err)?;
        if spec.is_empty() {
            return Err(err());
        }
        let mut edges = Edges::default();
        for c in spec.chars() {
            let slot = match c {
                'n' => &mut edges.north,
                's' => &mut edges.south,
                'e' => &mut edges.east,
                'w' => &mut edges.west,
                _ => return Err(err()),
            };
            if *slot {
                return Err(err());
            }
            *slot = true;
        }
        if (edges.north && edges.south) || (edges.east && edges.west) {
            return Err(err());
        }
        Ok(GestureKind::Resize(edges))
    }
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GestureKind::Drag => f.write_str("drag"),
            GestureKind::Rotate => f.write_str("rotate"),
            GestureKind::Resize(edges) => {
                f.write_str("resize-")?;
                if edges.north {
                    f.write_str("n")?;
                }
                if edges.south {
                    f.write_str("s")?;
                }
                if edges.east {
                    f.write_str("e")?;
                }
                if edges.west {
                    f.write_str("w")?;
                }
                Ok(())
            }
        }
    }
}

impl Serialize for GestureKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for GestureKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(de::Error::custom)
    }
}

/// On-screen measurements of an element, taken by the host at gesture start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementMetrics {
    /// Center of the element in screen space.
    pub screen_center: Point,
    /// Unscaled, unrotated pixel size of the element box.
    pub pixel_size: Size,
}

impl ElementMetrics {
    pub fn new(screen_center: Point, pixel_size: Size) -> Self {
        Self {
            screen_center,
            pixel_size,
        }
    }
}

/// Everything captured when a gesture starts. Never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionSession {
    pub kind: GestureKind,
    pub pointer_start: Point,
    pub initial: TransformValues,
    pub metrics: ElementMetrics,
}

impl InteractionSession {
    pub fn new(
        kind: GestureKind,
        pointer_start: Point,
        initial: TransformValues,
        metrics: ElementMetrics,
    ) -> Self {
        Self {
            kind,
            pointer_start,
            initial,
            metrics,
        }
    }

    /// Raw pointer delta from gesture start.
    pub fn delta(&self, pointer: Point) -> Vec2 {
        pointer - self.pointer_start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kinds() {
        assert_eq!("drag".parse::<GestureKind>(), Ok(GestureKind::Drag));
        assert_eq!("rotate".parse::<GestureKind>(), Ok(GestureKind::Rotate));
        assert_eq!("resize-e".parse::<GestureKind>(), Ok(GestureKind::Resize(Edges::E)));
        assert_eq!("resize-nw".parse::<GestureKind>(), Ok(GestureKind::Resize(Edges::NW)));
        assert_eq!("resize-wn".parse::<GestureKind>(), Ok(GestureKind::Resize(Edges::NW)));
    }

    #[test]
    fn test_parse_rejects_invalid() {
        for bad in ["", "resize-", "resize-x", "resize-ns", "resize-ee", "spin"] {
            assert!(bad.parse::<GestureKind>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn test_serde_uses_handle_names() {
        let kind = GestureKind::Resize(Edges::SE);
        assert_eq!(serde_json::to_string(&kind).unwrap(), "\"resize-se\"");
        assert_eq!(serde_json::from_str::<GestureKind>("\"resize-se\"").unwrap(), kind);
        assert_eq!(serde_json::to_string(&GestureKind::Drag).unwrap(), "\"drag\"");
        assert!(serde_json::from_str::<GestureKind>("\"resize-ns\"").is_err());
        assert!(serde_json::from_str::<GestureKind>("{\"Resize\":{}}").is_err());
    }

    #[test]
    fn test_display_roundtrip() {
        for kind in ["drag", "rotate", "resize-n", "resize-se", "resize-sw", "resize-w"] {
            assert_eq!(kind.parse::<GestureKind>().unwrap().to_string(), kind);
        }
    }

    #[test]
    fn test_growing_handles() {
        assert!(Edges::E.is_growing());
        assert!(Edges::SE.is_growing());
        assert!(Edges::NE.is_growing());
        assert!(Edges::SW.is_growing());
        assert!(!Edges::N.is_growing());
        assert!(!Edges::W.is_growing());
        assert!(!Edges::NW.is_growing());
    }
}
