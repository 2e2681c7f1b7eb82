use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Midpoint of a box of this size anchored at the origin
    pub fn center(&self) -> Position {
        Position::new(self.width / 2.0, self.height / 2.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point at `radius` from `self` along `angle` (radians, clockwise in screen space)
    pub fn polar_offset(&self, radius: f64, angle: f64) -> Position {
        Position {
            x: self.x + radius * angle.cos(),
            y: self.y + radius * angle.sin(),
        }
    }

    pub fn distance(&self, other: &Position) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("radius table must not be empty")]
    EmptyRadii,
    #[error("radius {0} is not a finite, non-negative number")]
    InvalidRadius(f64),
    #[error("radius table must be ascending, {next} follows {prev}")]
    DescendingRadii { prev: f64, next: f64 },
    #[error("min_slots must be at least 1")]
    NoSlots,
}

/// Anything the radial engine can place.
pub trait LayoutNode {
    /// Depth in the tree; 0 is the root
    fn level(&self) -> usize;
}

impl LayoutNode for usize {
    fn level(&self) -> usize {
        *self
    }
}
