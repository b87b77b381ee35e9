//! Axis-aligned rectangle geometry
//!
//! Everything in a level is either a rectangle (platforms, obstacles, goal,
//! the bunny itself) or a point checked by distance (collectibles).

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle, y grows downward
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// True if the horizontal extents overlap (touching edges do not count)
    #[inline]
    pub fn overlaps_x(&self, other: &Rect) -> bool {
        self.right() > other.x && self.x < other.right()
    }

    /// Strict overlap test, rectangles sharing only an edge do not overlap
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.overlaps_x(other) && self.bottom() > other.y && self.y < other.bottom()
    }
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (a - b).length()
}
