//! Math utilities
//!
//! Re-exports from glam and the integer rectangle used for bounding boxes,
//! collision queries and blit clipping.

pub use glam::{IVec2, UVec2, Vec2};

/// Half-open integer rectangle `[left, right) x [top, bottom)` in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    /// Create a rectangle from its edges
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    /// Create a rectangle from a corner and a size
    pub const fn from_xywh(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            left: x,
            top: y,
            right: x + width,
            bottom: y + height,
        }
    }

    /// Width, zero when the rectangle is inverted
    pub fn width(&self) -> i32 {
        (self.right - self.left).max(0)
    }

    /// Height, zero when the rectangle is inverted
    pub fn height(&self) -> i32 {
        (self.bottom - self.top).max(0)
    }

    /// Number of covered pixels
    pub fn area(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    /// Check if the rectangle covers no pixels
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Top-left corner
    pub fn origin(&self) -> IVec2 {
        IVec2::new(self.left, self.top)
    }

    /// Grow every edge outward by `amount`
    pub fn dilate(&self, amount: i32) -> Rect {
        Rect {
            left: self.left - amount,
            top: self.top - amount,
            right: self.right + amount,
            bottom: self.bottom + amount,
        }
    }

    /// Clip against `[0, width) x [0, height)`
    pub fn clip_to(&self, width: u32, height: u32) -> Rect {
        Rect {
            left: self.left.max(0),
            top: self.top.max(0),
            right: self.right.min(width as i32),
            bottom: self.bottom.min(height as i32),
        }
    }

    /// Check if a pixel lies inside
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }

    /// Check if two rectangles share at least one pixel
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left < other.right
            && other.left < self.right
            && self.top < other.bottom
            && other.top < self.bottom
    }

    /// The shared region of two rectangles
    pub fn intersection(&self, other: &Rect) -> Rect {
        Rect {
            left: self.left.max(other.left),
            top: self.top.max(other.top),
            right: self.right.min(other.right),
            bottom: self.bottom.min(other.bottom),
        }
    }

    /// Iterate over every covered pixel, row by row
    pub fn pixels(&self) -> impl Iterator<Item = (i32, i32)> + use<> {
        let (left, right) = (self.left, self.right);
        (self.top..self.bottom).flat_map(move |y| (left..right).map(move |x| (x, y)))
    }
}
