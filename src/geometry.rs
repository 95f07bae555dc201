//! Axis-aligned bounding box geometry shared by all pipeline stages.
//!
//! Coordinates are pixel-space with the origin at the top-left corner of
//! the page, matching the output of the upstream OCR/layout engine.

use serde::{Deserialize, Serialize};

/// An axis-aligned bounding rectangle in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    /// X position (left edge)
    pub x: f32,
    /// Y position (top edge)
    pub y: f32,
    /// Width in pixels
    pub width: f32,
    /// Height in pixels
    pub height: f32,
}

impl BBox {
    /// Create a new bounding box.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge X coordinate.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge Y coordinate.
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Area in square pixels.
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Whether the box has positive extent on both axes.
    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// The minimal rectangle enclosing both boxes.
    pub fn union(&self, other: &BBox) -> BBox {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        BBox::new(x, y, right - x, bottom - y)
    }

    /// Vertical gap between the two boxes' bands, 0.0 when they overlap.
    pub fn vertical_gap(&self, other: &BBox) -> f32 {
        if self.bottom() < other.y {
            other.y - self.bottom()
        } else if other.bottom() < self.y {
            self.y - other.bottom()
        } else {
            0.0
        }
    }

    /// Horizontal gap between the two boxes' extents, 0.0 when they overlap.
    pub fn horizontal_gap(&self, other: &BBox) -> f32 {
        if self.right() < other.x {
            other.x - self.right()
        } else if other.right() < self.x {
            self.x - other.right()
        } else {
            0.0
        }
    }

    /// Horizontal alignment score: the shared horizontal extent divided by
    /// the shorter of the two widths.
    ///
    /// Full overlap of the narrower box yields 1.0; disjoint extents yield
    /// 0.0. Degenerate widths yield 0.0.
    pub fn horizontal_overlap_ratio(&self, other: &BBox) -> f32 {
        let overlap = self.right().min(other.right()) - self.x.max(other.x);
        if overlap <= 0.0 {
            return 0.0;
        }
        let shorter = self.width.min(other.width);
        if shorter <= 0.0 {
            return 0.0;
        }
        (overlap / shorter).min(1.0)
    }

    /// Whether this box encloses `other` on all four edges, allowing
    /// `tolerance` pixels of slack per edge.
    pub fn contains_with_tolerance(&self, other: &BBox, tolerance: f32) -> bool {
        self.x - tolerance <= other.x
            && self.y - tolerance <= other.y
            && self.right() + tolerance >= other.right()
            && self.bottom() + tolerance >= other.bottom()
    }
}
