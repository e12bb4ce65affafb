//! Axis-aligned bounding boxes and overlap math.

use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box.
///
/// Canonical form throughout the library is top-left origin (Y grows
/// downward) and page-relative coordinates. Raw extraction output may
/// arrive in other conventions; see [`crate::fuse::normalize`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge
    pub x0: f32,
    /// Top edge (in canonical form)
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge (in canonical form)
    pub y1: f32,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Width of the box (clipped to non-negative).
    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).max(0.0)
    }

    /// Height of the box (clipped to non-negative).
    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).max(0.0)
    }

    /// Area of the box.
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Check the `x1 >= x0 && y1 >= y0` invariant.
    pub fn is_valid(&self) -> bool {
        self.x1 >= self.x0 && self.y1 >= self.y0
    }

    /// Area of the intersection with another box.
    ///
    /// Zero when the boxes do not overlap; the intersection rectangle is
    /// clipped to non-negative width and height.
    pub fn intersection_area(&self, other: &BoundingBox) -> f32 {
        let ix = (self.x1.min(other.x1) - self.x0.max(other.x0)).max(0.0);
        let iy = (self.y1.min(other.y1) - self.y0.max(other.y0)).max(0.0);
        ix * iy
    }

    /// Area of the union with another box.
    pub fn union_area(&self, other: &BoundingBox) -> f32 {
        self.area() + other.area() - self.intersection_area(other)
    }

    /// Symmetric overlap score: intersection area over union area.
    ///
    /// Returns a value in `[0, 1]`; 0 when the union is degenerate.
    /// This is deliberately not plain containment, so a tiny span inside
    /// a huge block scores low rather than 1.0.
    pub fn overlap_ratio(&self, other: &BoundingBox) -> f32 {
        let union = self.union_area(other);
        if union <= f32::EPSILON {
            return 0.0;
        }
        self.intersection_area(other) / union
    }

    /// Shift the box vertically by `dy`.
    pub fn translate_y(&self, dy: f32) -> Self {
        Self {
            x0: self.x0,
            y0: self.y0 + dy,
            x1: self.x1,
            y1: self.y1 + dy,
        }
    }

    /// Flip the Y axis within a page of the given height.
    ///
    /// Converts bottom-left origin coordinates to top-left (and back,
    /// since the operation is an involution). The edge roles swap so the
    /// `y1 >= y0` invariant is preserved.
    pub fn flip_y(&self, page_height: f32) -> Self {
        Self {
            x0: self.x0,
            y0: page_height - self.y1,
            x1: self.x1,
            y1: page_height - self.y0,
        }
    }
}
