//! Rectangle primitives shared by the editor, the overlap detector and the
//! batch merger.
//!
//! Coordinates are stored as entered (corner order is not guaranteed); every
//! derived quantity goes through `normalized()` first.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in image pixel coordinates.
///
/// Serialized as a 4-element array `[x1, y1, x2, y2]` to match the sidecar
/// schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct Rect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl From<[i32; 4]> for Rect {
    fn from(c: [i32; 4]) -> Self {
        Rect { x1: c[0], y1: c[1], x2: c[2], y2: c[3] }
    }
}

impl From<Rect> for [i32; 4] {
    fn from(r: Rect) -> Self {
        [r.x1, r.y1, r.x2, r.y2]
    }
}

impl Rect {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Rect { x1, y1, x2, y2 }
    }

    /// Corner-order independent normal form: `(min_x, min_y, max_x, max_y)`.
    /// Idempotent.
    pub fn normalized(&self) -> Rect {
        Rect {
            x1: self.x1.min(self.x2),
            y1: self.y1.min(self.y2),
            x2: self.x1.max(self.x2),
            y2: self.y1.max(self.y2),
        }
    }

    pub fn width(&self) -> i32 {
        (self.x2 - self.x1).abs()
    }

    pub fn height(&self) -> i32 {
        (self.y2 - self.y1).abs()
    }

    pub fn area(&self) -> i64 {
        self.width() as i64 * self.height() as i64
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.x1 + self.x2) as f64 / 2.0,
            (self.y1 + self.y2) as f64 / 2.0,
        )
    }

    pub fn diagonal(&self) -> f64 {
        let w = self.width() as f64;
        let h = self.height() as f64;
        (w * w + h * h).sqrt()
    }

    /// Intersection over Union with `other`. Returns 0.0 when the union area
    /// is not positive (degenerate rectangles).
    pub fn iou(&self, other: &Rect) -> f64 {
        let a = self.normalized();
        let b = other.normalized();

        let ix = (a.x2.min(b.x2) - a.x1.max(b.x1)).max(0) as i64;
        let iy = (a.y2.min(b.y2) - a.y1.max(b.y1)).max(0) as i64;
        let inter = ix * iy;

        let union = a.area() + b.area() - inter;
        if union <= 0 {
            return 0.0;
        }

        inter as f64 / union as f64
    }

    /// Smallest rectangle containing both `self` and `other`.
    pub fn envelope(&self, other: &Rect) -> Rect {
        let a = self.normalized();
        let b = other.normalized();
        Rect {
            x1: a.x1.min(b.x1),
            y1: a.y1.min(b.y1),
            x2: a.x2.max(b.x2),
            y2: a.y2.max(b.y2),
        }
    }

    /// True when the squared center distance is below
    /// `(factor * min(diagA, diagB))^2`. Strict comparison, as the merge
    /// clustering rule requires.
    pub fn centers_close(&self, other: &Rect, factor: f64) -> bool {
        let (ax, ay) = self.normalized().center();
        let (bx, by) = other.normalized().center();

        let dist_sq = (ax - bx).powi(2) + (ay - by).powi(2);
        let limit = self.diagonal().min(other.diagonal()) * factor;

        dist_sq < limit * limit
    }
}
