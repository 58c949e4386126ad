//! Geometry primitives.
//!
//! `Rect` is the library's own axis-aligned rectangle, independent of lopdf's
//! object model, so association and merge logic can be tested without a PDF.
//! All rectangles handed out by the library use a top-left origin with y
//! growing downward.

use serde::Serialize;

/// A 2D point (x, y).
pub type Point = (f64, f64);

/// A 6-element affine transformation matrix (a, b, c, d, e, f).
/// Transforms point (x, y) to (ax + cy + e, bx + dy + f).
pub type Matrix = (f64, f64, f64, f64, f64, f64);

/// Identity transformation matrix.
pub const MATRIX_IDENTITY: Matrix = (1.0, 0.0, 0.0, 1.0, 0.0, 0.0);

/// Multiplies two matrices: result = m1 * m0.
/// This applies m1 first, then m0.
pub fn mult_matrix(m1: Matrix, m0: Matrix) -> Matrix {
    let (a1, b1, c1, d1, e1, f1) = m1;
    let (a0, b0, c0, d0, e0, f0) = m0;
    (
        a0 * a1 + c0 * b1,
        b0 * a1 + d0 * b1,
        a0 * c1 + c0 * d1,
        b0 * c1 + d0 * d1,
        a0 * e1 + c0 * f1 + e0,
        b0 * e1 + d0 * f1 + f0,
    )
}

/// Translates a matrix by (x, y) in its own coordinate system.
pub fn translate_matrix(m: Matrix, v: Point) -> Matrix {
    let (a, b, c, d, e, f) = m;
    let (x, y) = v;
    (a, b, c, d, x * a + y * c + e, x * b + y * d + f)
}

/// Applies a matrix to a point.
pub fn apply_matrix_pt(m: Matrix, v: Point) -> Point {
    let (a, b, c, d, e, f) = m;
    let (x, y) = v;
    (a * x + c * y + e, b * x + d * y + f)
}

/// Applies a matrix to a rectangle, returning the axis-aligned box that
/// tightly fits the transformed corners.
pub fn apply_matrix_rect(m: Matrix, rect: Rect) -> Rect {
    Rect::bound_of([
        apply_matrix_pt(m, (rect.x0, rect.y0)),
        apply_matrix_pt(m, (rect.x1, rect.y0)),
        apply_matrix_pt(m, (rect.x1, rect.y1)),
        apply_matrix_pt(m, (rect.x0, rect.y1)),
    ])
    .unwrap_or(rect)
}

/// Axis-aligned rectangle. Always normalized: `x0 <= x1`, `y0 <= y1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    /// Creates a rectangle from two corners in any order.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// Computes the minimal rectangle covering all the points, or `None` for
    /// an empty iterator.
    pub fn bound_of<I: IntoIterator<Item = Point>>(pts: I) -> Option<Self> {
        let mut iter = pts.into_iter();
        let (x, y) = iter.next()?;
        let mut r = Self {
            x0: x,
            y0: y,
            x1: x,
            y1: y,
        };
        for (x, y) in iter {
            r.x0 = r.x0.min(x);
            r.y0 = r.y0.min(y);
            r.x1 = r.x1.max(x);
            r.y1 = r.y1.max(y);
        }
        Some(r)
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn center(&self) -> Point {
        ((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }

    /// True when the rectangles share any point; touching edges count.
    pub fn intersects(&self, other: &Rect) -> bool {
        !(self.x1 < other.x0 || other.x1 < self.x0 || self.y1 < other.y0 || other.y1 < self.y0)
    }

    /// The overlapping region, if any.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }
        Some(Rect {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        })
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Length of the shared vertical extent (0 when disjoint).
    pub fn vertical_overlap(&self, other: &Rect) -> f64 {
        (self.y1.min(other.y1) - self.y0.max(other.y0)).max(0.0)
    }

    /// True when `x` lies within the horizontal extent.
    pub fn contains_x(&self, x: f64) -> bool {
        self.x0 <= x && x <= self.x1
    }

    /// Grows the rectangle by `d` on every side.
    pub fn expand(&self, d: f64) -> Rect {
        Rect {
            x0: self.x0 - d,
            y0: self.y0 - d,
            x1: self.x1 + d,
            y1: self.y1 + d,
        }
    }
}

/// True when the rectangles overlap or are separated by at most `tolerance`
/// on both axes.
pub fn is_adjacent_or_overlapping(a: &Rect, b: &Rect, tolerance: f64) -> bool {
    a.expand(tolerance / 2.0).intersects(&b.expand(tolerance / 2.0))
}

/// Union of all rectangles, or `None` when empty.
pub fn union_all<'a, I: IntoIterator<Item = &'a Rect>>(rects: I) -> Option<Rect> {
    rects.into_iter().copied().reduce(|acc, r| acc.union(&r))
}

/// Reading-order comparison: top to bottom, then left to right.
pub fn reading_order(a: &Rect, b: &Rect) -> std::cmp::Ordering {
    a.y0.total_cmp(&b.y0).then(a.x0.total_cmp(&b.x0))
}
