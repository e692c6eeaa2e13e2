//! Axis-aligned rectangles and bounding boxes.

use serde::{Deserialize, Serialize};

use crate::point::Point;

/// An axis-aligned rectangle, stored as its lower-left and upper-right corners.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
}

impl Rect {
    /// Creates a rectangle from two opposite corners, normalizing the order.
    pub fn from_sides(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// Creates a zero-area rectangle at the given point.
    pub fn from_point(p: Point) -> Self {
        Self {
            x0: p.x,
            y0: p.y,
            x1: p.x,
            y1: p.y,
        }
    }

    /// The minimum x-coordinate.
    #[inline]
    pub fn min_x(&self) -> f64 {
        self.x0
    }

    /// The minimum y-coordinate.
    #[inline]
    pub fn min_y(&self) -> f64 {
        self.y0
    }

    /// The maximum x-coordinate.
    #[inline]
    pub fn max_x(&self) -> f64 {
        self.x1
    }

    /// The maximum y-coordinate.
    #[inline]
    pub fn max_y(&self) -> f64 {
        self.y1
    }

    /// The width of the rectangle.
    #[inline]
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// The height of the rectangle.
    #[inline]
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// The center of the rectangle.
    pub fn center(&self) -> Point {
        Point::new((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }

    /// The smallest rectangle covering both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }
}

/// A trait for types with an axis-aligned bounding box.
pub trait Bbox {
    /// Returns the bounding box, or [`None`] if the object is empty.
    fn bbox(&self) -> Option<Rect>;
}

impl Bbox for Rect {
    fn bbox(&self) -> Option<Rect> {
        Some(*self)
    }
}

impl<T: Bbox> Bbox for [T] {
    fn bbox(&self) -> Option<Rect> {
        self.iter()
            .filter_map(Bbox::bbox)
            .reduce(|a, b| a.union(&b))
    }
}
