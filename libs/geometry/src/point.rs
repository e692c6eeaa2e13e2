//! Points in drawing coordinates.

use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// A point in the drawing's coordinate frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// The x-coordinate.
    pub x: f64,
    /// The y-coordinate.
    pub y: f64,
}

impl Point {
    /// Creates a new point at `(x, y)`.
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Totally orders points by x-coordinate, then y-coordinate.
    ///
    /// Uses [`f64::total_cmp`], so NaN coordinates order deterministically
    /// rather than poisoning comparisons.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.x
            .total_cmp(&other.x)
            .then_with(|| self.y.total_cmp(&other.y))
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

impl From<Point> for geo::Coord<f64> {
    #[inline]
    fn from(value: Point) -> Self {
        geo::Coord {
            x: value.x,
            y: value.y,
        }
    }
}

impl From<geo::Coord<f64>> for Point {
    #[inline]
    fn from(value: geo::Coord<f64>) -> Self {
        Self {
            x: value.x,
            y: value.y,
        }
    }
}
