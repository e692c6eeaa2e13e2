//! Line segments, used for label anchor baselines.

use serde::{Deserialize, Serialize};

use crate::point::Point;
use crate::polygon::Polygon;

/// A 2-point line segment.
///
/// Text labels in a drawing are anchored by a segment taken from the label's
/// geometric baseline; the segment is tested against layer polygons to decide
/// what the label names.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// The segment start point.
    pub p0: Point,
    /// The segment end point.
    pub p1: Point,
}

impl Segment {
    /// Creates a new segment between the given endpoints.
    #[inline]
    pub fn new(p0: Point, p1: Point) -> Self {
        Self { p0, p1 }
    }

    /// The midpoint of the segment.
    pub fn midpoint(&self) -> Point {
        Point::new((self.p0.x + self.p1.x) / 2.0, (self.p0.y + self.p1.y) / 2.0)
    }

    /// Returns `true` if this segment intersects the given polygon.
    pub fn intersects(&self, polygon: &Polygon) -> bool {
        use geo::Intersects;
        let line = geo::Line::new(
            geo::Coord::from(self.p0),
            geo::Coord::from(self.p1),
        );
        line.intersects(&polygon.to_geo())
    }
}
