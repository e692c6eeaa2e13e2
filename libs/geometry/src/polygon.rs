//! Simple polygons in drawing coordinates.

use geo::{Area, Centroid, Contains, Intersects, Relate, Validation};
use serde::{Deserialize, Serialize};

use crate::point::Point;
use crate::rect::{Bbox, Rect};

/// A polygon with an exterior ring and zero or more holes.
///
/// Rings are neither required to be closed (the last vertex need not repeat
/// the first) nor to have a particular winding; predicates normalize as
/// needed.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    exterior: Vec<Point>,
    holes: Vec<Vec<Point>>,
}

impl Polygon {
    /// Creates a hole-free polygon with the given vertices.
    pub fn from_verts(exterior: Vec<Point>) -> Self {
        Self {
            exterior,
            holes: Vec::new(),
        }
    }

    /// Creates a polygon with the given exterior ring and holes.
    pub fn with_holes(exterior: Vec<Point>, holes: Vec<Vec<Point>>) -> Self {
        Self { exterior, holes }
    }

    /// Creates a rectangular polygon covering `rect`.
    pub fn from_rect(rect: Rect) -> Self {
        Self::from_verts(vec![
            Point::new(rect.min_x(), rect.min_y()),
            Point::new(rect.max_x(), rect.min_y()),
            Point::new(rect.max_x(), rect.max_y()),
            Point::new(rect.min_x(), rect.max_y()),
        ])
    }

    /// The vertices of the exterior ring.
    pub fn points(&self) -> &[Point] {
        &self.exterior
    }

    /// The holes of this polygon.
    pub fn holes(&self) -> &[Vec<Point>] {
        &self.holes
    }

    /// The first vertex of the exterior ring.
    ///
    /// Useful for pointing a user at a problematic shape.
    pub fn start_point(&self) -> Option<Point> {
        self.exterior.first().copied()
    }

    /// The centroid of the polygon.
    ///
    /// Falls back to the vertex average for degenerate (zero-area) shapes.
    pub fn centroid(&self) -> Point {
        if let Some(c) = self.to_geo().centroid() {
            return Point::new(c.x(), c.y());
        }
        let n = self.exterior.len().max(1) as f64;
        let x = self.exterior.iter().map(|p| p.x).sum::<f64>() / n;
        let y = self.exterior.iter().map(|p| p.y).sum::<f64>() / n;
        Point::new(x, y)
    }

    /// The unsigned area of the polygon, holes excluded.
    pub fn area(&self) -> f64 {
        self.to_geo().unsigned_area()
    }

    /// Returns `true` if the given point lies in the polygon's interior.
    pub fn contains(&self, p: &Point) -> bool {
        self.to_geo().contains(&geo::Point::from(geo::Coord::from(*p)))
    }

    /// Returns `true` if this polygon intersects `other` (boundaries included).
    pub fn intersects(&self, other: &Polygon) -> bool {
        self.to_geo().intersects(&other.to_geo())
    }

    /// Returns `true` if this polygon touches `other`: their boundaries meet
    /// but their interiors do not overlap.
    pub fn touches(&self, other: &Polygon) -> bool {
        self.to_geo().relate(&other.to_geo()).is_touches()
    }

    /// Returns `true` if this polygon is topologically sound (no
    /// self-crossing rings, holes properly contained).
    pub fn is_valid(&self) -> bool {
        self.exterior.len() >= 3 && self.to_geo().is_valid()
    }

    pub(crate) fn to_geo(&self) -> geo::Polygon<f64> {
        let exterior: Vec<geo::Coord<f64>> =
            self.exterior.iter().map(|&p| p.into()).collect();
        let holes: Vec<geo::LineString<f64>> = self
            .holes
            .iter()
            .map(|ring| ring.iter().map(|&p| geo::Coord::from(p)).collect())
            .collect();
        geo::Polygon::new(geo::LineString::from(exterior), holes)
    }

    pub(crate) fn from_geo(polygon: &geo::Polygon<f64>) -> Self {
        // geo rings repeat the first coordinate at the end; drop it.
        let ring_points = |ring: &geo::LineString<f64>| -> Vec<Point> {
            let mut pts: Vec<Point> = ring.coords().map(|&c| c.into()).collect();
            if pts.len() > 1 && pts.first() == pts.last() {
                pts.pop();
            }
            pts
        };
        Self {
            exterior: ring_points(polygon.exterior()),
            holes: polygon.interiors().iter().map(ring_points).collect(),
        }
    }
}

impl Bbox for Polygon {
    fn bbox(&self) -> Option<Rect> {
        let mut iter = self.exterior.iter();
        let first = iter.next()?;
        let mut rect = Rect::from_point(*first);
        for p in iter {
            rect = rect.union(&Rect::from_point(*p));
        }
        Some(rect)
    }
}
