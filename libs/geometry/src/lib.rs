//! Drawing-space geometry for layer-based chip tracings.
//!
//! Coordinates are `f64` values in the drawing's shared coordinate frame.
//! Polygons are simple (optionally holed) regions; the predicates exposed
//! here (containment, touching, intersection) and the region boolean
//! operations are backed by the `geo` crate.
//!
//! Determinism: all region-producing operations return polygons sorted by
//! the canonical bounding-box comparator (minimum x, then minimum y), so
//! downstream indices and tie-breaks are reproducible across runs.

#![warn(missing_docs)]

pub mod point;
pub mod polygon;
pub mod rect;
pub mod regions;
pub mod segment;

#[cfg(test)]
pub(crate) mod tests;

pub use point::Point;
pub use polygon::Polygon;
pub use rect::{Bbox, Rect};
pub use regions::{canonical_order, difference, intersection, merge, sort_canonical, union};
pub use segment::Segment;
