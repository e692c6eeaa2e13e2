//! Boolean operations over sets of layer polygons.
//!
//! A layer is represented as a multiset of polygons. The operations here
//! treat each input slice as one region (the union of its polygons) and
//! return the resulting region fractured back into simple polygons, sorted
//! canonically.

use std::cmp::Ordering;

use geo::{BooleanOps, CoordsIter};

use crate::polygon::Polygon;
use crate::rect::Bbox;

/// Canonical polygon ordering: bounding-box minimum x, then minimum y.
///
/// Polygons without a bounding box (no vertices) sort first.
pub fn canonical_order(a: &Polygon, b: &Polygon) -> Ordering {
    match (a.bbox(), b.bbox()) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(ra), Some(rb)) => ra
            .min_x()
            .total_cmp(&rb.min_x())
            .then_with(|| ra.min_y().total_cmp(&rb.min_y())),
    }
}

/// Sorts polygons into canonical order.
pub fn sort_canonical(polygons: &mut [Polygon]) {
    polygons.sort_by(canonical_order);
}

fn to_multi(polygons: &[Polygon]) -> geo::MultiPolygon<f64> {
    geo::MultiPolygon::new(polygons.iter().map(|p| p.to_geo()).collect())
}

fn from_multi(multi: geo::MultiPolygon<f64>) -> Vec<Polygon> {
    let mut out: Vec<Polygon> = multi
        .iter()
        .filter(|p| p.exterior().coords_count() >= 4)
        .map(Polygon::from_geo)
        .collect();
    sort_canonical(&mut out);
    out
}

/// Coalesces overlapping polygons within one layer.
///
/// Input polygons may overlap each other; the result covers the same region
/// with pairwise disjoint polygons in canonical order. Polygons are folded in
/// one at a time, so the inputs to each boolean step stay valid multipolygons.
pub fn merge(polygons: &[Polygon]) -> Vec<Polygon> {
    let mut acc = geo::MultiPolygon::<f64>::new(Vec::new());
    for p in polygons {
        acc = acc.union(&geo::MultiPolygon::new(vec![p.to_geo()]));
    }
    from_multi(acc)
}

/// The region `a ∩ b`, fractured into canonically ordered polygons.
pub fn intersection(a: &[Polygon], b: &[Polygon]) -> Vec<Polygon> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    from_multi(to_multi(a).intersection(&to_multi(b)))
}

/// The region `a \ b`, fractured into canonically ordered polygons.
pub fn difference(a: &[Polygon], b: &[Polygon]) -> Vec<Polygon> {
    if a.is_empty() {
        return Vec::new();
    }
    if b.is_empty() {
        let mut out = a.to_vec();
        sort_canonical(&mut out);
        return out;
    }
    from_multi(to_multi(a).difference(&to_multi(b)))
}

/// The region `a ∪ b`, fractured into canonically ordered polygons.
pub fn union(a: &[Polygon], b: &[Polygon]) -> Vec<Polygon> {
    if a.is_empty() {
        let mut out = b.to_vec();
        sort_canonical(&mut out);
        return out;
    }
    if b.is_empty() {
        let mut out = a.to_vec();
        sort_canonical(&mut out);
        return out;
    }
    from_multi(to_multi(a).union(&to_multi(b)))
}
