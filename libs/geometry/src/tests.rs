use approx::assert_abs_diff_eq;

use crate::*;

fn rect_poly(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon {
    Polygon::from_rect(Rect::from_sides(x0, y0, x1, y1))
}

#[test]
fn bbox_and_center() {
    let p = rect_poly(1.0, 2.0, 5.0, 6.0);
    let bbox = p.bbox().unwrap();
    assert_eq!(bbox.min_x(), 1.0);
    assert_eq!(bbox.min_y(), 2.0);
    assert_eq!(bbox.max_x(), 5.0);
    assert_eq!(bbox.max_y(), 6.0);
    let c = p.centroid();
    assert_abs_diff_eq!(c.x, 3.0, epsilon = 1e-9);
    assert_abs_diff_eq!(c.y, 4.0, epsilon = 1e-9);
}

#[test]
fn point_containment() {
    let p = rect_poly(0.0, 0.0, 10.0, 10.0);
    assert!(p.contains(&Point::new(5.0, 5.0)));
    assert!(!p.contains(&Point::new(15.0, 5.0)));
}

#[test]
fn containment_respects_holes() {
    let outer = vec![
        Point::new(0.0, 0.0),
        Point::new(10.0, 0.0),
        Point::new(10.0, 10.0),
        Point::new(0.0, 10.0),
    ];
    let hole = vec![
        Point::new(4.0, 4.0),
        Point::new(6.0, 4.0),
        Point::new(6.0, 6.0),
        Point::new(4.0, 6.0),
    ];
    let p = Polygon::with_holes(outer, vec![hole]);
    assert!(p.contains(&Point::new(1.0, 1.0)));
    assert!(!p.contains(&Point::new(5.0, 5.0)));
}

#[test]
fn touching_vs_overlapping() {
    let a = rect_poly(0.0, 0.0, 4.0, 4.0);
    let b = rect_poly(4.0, 0.0, 8.0, 4.0);
    let c = rect_poly(2.0, 0.0, 6.0, 4.0);
    assert!(a.touches(&b));
    assert!(a.intersects(&b));
    assert!(!a.touches(&c));
    assert!(a.intersects(&c));
}

#[test]
fn self_crossing_polygon_is_invalid() {
    // Bowtie: edges cross at the center.
    let bowtie = Polygon::from_verts(vec![
        Point::new(0.0, 0.0),
        Point::new(4.0, 4.0),
        Point::new(4.0, 0.0),
        Point::new(0.0, 4.0),
    ]);
    assert!(!bowtie.is_valid());
    assert!(rect_poly(0.0, 0.0, 1.0, 1.0).is_valid());
}

#[test]
fn boolean_intersection_and_difference() {
    let a = vec![rect_poly(0.0, 0.0, 10.0, 4.0)];
    let b = vec![rect_poly(4.0, -2.0, 6.0, 6.0)];

    let isect = intersection(&a, &b);
    assert_eq!(isect.len(), 1);
    assert_abs_diff_eq!(isect[0].area(), 8.0, epsilon = 1e-9);

    // The vertical bar splits the horizontal bar in two.
    let diff = difference(&a, &b);
    assert_eq!(diff.len(), 2);
    let b0 = diff[0].bbox().unwrap();
    let b1 = diff[1].bbox().unwrap();
    // Canonical order: leftmost fragment first.
    assert!(b0.min_x() < b1.min_x());
    assert_eq!(b0.min_x(), 0.0);
    assert_eq!(b1.max_x(), 10.0);
}

#[test]
fn union_merges_overlapping_regions() {
    let a = vec![rect_poly(0.0, 0.0, 5.0, 5.0)];
    let b = vec![rect_poly(3.0, 0.0, 8.0, 5.0)];
    let u = union(&a, &b);
    assert_eq!(u.len(), 1);
    assert_abs_diff_eq!(u[0].area(), 40.0, epsilon = 1e-9);
}

#[test]
fn merge_coalesces_a_layer() {
    let layer = vec![
        rect_poly(6.0, 0.0, 8.0, 2.0),
        rect_poly(0.0, 0.0, 3.0, 3.0),
        rect_poly(2.0, 0.0, 5.0, 3.0),
    ];
    let merged = merge(&layer);
    assert_eq!(merged.len(), 2);
    // Canonical order, overlap counted once.
    assert_abs_diff_eq!(merged[0].area(), 15.0, epsilon = 1e-9);
    assert_abs_diff_eq!(merged[1].area(), 4.0, epsilon = 1e-9);

    assert!(merge(&[]).is_empty());
}

#[test]
fn canonical_order_is_min_x_then_min_y() {
    let mut polys = vec![
        rect_poly(5.0, 0.0, 6.0, 1.0),
        rect_poly(0.0, 7.0, 1.0, 8.0),
        rect_poly(0.0, 2.0, 1.0, 3.0),
    ];
    sort_canonical(&mut polys);
    let mins: Vec<(f64, f64)> = polys
        .iter()
        .map(|p| {
            let b = p.bbox().unwrap();
            (b.min_x(), b.min_y())
        })
        .collect();
    assert_eq!(mins, vec![(0.0, 2.0), (0.0, 7.0), (5.0, 0.0)]);
}

#[test]
fn segment_polygon_intersection() {
    let p = rect_poly(0.0, 0.0, 4.0, 4.0);
    let hit = Segment::new(Point::new(-1.0, 2.0), Point::new(2.0, 2.0));
    let miss = Segment::new(Point::new(-1.0, 5.0), Point::new(5.0, 5.0));
    assert!(hit.intersects(&p));
    assert!(!miss.intersects(&p));
    assert_eq!(hit.midpoint(), Point::new(0.5, 2.0));
}
