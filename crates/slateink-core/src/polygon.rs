//! Convex quad predicates used for hit-testing and intersection queries.
//!
//! Every object's footprint is its 4-corner polygon (tl, tr, br, bl in
//! winding order); all predicates here operate on that representation.

use kurbo::{Point, Rect};

/// The 4 corners of an object's footprint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerSet {
    pub tl: Point,
    pub tr: Point,
    pub br: Point,
    pub bl: Point,
}

impl CornerSet {
    pub fn points(&self) -> [Point; 4] {
        [self.tl, self.tr, self.br, self.bl]
    }

    /// Corners of an axis-aligned rectangle.
    pub fn from_rect(rect: Rect) -> Self {
        Self {
            tl: Point::new(rect.x0, rect.y0),
            tr: Point::new(rect.x1, rect.y0),
            br: Point::new(rect.x1, rect.y1),
            bl: Point::new(rect.x0, rect.y1),
        }
    }

    /// Axis-aligned bounding box (min/max over the 4 corners).
    pub fn bounding_rect(&self) -> Rect {
        let pts = self.points();
        let min_x = pts.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let max_x = pts.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let min_y = pts.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let max_y = pts.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
        Rect::new(min_x, min_y, max_x, max_y)
    }

    /// Edges in winding order, closing back to the first corner.
    pub fn edges(&self) -> [(Point, Point); 4] {
        let p = self.points();
        [(p[0], p[1]), (p[1], p[2]), (p[2], p[3]), (p[3], p[0])]
    }
}

/// Test if two line segments (a-b) and (c-d) intersect, including the
/// collinear-overlap case.
pub fn segments_intersect(a: Point, b: Point, c: Point, d: Point) -> bool {
    let cross = |o: Point, p: Point, q: Point| -> f64 {
        (p.x - o.x) * (q.y - o.y) - (p.y - o.y) * (q.x - o.x)
    };
    let d1 = cross(c, d, a);
    let d2 = cross(c, d, b);
    let d3 = cross(a, b, c);
    let d4 = cross(a, b, d);
    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    // Collinear cases: check if an endpoint lies on the other segment
    let on_segment = |p: Point, q: Point, r: Point| -> bool {
        r.x >= p.x.min(q.x) && r.x <= p.x.max(q.x) && r.y >= p.y.min(q.y) && r.y <= p.y.max(q.y)
    };
    (d1.abs() < 1e-10 && on_segment(c, d, a))
        || (d2.abs() < 1e-10 && on_segment(c, d, b))
        || (d3.abs() < 1e-10 && on_segment(a, b, c))
        || (d4.abs() < 1e-10 && on_segment(a, b, d))
}

/// True if any edge of `a` crosses any edge of `b`. Edge-touching and
/// coincident quads count as intersecting; full containment does not and
/// must be checked separately.
pub fn polygons_intersect(a: &CornerSet, b: &CornerSet) -> bool {
    for (a1, a2) in a.edges() {
        for (b1, b2) in b.edges() {
            if segments_intersect(a1, a2, b1, b2) {
                return true;
            }
        }
    }
    false
}

/// Ray-casting point-in-polygon over the 4 corners.
pub fn polygon_contains_point(corners: &CornerSet, point: Point) -> bool {
    let mut inside = false;
    for (p1, p2) in corners.edges() {
        if (p1.y > point.y) != (p2.y > point.y) {
            let x_at = p1.x + (point.y - p1.y) / (p2.y - p1.y) * (p2.x - p1.x);
            if point.x < x_at {
                inside = !inside;
            }
        }
    }
    inside
}

/// All 4 corners of `inner` lie inside `outer`.
pub fn polygon_contains_polygon(outer: &CornerSet, inner: &CornerSet) -> bool {
    inner
        .points()
        .iter()
        .all(|&p| polygon_contains_point(outer, p))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(x0: f64, y0: f64, x1: f64, y1: f64) -> CornerSet {
        CornerSet::from_rect(Rect::new(x0, y0, x1, y1))
    }

    #[test]
    fn test_segments_cross() {
        assert!(segments_intersect(
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 0.0),
        ));
    }

    #[test]
    fn test_segments_parallel() {
        assert!(!segments_intersect(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(10.0, 1.0),
        ));
    }

    #[test]
    fn test_segments_collinear_overlap() {
        assert!(segments_intersect(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(15.0, 0.0),
        ));
    }

    #[test]
    fn test_overlapping_quads_intersect() {
        assert!(polygons_intersect(
            &quad(0.0, 0.0, 10.0, 10.0),
            &quad(5.0, 5.0, 15.0, 15.0)
        ));
    }

    #[test]
    fn test_disjoint_quads_do_not_intersect() {
        assert!(!polygons_intersect(
            &quad(0.0, 0.0, 10.0, 10.0),
            &quad(20.0, 20.0, 30.0, 30.0)
        ));
    }

    #[test]
    fn test_contained_quad_has_no_edge_intersection() {
        let outer = quad(0.0, 0.0, 100.0, 100.0);
        let inner = quad(40.0, 40.0, 60.0, 60.0);
        assert!(!polygons_intersect(&outer, &inner));
        assert!(polygon_contains_polygon(&outer, &inner));
        assert!(!polygon_contains_polygon(&inner, &outer));
    }

    #[test]
    fn test_point_in_polygon() {
        let q = quad(0.0, 0.0, 10.0, 10.0);
        assert!(polygon_contains_point(&q, Point::new(5.0, 5.0)));
        assert!(!polygon_contains_point(&q, Point::new(15.0, 5.0)));
    }

    #[test]
    fn test_bounding_rect_of_rotated_corners() {
        let corners = CornerSet {
            tl: Point::new(0.0, -5.0),
            tr: Point::new(5.0, 0.0),
            br: Point::new(0.0, 5.0),
            bl: Point::new(-5.0, 0.0),
        };
        let r = corners.bounding_rect();
        assert_eq!(r, Rect::new(-5.0, -5.0, 5.0, 5.0));
    }
}
