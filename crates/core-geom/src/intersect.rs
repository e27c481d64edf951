//! Segment-circle intersection, used to place arrowheads on arrow shafts.

use crate::vec::{self, V};

/// Result of an intersection test. `points` is empty when the segment does
/// not cross the circle.
#[derive(Debug, Clone, PartialEq)]
pub struct Intersection {
    pub message: &'static str,
    pub points: Vec<V>,
}

impl Intersection {
    fn new(message: &'static str, points: Vec<V>) -> Self {
        Self { message, points }
    }

    pub fn did_intersect(&self) -> bool {
        !self.points.is_empty()
    }
}

/// Intersect the segment a1-a2 with the circle centered at c of radius r.
pub fn intersect_line_segment_circle(a1: V, a2: V, c: V, r: f64) -> Intersection {
    let a = (a2.0 - a1.0) * (a2.0 - a1.0) + (a2.1 - a1.1) * (a2.1 - a1.1);
    let b = 2.0 * ((a2.0 - a1.0) * (a1.0 - c.0) + (a2.1 - a1.1) * (a1.1 - c.1));
    let cc = c.0 * c.0 + c.1 * c.1 + a1.0 * a1.0 + a1.1 * a1.1
        - 2.0 * (c.0 * a1.0 + c.1 * a1.1)
        - r * r;

    let deter = b * b - 4.0 * a * cc;

    if deter < 0.0 {
        return Intersection::new("outside", vec![]);
    }
    if deter == 0.0 {
        return Intersection::new("tangent", vec![]);
    }

    let e = deter.sqrt();
    let u1 = (-b + e) / (2.0 * a);
    let u2 = (-b - e) / (2.0 * a);
    if !(0.0..=1.0).contains(&u1) && !(0.0..=1.0).contains(&u2) {
        return if (u1 < 0.0 && u2 < 0.0) || (u1 > 1.0 && u2 > 1.0) {
            Intersection::new("outside", vec![])
        } else {
            Intersection::new("inside", vec![])
        };
    }

    let mut results = Vec::with_capacity(2);
    if (0.0..=1.0).contains(&u1) {
        results.push(vec::lrp(a1, a2, u1));
    }
    if (0.0..=1.0).contains(&u2) {
        results.push(vec::lrp(a1, a2, u2));
    }

    Intersection::new("intersection", results)
}

/// Same test with the circle arguments first.
pub fn intersect_circle_line_segment(c: V, r: f64, a1: V, a2: V) -> Intersection {
    intersect_line_segment_circle(a1, a2, c, r)
}

/// Intersect two circles. Two solutions when they properly cross; their
/// order follows the sign of the radical-line offset so callers can pick a
/// side by sweep direction.
pub fn intersect_circle_circle(c1: V, r1: f64, c2: V, r2: f64) -> Intersection {
    let d = vec::dist(c1, c2);
    if d == 0.0 || d > r1 + r2 || d < (r1 - r2).abs() {
        return Intersection::new("no intersection", vec![]);
    }

    let a = (r1 * r1 - r2 * r2 + d * d) / (2.0 * d);
    let h2 = r1 * r1 - a * a;
    if h2 < 0.0 {
        return Intersection::new("no intersection", vec![]);
    }
    let h = h2.sqrt();

    let mid = vec::add(c1, vec::mul(vec::div(vec::sub(c2, c1), d), a));
    let offset = vec::mul(vec::div(vec::per(vec::sub(c2, c1)), d), h);

    if h == 0.0 {
        return Intersection::new("tangent", vec![mid]);
    }

    Intersection::new(
        "intersection",
        vec![vec::add(mid, offset), vec::sub(mid, offset)],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_through_circle_has_two_hits() {
        let i = intersect_line_segment_circle((-10.0, 0.0), (10.0, 0.0), (0.0, 0.0), 5.0);
        assert!(i.did_intersect());
        assert_eq!(i.points.len(), 2);
        for p in &i.points {
            assert!((p.0.abs() - 5.0).abs() < 1e-9);
            assert!(p.1.abs() < 1e-9);
        }
    }

    #[test]
    fn segment_leaving_circle_has_one_hit() {
        let i = intersect_line_segment_circle((0.0, 0.0), (10.0, 0.0), (0.0, 0.0), 5.0);
        assert_eq!(i.points.len(), 1);
        assert!((i.points[0].0 - 5.0).abs() < 1e-9);
    }

    #[test]
    fn segment_missing_circle() {
        let i = intersect_line_segment_circle((-10.0, 20.0), (10.0, 20.0), (0.0, 0.0), 5.0);
        assert!(!i.did_intersect());
        assert_eq!(i.message, "outside");
    }

    #[test]
    fn crossing_circles_have_two_hits() {
        let i = intersect_circle_circle((0.0, 0.0), 5.0, (6.0, 0.0), 5.0);
        assert_eq!(i.points.len(), 2);
        for p in &i.points {
            assert!((p.0 - 3.0).abs() < 1e-9);
            assert!((p.1.abs() - 4.0).abs() < 1e-9);
        }
        // The two solutions are on opposite sides of the center line.
        assert!(i.points[0].1 * i.points[1].1 < 0.0);
    }

    #[test]
    fn distant_circles_do_not_intersect() {
        let i = intersect_circle_circle((0.0, 0.0), 1.0, (10.0, 0.0), 2.0);
        assert!(!i.did_intersect());
    }

    #[test]
    fn segment_inside_circle() {
        let i = intersect_line_segment_circle((-1.0, 0.0), (1.0, 0.0), (0.0, 0.0), 5.0);
        assert!(!i.did_intersect());
        assert_eq!(i.message, "inside");
    }
}
