//! Circle, ellipse, and angle helpers used by the shape finalizers.

use std::f64::consts::{PI, TAU};

use crate::vec::{self, V};
use crate::Position;

/// The magic constant for approximating a quarter circle with one cubic
/// Bézier segment. Used instead of `cairo::Context::arc` because degenerate
/// (zero-width or zero-height) ellipses break the scaling that arc-based
/// drawing requires.
pub const BEZIER_CIRCLE_MAGIC: f64 = 0.551915024494;

/// Center and radius of the circle passing through three points.
///
/// Collinear inputs make the denominator zero; callers guard against that by
/// treating nearly-straight arrows as straight lines.
pub fn circle_from_three_points(a: V, b: V, c: V) -> (Position, f64) {
    let (x1, y1) = a;
    let (x2, y2) = b;
    let (x3, y3) = c;

    let da = x1 * (y2 - y3) - y1 * (x2 - x3) + x2 * y3 - x3 * y2;

    let db = (x1 * x1 + y1 * y1) * (y3 - y2)
        + (x2 * x2 + y2 * y2) * (y1 - y3)
        + (x3 * x3 + y3 * y3) * (y2 - y1);

    let dc = (x1 * x1 + y1 * y1) * (x2 - x3)
        + (x2 * x2 + y2 * y2) * (x3 - x1)
        + (x3 * x3 + y3 * y3) * (x1 - x2);

    let x = -db / (2.0 * da);
    let y = -dc / (2.0 * da);

    (Position::new(x, y), (x - x1).hypot(y - y1))
}

/// Short angular distance from a0 to a1, in `(-π, π]`.
pub fn short_angle_dist(a0: f64, a1: f64) -> f64 {
    let da = (a1 - a0) % TAU;
    ((2.0 * da) % TAU) - da
}

/// Interpolate between two angles along the short way around.
pub fn lerp_angles(a0: f64, a1: f64, t: f64) -> f64 {
    a0 + short_angle_dist(a0, a1) * t
}

/// Signed sweep between two points on a circle's perimeter, seen from the
/// center C. The sign encodes traversal direction.
pub fn get_sweep(c: V, a: V, b: V) -> f64 {
    short_angle_dist(vec::angle(c, a), vec::angle(c, b))
}

/// Arc length of the sweep from A to B on the circle centered at C.
pub fn arc_length(c: V, r: f64, a: V, b: V) -> f64 {
    r * TAU * (get_sweep(c, a, b) / TAU)
}

/// Point on the circle centered at `center` at the given angle.
pub fn point_on_circle(center: V, radius: f64, angle: f64) -> V {
    (
        center.0 + radius * angle.cos(),
        center.1 + radius * angle.sin(),
    )
}

/// Approximate perimeter of an ellipse (Ramanujan's second approximation).
pub fn perimeter_of_ellipse(rx: f64, ry: f64) -> f64 {
    // Degenerate "ellipses" are really lines (or points).
    if rx == 0.0 {
        return 2.0 * ry;
    } else if ry == 0.0 {
        return 2.0 * rx;
    }

    let h = (rx - ry) * (rx - ry) / ((rx + ry) * (rx + ry));
    PI * (rx + ry) * (1.0 + (3.0 * h) / (10.0 + (4.0 - 3.0 * h).sqrt()))
}

/// Convert a quadratic Bézier (p0, control, p2) into the control points of
/// the equivalent cubic.
pub fn bezier_quad_to_cube(qp0: V, qp1: V, qp2: V) -> (V, V) {
    (
        vec::add(qp0, vec::mul(vec::sub(qp1, qp0), 2.0 / 3.0)),
        vec::add(qp2, vec::mul(vec::sub(qp1, qp2), 2.0 / 3.0)),
    )
}

/// Evaluate the quadratic Bézier (p0, control, p2) at t.
pub fn bezier_quad_at(p0: V, c: V, p2: V, t: f64) -> V {
    let u = 1.0 - t;
    (
        u * u * p0.0 + 2.0 * u * t * c.0 + t * t * p2.0,
        u * u * p0.1 + 2.0 * u * t * c.1 + t * t * p2.1,
    )
}

/// Evaluate the cubic Bézier (p0, c1, c2, p3) at t.
pub fn bezier_cubic_at(p0: V, c1: V, c2: V, p3: V, t: f64) -> V {
    let u = 1.0 - t;
    (
        u * u * u * p0.0 + 3.0 * u * u * t * c1.0 + 3.0 * u * t * t * c2.0 + t * t * t * p3.0,
        u * u * u * p0.1 + 3.0 * u * u * t * c1.1 + 3.0 * u * t * t * c2.1 + t * t * t * p3.1,
    )
}

/// Approximate the length of the cubic curve through `control` (used with
/// both cubic control points coincident) by sampling segments.
pub fn bezier_length(start: Position, control: Position, end: Position) -> f64 {
    const NUM_SEGMENTS: usize = 10;
    let mut length = 0.0;
    let mut last: V = start.into();

    for i in 1..=NUM_SEGMENTS {
        let t = i as f64 / NUM_SEGMENTS as f64;
        let u = 1.0 - t;
        let x = u * u * u * start.x
            + 3.0 * u * u * t * control.x
            + 3.0 * u * t * t * control.x
            + t * t * t * end.x;
        let y = u * u * u * start.y
            + 3.0 * u * u * t * control.y
            + 3.0 * u * t * t * control.y
            + t * t * t * end.y;
        length += vec::dist(last, (x, y));
        last = (x, y);
    }

    length
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circumcircle_of_right_triangle() {
        let (center, radius) = circle_from_three_points((0.0, 0.0), (10.0, 0.0), (0.0, 10.0));
        assert!((center.x - 5.0).abs() < 1e-9);
        assert!((center.y - 5.0).abs() < 1e-9);
        assert!((radius - 50.0_f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn sweep_sign_matches_traversal_direction() {
        let c = (5.0, 5.0);
        let cw = get_sweep(c, (0.0, 0.0), (10.0, 0.0));
        let ccw = get_sweep(c, (10.0, 0.0), (0.0, 0.0));
        assert!(cw * ccw < 0.0);
    }

    #[test]
    fn short_angle_dist_wraps() {
        let d = short_angle_dist(0.1, TAU - 0.1);
        assert!((d + 0.2).abs() < 1e-9);
    }

    #[test]
    fn quad_to_cube_preserves_curve() {
        let p0 = (0.0, 0.0);
        let c = (5.0, 10.0);
        let p2 = (10.0, 0.0);
        let (c1, c2) = bezier_quad_to_cube(p0, c, p2);
        for t in [0.0, 0.5, 1.0] {
            let q = bezier_quad_at(p0, c, p2, t);
            let cu = bezier_cubic_at(p0, c1, c2, p2, t);
            assert!((q.0 - cu.0).abs() < 1e-9);
            assert!((q.1 - cu.1).abs() < 1e-9);
        }
    }

    #[test]
    fn ellipse_perimeter_circle_case() {
        let p = perimeter_of_ellipse(10.0, 10.0);
        assert!((p - TAU * 10.0).abs() < 1e-6);
        // Degenerate cases collapse to line lengths.
        assert_eq!(perimeter_of_ellipse(0.0, 7.0), 14.0);
        assert_eq!(perimeter_of_ellipse(7.0, 0.0), 14.0);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn short_angle_dist_stays_within_half_a_turn(
                a0 in -20.0..20.0f64,
                a1 in -20.0..20.0f64,
            ) {
                let d = short_angle_dist(a0, a1);
                prop_assert!(d.abs() <= PI + 1e-9);
            }

            #[test]
            fn lerp_angles_endpoints_agree_modulo_tau(
                a0 in -6.0..6.0f64,
                a1 in -6.0..6.0f64,
            ) {
                let start = lerp_angles(a0, a1, 0.0);
                let end = lerp_angles(a0, a1, 1.0);
                prop_assert!((start - a0).abs() < 1e-9);
                let wrapped = (end - a1).rem_euclid(TAU);
                prop_assert!(wrapped < 1e-6 || (TAU - wrapped) < 1e-6);
            }

            #[test]
            fn circumcircle_is_equidistant_from_all_three_points(
                x2 in 1.0..100.0f64,
                y3 in 1.0..100.0f64,
                y2 in -50.0..50.0f64,
            ) {
                // Three non-collinear points by construction.
                let a = (0.0, 0.0);
                let b = (x2, y2);
                let c = (0.0, y3);
                prop_assume!((b.0 * c.1 - b.1 * c.0).abs() > 1e-3);
                let (center, radius) = circle_from_three_points(a, b, c);
                for p in [a, b, c] {
                    let d = (center.x - p.0).hypot(center.y - p.1);
                    prop_assert!((d - radius).abs() < 1e-6 * radius.max(1.0));
                }
            }
        }
    }
}
