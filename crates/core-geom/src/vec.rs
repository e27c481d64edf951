//! Tuple vector arithmetic.
//!
//! These mirror the vector helpers the freehand brush algorithm is defined
//! over and are used anywhere the renderer works with raw point lists. All
//! functions take and return `(f64, f64)`; anything accepting a `Position`
//! converts at the call site.

/// A point or direction in 2-D.
pub type V = (f64, f64);

/// Add vectors.
pub fn add(a: V, b: V) -> V {
    (a.0 + b.0, a.1 + b.1)
}

/// Subtract vectors.
pub fn sub(a: V, b: V) -> V {
    (a.0 - b.0, a.1 - b.1)
}

/// Get the vector from A to B.
pub fn vec(a: V, b: V) -> V {
    (b.0 - a.0, b.1 - a.1)
}

/// Multiply by a scalar.
pub fn mul(a: V, n: f64) -> V {
    (a.0 * n, a.1 * n)
}

/// Divide by a scalar.
pub fn div(a: V, n: f64) -> V {
    (a.0 / n, a.1 / n)
}

/// Perpendicular rotation of a vector.
pub fn per(a: V) -> V {
    (a.1, -a.0)
}

/// Negate a vector.
pub fn neg(a: V) -> V {
    (-a.0, -a.1)
}

/// Dot product.
pub fn dpr(a: V, b: V) -> f64 {
    a.0 * b.0 + a.1 * b.1
}

/// Length of the vector.
pub fn len(a: V) -> f64 {
    a.0.hypot(a.1)
}

/// Unit vector. Zero-length input yields a zero vector rather than NaN.
pub fn uni(a: V) -> V {
    let l = len(a);
    if l == 0.0 {
        (0.0, 0.0)
    } else {
        div(a, l)
    }
}

/// Distance between two points.
pub fn dist(a: V, b: V) -> f64 {
    (a.1 - b.1).hypot(a.0 - b.0)
}

/// Squared distance between two points.
pub fn dist2(a: V, b: V) -> f64 {
    let d = sub(a, b);
    d.0 * d.0 + d.1 * d.1
}

/// Midpoint between two points.
pub fn med(a: V, b: V) -> V {
    mul(add(a, b), 0.5)
}

/// Interpolate from A to B by scalar t.
pub fn lrp(a: V, b: V, t: f64) -> V {
    add(a, mul(sub(b, a), t))
}

/// Angle of the line from A to B, in radians.
pub fn angle(a: V, b: V) -> f64 {
    (b.1 - a.1).atan2(b.0 - a.0)
}

/// Rotate point A around point C by r radians.
pub fn rot_with(a: V, c: V, r: f64) -> V {
    let s = r.sin();
    let co = r.cos();
    let px = a.0 - c.0;
    let py = a.1 - c.1;
    (px * co - py * s + c.0, px * s + py * co + c.1)
}

/// Push a point in the direction of another point by distance d.
pub fn nudge(a: V, b: V, d: f64) -> V {
    add(a, mul(uni(vec(a, b)), d))
}

/// Push a point in the direction of an angle by distance d.
pub fn nudge_at_angle(a: V, angle: f64, d: f64) -> V {
    (angle.cos() * d + a.0, angle.sin() * d + a.1)
}

/// A vector of length d pointing at the given angle.
pub fn from_angle(angle: f64, d: f64) -> V {
    (angle.cos() * d, angle.sin() * d)
}

/// Project a point in a direction by a distance.
pub fn prj(a: V, direction: V, d: f64) -> V {
    add(a, mul(direction, d))
}

/// Snap coordinates to two decimal places, as the arc samplers expect.
pub fn to_fixed(a: V) -> V {
    ((a.0 * 100.0).round() / 100.0, (a.1 * 100.0).round() / 100.0)
}

/// Get `steps` points between A and B, each tagged with a simulated pressure
/// that rises toward the middle of the segment.
pub fn points_between(a: V, b: V, steps: usize) -> Vec<(f64, f64, f64)> {
    let mut points = Vec::with_capacity(steps);
    for i in 0..steps {
        let t = i as f64 / (steps - 1) as f64;
        let k = (0.5 + (0.5 - t).abs()).min(1.0);
        let p = lrp(a, b, t);
        points.push((p.0, p.1, k));
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perpendicular_is_right_rotation() {
        assert_eq!(per((1.0, 0.0)), (0.0, -1.0));
        assert_eq!(per((0.0, 1.0)), (1.0, 0.0));
    }

    #[test]
    fn unit_vector_of_zero_is_zero() {
        assert_eq!(uni((0.0, 0.0)), (0.0, 0.0));
        let u = uni((3.0, 4.0));
        assert!((len(u) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rot_with_quarter_turn() {
        let p = rot_with((2.0, 1.0), (1.0, 1.0), std::f64::consts::FRAC_PI_2);
        assert!((p.0 - 1.0).abs() < 1e-12);
        assert!((p.1 - 2.0).abs() < 1e-12);
    }

    #[test]
    fn points_between_pressure_profile() {
        let pts = points_between((0.0, 0.0), (10.0, 0.0), 6);
        assert_eq!(pts.len(), 6);
        // Endpoints carry the max simulated pressure, midpoints the least.
        assert!((pts[0].2 - 1.0).abs() < 1e-12);
        assert!(pts[2].2 < pts[0].2);
        assert!((pts[5].0 - 10.0).abs() < 1e-12);
    }

    #[test]
    fn lrp_midpoint() {
        assert_eq!(lrp((0.0, 0.0), (4.0, 8.0), 0.5), (2.0, 4.0));
    }
}
