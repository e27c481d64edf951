//! Perfect-freehand stroke synthesis.
//!
//! Re-implementation of the freehand brush algorithm: an input polyline of
//! (x, y, pressure) samples is resampled with a streamline low-pass filter
//! into [`StrokePoint`]s carrying direction vectors and running length, and
//! then expanded into a closed outline polygon whose width varies with
//! (real or simulated) pressure. Filling the outline gives the appearance of
//! a variable-width brushed stroke.
//!
//! Invariants:
//! - The same input samples and options always produce the same outline.
//! - `running_length` is monotone non-decreasing over the stroke points.
//! - The returned outline is a closed loop: left side, end cap, reversed
//!   right side, start cap.

use crate::vec::{self, V};

/// π nudged off the exact value so rotations used for caps never land on a
/// degenerate colinear sample.
const FIXED_PI: f64 = std::f64::consts::PI + 0.0001;

/// How quickly simulated pressure settles toward its target.
const RATE_OF_PRESSURE_CHANGE: f64 = 0.275;

/// An input sample: x, y, pressure. Missing pressure is represented as 0.5.
pub type InputPoint = (f64, f64, f64);

/// A resampled point on the spine of the stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokePoint {
    /// Resampled position.
    pub point: V,
    /// Pressure at this point, in `[0, 1]`.
    pub pressure: f64,
    /// Unit vector pointing from this point back toward the previous one.
    pub vector: V,
    /// Distance from the previous point.
    pub distance: f64,
    /// Total distance along the stroke so far.
    pub running_length: f64,
}

/// Options shared by [`get_stroke_points`] and [`get_stroke_outline_points`].
#[derive(Clone, Copy)]
pub struct StrokeOptions {
    /// Base diameter of the stroke.
    pub size: f64,
    /// How much pressure affects width, in `[-1, 1]`.
    pub thinning: f64,
    /// How much to soften the outline (minimum spacing between emitted
    /// outline points, as a fraction of size).
    pub smoothing: f64,
    /// Low-pass amount for input resampling, in `[0, 1]`.
    pub streamline: f64,
    /// Derive pressure from point spacing instead of input samples.
    pub simulate_pressure: bool,
    /// Easing applied to the pressure before computing the radius.
    pub easing: fn(f64) -> f64,
    /// Whether the stroke is complete (pen lifted); the final input point is
    /// then kept exact instead of being interpolated.
    pub last: bool,
    /// Distance over which the start of the stroke tapers in.
    pub taper_start: f64,
    /// Distance over which the end of the stroke tapers out.
    pub taper_end: f64,
    /// Round cap at the start (square otherwise).
    pub cap_start: bool,
    /// Round cap at the end (square otherwise).
    pub cap_end: bool,
}

impl Default for StrokeOptions {
    fn default() -> Self {
        Self {
            size: 16.0,
            thinning: 0.5,
            smoothing: 0.5,
            streamline: 0.5,
            simulate_pressure: true,
            easing: crate::easings::linear,
            last: false,
            taper_start: 0.0,
            taper_end: 0.0,
            cap_start: true,
            cap_end: true,
        }
    }
}

fn stroke_radius(size: f64, thinning: f64, pressure: f64, easing: fn(f64) -> f64) -> f64 {
    size * easing(0.5 - thinning * (0.5 - pressure))
}

/// Resample an input polyline into a smoothed, evenly informative sequence of
/// stroke points.
pub fn get_stroke_points(points: &[InputPoint], options: &StrokeOptions) -> Vec<StrokePoint> {
    if points.is_empty() {
        return Vec::new();
    }

    let t = 0.15 + (1.0 - options.streamline) * 0.85;

    let mut pts: Vec<InputPoint> = points.to_vec();

    // A two-point line gets interpolated into a short run so the outline has
    // something to work with; a single point gets a synthetic neighbour.
    if pts.len() == 2 {
        let last = pts[1];
        pts.truncate(1);
        for i in 1..5 {
            let p = vec::lrp((pts[0].0, pts[0].1), (last.0, last.1), i as f64 / 4.0);
            pts.push((p.0, p.1, last.2));
        }
    }
    if pts.len() == 1 {
        let p = pts[0];
        pts.push((p.0 + 1.0, p.1 + 1.0, p.2));
    }

    let mut stroke_points: Vec<StrokePoint> = Vec::with_capacity(pts.len());
    stroke_points.push(StrokePoint {
        point: (pts[0].0, pts[0].1),
        pressure: if pts[0].2 >= 0.0 { pts[0].2 } else { 0.25 },
        vector: (1.0, 1.0),
        distance: 0.0,
        running_length: 0.0,
    });

    let mut has_reached_minimum_length = false;
    let mut running_length = 0.0;
    let mut prev = stroke_points[0];
    let max = pts.len() - 1;

    for (i, pt) in pts.iter().enumerate().skip(1) {
        let point = if options.last && i == max {
            // The last point in a completed stroke is exact.
            (pt.0, pt.1)
        } else {
            vec::lrp(prev.point, (pt.0, pt.1), t)
        };

        if prev.point == point {
            continue;
        }

        let distance = vec::dist(point, prev.point);
        running_length += distance;

        // Skip the jittery points near the pen-down location.
        if i < max && !has_reached_minimum_length {
            if running_length < options.size {
                continue;
            }
            has_reached_minimum_length = true;
        }

        prev = StrokePoint {
            point,
            pressure: if pt.2 >= 0.0 { pt.2 } else { 0.5 },
            vector: vec::uni(vec::sub(prev.point, point)),
            distance,
            running_length,
        };
        stroke_points.push(prev);
    }

    // The first point never got a meaningful direction.
    if stroke_points.len() > 1 {
        stroke_points[0].vector = stroke_points[1].vector;
    }

    stroke_points
}

/// Expand stroke points into a closed outline polygon.
pub fn get_stroke_outline_points(points: &[StrokePoint], options: &StrokeOptions) -> Vec<V> {
    if points.is_empty() || options.size <= 0.0 {
        return Vec::new();
    }

    let StrokeOptions {
        size,
        thinning,
        smoothing,
        simulate_pressure,
        easing,
        last: is_complete,
        taper_start,
        taper_end,
        cap_start,
        cap_end,
        ..
    } = *options;

    let total_length = points[points.len() - 1].running_length;
    let min_distance = (size * smoothing).powi(2);

    let mut left_pts: Vec<V> = Vec::new();
    let mut right_pts: Vec<V> = Vec::new();

    // Settle the pressure over the first few points so a heavy first sample
    // does not balloon the stroke start.
    let mut prev_pressure = points.iter().take(10).fold(points[0].pressure, |acc, sp| {
        let mut pressure = sp.pressure;
        if simulate_pressure {
            let sp_t = (sp.distance / size).min(1.0);
            let rp = (1.0 - sp_t).min(1.0);
            pressure = (acc + (rp - acc) * (sp_t * RATE_OF_PRESSURE_CHANGE)).min(1.0);
        }
        (acc + pressure) / 2.0
    });

    let mut radius = stroke_radius(size, thinning, points[points.len() - 1].pressure, easing);
    let mut first_radius: Option<f64> = None;

    let mut prev_vector = points[0].vector;
    let mut pl = points[0].point;
    let mut pr = pl;
    let mut tl = pl;
    let mut tr = pr;
    let mut is_prev_point_sharp_corner = false;

    for (i, sp) in points.iter().enumerate() {
        let mut pressure = sp.pressure;
        let StrokePoint {
            point,
            vector,
            distance,
            running_length,
            ..
        } = *sp;

        // Points very close to the end are dropped; the end cap covers them.
        if i < points.len() - 1 && total_length - running_length < 3.0 {
            continue;
        }

        if thinning != 0.0 {
            if simulate_pressure {
                let sp_t = (distance / size).min(1.0);
                let rp = (1.0 - sp_t).min(1.0);
                pressure =
                    (prev_pressure + (rp - prev_pressure) * (sp_t * RATE_OF_PRESSURE_CHANGE))
                        .min(1.0);
            }
            radius = stroke_radius(size, thinning, pressure, easing);
        } else {
            radius = size / 2.0;
        }

        if first_radius.is_none() {
            first_radius = Some(radius);
        }

        let ts = if running_length < taper_start {
            crate::easings::ease_out_quad(running_length / taper_start)
        } else {
            1.0
        };
        let te = if total_length - running_length < taper_end {
            crate::easings::ease_out_cubic((total_length - running_length) / taper_end)
        } else {
            1.0
        };
        radius = (radius * ts.min(te)).max(0.01);

        let next_vector = if i < points.len() - 1 {
            points[i + 1].vector
        } else {
            vector
        };
        let next_dpr = if i < points.len() - 1 {
            vec::dpr(vector, next_vector)
        } else {
            1.0
        };
        let prev_dpr = vec::dpr(vector, prev_vector);

        let is_point_sharp_corner = prev_dpr < 0.0 && !is_prev_point_sharp_corner;
        let is_next_point_sharp_corner = next_dpr < 0.0;

        // A sharp corner gets a full cap drawn around it so the outline does
        // not fold over itself.
        if is_point_sharp_corner || is_next_point_sharp_corner {
            let offset = vec::mul(vec::per(prev_vector), radius);
            let step = 1.0 / 13.0;
            let mut t = 0.0;
            while t <= 1.0 {
                tl = vec::rot_with(vec::sub(point, offset), point, FIXED_PI * t);
                left_pts.push(tl);
                tr = vec::rot_with(vec::add(point, offset), point, -FIXED_PI * t);
                right_pts.push(tr);
                t += step;
            }
            pl = tl;
            pr = tr;
            if is_next_point_sharp_corner {
                is_prev_point_sharp_corner = true;
            }
            continue;
        }

        is_prev_point_sharp_corner = false;

        if i == points.len() - 1 {
            let offset = vec::mul(vec::per(vector), radius);
            left_pts.push(vec::sub(point, offset));
            right_pts.push(vec::add(point, offset));
            continue;
        }

        let offset = vec::mul(vec::per(vec::lrp(next_vector, vector, next_dpr)), radius);

        tl = vec::sub(point, offset);
        if i <= 1 || vec::dist2(pl, tl) > min_distance {
            left_pts.push(tl);
            pl = tl;
        }

        tr = vec::add(point, offset);
        if i <= 1 || vec::dist2(pr, tr) > min_distance {
            right_pts.push(tr);
            pr = tr;
        }

        prev_pressure = pressure;
        prev_vector = vector;
    }

    let first_point = points[0].point;
    let last_point = if points.len() > 1 {
        points[points.len() - 1].point
    } else {
        vec::add(points[0].point, (1.0, 1.0))
    };

    let mut start_cap: Vec<V> = Vec::new();
    let mut end_cap: Vec<V> = Vec::new();

    if points.len() == 1 {
        if !(taper_start > 0.0 || taper_end > 0.0) || is_complete {
            // Draw a dot.
            let start = vec::prj(
                first_point,
                vec::uni(vec::per(vec::sub(first_point, last_point))),
                -first_radius.unwrap_or(radius),
            );
            let mut dot_pts = Vec::new();
            let step = 1.0 / 13.0;
            let mut t = step;
            while t <= 1.0 {
                dot_pts.push(vec::rot_with(start, first_point, FIXED_PI * 2.0 * t));
                t += step;
            }
            return dot_pts;
        }
    } else {
        // Start cap.
        if taper_start > 0.0 || (taper_end > 0.0 && points.len() == 1) {
            // Tapered start, no cap.
        } else if cap_start {
            let step = 1.0 / 13.0;
            let mut t = step;
            while t <= 1.0 {
                start_cap.push(vec::rot_with(right_pts[0], first_point, FIXED_PI * t));
                t += step;
            }
        } else {
            let corners_vector = vec::sub(left_pts[0], right_pts[0]);
            let offset_a = vec::mul(corners_vector, 0.5);
            let offset_b = vec::mul(corners_vector, 0.51);
            start_cap.push(vec::sub(first_point, offset_a));
            start_cap.push(vec::sub(first_point, offset_b));
            start_cap.push(vec::add(first_point, offset_b));
            start_cap.push(vec::add(first_point, offset_a));
        }

        // End cap.
        let direction = vec::per(vec::neg(points[points.len() - 1].vector));
        if taper_end > 0.0 || (taper_start > 0.0 && points.len() == 1) {
            end_cap.push(last_point);
        } else if cap_end {
            let start = vec::prj(last_point, direction, radius);
            let step = 1.0 / 29.0;
            let mut t = step;
            while t < 1.0 {
                end_cap.push(vec::rot_with(start, last_point, FIXED_PI * t));
                t += step;
            }
        } else {
            end_cap.push(vec::add(last_point, vec::mul(direction, radius)));
            end_cap.push(vec::add(last_point, vec::mul(direction, radius * 0.99)));
            end_cap.push(vec::sub(last_point, vec::mul(direction, radius * 0.99)));
            end_cap.push(vec::sub(last_point, vec::mul(direction, radius)));
        }
    }

    let mut outline = left_pts;
    outline.extend(end_cap);
    outline.extend(right_pts.into_iter().rev());
    outline.extend(start_cap);
    outline
}

/// Convenience wrapper: resample and outline in one call.
pub fn get_stroke(points: &[InputPoint], options: &StrokeOptions) -> Vec<V> {
    get_stroke_outline_points(&get_stroke_points(points, options), options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_points(n: usize) -> Vec<InputPoint> {
        (0..n).map(|i| (i as f64 * 10.0, 0.0, 0.5)).collect()
    }

    #[test]
    fn stroke_points_running_length_is_monotone() {
        let pts = get_stroke_points(
            &line_points(20),
            &StrokeOptions {
                streamline: 0.5,
                ..Default::default()
            },
        );
        assert!(pts.len() > 2);
        for w in pts.windows(2) {
            assert!(w[1].running_length >= w[0].running_length);
        }
        assert_eq!(pts[0].running_length, 0.0);
    }

    #[test]
    fn two_point_input_is_expanded() {
        let pts = get_stroke_points(&[(0.0, 0.0, 0.5), (100.0, 0.0, 0.5)], &StrokeOptions::default());
        assert!(pts.len() > 2);
    }

    #[test]
    fn completed_stroke_keeps_exact_endpoint() {
        let input = line_points(12);
        let pts = get_stroke_points(
            &input,
            &StrokeOptions {
                last: true,
                ..Default::default()
            },
        );
        let last = pts.last().unwrap();
        assert_eq!(last.point, (110.0, 0.0));
    }

    #[test]
    fn outline_is_nonempty_and_deterministic() {
        let input = line_points(15);
        let opts = StrokeOptions {
            size: 8.0,
            thinning: 0.65,
            smoothing: 0.65,
            simulate_pressure: true,
            easing: crate::easings::simulated_pressure,
            last: true,
            ..Default::default()
        };
        let a = get_stroke(&input, &opts);
        let b = get_stroke(&input, &opts);
        assert!(!a.is_empty());
        assert_eq!(a, b);
    }

    #[test]
    fn outline_straddles_the_spine() {
        let input = line_points(15);
        let opts = StrokeOptions {
            size: 8.0,
            thinning: 0.0,
            ..Default::default()
        };
        let outline = get_stroke(&input, &opts);
        let above = outline.iter().filter(|p| p.1 < 0.0).count();
        let below = outline.iter().filter(|p| p.1 > 0.0).count();
        assert!(above > 0 && below > 0);
    }

    #[test]
    fn zero_thinning_uses_half_size_radius() {
        let input = line_points(10);
        let pts = get_stroke_points(&input, &StrokeOptions::default());
        let outline = get_stroke_outline_points(
            &pts,
            &StrokeOptions {
                size: 10.0,
                thinning: 0.0,
                smoothing: 0.0,
                ..Default::default()
            },
        );
        // Width of the outline around mid-stroke should be about the size.
        let mid_y: Vec<f64> = outline
            .iter()
            .filter(|p| (p.0 - 50.0).abs() < 6.0)
            .map(|p| p.1)
            .collect();
        let max = mid_y.iter().cloned().fold(f64::MIN, f64::max);
        let min = mid_y.iter().cloned().fold(f64::MAX, f64::min);
        assert!((max - min - 10.0).abs() < 1.5);
    }
}
