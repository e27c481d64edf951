//! Easing functions for stroke synthesis and arc sampling.

use std::f64::consts::PI;

/// Identity easing, the freehand default.
pub fn linear(t: f64) -> f64 {
    t
}

pub fn ease_in_out_sine(t: f64) -> f64 {
    -((PI * t).cos() - 1.0) / 2.0
}

pub fn ease_out_quad(t: f64) -> f64 {
    t * (2.0 - t)
}

pub fn ease_in_out_cubic(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        (t - 1.0) * (2.0 * t - 2.0) * (2.0 * t - 2.0) + 1.0
    }
}

pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t - 1.0;
    t * t * t + 1.0
}

/// Pressure curve used for freehand strokes when the input has no real
/// pressure samples.
pub fn simulated_pressure(t: f64) -> f64 {
    (t * PI).sin() / 2.0
}

/// Pressure curve used when the input carries real pressure samples.
pub fn real_pressure(t: f64) -> f64 {
    t * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints() {
        for f in [
            linear,
            ease_in_out_sine,
            ease_out_quad,
            ease_in_out_cubic,
            ease_out_cubic,
        ] {
            assert!(f(0.0).abs() < 1e-12);
            assert!((f(1.0) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn simulated_pressure_peaks_mid_stroke() {
        assert!(simulated_pressure(0.5) > simulated_pressure(0.1));
        assert!((simulated_pressure(0.5) - 0.5).abs() < 1e-12);
    }
}
