//! Scalar helpers shared by animation and hit testing.

use core::cmp::Ordering;

/// Canonicalize a floating-point value for deterministic ordering.
///
/// Rules:
/// - `-0.0` becomes `0.0`
/// - all NaNs become a single canonical NaN
pub fn canonical_f64(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else if v.is_nan() {
        f64::NAN
    } else {
        v
    }
}

/// Deterministic total ordering for floats.
pub fn stable_total_cmp_f64(a: f64, b: f64) -> Ordering {
    canonical_f64(a).total_cmp(&canonical_f64(b))
}

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Frame-rate independent blend factor for exponential smoothing.
///
/// `rate` is in 1/s; returns the fraction of the remaining distance to cover
/// in `dt_s` seconds.
pub fn smoothing_alpha(rate: f64, dt_s: f64) -> f64 {
    if rate <= 0.0 || dt_s <= 0.0 {
        return 0.0;
    }
    1.0 - (-rate * dt_s).exp()
}

/// Wraps an angle to `(-PI, PI]`.
pub fn wrap_angle_rad(a: f64) -> f64 {
    let tau = std::f64::consts::TAU;
    let mut w = a.rem_euclid(tau);
    if w > std::f64::consts::PI {
        w -= tau;
    }
    w
}

#[cfg(test)]
mod tests {
    use super::{canonical_f64, lerp, smoothing_alpha, stable_total_cmp_f64, wrap_angle_rad};
    use core::cmp::Ordering;
    use std::f64::consts::PI;

    #[test]
    fn canonicalizes_negative_zero() {
        assert_eq!(canonical_f64(-0.0).to_bits(), 0.0f64.to_bits());
        assert_eq!(stable_total_cmp_f64(f64::NAN, f64::NAN), Ordering::Equal);
        assert_eq!(stable_total_cmp_f64(1.0, 2.0), Ordering::Less);
    }

    #[test]
    fn smoothing_is_bounded_and_monotonic() {
        assert_eq!(smoothing_alpha(8.0, 0.0), 0.0);
        let a = smoothing_alpha(8.0, 1.0 / 60.0);
        let b = smoothing_alpha(8.0, 1.0 / 30.0);
        assert!(a > 0.0 && a < b && b < 1.0);
    }

    #[test]
    fn wraps_angles() {
        assert!((wrap_angle_rad(3.0 * PI) - PI).abs() < 1e-12);
        assert!((wrap_angle_rad(-0.5) + 0.5).abs() < 1e-12);
        assert_eq!(lerp(2.0, 4.0, 0.25), 2.5);
    }
}
