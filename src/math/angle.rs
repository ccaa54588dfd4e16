use glam::Vec2;
use std::f32::consts::TAU;

/// Distances at or below this are treated as coincident points.
pub const EPSILON: f32 = 0.01;

/// Wraps `angle` onto the 2π window centred on `center` (shortest path).
///
/// ```
/// use followers::math::wrap_around;
/// let wrapped = wrap_around(7.0, 0.0);
/// assert!((wrapped - (7.0 - std::f32::consts::TAU)).abs() < 1e-6);
/// ```
pub fn wrap_around(angle: f32, center: f32) -> f32 {
    angle - TAU * ((angle - center) / TAU + 0.5).floor()
}

/// Wraps `angle` into (−π, π].
pub fn wrap_to_pi(angle: f32) -> f32 {
    angle - TAU * (angle / TAU - 0.5).ceil()
}

/// Unit vector from `from` to `to`, or `None` when the points coincide.
pub fn direction(from: Vec2, to: Vec2) -> Option<Vec2> {
    let delta = to - from;
    let len = delta.length();
    if len > EPSILON && len.is_finite() {
        Some(delta / len)
    } else {
        None
    }
}

/// Angle of the vector from `from` to `to`, or `None` when the points coincide.
pub fn heading(from: Vec2, to: Vec2) -> Option<f32> {
    direction(from, to).map(|d| d.y.atan2(d.x))
}

/// Offset of `length` along `angle`.
pub fn polar(angle: f32, length: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin()) * length
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f32::consts::PI;

    #[test]
    fn wrap_stays_inside_window() {
        for i in -200..200 {
            let angle = i as f32 * 0.37;
            let wrapped = wrap_around(angle, 1.0);
            assert!(wrapped >= 1.0 - PI - 1e-4 && wrapped <= 1.0 + PI + 1e-4);
        }
    }

    #[test]
    fn wrap_to_pi_keeps_pi_and_flips_minus_pi() {
        assert_eq!(wrap_to_pi(PI), PI);
        assert_eq!(wrap_to_pi(-PI), PI);
        assert_abs_diff_eq!(wrap_to_pi(2.5 * PI), 0.5 * PI, epsilon = 1e-5);
        assert_abs_diff_eq!(wrap_to_pi(-PI + 0.1), -PI + 0.1, epsilon = 1e-6);
    }

    #[test]
    fn wrap_is_idempotent() {
        for i in -200..200 {
            let angle = i as f32 * 0.731 + 0.05;
            let once = wrap_to_pi(angle);
            assert_abs_diff_eq!(wrap_to_pi(once), once, epsilon = 1e-5);
        }
    }

    #[test]
    fn coincident_points_have_no_direction() {
        let p = Vec2::new(3.0, 4.0);
        assert!(direction(p, p + Vec2::splat(0.001)).is_none());
        assert!(heading(p, p).is_none());
    }

    #[test]
    fn heading_matches_atan2() {
        let h = heading(Vec2::ZERO, Vec2::new(0.0, 2.0)).unwrap_or_default();
        assert_abs_diff_eq!(h, PI / 2.0, epsilon = 1e-6);
    }
}
