//! 2D vector helpers
//!
//! Operations the router composes geometry from that [`glam::DVec2`]
//! has no operator for. Board coordinates are y-down.

pub use glam::DVec2;

/// Rescale `v` to the given magnitude
///
/// Returns `None` for a zero-length vector.
pub fn normalize_to(v: DVec2, magnitude: f64) -> Option<DVec2> {
    v.try_normalize().map(|unit| unit * magnitude)
}

/// Perpendicular `(y, -x)`
#[inline]
pub fn perpendicular(v: DVec2) -> DVec2 {
    DVec2::new(v.y, -v.x)
}

/// Mirror across the y axis (negate x)
#[inline]
pub fn mirror_x(v: DVec2) -> DVec2 {
    DVec2::new(-v.x, v.y)
}

/// Mirror across the x axis (negate y)
#[inline]
pub fn mirror_y(v: DVec2) -> DVec2 {
    DVec2::new(v.x, -v.y)
}

/// Midpoint of two points
#[inline]
pub fn midpoint(a: DVec2, b: DVec2) -> DVec2 {
    (a + b) * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_to_magnitude() {
        let v = normalize_to(DVec2::new(3.0, 4.0), 10.0).unwrap();
        assert!((v - DVec2::new(6.0, 8.0)).length() < 1e-12);
        assert!(normalize_to(DVec2::ZERO, 1.0).is_none());
    }

    #[test]
    fn test_perpendicular_and_mirrors() {
        let v = DVec2::new(1.0, 2.0);
        assert_eq!(perpendicular(v), DVec2::new(2.0, -1.0));
        assert_eq!(perpendicular(v).dot(v), 0.0);
        assert_eq!(mirror_x(v), DVec2::new(-1.0, 2.0));
        assert_eq!(mirror_y(v), DVec2::new(1.0, -2.0));
    }

    #[test]
    fn test_midpoint() {
        let a = DVec2::new(1.0, 1.0);
        let b = DVec2::new(3.0, 5.0);
        assert_eq!(midpoint(a, b), DVec2::new(2.0, 3.0));
        assert_eq!(midpoint(b, -b), DVec2::ZERO);
    }
}
