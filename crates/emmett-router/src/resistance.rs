//! Closed-form resistance and arc geometry.
//!
//! Straight tracks use `R = ρ·L / (w·t)`. Arcs use the annular-sector
//! model, treating the track as concentric conductors between the inner
//! and outer radius, which integrates to `R = ρ·θ / (t·ln(Ro/Ri))`.
//!
//! In-plane lengths (length, width, radius) only appear as ratios, so
//! any consistent unit works. Thickness and resistivity must be SI.

use crate::error::{RouterError, RouterResult};
use emmett_core::vector::DVec2;
use std::f64::consts::{PI, TAU};

/// Temperature at which resistivity is specified, in °C
pub const REFERENCE_TEMPERATURE: f64 = 20.0;

/// Relative area below which three points count as collinear
const COLLINEAR_EPSILON: f64 = 1e-10;

/// Resistance of a straight track
pub fn linear_resistance(length: f64, width: f64, thickness: f64, resistivity: f64) -> f64 {
    resistivity * length / (width * thickness)
}

/// Circle through an arc's three defining points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcGeometry {
    pub center: DVec2,
    pub radius: f64,
    /// Angle of the start point about the centre, radians
    pub start_angle: f64,
    /// Angle of the end point about the centre, radians
    pub end_angle: f64,
}

impl ArcGeometry {
    /// Swept angle, always the minor arc in `(0, π]`
    pub fn sweep(&self) -> f64 {
        minor_arc_angle(self.start_angle, self.end_angle)
    }
}

/// Reconstruct the circle through `start`, `mid` and `end`.
///
/// The centre is the intersection of the perpendicular bisectors of
/// start→mid and mid→end.
pub fn arc_center_radius_angles(start: DVec2, mid: DVec2, end: DVec2) -> RouterResult<ArcGeometry> {
    let d1 = mid - start;
    let d2 = end - mid;

    // twice the signed triangle area
    let area = start.x * (mid.y - end.y) + mid.x * (end.y - start.y) + end.x * (start.y - mid.y);
    let scale = d1.length_squared().max(d2.length_squared()).max((end - start).length_squared());
    if area.abs() <= COLLINEAR_EPSILON * scale {
        return Err(RouterError::DegenerateArc(format!(
            "points ({}, {}), ({}, {}), ({}, {}) are collinear",
            start.x, start.y, mid.x, mid.y, end.x, end.y
        )));
    }

    // Bisector i is the set of p with (p - m_i)·d_i = 0
    let m1 = (start + mid) * 0.5;
    let m2 = (mid + end) * 0.5;
    let det = d1.perp_dot(d2);
    if det.abs() <= COLLINEAR_EPSILON * d1.length() * d2.length() {
        return Err(RouterError::DegenerateArc(
            "perpendicular bisectors are parallel".to_string(),
        ));
    }

    let b1 = d1.dot(m1);
    let b2 = d2.dot(m2);
    let center = DVec2::new((b1 * d2.y - b2 * d1.y) / det, (d1.x * b2 - d2.x * b1) / det);

    let to_start = start - center;
    let to_end = end - center;
    Ok(ArcGeometry {
        center,
        radius: to_start.length(),
        start_angle: to_start.y.atan2(to_start.x),
        end_angle: to_end.y.atan2(to_end.x),
    })
}

/// Angle between two directions, folded onto the minor arc `[0, π]`
pub fn minor_arc_angle(start_angle: f64, end_angle: f64) -> f64 {
    let diff = (end_angle - start_angle).rem_euclid(TAU);
    if diff > PI {
        TAU - diff
    } else {
        diff
    }
}

/// Resistance of a circular arc track (annular-sector model).
///
/// `theta` is folded onto the minor arc before use. Fails when the
/// track's inner edge would reach or cross the centre.
pub fn arc_resistance(
    theta: f64,
    width: f64,
    radius: f64,
    thickness: f64,
    resistivity: f64,
    correction: f64,
) -> RouterResult<f64> {
    let inner = radius - width / 2.0;
    if inner <= 0.0 {
        return Err(RouterError::InvalidArcWidth { width, radius });
    }
    let outer = radius + width / 2.0;
    let theta = minor_arc_angle(0.0, theta);

    Ok(correction * resistivity * theta / (thickness * (outer / inner).ln()))
}

/// Apply the temperature coefficient to a 20 °C resistance
pub fn temperature_adjust(resistance_20c: f64, temperature: f64, tcr: f64) -> f64 {
    resistance_20c * (1.0 + tcr * (temperature - REFERENCE_TEMPERATURE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_resistance_reference_value() {
        let r = linear_resistance(0.05, 1e-3, 35e-6, 1.68e-8);
        assert!((r - 0.024).abs() < 1e-12);
    }

    #[test]
    fn test_circle_through_three_points() {
        let g = arc_center_radius_angles(
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(2.0, 0.0),
        )
        .unwrap();
        assert!((g.center - DVec2::new(1.0, 0.0)).length() < 1e-12);
        assert!((g.radius - 1.0).abs() < 1e-12);
        assert!((g.sweep() - PI).abs() < 1e-12);
    }

    #[test]
    fn test_vertical_chord_is_handled() {
        // start and mid share an x coordinate
        let g = arc_center_radius_angles(
            DVec2::new(0.0, -1.0),
            DVec2::new(0.0, 1.0),
            DVec2::new(1.0, 0.0),
        )
        .unwrap();
        assert!((g.center - DVec2::ZERO).length() < 1e-12);
        assert!((g.radius - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_collinear_points_fail() {
        let err = arc_center_radius_angles(
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(2.0, 2.0),
        )
        .unwrap_err();
        assert!(matches!(err, RouterError::DegenerateArc(_)));

        let err = arc_center_radius_angles(DVec2::ONE, DVec2::ONE, DVec2::ONE).unwrap_err();
        assert!(matches!(err, RouterError::DegenerateArc(_)));
    }

    #[test]
    fn test_collinearity_is_relative_to_chord_length() {
        // a 100 mm chord bowed by 1 pm is a straight line
        let flat = arc_center_radius_angles(
            DVec2::new(0.0, 0.0),
            DVec2::new(100_000.0, 1e-6),
            DVec2::new(200_000.0, 0.0),
        );
        assert!(matches!(flat, Err(RouterError::DegenerateArc(_))));

        // bowed by 0.1 nm it is still an arc
        let bowed = arc_center_radius_angles(
            DVec2::new(0.0, 0.0),
            DVec2::new(100_000.0, 1e-4),
            DVec2::new(200_000.0, 0.0),
        );
        assert!(bowed.is_ok());
    }

    #[test]
    fn test_minor_arc_angle_folds_reflex() {
        assert!((minor_arc_angle(0.0, 1.5 * PI) - 0.5 * PI).abs() < 1e-12);
        assert!((minor_arc_angle(-PI / 2.0, PI / 2.0) - PI).abs() < 1e-12);
        assert!((minor_arc_angle(3.0, -3.0) - (TAU - 6.0)).abs() < 1e-12);
    }

    #[test]
    fn test_arc_resistance_matches_formula() {
        let r = arc_resistance(PI, 1000.0, 600.0, 35e-6, 1.68e-8, 1.1).unwrap();
        let expected = 1.1 * 1.68e-8 * PI / (35e-6 * (1100.0f64 / 100.0).ln());
        assert!((r - expected).abs() < 1e-15);
    }

    #[test]
    fn test_arc_too_wide_fails() {
        let err = arc_resistance(PI, 1200.0, 600.0, 35e-6, 1.68e-8, 1.1).unwrap_err();
        assert!(matches!(err, RouterError::InvalidArcWidth { .. }));
    }

    #[test]
    fn test_temperature_adjust() {
        assert_eq!(temperature_adjust(2.0, 20.0, 0.00393), 2.0);
        let hot = temperature_adjust(2.0, 220.0, 0.00393);
        assert!((hot - 2.0 * (1.0 + 0.00393 * 200.0)).abs() < 1e-12);
    }
}
