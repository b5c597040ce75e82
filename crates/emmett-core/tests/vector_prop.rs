use emmett_core::units::{from_microns, to_microns, LengthUnit};
use emmett_core::vector::{midpoint, mirror_x, mirror_y, normalize_to, perpendicular, DVec2};
use proptest::prelude::*;

proptest! {
    #[test]
    fn normalize_to_hits_requested_magnitude(
        x in -1e6f64..1e6,
        y in -1e6f64..1e6,
        magnitude in 1e-3f64..1e4,
    ) {
        prop_assume!(x.abs() > 1e-3 || y.abs() > 1e-3);
        let v = normalize_to(DVec2::new(x, y), magnitude).unwrap();
        prop_assert!((v.length() - magnitude).abs() <= 1e-9 * magnitude.max(1.0));
        // direction is preserved
        prop_assert!(v.dot(DVec2::new(x, y)) > 0.0);
    }

    #[test]
    fn perpendicular_is_orthogonal_and_same_length(x in -1e4f64..1e4, y in -1e4f64..1e4) {
        let v = DVec2::new(x, y);
        let p = perpendicular(v);
        prop_assert!(v.dot(p).abs() < 1e-6);
        prop_assert!((p.length() - v.length()).abs() < 1e-9);
    }

    #[test]
    fn midpoint_is_equidistant(ax in -1e5f64..1e5, ay in -1e5f64..1e5, bx in -1e5f64..1e5, by in -1e5f64..1e5) {
        let a = DVec2::new(ax, ay);
        let b = DVec2::new(bx, by);
        let m = midpoint(a, b);
        prop_assert!((m.distance(a) - m.distance(b)).abs() <= 1e-9 * a.distance(b).max(1.0));
    }

    #[test]
    fn mirrors_compose_to_negation(x in -1e5f64..1e5, y in -1e5f64..1e5) {
        let v = DVec2::new(x, y);
        prop_assert_eq!(mirror_x(mirror_y(v)), -v);
        prop_assert_eq!(mirror_x(mirror_x(v)), v);
    }

    #[test]
    fn micron_conversion_round_trips(value in -1e3f64..1e3) {
        for unit in [LengthUnit::Micron, LengthUnit::Millimetre, LengthUnit::Metre] {
            let back = from_microns(to_microns(value, unit), unit);
            prop_assert!((back - value).abs() <= 1e-9 * value.abs().max(1.0));
        }
    }
}
