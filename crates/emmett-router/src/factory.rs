//! Material constants and the segment factory.
//!
//! Segments carry no material of their own. A [`SegmentFactory`] binds a
//! [`Material`] and a default net to the segments it creates and sums
//! their resistance. Temperature correction is applied once to the total,
//! which is only exact when every segment shares the same material, so
//! summing across materials at temperature is refused.

use crate::error::{RouterError, RouterResult};
use crate::resistance::{temperature_adjust, REFERENCE_TEMPERATURE};
use crate::segment::{ArcSegment, LinearSegment, Segment};
use emmett_core::units::metres;
use emmett_core::vector::DVec2;
use serde::{Deserialize, Serialize};

/// Copper resistivity at 20 °C, Ω·m
pub const DEFAULT_RESISTIVITY: f64 = 1.68e-8;
/// 1 oz copper, m
pub const DEFAULT_THICKNESS: f64 = 35e-6;
/// Empirical multiplier on arc resistance
pub const DEFAULT_ARC_CORRECTION: f64 = 1.1;
/// Copper temperature coefficient, per °C
pub const DEFAULT_TCR: f64 = 0.00393;

/// Conductor material and foil constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Resistivity at 20 °C in Ω·m
    pub resistivity: f64,
    /// Foil thickness in metres
    pub thickness: f64,
    /// Multiplier applied to the annular-sector arc model
    pub arc_correction: f64,
    /// Temperature coefficient of resistance per °C
    pub tcr: f64,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            resistivity: DEFAULT_RESISTIVITY,
            thickness: DEFAULT_THICKNESS,
            arc_correction: DEFAULT_ARC_CORRECTION,
            tcr: DEFAULT_TCR,
        }
    }
}

impl Material {
    /// Copper with the given foil thickness in microns
    pub fn copper(thickness_um: f64) -> RouterResult<Self> {
        let material = Self {
            thickness: metres(thickness_um),
            ..Self::default()
        };
        material.validate()?;
        Ok(material)
    }

    /// Every constant must be finite and positive
    pub fn validate(&self) -> RouterResult<()> {
        for (name, value) in [
            ("resistivity", self.resistivity),
            ("thickness", self.thickness),
            ("arc_correction", self.arc_correction),
            ("tcr", self.tcr),
        ] {
            ensure_positive(name, value)?;
        }
        Ok(())
    }

    /// Resistance at `temperature` given the 20 °C value
    pub fn temperature_adjust(&self, resistance_20c: f64, temperature: f64) -> f64 {
        temperature_adjust(resistance_20c, temperature, self.tcr)
    }
}

fn ensure_positive(name: &str, value: f64) -> RouterResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(RouterError::InvalidMaterial {
            name: name.to_string(),
            value,
        })
    }
}

/// Creates segments bound to one material and net
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentFactory {
    material: Material,
    net: Option<String>,
}

impl SegmentFactory {
    pub fn new(material: Material) -> RouterResult<Self> {
        material.validate()?;
        Ok(Self {
            material,
            net: None,
        })
    }

    /// Set the net assigned to segments created from now on
    pub fn with_net(mut self, net: impl Into<String>) -> Self {
        self.net = Some(net.into());
        self
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn net(&self) -> Option<&str> {
        self.net.as_deref()
    }

    pub fn set_net(&mut self, net: Option<String>) {
        self.net = net;
    }

    pub fn set_resistivity(&mut self, value: f64) -> RouterResult<()> {
        ensure_positive("resistivity", value)?;
        self.material.resistivity = value;
        Ok(())
    }

    pub fn set_thickness(&mut self, value: f64) -> RouterResult<()> {
        ensure_positive("thickness", value)?;
        self.material.thickness = value;
        Ok(())
    }

    pub fn set_arc_correction(&mut self, value: f64) -> RouterResult<()> {
        ensure_positive("arc_correction", value)?;
        self.material.arc_correction = value;
        Ok(())
    }

    pub fn set_tcr(&mut self, value: f64) -> RouterResult<()> {
        ensure_positive("tcr", value)?;
        self.material.tcr = value;
        Ok(())
    }

    pub fn linear(&self, start: DVec2, end: DVec2, width: f64) -> Segment {
        let mut segment = LinearSegment::new(start, end, width);
        segment.net = self.net.clone();
        Segment::Linear(segment)
    }

    pub fn arc(&self, start: DVec2, mid: DVec2, end: DVec2, width: f64) -> RouterResult<Segment> {
        let mut segment = ArcSegment::new(start, mid, end, width)?;
        segment.net = self.net.clone();
        Ok(Segment::Arc(segment))
    }

    /// Resistance of one segment at 20 °C
    pub fn resistance(&self, segment: &Segment) -> RouterResult<f64> {
        segment.resistance(&self.material)
    }

    /// Series resistance of `segments`
    ///
    /// Sums the 20 °C resistances, then applies the temperature
    /// correction once to the total when a temperature is given.
    pub fn aggregate_resistance(&self, segments: &[Segment], temperature: Option<f64>) -> RouterResult<f64> {
        let total = sum_at_reference(&self.material, segments)?;
        Ok(match temperature {
            Some(t) => self.material.temperature_adjust(total, t),
            None => total,
        })
    }
}

fn sum_at_reference(material: &Material, segments: &[Segment]) -> RouterResult<f64> {
    segments
        .iter()
        .try_fold(0.0, |acc, s| Ok(acc + s.resistance(material)?))
}

/// Series resistance of groups of segments made from possibly different
/// materials.
///
/// At 20 °C the groups simply add. At any other temperature all groups
/// must share one material, otherwise [`RouterError::MixedMaterials`].
pub fn combined_resistance(groups: &[(&Material, &[Segment])], temperature: Option<f64>) -> RouterResult<f64> {
    let mut total = 0.0;
    for (material, segments) in groups {
        total += sum_at_reference(material, segments)?;
    }

    let Some(t) = temperature else {
        return Ok(total);
    };
    if t == REFERENCE_TEMPERATURE {
        return Ok(total);
    }

    match groups.split_first() {
        None => Ok(total),
        Some(((first, _), rest)) => {
            if rest.iter().any(|(m, _)| *m != *first) {
                tracing::warn!(groups = groups.len(), "refusing to temperature-correct mixed materials");
                return Err(RouterError::MixedMaterials);
            }
            Ok(first.temperature_adjust(total, t))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(length: f64, width: f64) -> Segment {
        SegmentFactory::default().linear(DVec2::ZERO, DVec2::new(length, 0.0), width)
    }

    #[test]
    fn test_defaults() {
        let m = Material::default();
        assert_eq!(m.resistivity, 1.68e-8);
        assert_eq!(m.thickness, 35e-6);
        assert_eq!(m.arc_correction, 1.1);
        assert_eq!(m.tcr, 0.00393);
    }

    #[test]
    fn test_setters_reject_non_positive() {
        let mut f = SegmentFactory::default();
        assert!(f.set_thickness(0.0).is_err());
        assert!(f.set_resistivity(-1.0).is_err());
        assert!(f.set_tcr(f64::NAN).is_err());
        assert!(f.set_arc_correction(1.2).is_ok());
        assert_eq!(f.material().arc_correction, 1.2);
    }

    #[test]
    fn test_net_is_applied_to_new_segments() {
        let f = SegmentFactory::default().with_net("HEAT");
        let seg = f.linear(DVec2::ZERO, DVec2::X, 1.0);
        assert_eq!(seg.net(), Some("HEAT"));
    }

    #[test]
    fn test_aggregate_applies_tcr_once() {
        let f = SegmentFactory::default();
        let segs = vec![strip(50_000.0, 1000.0), strip(25_000.0, 1000.0)];
        let cold = f.aggregate_resistance(&segs, None).unwrap();
        assert!((cold - 0.036).abs() < 1e-12);
        let hot = f.aggregate_resistance(&segs, Some(120.0)).unwrap();
        assert!((hot - 0.036 * (1.0 + 0.00393 * 100.0)).abs() < 1e-12);
    }

    #[test]
    fn test_combined_resistance_flags_mixed_materials() {
        let copper = Material::default();
        let thick = Material::copper(70.0).unwrap();
        let a = [strip(50_000.0, 1000.0)];
        let b = [strip(50_000.0, 1000.0)];
        let (a, b): (&[Segment], &[Segment]) = (&a, &b);

        let cold = combined_resistance(&[(&copper, a), (&thick, b)], None).unwrap();
        assert!((cold - 0.036).abs() < 1e-12);

        let err = combined_resistance(&[(&copper, a), (&thick, b)], Some(200.0)).unwrap_err();
        assert!(matches!(err, RouterError::MixedMaterials));

        let same = combined_resistance(&[(&copper, a), (&copper, b)], Some(200.0)).unwrap();
        assert!((same - copper.temperature_adjust(0.048, 200.0)).abs() < 1e-12);
    }
}
