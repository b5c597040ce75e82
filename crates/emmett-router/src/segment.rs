//! Track segments.
//!
//! A heater is an ordered list of straight and arc segments. Both kinds
//! share the same capabilities (length, resistance, repositioning) and
//! are held in the [`Segment`] enum so callers can match on the kind.
//!
//! Coordinates and widths are in microns.

use crate::error::{RouterError, RouterResult};
use crate::factory::Material;
use crate::resistance::{arc_center_radius_angles, arc_resistance, linear_resistance, ArcGeometry};
use emmett_core::vector::DVec2;
use serde::{Deserialize, Serialize};

/// Straight track
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSegment {
    pub start: DVec2,
    pub end: DVec2,
    pub width: f64,
    pub net: Option<String>,
}

impl LinearSegment {
    pub fn new(start: DVec2, end: DVec2, width: f64) -> Self {
        Self {
            start,
            end,
            width,
            net: None,
        }
    }

    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    pub fn move_start(&mut self, delta: DVec2) {
        self.start += delta;
    }

    pub fn move_end(&mut self, delta: DVec2) {
        self.end += delta;
    }

    pub fn translate(&mut self, delta: DVec2) {
        self.start += delta;
        self.end += delta;
    }
}

/// Circular arc track defined by three points, as board editors store it.
///
/// The circle is derived once at construction and kept consistent when
/// the arc is translated.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcSegment {
    start: DVec2,
    mid: DVec2,
    end: DVec2,
    width: f64,
    geometry: ArcGeometry,
    pub net: Option<String>,
}

impl ArcSegment {
    /// Create an arc, failing if the points are collinear
    pub fn new(start: DVec2, mid: DVec2, end: DVec2, width: f64) -> RouterResult<Self> {
        let geometry = arc_center_radius_angles(start, mid, end)?;
        Ok(Self {
            start,
            mid,
            end,
            width,
            geometry,
            net: None,
        })
    }

    pub fn start(&self) -> DVec2 {
        self.start
    }

    pub fn mid(&self) -> DVec2 {
        self.mid
    }

    pub fn end(&self) -> DVec2 {
        self.end
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn center(&self) -> DVec2 {
        self.geometry.center
    }

    pub fn radius(&self) -> f64 {
        self.geometry.radius
    }

    pub fn start_angle(&self) -> f64 {
        self.geometry.start_angle
    }

    pub fn end_angle(&self) -> f64 {
        self.geometry.end_angle
    }

    /// Swept angle in radians (minor arc)
    pub fn sweep(&self) -> f64 {
        self.geometry.sweep()
    }

    pub fn length(&self) -> f64 {
        self.geometry.radius * self.sweep()
    }

    /// True when the arc bows towards smaller y (up on the board)
    pub fn bulges_up(&self) -> bool {
        self.mid.y < (self.start.y + self.end.y) / 2.0
    }

    pub fn translate(&mut self, delta: DVec2) {
        self.start += delta;
        self.mid += delta;
        self.end += delta;
        self.geometry.center += delta;
    }

    fn rebuilt(&self, start: DVec2, mid: DVec2, end: DVec2) -> RouterResult<Self> {
        let mut arc = Self::new(start, mid, end, self.width)?;
        arc.net = self.net.clone();
        Ok(arc)
    }
}

/// One piece of track, straight or curved.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Linear(LinearSegment),
    Arc(ArcSegment),
}

impl Segment {
    pub fn start(&self) -> DVec2 {
        match self {
            Segment::Linear(l) => l.start,
            Segment::Arc(a) => a.start,
        }
    }

    pub fn end(&self) -> DVec2 {
        match self {
            Segment::Linear(l) => l.end,
            Segment::Arc(a) => a.end,
        }
    }

    pub fn width(&self) -> f64 {
        match self {
            Segment::Linear(l) => l.width,
            Segment::Arc(a) => a.width,
        }
    }

    pub fn net(&self) -> Option<&str> {
        match self {
            Segment::Linear(l) => l.net.as_deref(),
            Segment::Arc(a) => a.net.as_deref(),
        }
    }

    pub fn set_net(&mut self, net: Option<String>) {
        match self {
            Segment::Linear(l) => l.net = net,
            Segment::Arc(a) => a.net = net,
        }
    }

    pub fn is_arc(&self) -> bool {
        matches!(self, Segment::Arc(_))
    }

    pub fn as_arc(&self) -> Option<&ArcSegment> {
        match self {
            Segment::Arc(a) => Some(a),
            Segment::Linear(_) => None,
        }
    }

    /// Centre-line length
    pub fn length(&self) -> f64 {
        match self {
            Segment::Linear(l) => l.length(),
            Segment::Arc(a) => a.length(),
        }
    }

    /// Resistance at 20 °C for the given material
    pub fn resistance(&self, material: &Material) -> RouterResult<f64> {
        match self {
            Segment::Linear(l) => Ok(linear_resistance(
                l.length(),
                l.width,
                material.thickness,
                material.resistivity,
            )),
            Segment::Arc(a) => arc_resistance(
                a.sweep(),
                a.width,
                a.radius(),
                material.thickness,
                material.resistivity,
                material.arc_correction,
            ),
        }
    }

    /// Shift the whole segment
    pub fn translate(&mut self, delta: DVec2) {
        match self {
            Segment::Linear(l) => l.translate(delta),
            Segment::Arc(a) => a.translate(delta),
        }
    }

    /// Move only the start point. Arcs are re-derived from their new points.
    pub fn move_start(&mut self, delta: DVec2) -> RouterResult<()> {
        match self {
            Segment::Linear(l) => l.move_start(delta),
            Segment::Arc(a) => *a = a.rebuilt(a.start + delta, a.mid, a.end)?,
        }
        Ok(())
    }

    /// Move only the end point. Arcs are re-derived from their new points.
    pub fn move_end(&mut self, delta: DVec2) -> RouterResult<()> {
        match self {
            Segment::Linear(l) => l.move_end(delta),
            Segment::Arc(a) => *a = a.rebuilt(a.start, a.mid, a.end + delta)?,
        }
        Ok(())
    }

    /// Same track traversed end to start
    pub fn reversed(&self) -> Segment {
        match self {
            Segment::Linear(l) => Segment::Linear(LinearSegment {
                start: l.end,
                end: l.start,
                width: l.width,
                net: l.net.clone(),
            }),
            Segment::Arc(a) => Segment::Arc(ArcSegment {
                start: a.end,
                mid: a.mid,
                end: a.start,
                width: a.width,
                geometry: ArcGeometry {
                    center: a.geometry.center,
                    radius: a.geometry.radius,
                    start_angle: a.geometry.end_angle,
                    end_angle: a.geometry.start_angle,
                },
                net: a.net.clone(),
            }),
        }
    }

    /// Copy with every coordinate and the width multiplied by `factor`
    pub fn scaled(&self, factor: f64) -> RouterResult<Segment> {
        match self {
            Segment::Linear(l) => Ok(Segment::Linear(LinearSegment {
                start: l.start * factor,
                end: l.end * factor,
                width: l.width * factor,
                net: l.net.clone(),
            })),
            Segment::Arc(a) => {
                let mut arc = ArcSegment::new(a.start * factor, a.mid * factor, a.end * factor, a.width * factor)?;
                arc.net = a.net.clone();
                Ok(Segment::Arc(arc))
            }
        }
    }

    /// Plain description for board writers and JSON export
    pub fn record(&self) -> SegmentRecord {
        match self {
            Segment::Linear(l) => SegmentRecord {
                kind: SegmentKind::Linear,
                start: l.start,
                mid: None,
                end: l.end,
                width: l.width,
                net: l.net.clone(),
            },
            Segment::Arc(a) => SegmentRecord {
                kind: SegmentKind::Arc,
                start: a.start,
                mid: Some(a.mid),
                end: a.end,
                width: a.width,
                net: a.net.clone(),
            },
        }
    }
}

/// Kind tag used in [`SegmentRecord`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Linear,
    Arc,
}

/// Serializable form of a segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentRecord {
    pub kind: SegmentKind,
    pub start: DVec2,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mid: Option<DVec2>,
    pub end: DVec2,
    pub width: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net: Option<String>,
}

impl TryFrom<SegmentRecord> for Segment {
    type Error = RouterError;

    fn try_from(record: SegmentRecord) -> Result<Self, Self::Error> {
        let mut segment = match (record.kind, record.mid) {
            (SegmentKind::Linear, _) => {
                Segment::Linear(LinearSegment::new(record.start, record.end, record.width))
            }
            (SegmentKind::Arc, Some(mid)) => {
                Segment::Arc(ArcSegment::new(record.start, mid, record.end, record.width)?)
            }
            (SegmentKind::Arc, None) => {
                return Err(RouterError::DegenerateArc(
                    "arc record has no mid point".to_string(),
                ))
            }
        };
        segment.set_net(record.net);
        Ok(segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn half_turn() -> ArcSegment {
        ArcSegment::new(
            DVec2::new(0.0, 0.0),
            DVec2::new(600.0, -600.0),
            DVec2::new(1200.0, 0.0),
            1000.0,
        )
        .unwrap()
    }

    #[test]
    fn test_arc_derived_geometry() {
        let arc = half_turn();
        assert!((arc.center() - DVec2::new(600.0, 0.0)).length() < 1e-9);
        assert!((arc.radius() - 600.0).abs() < 1e-9);
        assert!((arc.sweep() - PI).abs() < 1e-12);
        assert!((arc.length() - 600.0 * PI).abs() < 1e-9);
        assert!(arc.bulges_up());
    }

    #[test]
    fn test_translate_keeps_center_consistent() {
        let mut arc = half_turn();
        arc.translate(DVec2::new(10.0, 250.0));
        let fresh = ArcSegment::new(arc.start(), arc.mid(), arc.end(), arc.width()).unwrap();
        assert!((arc.center() - fresh.center()).length() < 1e-9);
        assert!((arc.radius() - fresh.radius()).abs() < 1e-9);
    }

    #[test]
    fn test_linear_moves() {
        let mut seg = Segment::Linear(LinearSegment::new(DVec2::ZERO, DVec2::new(0.0, 1000.0), 500.0));
        seg.move_start(DVec2::new(0.0, 100.0)).unwrap();
        seg.move_end(DVec2::new(0.0, -100.0)).unwrap();
        assert_eq!(seg.start(), DVec2::new(0.0, 100.0));
        assert_eq!(seg.end(), DVec2::new(0.0, 900.0));
        assert!((seg.length() - 800.0).abs() < 1e-12);
    }

    #[test]
    fn test_reversed_keeps_resistance() {
        let material = Material::default();
        let seg = Segment::Arc(half_turn());
        let rev = seg.reversed();
        assert_eq!(rev.start(), seg.end());
        assert_eq!(rev.end(), seg.start());
        let a = seg.resistance(&material).unwrap();
        let b = rev.resistance(&material).unwrap();
        assert!((a - b).abs() < 1e-15);
    }

    #[test]
    fn test_resistance_is_unit_independent() {
        let material = Material::default();
        let microns = Segment::Linear(LinearSegment::new(DVec2::ZERO, DVec2::new(50_000.0, 0.0), 1000.0));
        let metres = microns.scaled(1e-6).unwrap();
        let a = microns.resistance(&material).unwrap();
        let b = metres.resistance(&material).unwrap();
        assert!((a - 0.024).abs() < 1e-12);
        assert!((a - b).abs() < 1e-12);
    }

    #[test]
    fn test_record_round_trip_through_json() {
        let mut seg = Segment::Arc(half_turn());
        seg.set_net(Some("HEATER".to_string()));
        let json = serde_json::to_string(&seg.record()).unwrap();
        let record: SegmentRecord = serde_json::from_str(&json).unwrap();
        let back = Segment::try_from(record).unwrap();
        assert_eq!(back.net(), Some("HEATER"));
        assert!((back.start() - seg.start()).length() < 1e-9);
        assert!(back.is_arc());
    }

    #[test]
    fn test_arc_record_without_mid_is_rejected() {
        let record = SegmentRecord {
            kind: SegmentKind::Arc,
            start: DVec2::ZERO,
            mid: None,
            end: DVec2::X,
            width: 1.0,
            net: None,
        };
        assert!(Segment::try_from(record).is_err());
    }
}
