//! Boundary to a PCB board database.
//!
//! Planning asks a board for its outline, the pads and holes near some
//! expected positions and any copper already laid. Writing back is a
//! clear-then-add of one layer. [`MemoryBoard`] implements both sides
//! in process.

use crate::error::{RouterError, RouterResult};
use crate::factory::SegmentFactory;
use crate::obstacles::{CircularPad, RectangularPad};
use crate::planner::{BoardFeatures, RouterConfig};
use crate::segment::{Segment, SegmentKind, SegmentRecord};
use emmett_core::units::round_to_micron;
use emmett_core::vector::DVec2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Copper layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layer {
    #[serde(rename = "F.Cu")]
    FrontCopper,
    #[serde(rename = "B.Cu")]
    BackCopper,
}

impl Layer {
    pub fn name(&self) -> &'static str {
        match self {
            Layer::FrontCopper => "F.Cu",
            Layer::BackCopper => "B.Cu",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Layer {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "F.Cu" | "front" => Ok(Layer::FrontCopper),
            "B.Cu" | "back" => Ok(Layer::BackCopper),
            other => Err(RouterError::BoardLookup(format!("unknown layer '{other}'"))),
        }
    }
}

/// Board outline bounding box, µm
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoardExtents {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl BoardExtents {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn contains(&self, point: DVec2) -> bool {
        (self.left..=self.right).contains(&point.x) && (self.top..=self.bottom).contains(&point.y)
    }
}

impl From<&RouterConfig> for BoardExtents {
    fn from(config: &RouterConfig) -> Self {
        Self::new(config.left, config.top, config.right, config.bottom)
    }
}

/// Read access to a board.
pub trait BoardSurveyor {
    fn extents(&self) -> RouterResult<BoardExtents>;

    /// Pad nearest `near` on `layer`, with its width and height in board
    /// orientation
    fn closest_pad(&self, near: DVec2, layer: Layer) -> RouterResult<RectangularPad>;

    fn closest_hole(&self, near: DVec2) -> RouterResult<CircularPad>;

    /// Existing copper on `layer`, optionally limited to one net, built
    /// with `factory`
    fn trace_segments(&self, factory: &SegmentFactory, layer: Layer, net: Option<&str>) -> RouterResult<Vec<Segment>>;
}

/// Write access to a board.
pub trait BoardWriter {
    /// Remove every track on `layer`, returning how many went
    fn clear_tracks(&mut self, layer: Layer) -> RouterResult<usize>;

    /// Add `segments` to `layer`, returning how many were added
    fn add_tracks(&mut self, segments: &[Segment], layer: Layer) -> RouterResult<usize>;
}

/// Replace the copper on `layer` with `segments`
pub fn commit_tracks(writer: &mut dyn BoardWriter, segments: &[Segment], layer: Layer) -> RouterResult<usize> {
    let removed = writer.clear_tracks(layer)?;
    let added = writer.add_tracks(segments, layer)?;
    tracing::info!(%layer, removed, added, "committed heater tracks");
    Ok(added)
}

/// Track dimensions read back from existing copper
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackStatistics {
    pub width: f64,
    pub spacing: f64,
    pub pitch: f64,
}

/// Dominant track width and meander pitch of `segments`.
///
/// Width is the most common track width and pitch the most common arc
/// diameter, both to the nearest micron. `None` without any arcs.
pub fn design_statistics(segments: &[Segment]) -> Option<TrackStatistics> {
    let width = most_common(segments.iter().map(Segment::width))?;
    let pitch = most_common(
        segments
            .iter()
            .filter_map(Segment::as_arc)
            .map(|arc| 2.0 * arc.radius()),
    )?;
    Some(TrackStatistics {
        width,
        spacing: pitch - width,
        pitch,
    })
}

/// Mode of `values` rounded to whole microns, smallest value on ties
fn most_common(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(round_to_micron(value) as i64).or_default() += 1;
    }
    counts
        .into_iter()
        .fold(None, |best: Option<(i64, usize)>, (value, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((value, count)),
        })
        .map(|(value, _)| value as f64)
}

/// What [`LayoutPlanner::analyze_board`](crate::planner::LayoutPlanner::analyze_board) found
#[derive(Debug, Clone)]
pub struct BoardSurvey {
    pub extents: BoardExtents,
    /// Copper already on the heater layer
    pub tracks: Vec<Segment>,
    pub statistics: Option<TrackStatistics>,
}

impl BoardSurvey {
    /// Resistance of the existing copper
    pub fn resistance(&self, factory: &SegmentFactory, temperature: Option<f64>) -> RouterResult<f64> {
        factory.aggregate_resistance(&self.tracks, temperature)
    }
}

/// Pad as placed on a board, before orientation is applied
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacedPad {
    pub layer: Layer,
    pub pad: RectangularPad,
    /// Footprint rotation, degrees
    pub orientation: f64,
}

impl PlacedPad {
    /// Pad with width and height swapped when the footprint is turned on
    /// its side
    pub fn oriented(&self) -> RectangularPad {
        if (45.0..=135.0).contains(&self.orientation.abs()) {
            self.pad.rotated()
        } else {
            self.pad
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PlacedTrack {
    layer: Layer,
    #[serde(flatten)]
    record: SegmentRecord,
}

/// Board held entirely in memory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryBoard {
    extents: Option<BoardExtents>,
    pads: Vec<PlacedPad>,
    holes: Vec<CircularPad>,
    tracks: Vec<PlacedTrack>,
}

impl MemoryBoard {
    pub fn new(extents: BoardExtents) -> Self {
        Self {
            extents: Some(extents),
            ..Self::default()
        }
    }

    /// Board carrying `features` on the front copper
    pub fn from_features(config: &RouterConfig, features: &BoardFeatures) -> Self {
        let mut board = Self::new(BoardExtents::from(config));
        for pad in features.fuse.iter().chain(features.connections.iter()) {
            board.add_pad(Layer::FrontCopper, *pad, 0.0);
        }
        for hole in &features.holes {
            board.add_hole(*hole);
        }
        board
    }

    pub fn add_pad(&mut self, layer: Layer, pad: RectangularPad, orientation: f64) {
        self.pads.push(PlacedPad {
            layer,
            pad,
            orientation,
        });
    }

    pub fn add_hole(&mut self, hole: CircularPad) {
        self.holes.push(hole);
    }

    pub fn track_count(&self, layer: Layer) -> usize {
        self.tracks.iter().filter(|t| t.layer == layer).count()
    }

    /// Tracks on `layer` in the order they were added
    pub fn track_records(&self, layer: Layer) -> Vec<SegmentRecord> {
        self.tracks
            .iter()
            .filter(|t| t.layer == layer)
            .map(|t| t.record.clone())
            .collect()
    }

    pub fn to_json(&self) -> RouterResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> RouterResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl BoardSurveyor for MemoryBoard {
    fn extents(&self) -> RouterResult<BoardExtents> {
        self.extents
            .ok_or_else(|| RouterError::BoardLookup("board has no outline".to_string()))
    }

    fn closest_pad(&self, near: DVec2, layer: Layer) -> RouterResult<RectangularPad> {
        self.pads
            .iter()
            .filter(|p| p.layer == layer)
            .min_by(|a, b| {
                a.pad
                    .center()
                    .distance(near)
                    .total_cmp(&b.pad.center().distance(near))
            })
            .map(PlacedPad::oriented)
            .ok_or_else(|| RouterError::BoardLookup(format!("no pads on {layer}")))
    }

    fn closest_hole(&self, near: DVec2) -> RouterResult<CircularPad> {
        self.holes
            .iter()
            .min_by(|a, b| a.center().distance(near).total_cmp(&b.center().distance(near)))
            .copied()
            .ok_or_else(|| RouterError::BoardLookup("board has no mounting holes".to_string()))
    }

    fn trace_segments(&self, factory: &SegmentFactory, layer: Layer, net: Option<&str>) -> RouterResult<Vec<Segment>> {
        self.tracks
            .iter()
            .filter(|t| t.layer == layer)
            .filter(|t| net.is_none() || t.record.net.as_deref() == net)
            .map(|t| -> RouterResult<Segment> {
                let r = &t.record;
                let mut segment = match (r.kind, r.mid) {
                    (SegmentKind::Arc, Some(mid)) => factory.arc(r.start, mid, r.end, r.width)?,
                    _ => factory.linear(r.start, r.end, r.width),
                };
                segment.set_net(r.net.clone());
                Ok(segment)
            })
            .collect()
    }
}

impl BoardWriter for MemoryBoard {
    fn clear_tracks(&mut self, layer: Layer) -> RouterResult<usize> {
        let before = self.tracks.len();
        self.tracks.retain(|t| t.layer != layer);
        Ok(before - self.tracks.len())
    }

    fn add_tracks(&mut self, segments: &[Segment], layer: Layer) -> RouterResult<usize> {
        self.tracks.extend(segments.iter().map(|s| PlacedTrack {
            layer,
            record: s.record(),
        }));
        Ok(segments.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_names() {
        assert_eq!(Layer::FrontCopper.to_string(), "F.Cu");
        assert_eq!("B.Cu".parse::<Layer>().unwrap(), Layer::BackCopper);
        assert!("In1.Cu".parse::<Layer>().is_err());
    }

    #[test]
    fn test_sideways_pad_is_rotated() {
        let mut board = MemoryBoard::new(BoardExtents::new(0.0, 0.0, 10_000.0, 10_000.0));
        board.add_pad(Layer::FrontCopper, RectangularPad::new(100.0, 100.0, 5000.0, 6000.0, 250.0), -90.0);
        let pad = board.closest_pad(DVec2::ZERO, Layer::FrontCopper).unwrap();
        assert_eq!(pad.width, 6000.0);
        assert_eq!(pad.height, 5000.0);
        assert!(board.closest_pad(DVec2::ZERO, Layer::BackCopper).is_err());
    }

    #[test]
    fn test_most_common_prefers_smaller_on_ties() {
        assert_eq!(most_common([3.0, 1.2, 0.9, 3.2].into_iter()), Some(1.0));
        assert_eq!(most_common(std::iter::empty()), None);
    }

    #[test]
    fn test_statistics_need_arcs() {
        let f = SegmentFactory::default();
        let straight = vec![f.linear(DVec2::ZERO, DVec2::X * 1000.0, 500.0)];
        assert!(design_statistics(&straight).is_none());
    }
}
