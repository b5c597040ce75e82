//! Heater layout planning.
//!
//! The working width of the board is split into a left bank, a fuse
//! meander and a right bank. Current enters at the first connection pad,
//! runs down the left bank, over the fuse and back out through the right
//! bank to the second connection pad:
//!
//! ```text
//!  conn0 ─ lead ─ left bank ─ fuse in ─ [F0 F1] ─ fuse out ─ right bank ─ lead ─ conn1
//! ```
//!
//! The planner holds the board description and a segment factory. It
//! generates a layout for any [`RouterConfig`] without changing its own
//! state, so searches can evaluate many configurations from one planner.

pub mod avoidance;
mod banks;
pub mod partition;
pub mod skirting;

pub use avoidance::{
    avoid_obstacles, clear_turns, corner_90, oriented_corner, shorten_track_pair, CornerExit, Obstacle,
};
pub use partition::{even_tracks_over, even_tracks_under, odd_tracks_over, odd_tracks_under, TrackPartition};
pub use skirting::{LeadRoute, LeadRouter};

use crate::board::{design_statistics, BoardExtents, BoardSurvey, BoardSurveyor, Layer};
use crate::error::{RouterError, RouterResult};
use crate::factory::SegmentFactory;
use crate::obstacles::{CircularPad, RectangularPad};
use crate::segment::Segment;
use crate::serpentine::MINIMUM_SPACING;
use banks::LayoutBuilder;
use emmett_core::vector::{midpoint, mirror_x, mirror_y, DVec2};
use serde::{Deserialize, Serialize};

/// Mounting hole radius, µm
pub const DEFAULT_HOLE_RADIUS: f64 = 1600.0;
/// Keep-out around a mounting hole, µm
pub const DEFAULT_HOLE_COURTYARD: f64 = 3400.0;
/// Distance of the mounting holes from the board edges, µm
pub const DEFAULT_HOLE_INSET: f64 = 5000.0;
/// Keep-out around the connection pads, µm
pub const DEFAULT_PAD_COURTYARD: f64 = 250.0;

/// Track and board dimensions for one layout, all in microns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    pub width: f64,
    pub spacing: f64,
    /// Copper-free border inside the board edge
    pub margin: f64,
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            width: 1000.0,
            spacing: 200.0,
            margin: 500.0,
            left: 100_000.0,
            top: 40_000.0,
            right: 200_000.0,
            bottom: 140_000.0,
        }
    }
}

impl RouterConfig {
    pub fn pitch(&self) -> f64 {
        self.width + self.spacing
    }

    pub fn board_width(&self) -> f64 {
        self.right - self.left
    }

    pub fn board_height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new((self.left + self.right) / 2.0, (self.top + self.bottom) / 2.0)
    }

    /// Width available to track centre lines, plus one spacing so that
    /// `n` runs fit in `n` pitches
    pub fn working_width(&self) -> f64 {
        self.board_width() - 2.0 * self.margin + self.spacing
    }

    /// Same board with different track dimensions
    pub fn with_tracks(&self, width: f64, spacing: f64) -> Self {
        Self {
            width,
            spacing,
            ..*self
        }
    }

    pub fn with_extents(&self, extents: &BoardExtents) -> Self {
        Self {
            left: extents.left,
            top: extents.top,
            right: extents.right,
            bottom: extents.bottom,
            ..*self
        }
    }

    pub fn validate(&self) -> RouterResult<()> {
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(RouterError::InvalidBoard(format!(
                "track width must be positive, got {}",
                self.width
            )));
        }
        if self.spacing.is_nan() || self.spacing < MINIMUM_SPACING {
            return Err(RouterError::InvalidSpacing {
                spacing: self.spacing,
                minimum: MINIMUM_SPACING,
            });
        }
        if self.margin.is_nan() || self.margin < 0.0 {
            return Err(RouterError::InvalidBoard(format!(
                "margin must not be negative, got {}",
                self.margin
            )));
        }
        if self.right <= self.left || self.bottom <= self.top {
            return Err(RouterError::InvalidBoard(format!(
                "board extents ({}, {})-({}, {}) are empty",
                self.left, self.top, self.right, self.bottom
            )));
        }
        Ok(())
    }
}

/// Pads and holes on the board the layout is routed around.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardFeatures {
    /// Fuse footprint pads, upper then lower
    pub fuse: [RectangularPad; 2],
    /// Supply pads, joined to the left then the right bank
    pub connections: [RectangularPad; 2],
    pub holes: Vec<CircularPad>,
}

impl Default for BoardFeatures {
    fn default() -> Self {
        Self::for_board(&RouterConfig::default())
    }
}

impl BoardFeatures {
    /// Stock footprint placement on a board: fuse in the middle, supply
    /// pads near the top edge, one hole in each corner.
    pub fn for_board(config: &RouterConfig) -> Self {
        let c = config.center();
        let fuse = |dy: f64| RectangularPad::new(c.x, c.y + dy, 5000.0, 6000.0, 500.0);
        let connection = |dx: f64| {
            RectangularPad::new(c.x + dx, config.top + 3500.0, 5000.0, 6000.0, DEFAULT_PAD_COURTYARD)
        };
        Self {
            fuse: [fuse(-10_500.0), fuse(10_500.0)],
            connections: [connection(-10_000.0), connection(10_000.0)],
            holes: corner_points(config)
                .into_iter()
                .map(|p| CircularPad::new(p.x, p.y, DEFAULT_HOLE_RADIUS, DEFAULT_HOLE_COURTYARD))
                .collect(),
        }
    }
}

/// Expected mounting hole centres, top-left first, clockwise
fn corner_points(config: &RouterConfig) -> [DVec2; 4] {
    let center = midpoint(DVec2::new(config.left, config.top), DVec2::new(config.right, config.bottom));
    let corner = DVec2::new(config.left + DEFAULT_HOLE_INSET, config.top + DEFAULT_HOLE_INSET) - center;
    [
        center + corner,
        center + mirror_x(corner),
        center - corner,
        center + mirror_y(corner),
    ]
}

/// A generated heater.
#[derive(Debug, Clone)]
pub struct Layout {
    pub partition: TrackPartition,
    /// Fuse pads where the layout expects them, after the balancing shift
    pub fuse: [RectangularPad; 2],
    /// Electrical path order: first connection pad to the upper fuse pad,
    /// then lower fuse pad to the second connection pad
    pub segments: Vec<Segment>,
    /// Index of the first segment after the fuse
    pub fuse_gap: usize,
}

impl Layout {
    /// The two continuous halves either side of the fuse
    pub fn halves(&self) -> (&[Segment], &[Segment]) {
        self.segments.split_at(self.fuse_gap)
    }

    pub fn resistance(&self, factory: &SegmentFactory, temperature: Option<f64>) -> RouterResult<f64> {
        factory.aggregate_resistance(&self.segments, temperature)
    }

    pub fn track_length(&self) -> f64 {
        self.segments.iter().map(Segment::length).sum()
    }
}

/// Plans heater layouts for one board.
#[derive(Debug, Clone, Default)]
pub struct LayoutPlanner {
    config: RouterConfig,
    features: BoardFeatures,
    factory: SegmentFactory,
}

impl LayoutPlanner {
    pub fn new(config: RouterConfig, features: BoardFeatures, factory: SegmentFactory) -> Self {
        Self {
            config,
            features,
            factory,
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: RouterConfig) {
        self.config = config;
    }

    pub fn features(&self) -> &BoardFeatures {
        &self.features
    }

    pub fn features_mut(&mut self) -> &mut BoardFeatures {
        &mut self.features
    }

    pub fn factory(&self) -> &SegmentFactory {
        &self.factory
    }

    pub fn factory_mut(&mut self) -> &mut SegmentFactory {
        &mut self.factory
    }

    /// Bank split for the current configuration
    pub fn partition(&self) -> RouterResult<TrackPartition> {
        self.config.validate()?;
        TrackPartition::compute(&self.config, &self.features.fuse[0])
    }

    /// Layout for the current configuration
    pub fn generate_tracks(&self) -> RouterResult<Layout> {
        self.generate(&self.config)
    }

    /// Layout for `config` on this planner's board
    pub fn generate(&self, config: &RouterConfig) -> RouterResult<Layout> {
        let layout = LayoutBuilder::new(config, &self.features, &self.factory)?.build()?;
        tracing::debug!(
            width = config.width,
            spacing = config.spacing,
            segments = layout.segments.len(),
            left = layout.partition.left,
            right = layout.partition.right,
            "generated heater layout"
        );
        Ok(layout)
    }

    /// Series resistance of the layout for `config`
    pub fn resistance(&self, config: &RouterConfig, temperature: Option<f64>) -> RouterResult<f64> {
        self.generate(config)?.resistance(&self.factory, temperature)
    }

    /// Pick up extents, footprints and any existing heater from a board.
    ///
    /// Pads and holes are matched to the nearest feature on the board.
    /// When the board already carries tracks on `layer`, their dominant
    /// width and spacing become the current configuration.
    pub fn analyze_board(&mut self, surveyor: &dyn BoardSurveyor, layer: Layer) -> RouterResult<BoardSurvey> {
        let extents = surveyor.extents()?;
        let mut config = self.config.with_extents(&extents);

        let mut features = self.features.clone();
        for pad in features.fuse.iter_mut().chain(features.connections.iter_mut()) {
            *pad = surveyor.closest_pad(pad.center(), layer)?;
        }
        let mut holes: Vec<CircularPad> = Vec::with_capacity(4);
        for corner in corner_points(&config) {
            let hole = surveyor.closest_hole(corner)?;
            if !holes.contains(&hole) {
                holes.push(hole);
            }
        }
        features.holes = holes;
        if features.fuse[0].y > features.fuse[1].y {
            features.fuse.swap(0, 1);
        }

        let tracks = surveyor.trace_segments(&self.factory, layer, self.factory.net())?;
        let statistics = design_statistics(&tracks);
        if let Some(stats) = &statistics {
            config = config.with_tracks(stats.width, stats.spacing);
        }

        tracing::info!(
            width = extents.width(),
            height = extents.height(),
            existing = tracks.len(),
            holes = features.holes.len(),
            "analyzed board"
        );
        self.config = config;
        self.features = features;
        Ok(BoardSurvey {
            extents,
            tracks,
            statistics,
        })
    }

    /// Grow or shrink the board about its centre.
    ///
    /// Each mounting hole moves with its nearest corner and the
    /// connection pads move with the top edge. The fuse stays put.
    pub fn resize_board(&mut self, width: f64, height: f64) -> RouterResult<()> {
        if width <= 2.0 * self.config.margin || height <= 2.0 * self.config.margin {
            return Err(RouterError::InvalidBoard(format!(
                "board size {width} x {height} µm leaves no room inside the margin"
            )));
        }
        let center = self.config.center();
        let half_dw = (width - self.config.board_width()) / 2.0;
        let half_dh = (height - self.config.board_height()) / 2.0;

        self.config.left -= half_dw;
        self.config.right += half_dw;
        self.config.top -= half_dh;
        self.config.bottom += half_dh;
        for hole in &mut self.features.holes {
            let dx = if hole.x < center.x { -half_dw } else { half_dw };
            let dy = if hole.y < center.y { -half_dh } else { half_dh };
            hole.translate(DVec2::new(dx, dy));
        }
        for pad in &mut self.features.connections {
            pad.y -= half_dh;
        }
        tracing::debug!(width, height, "resized board");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RouterConfig::default();
        assert_eq!(config.pitch(), 1200.0);
        assert_eq!(config.board_width(), 100_000.0);
        assert_eq!(config.working_width(), 99_200.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_tight_spacing() {
        let config = RouterConfig::default().with_tracks(1000.0, 100.0);
        assert!(matches!(config.validate(), Err(RouterError::InvalidSpacing { .. })));
        let config = RouterConfig {
            right: 90_000.0,
            ..RouterConfig::default()
        };
        assert!(matches!(config.validate(), Err(RouterError::InvalidBoard(_))));
    }

    #[test]
    fn test_default_features() {
        let f = BoardFeatures::default();
        assert_eq!(f.fuse[0].center(), DVec2::new(150_000.0, 79_500.0));
        assert_eq!(f.fuse[1].center(), DVec2::new(150_000.0, 100_500.0));
        assert_eq!(f.connections[0].center(), DVec2::new(140_000.0, 43_500.0));
        assert_eq!(f.connections[1].center(), DVec2::new(160_000.0, 43_500.0));
        assert_eq!(f.holes.len(), 4);
        assert_eq!(f.holes[0].center(), DVec2::new(105_000.0, 45_000.0));
        assert_eq!(f.holes[0].clear_radius(), 5000.0);
    }

    #[test]
    fn test_resize_moves_corner_holes() {
        let mut planner = LayoutPlanner::default();
        planner.resize_board(120_000.0, 80_000.0).unwrap();

        let c = planner.config();
        assert_eq!(c.left, 90_000.0);
        assert_eq!(c.right, 210_000.0);
        assert_eq!(c.top, 50_000.0);
        assert_eq!(c.bottom, 130_000.0);
        assert_eq!(planner.features().holes[0].center(), DVec2::new(95_000.0, 55_000.0));
        assert_eq!(planner.features().holes[2].center(), DVec2::new(205_000.0, 125_000.0));
        assert_eq!(planner.features().fuse[0].center(), DVec2::new(150_000.0, 79_500.0));
        assert_eq!(planner.features().connections[0].y, 53_500.0);

        assert!(planner.resize_board(500.0, 80_000.0).is_err());
    }
}
