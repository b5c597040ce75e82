//! Assembly of the full heater path.
//!
//! Each half is built outward from its fuse pad: the fuse meander, the
//! bank, then the lead to the connection pad. The left half is reversed
//! at the end so the whole path runs from the first connection pad.

use super::avoidance::{clear_turns, oriented_corner, CornerExit, Obstacle};
use super::partition::{even_tracks_under, TrackPartition};
use super::skirting::LeadRouter;
use super::{BoardFeatures, Layout, RouterConfig};
use crate::error::{RouterError, RouterResult};
use crate::factory::SegmentFactory;
use crate::obstacles::RectangularPad;
use crate::segment::Segment;
use crate::serpentine::serpentine;
use emmett_core::vector::DVec2;

pub(super) struct LayoutBuilder<'a> {
    config: &'a RouterConfig,
    features: &'a BoardFeatures,
    factory: &'a SegmentFactory,
    partition: TrackPartition,
    /// Fuse pads moved onto the partition's fuse centre
    fuse: [RectangularPad; 2],
    pitch: f64,
    /// Top ends of the bank runs
    y_start: f64,
    /// Bottom ends of the bank runs
    y_end: f64,
    /// Centre line of the supply leads
    y_lead: f64,
}

impl<'a> LayoutBuilder<'a> {
    pub fn new(config: &'a RouterConfig, features: &'a BoardFeatures, factory: &'a SegmentFactory) -> RouterResult<Self> {
        config.validate()?;
        let mut fuse = features.fuse;
        if fuse[0].y >= fuse[1].y {
            return Err(RouterError::InvalidBoard(
                "upper fuse pad must sit above the lower one".to_string(),
            ));
        }

        let partition = TrackPartition::compute(config, &fuse[0])?;
        for pad in &mut fuse {
            pad.x = partition.fuse_x;
        }

        let pitch = config.pitch();
        let builder = Self {
            config,
            features,
            factory,
            partition,
            fuse,
            pitch,
            y_start: config.top + config.margin + 2.0 * pitch,
            y_end: config.bottom - config.margin - pitch,
            y_lead: config.top + config.margin + config.width / 2.0,
        };
        builder.check_fuse_room()?;
        Ok(builder)
    }

    fn check_fuse_room(&self) -> RouterResult<()> {
        let p = self.pitch;
        let w = self.config.width;
        if self.fuse[0].clear_top() - (p + w) / 2.0 <= self.y_start - p {
            return Err(RouterError::InvalidBoard(
                "no room for the fuse meander above the upper fuse pad".to_string(),
            ));
        }
        if self.fuse[1].clear_bottom() + (p + w) / 2.0 >= self.y_end {
            return Err(RouterError::InvalidBoard(
                "no room for the fuse meander below the lower fuse pad".to_string(),
            ));
        }
        if self.fuse[1].clear_top() - self.fuse[0].clear_bottom() < 2.0 * p {
            return Err(RouterError::InvalidBoard(
                "fuse pads are too close for the track passing between them".to_string(),
            ));
        }
        Ok(())
    }

    pub fn build(&self) -> RouterResult<Layout> {
        let left = self.left_half()?;
        let right = self.right_half()?;

        let fuse_gap = left.len();
        let mut segments: Vec<Segment> = left.iter().rev().map(Segment::reversed).collect();
        segments.extend(right);

        Ok(Layout {
            partition: self.partition,
            fuse: self.fuse,
            segments,
            fuse_gap,
        })
    }

    fn width(&self) -> f64 {
        self.config.width
    }

    fn spacing(&self) -> f64 {
        self.config.spacing
    }

    fn obstacles(&self) -> Vec<Obstacle<'_>> {
        let middle = self.config.center().y;
        let mut obstacles: Vec<Obstacle<'_>> = self.features.connections.iter().map(Obstacle::Pad).collect();
        // holes along the top share their clearance with a skirting lead
        obstacles.extend(self.features.holes.iter().map(|hole| Obstacle::Hole {
            hole,
            lane: if hole.y < middle { self.pitch } else { 0.0 },
        }));
        obstacles
    }

    /// Upper fuse pad → fuse meander → left bank → first connection pad
    fn left_half(&self) -> RouterResult<Vec<Segment>> {
        let mut path = self.fuse_in()?;

        let x = self.partition.left_bank_x();
        let mut bank = serpentine(
            self.factory,
            DVec2::new(x, self.y_start),
            DVec2::new(x, self.y_end),
            self.width(),
            self.spacing(),
            self.partition.left,
            -1,
        )?;
        clear_turns(&mut bank, &self.obstacles())?;

        // the fuse meander's exit turn lands a pitch above the bank top
        bank[0].move_start(DVec2::new(0.0, -self.pitch))?;

        let router = LeadRouter::new(self.factory, self.width(), self.pitch, self.y_lead);
        let lead = router.route(
            self.partition.left_terminal_x(),
            &self.features.connections[0],
            &self.features.holes,
        )?;
        let last = bank.len() - 1;
        let trim = lead.terminal_end.y - bank[last].end().y;
        bank[last].move_end(DVec2::new(0.0, trim))?;

        let mut bank = bank.into_iter();
        if let Some(first) = bank.next() {
            path.extend(self.between_fuse_detour(first)?);
        }
        path.extend(bank);
        path.extend(lead.segments);
        Ok(path)
    }

    /// Lower fuse pad → fuse meander → right bank → second connection pad
    fn right_half(&self) -> RouterResult<Vec<Segment>> {
        let mut path = self.fuse_out()?;

        let x = self.partition.right_bank_x();
        let mut bank = serpentine(
            self.factory,
            DVec2::new(x, self.y_end),
            DVec2::new(x, self.y_start),
            self.width(),
            self.spacing(),
            self.partition.right,
            -1,
        )?;
        clear_turns(&mut bank, &self.obstacles())?;

        let router = LeadRouter::new(self.factory, self.width(), self.pitch, self.y_lead);
        let lead = router.route(
            self.partition.right_terminal_x(),
            &self.features.connections[1],
            &self.features.holes,
        )?;
        let last = bank.len() - 1;
        let trim = lead.terminal_end.y - bank[last].end().y;
        bank[last].move_end(DVec2::new(0.0, trim))?;

        path.extend(bank);
        path.extend(lead.segments);
        Ok(path)
    }

    /// Diagonal from the upper fuse pad into a meander climbing to the top
    /// of the board, ending on the left bank's first run.
    fn fuse_in(&self) -> RouterResult<Vec<Segment>> {
        let p = self.pitch;
        let pad = &self.fuse[0];
        let x = self.partition.fuse_right;

        let mut meander = serpentine(
            self.factory,
            DVec2::new(x, pad.clear_top() - (p + self.width()) / 2.0),
            DVec2::new(x, self.y_start - p),
            self.width(),
            self.spacing(),
            self.partition.fuse,
            1,
        )?;

        let exit = meander[meander.len() - 1].end();
        let turn = self.factory.arc(
            exit,
            exit + DVec2::new(-p / 2.0, -p / 2.0),
            exit + DVec2::new(-p, 0.0),
            self.width(),
        )?;

        // first run reaches down to a 45° elbow pointing at the pad centre
        let elbow_y = pad.y - (x - pad.x);
        let first = meander[0].start();
        meander[0].move_start(DVec2::new(0.0, elbow_y - first.y))?;

        let mut path = vec![self.factory.linear(pad.center(), meander[0].start(), self.width())];
        path.extend(meander);
        path.push(turn);
        Ok(path)
    }

    /// Diagonal from the lower fuse pad into a meander descending to the
    /// bottom of the board, ending on the right bank's first run.
    fn fuse_out(&self) -> RouterResult<Vec<Segment>> {
        let p = self.pitch;
        let pad = &self.fuse[1];
        let x = self.partition.fuse_left;

        let mut meander = serpentine(
            self.factory,
            DVec2::new(x, pad.clear_bottom() + (p + self.width()) / 2.0),
            DVec2::new(x, self.y_end),
            self.width(),
            self.spacing(),
            self.partition.fuse,
            1,
        )?;

        let exit = meander[meander.len() - 1].end();
        let turn = self.factory.arc(
            exit,
            exit + DVec2::new(p / 2.0, p / 2.0),
            exit + DVec2::new(p, 0.0),
            self.width(),
        )?;

        let elbow_y = pad.y + (pad.x - x);
        let first = meander[0].start();
        meander[0].move_start(DVec2::new(0.0, elbow_y - first.y))?;

        let mut path = vec![self.factory.linear(pad.center(), meander[0].start(), self.width())];
        path.extend(meander);
        path.push(turn);
        Ok(path)
    }

    /// Replace the left bank's first run with one that detours through
    /// the gap between the fuse pads, keeping that area heated.
    fn between_fuse_detour(&self, first_run: Segment) -> RouterResult<Vec<Segment>> {
        let p = self.pitch;
        let [upper, lower] = &self.fuse;
        let gap = lower.clear_top() - upper.clear_bottom();
        let middle = (lower.clear_top() + upper.clear_bottom()) / 2.0;
        let count = even_tracks_under(gap, p);
        let y = middle - (count - 1) as f64 * p / 2.0;

        let meander = serpentine(
            self.factory,
            DVec2::new(self.partition.fuse_left - p / 2.0, y),
            DVec2::new(self.partition.fuse_right - p / 2.0, y),
            self.width(),
            self.spacing(),
            count,
            -1,
        )?;

        let x = first_run.start().x;
        let entry = meander[0].start();
        let exit = meander[meander.len() - 1].end();
        let leave_run = DVec2::new(x, entry.y - p / 2.0);
        let rejoin_run = DVec2::new(x, exit.y + p / 2.0);

        let mut path = Vec::with_capacity(meander.len() + 4);
        path.push(self.factory.linear(first_run.start(), leave_run, self.width()));
        path.push(oriented_corner(self.factory, leave_run, entry, self.width(), CornerExit::Vertical)?);
        path.extend(meander);
        path.push(oriented_corner(self.factory, exit, rejoin_run, self.width(), CornerExit::Horizontal)?);
        path.push(self.factory.linear(rejoin_run, first_run.end(), self.width()));

        tracing::trace!(count, y, "routed first run between the fuse pads");
        Ok(path)
    }
}
