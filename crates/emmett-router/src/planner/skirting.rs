//! Supply leads from the bank terminals to the connection pads.
//!
//! A bank's last run turns onto a lead row just inside the top margin and
//! follows it to above its connection pad, then drops into the pad. When
//! a mounting hole sits in the way the turn becomes a fillet, an arc
//! around the hole clearance and a second fillet back onto the lead row.

use super::avoidance::{oriented_corner, CornerExit};
use crate::error::{RouterError, RouterResult};
use crate::factory::SegmentFactory;
use crate::obstacles::{CircularPad, RectangularPad};
use crate::segment::Segment;
use emmett_core::vector::DVec2;
use std::f64::consts::{PI, TAU};

/// Sweeps below this many radians produce no arc
const SWEEP_EPSILON: f64 = 1e-9;
/// Leads shorter than this many microns are dropped
const LENGTH_EPSILON: f64 = 1e-6;

/// Lead from a bank terminal to its connection pad.
#[derive(Debug, Clone)]
pub struct LeadRoute {
    /// Where the terminal run now ends
    pub terminal_end: DVec2,
    /// Path from `terminal_end` to the pad centre
    pub segments: Vec<Segment>,
    /// Hole the lead wraps around, if any
    pub skirted: Option<CircularPad>,
}

pub struct LeadRouter<'a> {
    factory: &'a SegmentFactory,
    width: f64,
    fillet: f64,
    lead_y: f64,
}

impl<'a> LeadRouter<'a> {
    /// Fillets use half the pitch so they nest with the meander turns
    pub fn new(factory: &'a SegmentFactory, width: f64, pitch: f64, lead_y: f64) -> Self {
        Self {
            factory,
            width,
            fillet: pitch / 2.0,
            lead_y,
        }
    }

    /// Route from the terminal run at `terminal_x` to `pad`
    pub fn route(&self, terminal_x: f64, pad: &RectangularPad, holes: &[CircularPad]) -> RouterResult<LeadRoute> {
        let offset = pad.x - terminal_x;
        if offset.abs() <= self.fillet {
            let terminal_end = DVec2::new(terminal_x, self.lead_y);
            let segments = self.finish(Vec::new(), terminal_end, pad);
            return Ok(LeadRoute {
                terminal_end,
                segments,
                skirted: None,
            });
        }

        let toward = offset.signum();
        match self.blocking_hole(terminal_x, toward, pad, holes) {
            Some(hole) => self.skirt(terminal_x, toward, hole, pad),
            None => self.corner(terminal_x, toward, pad),
        }
    }

    /// Distance from a hole centre at which the lead's centre line passes
    fn skirt_radius(&self, hole: &CircularPad) -> f64 {
        hole.clear_radius() + self.width / 2.0
    }

    /// Nearest hole the lead must wrap: ahead of the terminal, or close
    /// enough behind it that the terminal run itself is in its clearance.
    fn blocking_hole<'h>(
        &self,
        terminal_x: f64,
        toward: f64,
        pad: &RectangularPad,
        holes: &'h [CircularPad],
    ) -> Option<&'h CircularPad> {
        let row = self.lead_y + self.fillet;
        holes
            .iter()
            .filter(|h| (h.x - terminal_x) * toward > -self.skirt_radius(h) && (pad.x - h.x) * toward > 0.0)
            .filter(|h| (row - h.y).abs() < self.skirt_radius(h) + self.fillet)
            .min_by(|a, b| (a.x - terminal_x).abs().total_cmp(&(b.x - terminal_x).abs()))
    }

    fn corner(&self, terminal_x: f64, toward: f64, pad: &RectangularPad) -> RouterResult<LeadRoute> {
        let terminal_end = DVec2::new(terminal_x, self.lead_y + self.fillet);
        let turn_end = DVec2::new(terminal_x + toward * self.fillet, self.lead_y);
        let turn = oriented_corner(self.factory, terminal_end, turn_end, self.width, CornerExit::Vertical)?;
        Ok(LeadRoute {
            terminal_end,
            segments: self.finish(vec![turn], turn_end, pad),
            skirted: None,
        })
    }

    fn skirt(&self, terminal_x: f64, side: f64, hole: &CircularPad, pad: &RectangularPad) -> RouterResult<LeadRoute> {
        let r_skirt = self.skirt_radius(hole);
        let r_sum = r_skirt + self.fillet;

        let approach_x = terminal_x + side * self.fillet;
        let dx = (hole.x - approach_x).abs();
        if dx >= r_sum {
            return Err(RouterError::InvalidBoard(format!(
                "lead row crosses the hole at ({}, {}) away from the bank terminal",
                hole.x, hole.y
            )));
        }
        let approach = DVec2::new(approach_x, hole.y + (r_sum * r_sum - dx * dx).sqrt());

        let dy = self.lead_y + self.fillet - hole.y;
        if dy.abs() >= r_sum {
            return Err(RouterError::InvalidBoard(format!(
                "hole at ({}, {}) cannot be skirted from the lead row",
                hole.x, hole.y
            )));
        }
        let departure = DVec2::new(
            hole.x + side * (r_sum * r_sum - dy * dy).sqrt(),
            self.lead_y + self.fillet,
        );
        if (pad.x - departure.x) * side < 0.0 {
            return Err(RouterError::InvalidBoard(format!(
                "connection pad at ({}, {}) sits inside the skirt of hole ({}, {})",
                pad.x, pad.y, hole.x, hole.y
            )));
        }

        let center = hole.center();
        let terminal_end = DVec2::new(terminal_x, approach.y);
        let contact_in = center + (approach - center) * (r_skirt / r_sum);
        let contact_out = center + (departure - center) * (r_skirt / r_sum);
        let lead_start = DVec2::new(departure.x, self.lead_y);

        // fillets turn one way, the skirt between them the other
        let mut segments = self.arcs(approach, terminal_end, contact_in, side)?;
        segments.extend(self.arcs(center, contact_in, contact_out, -side)?);
        segments.extend(self.arcs(departure, contact_out, lead_start, side)?);

        tracing::debug!(
            hole_x = hole.x,
            hole_y = hole.y,
            terminal_y = terminal_end.y,
            "lead skirts mounting hole"
        );
        Ok(LeadRoute {
            terminal_end,
            segments: self.finish(segments, lead_start, pad),
            skirted: Some(*hole),
        })
    }

    /// Arc about `center` from `from` to `to`, turning the way `rotation`
    /// says (positive for increasing angle). Sweeps past a half turn are
    /// split in two.
    fn arcs(&self, center: DVec2, from: DVec2, to: DVec2, rotation: f64) -> RouterResult<Vec<Segment>> {
        let a = from - center;
        let b = to - center;
        let radius = a.length();
        let start_angle = a.y.atan2(a.x);
        let sweep = ((b.y.atan2(b.x) - start_angle) * rotation).rem_euclid(TAU);
        if sweep < SWEEP_EPSILON || TAU - sweep < SWEEP_EPSILON {
            return Ok(Vec::new());
        }

        let pieces = if sweep > PI { 2 } else { 1 };
        let step = rotation * sweep / pieces as f64;
        let at = |angle: f64| center + DVec2::new(angle.cos(), angle.sin()) * radius;

        let mut arcs = Vec::with_capacity(pieces);
        let mut piece_start = from;
        for k in 0..pieces {
            let angle = start_angle + step * k as f64;
            let piece_end = if k + 1 == pieces { to } else { at(angle + step) };
            arcs.push(self.factory.arc(piece_start, at(angle + step / 2.0), piece_end, self.width)?);
            piece_start = piece_end;
        }
        Ok(arcs)
    }

    /// Append the lead row from `from` to above the pad and the drop into it
    fn finish(&self, mut segments: Vec<Segment>, from: DVec2, pad: &RectangularPad) -> Vec<Segment> {
        let above_pad = DVec2::new(pad.x, self.lead_y);
        for (a, b) in [(from, above_pad), (above_pad, pad.center())] {
            if a.distance(b) > LENGTH_EPSILON {
                segments.push(self.factory.linear(a, b, self.width));
            }
        }
        segments
    }
}
