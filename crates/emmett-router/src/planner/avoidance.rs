//! Obstacle avoidance for meander turns, and quarter-turn corners.
//!
//! A turn that would run into a pad or hole clearance is pulled back
//! towards its chord. The arc is translated rather than reshaped, and the
//! two runs it joins are shortened or lengthened to stay attached.

use crate::error::{RouterError, RouterResult};
use crate::factory::SegmentFactory;
use crate::obstacles::{CircularPad, RectangularPad};
use crate::segment::{ArcSegment, Segment};
use emmett_core::vector::DVec2;
use std::f64::consts::FRAC_1_SQRT_2;

/// Relative tolerance on the two legs of a quarter-turn corner
const CORNER_TOLERANCE: f64 = 1e-9;

/// Something a meander turn must keep clear of.
#[derive(Debug, Clone, Copy)]
pub enum Obstacle<'a> {
    Pad(&'a RectangularPad),
    /// `lane` is kept free between the hole clearance and the turn, for a
    /// lead that wraps the hole.
    Hole { hole: &'a CircularPad, lane: f64 },
}

impl Obstacle<'_> {
    /// How far `arc` must be pulled back towards its chord to clear.
    ///
    /// `run_end` is the y its two runs reach back to.
    pub fn clearance_depth(&self, arc: &ArcSegment, run_end: f64) -> f64 {
        match *self {
            Obstacle::Pad(pad) => pad_clearance_depth(arc, pad, run_end),
            Obstacle::Hole { hole, lane } => hole_clearance_depth(arc, hole, lane, run_end),
        }
    }
}

/// Whether an obstacle spanning `near..far` in y reaches into the half of
/// the run span that belongs to this turn. The turn at the other end of
/// the runs handles the rest.
fn owned_by_turn(arc: &ArcSegment, run_end: f64, near: f64, far: f64) -> bool {
    let halfway = (arc.center().y + run_end) / 2.0;
    if arc.bulges_up() {
        near.min(far) < halfway
    } else {
        near.max(far) > halfway
    }
}

/// Depth needed for the turn and both its runs to clear a rectangular pad.
///
/// Only pads overlapping the turn's horizontal extent count. The turn is
/// pulled until its apex passes the pad's far edge.
pub fn pad_clearance_depth(arc: &ArcSegment, pad: &RectangularPad, run_end: f64) -> f64 {
    let half_width = arc.width() / 2.0;
    let reach = arc.radius() + half_width;
    let center = arc.center();
    if center.x + reach <= pad.clear_left() || center.x - reach >= pad.clear_right() {
        return 0.0;
    }
    if !owned_by_turn(arc, run_end, pad.clear_top(), pad.clear_bottom()) {
        return 0.0;
    }

    let apex = arc.mid().y;
    if arc.bulges_up() {
        (pad.clear_bottom() + half_width - apex).max(0.0)
    } else {
        (apex - (pad.clear_top() - half_width)).max(0.0)
    }
}

/// Depth needed for the turn and both its runs to clear a circular hole
/// plus `lane`.
///
/// The turn's centre ends up beyond the hole, at least
/// `clear_radius + lane + radius + width / 2` from the hole centre. The
/// runs then lead away from the hole.
pub fn hole_clearance_depth(arc: &ArcSegment, hole: &CircularPad, lane: f64, run_end: f64) -> f64 {
    let needed = hole.clear_radius() + lane + arc.radius() + arc.width() / 2.0;
    let center = arc.center();
    let dx = (hole.x - center.x).abs();
    if dx >= needed {
        return 0.0;
    }

    let rise = (needed * needed - dx * dx).sqrt();
    if !owned_by_turn(arc, run_end, hole.y - rise, hole.y + rise) {
        return 0.0;
    }
    if arc.bulges_up() {
        (hole.y + rise - center.y).max(0.0)
    } else {
        (center.y - (hole.y - rise)).max(0.0)
    }
}

/// Pull the turn at `index` back towards its chord by `depth`, moving the
/// end of the run before it and the start of the run after it with it.
pub fn shorten_track_pair(segments: &mut [Segment], index: usize, depth: f64) -> RouterResult<()> {
    if index == 0 || index + 1 >= segments.len() {
        return Err(RouterError::NotAnArc(index));
    }
    let Some(arc) = segments[index].as_arc() else {
        return Err(RouterError::NotAnArc(index));
    };
    if depth <= 0.0 {
        return Ok(());
    }

    let delta = if arc.bulges_up() {
        DVec2::new(0.0, depth)
    } else {
        DVec2::new(0.0, -depth)
    };
    segments[index].translate(delta);
    segments[index - 1].move_end(delta)?;
    segments[index + 1].move_start(delta)?;
    Ok(())
}

/// Clear the turn at `index` of every obstacle, returning the depth used
pub fn avoid_obstacles(segments: &mut [Segment], index: usize, obstacles: &[Obstacle<'_>]) -> RouterResult<f64> {
    let arc = segments
        .get(index)
        .and_then(Segment::as_arc)
        .ok_or(RouterError::NotAnArc(index))?;
    if index == 0 || index + 1 >= segments.len() {
        return Err(RouterError::NotAnArc(index));
    }
    let run_end = (segments[index - 1].start().y + segments[index + 1].end().y) / 2.0;
    let depth = obstacles
        .iter()
        .map(|o| o.clearance_depth(arc, run_end))
        .fold(0.0, f64::max);
    shorten_track_pair(segments, index, depth)?;
    Ok(depth)
}

/// Clear every interior turn of a meander, returning how many moved
pub fn clear_turns(segments: &mut [Segment], obstacles: &[Obstacle<'_>]) -> RouterResult<usize> {
    let mut moved = 0;
    for index in 1..segments.len().saturating_sub(1) {
        if segments[index].is_arc() && avoid_obstacles(segments, index, obstacles)? > 0.0 {
            moved += 1;
        }
    }
    if moved > 0 {
        tracing::debug!(moved, "shortened meander turns around obstacles");
    }
    Ok(moved)
}

/// Which way a corner leaves its start point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CornerExit {
    Horizontal,
    Vertical,
}

/// Quarter-circle arc joining two points that are equally far apart in x
/// and y.
///
/// When the legs have the same sign the arc leaves `start` horizontally,
/// otherwise it leaves vertically. [`oriented_corner`] picks the exit.
pub fn corner_90(factory: &SegmentFactory, start: DVec2, end: DVec2, width: f64) -> RouterResult<Segment> {
    let d = end - start;
    if d.x.abs() < CORNER_TOLERANCE {
        return Err(RouterError::InvalidCorner(format!(
            "corner from ({}, {}) has zero length",
            start.x, start.y
        )));
    }
    if (d.x.abs() - d.y.abs()).abs() > CORNER_TOLERANCE * d.x.abs().max(1.0) {
        return Err(RouterError::InvalidCorner(format!(
            "legs {} and {} differ",
            d.x.abs(),
            d.y.abs()
        )));
    }

    let mid = if d.x * d.y < 0.0 {
        DVec2::new(end.x - d.x * FRAC_1_SQRT_2, start.y + d.y * FRAC_1_SQRT_2)
    } else {
        DVec2::new(start.x + d.x * FRAC_1_SQRT_2, end.y - d.y * FRAC_1_SQRT_2)
    };
    factory.arc(start, mid, end, width)
}

/// [`corner_90`] that leaves `start` the requested way
pub fn oriented_corner(
    factory: &SegmentFactory,
    start: DVec2,
    end: DVec2,
    width: f64,
    exit: CornerExit,
) -> RouterResult<Segment> {
    let d = end - start;
    let natural = if d.x * d.y < 0.0 {
        CornerExit::Vertical
    } else {
        CornerExit::Horizontal
    };
    if natural == exit {
        corner_90(factory, start, end, width)
    } else {
        Ok(corner_90(factory, end, start, width)?.reversed())
    }
}
