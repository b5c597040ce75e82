//! Track counting and the left/fuse/right split of the working width.

use super::RouterConfig;
use crate::error::{RouterError, RouterResult};
use crate::obstacles::RectangularPad;

/// Slack for distances that are a whole number of pitches up to rounding
const COUNT_EPSILON: f64 = 1e-9;

/// Smallest even count whose runs cover `distance`
pub fn even_tracks_over(distance: f64, pitch: f64) -> i64 {
    let n = (distance / pitch - COUNT_EPSILON).ceil() as i64;
    if n % 2 == 0 {
        n
    } else {
        n + 1
    }
}

/// Smallest odd count whose runs cover `distance`
pub fn odd_tracks_over(distance: f64, pitch: f64) -> i64 {
    let n = (distance / pitch - COUNT_EPSILON).ceil() as i64;
    if n % 2 == 0 {
        n + 1
    } else {
        n
    }
}

/// Largest even count that fits in `distance`, never below 2
pub fn even_tracks_under(distance: f64, pitch: f64) -> i64 {
    let n = (distance / pitch + COUNT_EPSILON).floor() as i64;
    let n = if n % 2 == 0 { n } else { n - 1 };
    n.max(2)
}

/// Largest odd count that fits in `distance`, never below 1
pub fn odd_tracks_under(distance: f64, pitch: f64) -> i64 {
    let n = (distance / pitch + COUNT_EPSILON).floor() as i64;
    let n = if n % 2 == 0 { n - 1 } else { n };
    n.max(1)
}

/// How the working width is divided between the two banks and the fuse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPartition {
    pub pitch: f64,
    /// Runs across the whole working width
    pub total: i64,
    /// Runs in the fuse meander, always odd
    pub fuse: i64,
    /// Runs in the bank left of the fuse, always even
    pub left: i64,
    /// Runs in the bank right of the fuse, always odd
    pub right: i64,
    /// Fuse centre after the half-pitch shift that balances the banks
    pub fuse_x: f64,
    /// x of the fuse meander's leftmost run
    pub fuse_left: f64,
    /// x of the fuse meander's rightmost run
    pub fuse_right: f64,
}

impl TrackPartition {
    /// Split the working width of `config` around `fuse`.
    ///
    /// The left bank must end on an even count so both heater halves
    /// leave from the top edge. The fuse is shifted half a pitch towards
    /// the smaller bank to keep the layout centred.
    pub fn compute(config: &RouterConfig, fuse: &RectangularPad) -> RouterResult<Self> {
        let pitch = config.pitch();
        let total = even_tracks_under(config.working_width(), pitch);
        let fuse_count = odd_tracks_over(fuse.clear_width(), pitch);

        let remaining = total - fuse_count;
        if remaining < 3 {
            return Err(RouterError::InvalidBoard(format!(
                "{total} tracks at pitch {pitch} µm leave no room beside a {fuse_count} track fuse"
            )));
        }

        // remaining is odd, so this is ceil(remaining / 2)
        let left_raw = (remaining + 1) / 2;
        let center = (config.left + config.right) / 2.0;
        let (left, fuse_x) = if left_raw % 2 == 0 {
            (left_raw, center + pitch / 2.0)
        } else {
            (left_raw - 1, center - pitch / 2.0)
        };
        let right = total - left - fuse_count;

        if left < 2 || right < 1 {
            return Err(RouterError::InvalidBoard(format!(
                "bank split {left}/{right} around the fuse is too small"
            )));
        }

        let half_span = (fuse_count - 1) as f64 * pitch / 2.0;
        Ok(Self {
            pitch,
            total,
            fuse: fuse_count,
            left,
            right,
            fuse_x,
            fuse_left: fuse_x - half_span,
            fuse_right: fuse_x + half_span,
        })
    }

    /// x of the left bank's first run, next to the fuse
    pub fn left_bank_x(&self) -> f64 {
        self.fuse_left - self.pitch
    }

    /// x of the right bank's first run, next to the fuse
    pub fn right_bank_x(&self) -> f64 {
        self.fuse_right + self.pitch
    }

    /// x of the left bank's last run, where the supply lead leaves
    pub fn left_terminal_x(&self) -> f64 {
        self.left_bank_x() - (self.left - 1) as f64 * self.pitch
    }

    /// x of the right bank's last run, where the supply lead leaves
    pub fn right_terminal_x(&self) -> f64 {
        self.right_bank_x() + (self.right - 1) as f64 * self.pitch
    }
}
