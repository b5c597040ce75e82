//! Pads and mounting holes the heater must route around.
//!
//! Positions are centres, all lengths in microns. The courtyard is the
//! keep-out margin copper must not enter.

use emmett_core::vector::DVec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangular pad
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectangularPad {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub courtyard: f64,
}

impl RectangularPad {
    pub fn new(x: f64, y: f64, width: f64, height: f64, courtyard: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            courtyard,
        }
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    pub fn left(&self) -> f64 {
        self.x - self.width / 2.0
    }

    pub fn right(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn top(&self) -> f64 {
        self.y - self.height / 2.0
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height / 2.0
    }

    pub fn clear_left(&self) -> f64 {
        self.left() - self.courtyard
    }

    pub fn clear_right(&self) -> f64 {
        self.right() + self.courtyard
    }

    pub fn clear_top(&self) -> f64 {
        self.top() - self.courtyard
    }

    pub fn clear_bottom(&self) -> f64 {
        self.bottom() + self.courtyard
    }

    pub fn clear_width(&self) -> f64 {
        self.width + 2.0 * self.courtyard
    }

    pub fn clear_height(&self) -> f64 {
        self.height + 2.0 * self.courtyard
    }

    /// Same pad turned a quarter turn
    pub fn rotated(&self) -> Self {
        Self {
            width: self.height,
            height: self.width,
            ..*self
        }
    }

    /// Distance from `point` to the clearance rectangle, zero inside it
    pub fn clearance_distance(&self, point: DVec2) -> f64 {
        let dx = (self.clear_left() - point.x).max(point.x - self.clear_right()).max(0.0);
        let dy = (self.clear_top() - point.y).max(point.y - self.clear_bottom()).max(0.0);
        DVec2::new(dx, dy).length()
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
            width: self.width * factor,
            height: self.height * factor,
            courtyard: self.courtyard * factor,
        }
    }
}

/// Circular pad or mounting hole
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircularPad {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    #[serde(default)]
    pub courtyard: f64,
}

impl CircularPad {
    pub fn new(x: f64, y: f64, radius: f64, courtyard: f64) -> Self {
        Self {
            x,
            y,
            radius,
            courtyard,
        }
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    pub fn clear_radius(&self) -> f64 {
        self.radius + self.courtyard
    }

    pub fn clear_diameter(&self) -> f64 {
        2.0 * self.clear_radius()
    }

    pub fn clear_left(&self) -> f64 {
        self.x - self.clear_radius()
    }

    pub fn clear_right(&self) -> f64 {
        self.x + self.clear_radius()
    }

    pub fn clear_top(&self) -> f64 {
        self.y - self.clear_radius()
    }

    pub fn clear_bottom(&self) -> f64 {
        self.y + self.clear_radius()
    }

    pub fn translate(&mut self, delta: DVec2) {
        self.x += delta.x;
        self.y += delta.y;
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
            radius: self.radius * factor,
            courtyard: self.courtyard * factor,
        }
    }
}
