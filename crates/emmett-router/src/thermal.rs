//! Heater power budget.
//!
//! An empirical fit of board-to-ambient thermal resistance against board
//! area gives the power needed to hold a temperature. From there the
//! supply voltage and the heater resistance follow from Ohm's law.

use serde::{Deserialize, Serialize};

/// Area the thermal fit is normalised to, mm²
pub const REFERENCE_AREA_MM2: f64 = 10_000.0;
/// Thermal resistance of the reference board, K/W
pub const REFERENCE_THERMAL_RESISTANCE: f64 = 2.8;
/// Exponent of the area fit
pub const AREA_EXPONENT: f64 = 0.874_230_616_502_018;

/// Board-to-ambient thermal resistance for a board of `area_mm2`, K/W
pub fn thermal_resistance(area_mm2: f64) -> f64 {
    REFERENCE_THERMAL_RESISTANCE * (REFERENCE_AREA_MM2 / area_mm2).powf(AREA_EXPONENT)
}

/// Operating point of a hotplate heater.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaterBudget {
    /// Heated area, mm²
    pub area_mm2: f64,
    /// Hottest plate temperature, °C
    pub max_temperature: f64,
    /// °C
    pub ambient: f64,
    /// Extra power above holding, percent
    pub margin_percent: f64,
    /// Supply voltage, V
    pub voltage: f64,
}

impl Default for HeaterBudget {
    fn default() -> Self {
        Self {
            area_mm2: 10_000.0,
            max_temperature: 200.0,
            ambient: 20.0,
            margin_percent: 20.0,
            voltage: 24.0,
        }
    }
}

impl HeaterBudget {
    pub fn thermal_resistance(&self) -> f64 {
        thermal_resistance(self.area_mm2)
    }

    /// Power that holds `max_temperature` against losses, W
    pub fn hold_power(&self) -> f64 {
        (self.max_temperature - self.ambient) / self.thermal_resistance()
    }

    /// Hold power plus the margin, W
    pub fn power(&self) -> f64 {
        self.hold_power() * (1.0 + self.margin_percent / 100.0)
    }

    /// Margin that a heater delivering `power` watts gives, percent
    pub fn margin_for_power(&self, power: f64) -> f64 {
        (power / self.hold_power() - 1.0) * 100.0
    }

    /// Hot resistance that draws [`power`](Self::power) at `voltage`, Ω
    pub fn target_resistance(&self) -> f64 {
        resistance_for(self.voltage, self.power())
    }

    /// Voltage needed to draw [`power`](Self::power) through `resistance`
    pub fn voltage_for(&self, resistance: f64) -> f64 {
        (resistance * self.power()).sqrt()
    }

    /// Switch-on current through a heater of `cold_resistance`, A
    pub fn cold_current(&self, cold_resistance: f64) -> f64 {
        (self.power() / cold_resistance).sqrt()
    }

    /// Same budget with the margin implied by `power`
    pub fn with_power(&self, power: f64) -> Self {
        Self {
            margin_percent: self.margin_for_power(power),
            ..*self
        }
    }
}

/// `V² / P`
pub fn resistance_for(voltage: f64, power: f64) -> f64 {
    voltage * voltage / power
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_board() {
        assert_eq!(thermal_resistance(REFERENCE_AREA_MM2), 2.8);
        // smaller boards lose less heat
        assert!(thermal_resistance(2500.0) > 2.8);
    }

    #[test]
    fn test_power_chain() {
        let budget = HeaterBudget::default();
        let hold = 180.0 / 2.8;
        assert!((budget.hold_power() - hold).abs() < 1e-9);
        assert!((budget.power() - hold * 1.2).abs() < 1e-9);
        assert!((budget.margin_for_power(budget.power()) - 20.0).abs() < 1e-9);

        let r = budget.target_resistance();
        assert!((r - 576.0 / (hold * 1.2)).abs() < 1e-9);
        assert!((budget.voltage_for(r) - 24.0).abs() < 1e-9);
    }

    #[test]
    fn test_with_power_round_trips_margin() {
        let budget = HeaterBudget::default();
        let doubled = budget.with_power(budget.hold_power() * 2.0);
        assert!((doubled.margin_percent - 100.0).abs() < 1e-9);
        assert!((doubled.power() - budget.hold_power() * 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_cold_current() {
        let budget = HeaterBudget {
            margin_percent: 0.0,
            ..HeaterBudget::default()
        };
        let i = budget.cold_current(4.0);
        assert!((i * i * 4.0 - budget.power()).abs() < 1e-9);
    }
}
