//! Unit conversion utilities
//!
//! Layout geometry is carried in microns. Material constants are SI
//! (metres, ohm-metres). These helpers convert between the two, parse
//! user-entered lengths and format lengths and resistances for display.

use crate::error::UnitError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Microns to metres
pub const MICRONS_TO_M: f64 = 1e-6;

/// Length unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    /// Microns (µm), the layout unit
    Micron,
    /// Millimetres, the unit users type
    Millimetre,
    /// Metres, the unit of material constants
    Metre,
}

impl Default for LengthUnit {
    fn default() -> Self {
        Self::Millimetre
    }
}

impl LengthUnit {
    /// Number of microns in one of this unit
    pub fn microns_per_unit(self) -> f64 {
        match self {
            Self::Micron => 1.0,
            Self::Millimetre => 1e3,
            Self::Metre => 1e6,
        }
    }

    /// Short label used when formatting
    pub fn label(self) -> &'static str {
        match self {
            Self::Micron => "µm",
            Self::Millimetre => "mm",
            Self::Metre => "m",
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for LengthUnit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "um" | "µm" | "micron" | "microns" => Ok(Self::Micron),
            "mm" | "millimetre" | "millimeter" => Ok(Self::Millimetre),
            "m" | "metre" | "meter" => Ok(Self::Metre),
            other => Err(UnitError::UnknownUnit {
                unit: other.to_string(),
            }),
        }
    }
}

/// Convert a value in `unit` to microns
pub fn to_microns(value: f64, unit: LengthUnit) -> f64 {
    value * unit.microns_per_unit()
}

/// Convert a value in microns to `unit`
pub fn from_microns(value_um: f64, unit: LengthUnit) -> f64 {
    value_um / unit.microns_per_unit()
}

/// Microns to metres
pub fn metres(value_um: f64) -> f64 {
    value_um * MICRONS_TO_M
}

/// Round a length in microns to the nearest whole micron
pub fn round_to_micron(value_um: f64) -> f64 {
    value_um.round()
}

/// Format a length held in microns for display in `unit`
///
/// Millimetres and metres show three decimals, microns show none.
pub fn format_length(value_um: f64, unit: LengthUnit) -> String {
    let value = from_microns(value_um, unit);
    match unit {
        LengthUnit::Micron => format!("{:.0} {}", value, unit),
        LengthUnit::Millimetre | LengthUnit::Metre => format!("{:.3} {}", value, unit),
    }
}

/// Parse a length string to microns
///
/// Accepts an optional unit suffix (`"1.2mm"`, `"200 um"`, `"0.001m"`).
/// A bare number is read in `default_unit`. Empty input is zero.
pub fn parse_length(input: &str, default_unit: LengthUnit) -> Result<f64, UnitError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(0.0);
    }

    let split = input
        .find(|c: char| c.is_alphabetic() || c == 'µ')
        .unwrap_or(input.len());
    let (number, suffix) = input.split_at(split);

    let unit = if suffix.trim().is_empty() {
        default_unit
    } else {
        suffix.parse::<LengthUnit>()?
    };

    let value = number
        .trim()
        .parse::<f64>()
        .map_err(|_| UnitError::InvalidNumber {
            input: input.to_string(),
        })?;

    if !value.is_finite() {
        return Err(UnitError::NotFinite {
            name: "length".to_string(),
        });
    }

    Ok(to_microns(value, unit))
}

/// Format a resistance for display
///
/// Values of ten ohms and above are shown in ohms with three decimals.
/// Smaller values are shown in milliohms with one decimal.
pub fn format_resistance(ohms: f64) -> String {
    if ohms >= 10.0 {
        format!("{:.3} Ω", ohms)
    } else {
        format!("{:.1} mΩ", ohms * 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_round_trip_through_microns() {
        assert_eq!(to_microns(1.5, LengthUnit::Millimetre), 1500.0);
        assert_eq!(from_microns(1500.0, LengthUnit::Millimetre), 1.5);
        assert_eq!(to_microns(0.002, LengthUnit::Metre), 2000.0);
        assert!((metres(35.0) - 35e-6).abs() < 1e-18);
        assert_eq!(round_to_micron(1234.5), 1235.0);
        assert_eq!(round_to_micron(1999.9999996), 2000.0);
    }

    #[test]
    fn test_parse_length_with_suffix() {
        assert_eq!(parse_length("1.2mm", LengthUnit::Micron).unwrap(), 1200.0);
        assert_eq!(parse_length(" 200 um ", LengthUnit::Millimetre).unwrap(), 200.0);
        assert_eq!(parse_length("200µm", LengthUnit::Millimetre).unwrap(), 200.0);
        assert_eq!(parse_length("0.001 m", LengthUnit::Micron).unwrap(), 1000.0);
    }

    #[test]
    fn test_parse_length_default_unit() {
        assert_eq!(parse_length("0.2", LengthUnit::Millimetre).unwrap(), 200.0);
        assert_eq!(parse_length("", LengthUnit::Millimetre).unwrap(), 0.0);
        assert_eq!(parse_length("-1", LengthUnit::Millimetre).unwrap(), -1000.0);
    }

    #[test]
    fn test_parse_length_invalid() {
        assert!(matches!(
            parse_length("1.2.3mm", LengthUnit::Millimetre),
            Err(UnitError::InvalidNumber { .. })
        ));
        assert!(matches!(
            parse_length("3 ft", LengthUnit::Millimetre),
            Err(UnitError::UnknownUnit { .. })
        ));
    }

    #[test]
    fn test_format_length() {
        assert_eq!(format_length(1234.0, LengthUnit::Millimetre), "1.234 mm");
        assert_eq!(format_length(1234.4, LengthUnit::Micron), "1234 µm");
    }

    #[test]
    fn test_format_resistance() {
        assert_eq!(format_resistance(12.3456), "12.346 Ω");
        assert_eq!(format_resistance(10.0), "10.000 Ω");
        assert_eq!(format_resistance(0.024), "24.0 mΩ");
        assert_eq!(format_resistance(6.4), "6400.0 mΩ");
    }

    #[test]
    fn test_unit_labels() {
        assert_eq!(LengthUnit::Micron.to_string(), "µm");
        assert_eq!("MM".parse::<LengthUnit>().unwrap(), LengthUnit::Millimetre);
        assert_eq!(LengthUnit::default(), LengthUnit::Millimetre);
    }
}
