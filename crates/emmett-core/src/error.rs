//! Error handling for Emmett
//!
//! Unit errors raised while parsing and converting lengths. The router
//! and settings crates carry their own error enums.

use thiserror::Error;

/// Unit error type
///
/// Raised when a length or resistance string cannot be interpreted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UnitError {
    /// The unit suffix is not one we understand
    #[error("Unknown length unit: {unit}")]
    UnknownUnit {
        /// The suffix that was not recognised.
        unit: String,
    },

    /// The numeric part could not be parsed
    #[error("Invalid number '{input}'")]
    InvalidNumber {
        /// The text that failed to parse.
        input: String,
    },

    /// A value that must be finite was NaN or infinite
    #[error("Value for {name} is not finite")]
    NotFinite {
        /// The quantity that was being converted.
        name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_error_display() {
        let err = UnitError::UnknownUnit {
            unit: "furlong".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown length unit: furlong");

        let err = UnitError::InvalidNumber {
            input: "1.2.3mm".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid number '1.2.3mm'");
    }

    #[test]
    fn test_not_finite_names_the_quantity() {
        let err = UnitError::NotFinite {
            name: "width".to_string(),
        };
        assert_eq!(err.to_string(), "Value for width is not finite");
        assert_eq!(err.clone(), err);
    }
}
