//! # Emmett Core
//!
//! Core types and utilities shared by the Emmett crates:
//! error types, length units and formatting, and 2D vector helpers.

pub mod error;
pub mod units;
pub mod vector;

pub use error::UnitError;
pub use units::{format_length, format_resistance, parse_length, LengthUnit};
pub use vector::DVec2;
