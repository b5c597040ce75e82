//! Error types for the router crate.
//!
//! This module provides structured error types for segment geometry,
//! serpentine generation, layout planning and the resistance search.

use thiserror::Error;

/// Errors that can occur while building or evaluating a heater layout.
#[derive(Error, Debug)]
pub enum RouterError {
    /// The three points defining an arc do not define a circle.
    #[error("Degenerate arc: {0}")]
    DegenerateArc(String),

    /// The track is wider than the arc it follows.
    #[error("Track width {width} is too wide for arc radius {radius}")]
    InvalidArcWidth { width: f64, radius: f64 },

    /// Serpentine spacing is below the manufacturing floor.
    #[error("Track spacing {spacing} µm is below the minimum of {minimum} µm")]
    InvalidSpacing { spacing: f64, minimum: f64 },

    /// Serpentine direction is neither -1 nor +1.
    #[error("Serpentine direction must be 1 or -1, got {0}")]
    InvalidDirection(i32),

    /// Serpentine track count is not at least one.
    #[error("Serpentine track count must be at least 1, got {0}")]
    InvalidCount(i64),

    /// Serpentine baseline has zero length.
    #[error("Serpentine baseline has zero length")]
    ZeroLengthBaseline,

    /// A 90° corner was requested between points that cannot form one.
    #[error("Invalid corner: {0}")]
    InvalidCorner(String),

    /// A segment index passed to obstacle avoidance is not an interior arc.
    #[error("Segment {0} is not an interior arc")]
    NotAnArc(usize),

    /// A material constant is out of range.
    #[error("Invalid material constant '{name}': {value}")]
    InvalidMaterial { name: String, value: f64 },

    /// Segments made from different materials were summed with a
    /// single temperature correction.
    #[error("Cannot temperature-correct segments of differing materials as one total")]
    MixedMaterials,

    /// Phase one of the search ran out of manufacturable widths.
    #[error("No track pitch found: {0}")]
    NoFeasiblePitch(String),

    /// The widest allowed layout already exceeds the target.
    #[error("Widest layout resistance {resistance:.4} Ω already exceeds target {target:.4} Ω")]
    NoUpperBracket { resistance: f64, target: f64 },

    /// Width bisection hit its iteration budget.
    #[error("Optimisation did not converge within {iterations} iterations")]
    OptimizationDidNotConverge { iterations: usize },

    /// A board feature could not be found.
    #[error("Board lookup failed: {0}")]
    BoardLookup(String),

    /// Board geometry leaves no room for the requested layout.
    #[error("Invalid board: {0}")]
    InvalidBoard(String),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for router operations.
pub type RouterResult<T> = Result<T, RouterError>;
