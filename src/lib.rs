//! # Emmett
//!
//! Serpentine heater trace designer for PCB hotplates. Given a board, a
//! conductor and a target resistance, Emmett lays out a meandering heater
//! track around the board's fuse, supply pads and mounting holes, and
//! searches track width and pitch until the heater draws the required
//! power when hot.
//!
//! ## Architecture
//!
//! Emmett is organized as a workspace with multiple crates:
//!
//! 1. **emmett-core** - Error types, length units and 2D vector helpers
//! 2. **emmett-router** - Segment model, serpentine banks, layout planner,
//!    resistance optimizer and board boundary
//! 3. **emmett-settings** - Configuration files and track-dimension fields
//! 4. **emmett** - This crate, which ties the others together

pub use emmett_core::{format_length, format_resistance, parse_length, DVec2, LengthUnit, UnitError};

pub use emmett_router::{
    commit_tracks, optimize_tracks, serpentine, ArcSegment, BoardExtents, BoardFeatures, BoardSurvey,
    BoardSurveyor, BoardWriter, HeaterBudget, Layer, Layout, LayoutPlanner, LinearSegment, Material, MemoryBoard,
    OptimizationResult, OptimizationTarget, OptimizerSettings, ResistanceOptimizer, RouterConfig, RouterError,
    RouterResult, Segment, SegmentFactory, SerpentineGenerator, SerpentineParameters, TrackPartition,
};

pub use emmett_settings::{Config, SettingsError, SettingsResult, TrackField, TrackFields};

use serde::Serialize;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Electrical summary of a finished heater
#[derive(Debug, Clone, Serialize)]
pub struct HeaterSummary {
    pub track_width: f64,
    pub track_spacing: f64,
    pub track_count: i64,
    /// Total track length, µm
    pub track_length: f64,
    /// Ω at 20 °C
    pub cold_resistance: f64,
    /// Ω at the target temperature
    pub hot_resistance: f64,
    pub target_resistance: f64,
    pub temperature: f64,
    /// Power drawn when hot at the configured voltage, W
    pub power: f64,
    /// Switch-on current at the configured voltage, A
    pub inrush_current: f64,
}

/// A designed heater and the layout that realises it
#[derive(Debug, Clone)]
pub struct HeaterDesign {
    pub result: OptimizationResult,
    pub layout: Layout,
    pub summary: HeaterSummary,
}

/// Search the configured board for the configured target and lay out the
/// winning heater.
pub fn design_heater(config: &Config) -> anyhow::Result<HeaterDesign> {
    config.validate()?;
    let mut planner = config.planner()?;
    let target = config.optimization_target();
    let result = optimize_tracks(&mut planner, &target, config.optimizer_settings())?;

    let layout = planner.generate_tracks()?;
    let cold = layout.resistance(planner.factory(), None)?;
    let hot = layout.resistance(planner.factory(), Some(target.temperature))?;
    let voltage = config.heater.voltage;

    let summary = HeaterSummary {
        track_width: result.width,
        track_spacing: result.spacing,
        track_count: result.track_count,
        track_length: layout.track_length(),
        cold_resistance: cold,
        hot_resistance: hot,
        target_resistance: target.resistance,
        temperature: target.temperature,
        power: voltage * voltage / hot,
        inrush_current: voltage / cold,
    };
    tracing::info!(
        width = %format_length(summary.track_width, config.display_unit),
        spacing = %format_length(summary.track_spacing, config.display_unit),
        hot = %format_resistance(hot),
        power = summary.power,
        "designed heater"
    );

    Ok(HeaterDesign {
        result,
        layout,
        summary,
    })
}

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support, `info` when unset
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
