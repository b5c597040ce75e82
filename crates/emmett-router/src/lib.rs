//! # Emmett Router
//!
//! Geometry and electrical model of serpentine PCB heater traces.
//!
//! ## Modules
//!
//! - **Segments**: straight and arc tracks with closed-form resistance
//! - **Serpentine**: meander bank generation
//! - **Planner**: splits the board into banks around the fuse, keeps
//!   turns clear of pads and holes and routes the supply leads
//! - **Optimizer**: searches track width and pitch for a target resistance
//! - **Thermal**: power budget and target resistance for a hotplate
//! - **Board**: survey and write-back boundary to a board database
//!
//! All in-plane geometry is in microns. Resistances are in ohms.

pub mod board;
pub mod error;
pub mod factory;
pub mod obstacles;
pub mod optimizer;
pub mod planner;
pub mod resistance;
pub mod segment;
pub mod serpentine;
pub mod thermal;

pub use board::{
    commit_tracks, design_statistics, BoardExtents, BoardSurvey, BoardSurveyor, BoardWriter, Layer,
    MemoryBoard, TrackStatistics,
};
pub use error::{RouterError, RouterResult};
pub use factory::{combined_resistance, Material, SegmentFactory};
pub use obstacles::{CircularPad, RectangularPad};
pub use optimizer::{
    optimize_tracks, OptimizationResult, OptimizationTarget, OptimizerSettings, ResistanceOptimizer,
};
pub use planner::{BoardFeatures, Layout, LayoutPlanner, RouterConfig, TrackPartition};
pub use resistance::{arc_center_radius_angles, arc_resistance, linear_resistance, temperature_adjust};
pub use segment::{ArcSegment, LinearSegment, Segment, SegmentKind, SegmentRecord};
pub use serpentine::{serpentine, SerpentineGenerator, SerpentineParameters, MINIMUM_SPACING};
pub use thermal::HeaterBudget;
