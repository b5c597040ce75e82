//! Track geometry search for a target resistance.
//!
//! Resistance rises with the number of runs and falls with track width.
//! The search first steps the run count at the widest manufacturable
//! track until the layout overshoots the target, then bisects the width
//! at the last pitch that still undershot it. Every evaluation generates
//! a full layout from an immutable configuration snapshot.

use crate::error::{RouterError, RouterResult};
use crate::planner::{even_tracks_over, LayoutPlanner, RouterConfig};
use crate::serpentine::MINIMUM_SPACING;
use serde::{Deserialize, Serialize};

/// Narrowest track the search will try, µm
pub const MIN_TRACK_WIDTH: f64 = 200.0;
/// Widest track the search starts from, µm
pub const MAX_TRACK_WIDTH: f64 = 3000.0;

/// What the heater should measure when hot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizationTarget {
    /// Ω at `temperature`
    pub resistance: f64,
    /// °C
    pub temperature: f64,
    /// Manufacturing floor for track spacing, µm
    pub min_spacing: f64,
}

impl OptimizationTarget {
    pub fn new(resistance: f64, temperature: f64) -> Self {
        Self {
            resistance,
            temperature,
            min_spacing: MINIMUM_SPACING,
        }
    }

    pub fn with_min_spacing(mut self, min_spacing: f64) -> Self {
        self.min_spacing = min_spacing;
        self
    }
}

/// Search limits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerSettings {
    pub max_width: f64,
    pub min_width: f64,
    /// Bisection budget per pitch
    pub max_iterations: usize,
    /// Stop once the resistance bracket is narrower than this, Ω
    pub resistance_tolerance: f64,
    /// Stop once the width bracket is narrower than this, µm
    pub width_tolerance: f64,
    /// Also bisect at the two next coarser pitches and keep the best
    pub refine: bool,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            max_width: MAX_TRACK_WIDTH,
            min_width: MIN_TRACK_WIDTH,
            max_iterations: 100,
            resistance_tolerance: 5e-5,
            width_tolerance: 5e-5,
            refine: true,
        }
    }
}

/// Winning track geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub width: f64,
    pub spacing: f64,
    pub pitch: f64,
    /// Runs across the working width
    pub track_count: i64,
    /// Ω at the target temperature
    pub resistance: f64,
    /// `resistance − target`, Ω
    pub error: f64,
    /// Layouts evaluated
    pub iterations: usize,
}

impl OptimizationResult {
    /// `base` with the winning track dimensions
    pub fn apply_to(&self, base: &RouterConfig) -> RouterConfig {
        base.with_tracks(self.width, self.spacing)
    }
}

/// Searches a planner's board for the track geometry hitting a target.
pub struct ResistanceOptimizer<'a> {
    planner: &'a LayoutPlanner,
    settings: OptimizerSettings,
}

impl<'a> ResistanceOptimizer<'a> {
    pub fn new(planner: &'a LayoutPlanner, settings: OptimizerSettings) -> Self {
        Self { planner, settings }
    }

    pub fn settings(&self) -> &OptimizerSettings {
        &self.settings
    }

    /// Run the full search without touching the planner
    pub fn optimize(&self, target: &OptimizationTarget) -> RouterResult<OptimizationResult> {
        let base = *self.planner.config();
        let spacing = target.min_spacing;
        let working = base.board_width() - 2.0 * base.margin + spacing;
        let first = even_tracks_over(working, self.settings.max_width + spacing);

        tracing::info!(
            target = target.resistance,
            temperature = target.temperature,
            first_count = first,
            "starting resistance search"
        );

        let (count, mut evaluations) = self.bracket_count(&base, target, working, first)?;
        let mut best = self.bisect_width(&base, target, working, count)?;
        evaluations += best.iterations;

        if self.settings.refine {
            for coarser in [count - 2, count - 4] {
                if coarser < first {
                    break;
                }
                match self.bisect_width(&base, target, working, coarser) {
                    Ok(candidate) => {
                        evaluations += candidate.iterations;
                        if candidate.error.abs() < best.error.abs() {
                            best = candidate;
                        }
                    }
                    Err(err) => {
                        tracing::warn!(count = coarser, error = %err, "refinement pitch skipped");
                    }
                }
            }
        }

        best.iterations = evaluations;
        tracing::info!(
            width = best.width,
            spacing = best.spacing,
            count = best.track_count,
            resistance = best.resistance,
            error = best.error,
            iterations = best.iterations,
            "resistance search finished"
        );
        Ok(best)
    }

    fn resistance(&self, config: &RouterConfig, target: &OptimizationTarget) -> RouterResult<f64> {
        self.planner.resistance(config, Some(target.temperature))
    }

    /// Largest even run count whose widest layout stays at or under the
    /// target, with the number of layouts evaluated.
    fn bracket_count(
        &self,
        base: &RouterConfig,
        target: &OptimizationTarget,
        working: f64,
        first: i64,
    ) -> RouterResult<(i64, usize)> {
        let spacing = target.min_spacing;
        let mut count = first;
        let mut evaluations = 0;

        loop {
            let width = working / count as f64 - spacing;
            if width < self.settings.min_width {
                return Err(RouterError::NoFeasiblePitch(format!(
                    "track width {width:.1} µm at {count} runs is below the {} µm minimum",
                    self.settings.min_width
                )));
            }

            let resistance = self.resistance(&base.with_tracks(width, spacing), target)?;
            evaluations += 1;
            tracing::debug!(count, width, resistance, "pitch step");

            if resistance > target.resistance {
                if count == first {
                    return Err(RouterError::NoUpperBracket {
                        resistance,
                        target: target.resistance,
                    });
                }
                return Ok((count - 2, evaluations));
            }
            count += 2;
        }
    }

    /// Bisect the track width at the pitch giving `count` runs
    fn bisect_width(
        &self,
        base: &RouterConfig,
        target: &OptimizationTarget,
        working: f64,
        count: i64,
    ) -> RouterResult<OptimizationResult> {
        let pitch = working / count as f64;
        let evaluate = |width: f64| self.resistance(&base.with_tracks(width, pitch - width), target);

        // narrow tracks sit at the high-resistance end
        let mut narrow = self.settings.min_width;
        let mut wide = pitch - target.min_spacing;
        if wide < narrow {
            return Err(RouterError::NoFeasiblePitch(format!(
                "pitch {pitch:.1} µm leaves no width above {narrow} µm"
            )));
        }
        let mut r_narrow = evaluate(narrow)?;
        let mut r_wide = evaluate(wide)?;

        for iteration in 1..=self.settings.max_iterations {
            if (r_narrow - r_wide).abs() < self.settings.resistance_tolerance
                || (wide - narrow).abs() < self.settings.width_tolerance
            {
                let (width, resistance) =
                    if (r_narrow - target.resistance).abs() <= (r_wide - target.resistance).abs() {
                        (narrow, r_narrow)
                    } else {
                        (wide, r_wide)
                    };
                tracing::debug!(count, width, resistance, iteration, "width bisection converged");
                return Ok(OptimizationResult {
                    width,
                    spacing: pitch - width,
                    pitch,
                    track_count: count,
                    resistance,
                    error: resistance - target.resistance,
                    iterations: iteration + 1,
                });
            }

            let mid = (narrow + wide) / 2.0;
            let r_mid = evaluate(mid)?;
            if r_mid > target.resistance {
                narrow = mid;
                r_narrow = r_mid;
            } else {
                wide = mid;
                r_wide = r_mid;
            }
        }

        Err(RouterError::OptimizationDidNotConverge {
            iterations: self.settings.max_iterations,
        })
    }
}

/// Search for `target` and write the winning track dimensions back into
/// `planner`. The planner is left untouched on failure.
pub fn optimize_tracks(
    planner: &mut LayoutPlanner,
    target: &OptimizationTarget,
    settings: OptimizerSettings,
) -> RouterResult<OptimizationResult> {
    let result = ResistanceOptimizer::new(planner, settings).optimize(target)?;
    let config = result.apply_to(planner.config());
    planner.set_config(config);
    Ok(result)
}
