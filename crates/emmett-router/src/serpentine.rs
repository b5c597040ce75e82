//! Serpentine (meander) bank generation.
//!
//! A bank is `count` parallel straight runs joined by semicircular turns.
//! The first run lies on the baseline. Each further run sits one pitch
//! to the side chosen by `direction` and runs the opposite way.

use crate::error::{RouterError, RouterResult};
use crate::factory::SegmentFactory;
use crate::segment::Segment;
use emmett_core::vector::{midpoint, normalize_to, perpendicular, DVec2};

/// Manufacturing floor for track spacing, µm
pub const MINIMUM_SPACING: f64 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SerpentineParameters {
    /// Baseline start, the first run starts here
    pub start: DVec2,
    /// Baseline end
    pub end: DVec2,
    pub width: f64,
    pub spacing: f64,
    /// Number of straight runs
    pub count: i64,
    /// +1 or -1, which side of the baseline the bank grows towards
    pub direction: i32,
}

impl SerpentineParameters {
    pub fn pitch(&self) -> f64 {
        self.width + self.spacing
    }

    fn validate(&self) -> RouterResult<()> {
        if self.count < 1 {
            return Err(RouterError::InvalidCount(self.count));
        }
        if self.spacing < MINIMUM_SPACING {
            return Err(RouterError::InvalidSpacing {
                spacing: self.spacing,
                minimum: MINIMUM_SPACING,
            });
        }
        if self.direction != 1 && self.direction != -1 {
            return Err(RouterError::InvalidDirection(self.direction));
        }
        Ok(())
    }
}

pub struct SerpentineGenerator {
    params: SerpentineParameters,
}

impl SerpentineGenerator {
    pub fn new(params: SerpentineParameters) -> Self {
        Self { params }
    }

    /// Emit `2·count − 1` segments: `Linear, Arc, Linear, …, Linear`
    pub fn generate(&self, factory: &SegmentFactory) -> RouterResult<Vec<Segment>> {
        let p = &self.params;
        p.validate()?;

        let pitch = p.pitch();
        let baseline = p.end - p.start;
        let dir = f64::from(p.direction);
        let gradient = normalize_to(baseline, pitch).ok_or(RouterError::ZeroLengthBaseline)?;
        let normal = normalize_to(perpendicular(baseline) * dir, pitch).ok_or(RouterError::ZeroLengthBaseline)?;

        // Turn midpoints sit half a pitch out along both axes
        let diagonal = midpoint(normal, gradient);
        let antidiagonal = midpoint(normal, -gradient);

        let mut start = p.start;
        let mut end = p.end;
        let mut end_mid = end + diagonal;
        let mut start_mid = start + antidiagonal;

        let mut result = Vec::with_capacity((2 * p.count - 1) as usize);
        result.push(factory.linear(start, end, p.width));

        for _ in 1..p.count {
            result.push(factory.arc(end, end_mid, end + normal, p.width)?);

            (start, end) = (end + normal, start + normal);
            (start_mid, end_mid) = (end_mid + normal, start_mid + normal);

            result.push(factory.linear(start, end, p.width));
        }

        tracing::trace!(
            count = p.count,
            pitch,
            segments = result.len(),
            "generated serpentine bank"
        );
        Ok(result)
    }
}

/// Shorthand for [`SerpentineGenerator::generate`]
pub fn serpentine(
    factory: &SegmentFactory,
    start: DVec2,
    end: DVec2,
    width: f64,
    spacing: f64,
    count: i64,
    direction: i32,
) -> RouterResult<Vec<Segment>> {
    SerpentineGenerator::new(SerpentineParameters {
        start,
        end,
        width,
        spacing,
        count,
        direction,
    })
    .generate(factory)
}
