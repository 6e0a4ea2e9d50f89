//! Stand-in solver used until a real engine is plugged in.

use crate::bridge::Bounds;
use crate::metrics::{EfficiencyReport, PerformanceTracker};
use crate::snapshot::FieldSnapshot;
use crate::source::Source;
use crate::traits::{Clock, FieldSolver, ReportSource};
use crate::Vec3;
use anyhow::Result;

/// Emits a unit +z electric vector at every source position. No field is
/// actually computed; it exists so the rest of the pipeline can be driven end
/// to end, and it keeps real solution counts and wall time.
pub struct PlaceholderSolver {
    tracker: PerformanceTracker,
    clock: Box<dyn Clock>,
}

impl PlaceholderSolver {
    pub fn new(clock: impl Clock + 'static) -> Self {
        Self {
            tracker: PerformanceTracker::new(),
            clock: Box::new(clock),
        }
    }
}

impl ReportSource for PlaceholderSolver {
    fn efficiency_report(&self) -> EfficiencyReport {
        self.tracker.report()
    }
}

impl FieldSolver for PlaceholderSolver {
    fn solve(
        &mut self,
        sources: &[Source],
        _bounds: &Bounds,
        _resolution: usize,
    ) -> Result<FieldSnapshot> {
        let started = self.clock.now();
        let points: Vec<Vec3> = sources.iter().map(Source::position).collect();
        let electric_field = vec![Vec3::z(); points.len()];
        let elapsed = self.clock.now().saturating_sub(started);
        self.tracker.record(elapsed);
        Ok(FieldSnapshot::new(points, electric_field))
    }
}
