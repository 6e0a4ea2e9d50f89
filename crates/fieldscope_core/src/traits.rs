use crate::bridge::Bounds;
use crate::metrics::EfficiencyReport;
use crate::snapshot::FieldSnapshot;
use crate::source::Source;
use anyhow::Result;
use std::time::Duration;

/// Anything that can hand out the current efficiency counters.
/// Reports are read-only snapshots; pulling one must not mutate the source.
pub trait ReportSource {
    fn efficiency_report(&self) -> EfficiencyReport;
}

/// The external field solver.
///
/// Implementations own all numerics. The session only guarantees that:
/// - `sources` is non-empty,
/// - `bounds` has finite components with `max > min` on every axis,
/// - `resolution` is within `1..=bridge::MAX_RESOLUTION`,
/// - no two calls overlap on the same session.
pub trait FieldSolver: ReportSource {
    /// Samples the field over `bounds` and returns a complete snapshot.
    /// An `Err` (or a panic) leaves the caller's state untouched.
    fn solve(
        &mut self,
        sources: &[Source],
        bounds: &Bounds,
        resolution: usize,
    ) -> Result<FieldSnapshot>;
}

/// Monotonic time source. Native builds use `InstantClock`; the browser build
/// reads `performance.now()`.
pub trait Clock {
    /// Time since an arbitrary, fixed origin.
    fn now(&self) -> Duration;
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn now(&self) -> Duration {
        (**self).now()
    }
}
