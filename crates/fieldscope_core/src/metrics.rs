//! Solver efficiency counters and the fixed-interval synchronizer that
//! republishes them for display.

use crate::traits::ReportSource;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Cumulative solver counters. Ratios the solver does not measure are `None`
/// and shown as "N/A".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EfficiencyReport {
    pub average_speedup: Option<f64>,
    pub simd_efficiency: Option<f64>,
    pub symmetry_reduction: Option<f64>,
    pub solutions_computed: u64,
    /// Seconds spent inside the solver across all solves.
    pub total_compute_time: f64,
}

/// One formatted line of the performance panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub label: &'static str,
    pub value: String,
}

impl ReportRow {
    fn new(label: &'static str, value: String) -> Self {
        Self { label, value }
    }
}

impl EfficiencyReport {
    /// Rows in panel order, with unmeasured ratios as "N/A".
    pub fn display_rows(&self) -> Vec<ReportRow> {
        vec![
            ReportRow::new("Performance Gain", format_ratio(self.average_speedup, "x")),
            ReportRow::new("SIMD Efficiency", format_ratio(self.simd_efficiency, "%")),
            ReportRow::new("Symmetry Reduction", format_ratio(self.symmetry_reduction, "x")),
            ReportRow::new("Solutions Computed", self.solutions_computed.to_string()),
            ReportRow::new("Total Compute Time", format!("{:.2}s", self.total_compute_time)),
        ]
    }
}

fn format_ratio(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.1}{unit}"),
        _ => "N/A".to_string(),
    }
}

/// Running totals kept by a solver.
#[derive(Debug, Clone, Default)]
pub struct PerformanceTracker {
    solutions: u64,
    total_time: Duration,
}

impl PerformanceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, elapsed: Duration) {
        self.solutions += 1;
        self.total_time += elapsed;
    }

    pub fn report(&self) -> EfficiencyReport {
        EfficiencyReport {
            solutions_computed: self.solutions,
            total_compute_time: self.total_time.as_secs_f64(),
            ..EfficiencyReport::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PollState {
    Idle,
    Running,
    Cancelled,
}

/// Pulls a report every `interval` and keeps only the newest one.
///
/// Time is pushed in by the owner (`advance`) or by an external timer (`pull`),
/// so the synchronizer never outlives the report source it reads: the source is
/// borrowed only for the duration of a call. Once cancelled it never pulls again.
#[derive(Debug, Clone)]
pub struct MetricsSynchronizer {
    interval: Duration,
    since_last: Duration,
    latest: Option<EfficiencyReport>,
    state: PollState,
}

impl MetricsSynchronizer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            since_last: Duration::ZERO,
            latest: None,
            state: PollState::Idle,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_active(&self) -> bool {
        self.state == PollState::Running
    }

    pub fn latest(&self) -> Option<&EfficiencyReport> {
        self.latest.as_ref()
    }

    /// Publishes immediately and arms the timer. No-op after `cancel`.
    pub fn start(&mut self, source: &impl ReportSource) -> Option<&EfficiencyReport> {
        if self.state == PollState::Cancelled {
            return None;
        }
        self.state = PollState::Running;
        self.since_last = Duration::ZERO;
        self.pull(source)
    }

    /// Advances the internal timer by `dt`; pulls once when at least one interval
    /// has elapsed. Missed intervals are not replayed.
    pub fn advance(
        &mut self,
        dt: Duration,
        source: &impl ReportSource,
    ) -> Option<&EfficiencyReport> {
        if !self.is_active() {
            return None;
        }
        self.since_last = self.since_last.saturating_add(dt);
        if self.since_last < self.interval {
            return None;
        }
        let remainder = self.since_last.as_nanos() % self.interval.as_nanos();
        self.since_last = Duration::from_nanos(u64::try_from(remainder).unwrap_or(u64::MAX));
        self.pull(source)
    }

    /// Pulls a fresh report right now, replacing the previous one.
    pub fn pull(&mut self, source: &impl ReportSource) -> Option<&EfficiencyReport> {
        if !self.is_active() {
            return None;
        }
        self.latest = Some(source.efficiency_report());
        self.latest.as_ref()
    }

    /// Stops polling for good. The last report stays readable.
    pub fn cancel(&mut self) {
        self.state = PollState::Cancelled;
    }
}

impl Default for MetricsSynchronizer {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

/// `std::time::Instant` based clock. Not available on `wasm32`, where the host
/// supplies `performance.now()` instead.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Copy)]
pub struct InstantClock {
    origin: std::time::Instant,
}

#[cfg(not(target_arch = "wasm32"))]
impl InstantClock {
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for InstantClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl crate::traits::Clock for InstantClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct CountingSource {
        pulls: Cell<u64>,
    }

    impl ReportSource for CountingSource {
        fn efficiency_report(&self) -> EfficiencyReport {
            self.pulls.set(self.pulls.get() + 1);
            EfficiencyReport {
                solutions_computed: self.pulls.get(),
                ..EfficiencyReport::default()
            }
        }
    }

    fn source() -> CountingSource {
        CountingSource {
            pulls: Cell::new(0),
        }
    }

    #[test]
    fn start_publishes_immediately() {
        let source = source();
        let mut sync = MetricsSynchronizer::default();
        assert!(sync.latest().is_none());
        let report = sync.start(&source).expect("first report");
        assert_eq!(report.solutions_computed, 1);
        assert!(sync.is_active());
    }

    #[test]
    fn pulls_once_per_interval_and_keeps_only_latest() {
        let source = source();
        let mut sync = MetricsSynchronizer::new(Duration::from_secs(1));
        sync.start(&source);

        assert!(sync.advance(Duration::from_millis(400), &source).is_none());
        assert!(sync.advance(Duration::from_millis(400), &source).is_none());
        let report = sync.advance(Duration::from_millis(400), &source).unwrap();
        assert_eq!(report.solutions_computed, 2);

        // 200 ms carried over from the previous tick
        assert!(sync.advance(Duration::from_millis(700), &source).is_none());
        assert!(sync.advance(Duration::from_millis(100), &source).is_some());
        assert_eq!(sync.latest().unwrap().solutions_computed, 3);
        assert_eq!(source.pulls.get(), 3);
    }

    #[test]
    fn missed_intervals_are_not_replayed() {
        let source = source();
        let mut sync = MetricsSynchronizer::new(Duration::from_secs(1));
        sync.start(&source);
        sync.advance(Duration::from_millis(5500), &source);
        assert_eq!(source.pulls.get(), 2);
        assert!(sync.advance(Duration::from_millis(400), &source).is_none());
        assert!(sync.advance(Duration::from_millis(100), &source).is_some());
    }

    #[test]
    fn cancelled_synchronizer_never_pulls_again() {
        let source = source();
        let mut sync = MetricsSynchronizer::default();
        sync.start(&source);
        sync.cancel();
        assert!(sync.advance(Duration::from_secs(10), &source).is_none());
        assert!(sync.pull(&source).is_none());
        assert!(sync.start(&source).is_none());
        assert_eq!(source.pulls.get(), 1);
        assert_eq!(sync.latest().unwrap().solutions_computed, 1);
    }

    #[test]
    fn huge_time_steps_saturate_instead_of_overflowing() {
        let source = source();
        let mut sync = MetricsSynchronizer::new(Duration::from_secs(1));
        sync.start(&source);
        assert!(sync.advance(Duration::MAX, &source).is_some());
        assert!(sync.advance(Duration::MAX, &source).is_some());
        assert_eq!(source.pulls.get(), 3);

        let mut slow = MetricsSynchronizer::new(Duration::MAX);
        slow.start(&source);
        assert!(slow.advance(Duration::from_secs(u64::MAX / 2), &source).is_none());
        assert!(slow.advance(Duration::from_secs(u64::MAX), &source).is_some());
    }

    #[test]
    fn idle_synchronizer_does_not_pull() {
        let source = source();
        let mut sync = MetricsSynchronizer::default();
        assert!(sync.advance(Duration::from_secs(3), &source).is_none());
        assert_eq!(source.pulls.get(), 0);
    }

    #[test]
    fn tracker_accumulates_solutions_and_time() {
        let mut tracker = PerformanceTracker::new();
        tracker.record(Duration::from_millis(250));
        tracker.record(Duration::from_millis(500));
        let report = tracker.report();
        assert_eq!(report.solutions_computed, 2);
        assert!((report.total_compute_time - 0.75).abs() < 1e-12);
        assert!(report.average_speedup.is_none());
    }

    #[test]
    fn display_rows_show_missing_ratios_as_na() {
        let report = EfficiencyReport {
            average_speedup: Some(112.345),
            solutions_computed: 4,
            total_compute_time: 1.5,
            ..EfficiencyReport::default()
        };
        let rows = report.display_rows();
        assert_eq!(rows[0], ReportRow::new("Performance Gain", "112.3x".to_string()));
        assert_eq!(rows[1].value, "N/A");
        assert_eq!(rows[2].value, "N/A");
        assert_eq!(rows[3].value, "4");
        assert_eq!(rows[4].value, "1.50s");
        assert_eq!(
            serde_json::to_value(&rows[1]).unwrap(),
            serde_json::json!({"label": "SIMD Efficiency", "value": "N/A"})
        );
    }
}
