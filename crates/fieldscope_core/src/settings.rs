use crate::bridge::{Bounds, SolveRequest, DEFAULT_RESOLUTION};
use crate::metrics::DEFAULT_POLL_INTERVAL;
use crate::projector::ProjectorSettings;
use crate::snapshot::FieldChannel;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Session configuration. Every field has a default, so hosts can pass a
/// partial object (or nothing at all).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionSettings {
    pub bounds: Bounds,
    pub resolution: usize,
    pub metrics_interval_ms: u64,
    /// Half-width of the cube random placement samples from.
    pub placement_extent: f64,
    /// Fixed RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
    pub channel: FieldChannel,
    pub projector: ProjectorSettings,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            bounds: Bounds::default(),
            resolution: DEFAULT_RESOLUTION,
            metrics_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            placement_extent: 2.0,
            seed: None,
            channel: FieldChannel::Electric,
            projector: ProjectorSettings::default(),
        }
    }
}

impl SessionSettings {
    pub fn solve_request(&self) -> SolveRequest {
        SolveRequest::new(self.bounds, self.resolution)
    }

    pub fn metrics_interval(&self) -> Duration {
        Duration::from_millis(self.metrics_interval_ms)
    }
}
