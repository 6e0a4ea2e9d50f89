//! Field samples to renderable line segments.
//!
//! Each surviving sample becomes one short segment starting at its sample point
//! and pointing along the field. Segment length grows linearly with field
//! magnitude and saturates, so a strong source cannot blow the scene scale;
//! width grows without bound but never drops below a visible floor. Samples
//! whose magnitude is at or below the threshold are dropped, which also keeps
//! zero vectors away from the normalization.

use crate::snapshot::{FieldChannel, FieldSnapshot};
use crate::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scaling constants for the projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectorSettings {
    /// Samples with `|v| <= threshold` are not rendered.
    pub threshold: f64,
    pub length_scale: f64,
    pub max_length: f64,
    pub width_scale: f64,
    pub min_width: f64,
}

impl Default for ProjectorSettings {
    fn default() -> Self {
        Self {
            threshold: 0.001,
            length_scale: 0.1,
            max_length: 2.0,
            width_scale: 0.5,
            min_width: 0.5,
        }
    }
}

impl ProjectorSettings {
    pub fn segment_length(&self, magnitude: f64) -> f64 {
        (magnitude * self.length_scale).min(self.max_length)
    }

    pub fn line_width(&self, magnitude: f64) -> f64 {
        (magnitude * self.width_scale).max(self.min_width)
    }
}

/// Stable scene-graph key: the sample index the segment came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentKey(pub usize);

impl fmt::Display for SegmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSegment {
    pub key: SegmentKey,
    pub start: Vec3,
    pub end: Vec3,
    pub magnitude: f64,
    pub length: f64,
    pub line_width: f64,
}

/// Projects the electric channel of `snapshot` with `settings`.
pub fn project_field(
    snapshot: Option<&FieldSnapshot>,
    settings: &ProjectorSettings,
) -> Vec<FieldSegment> {
    project_channel(snapshot, FieldChannel::Electric, settings)
}

/// Projects one channel. A missing snapshot, an absent channel or an empty
/// point list all produce no segments. When the channel and the point list
/// disagree in length only the aligned prefix is used.
pub fn project_channel(
    snapshot: Option<&FieldSnapshot>,
    channel: FieldChannel,
    settings: &ProjectorSettings,
) -> Vec<FieldSegment> {
    let Some(snapshot) = snapshot else {
        return Vec::new();
    };
    snapshot
        .points
        .iter()
        .zip(snapshot.channel(channel))
        .enumerate()
        .filter_map(|(index, (point, field))| project_sample(index, point, field, settings))
        .collect()
}

/// Segment for a single sample, or `None` when it is below threshold or has a
/// NaN or infinite component.
pub fn project_sample(
    index: usize,
    point: &Vec3,
    field: &Vec3,
    settings: &ProjectorSettings,
) -> Option<FieldSegment> {
    if !field.iter().all(|c| c.is_finite()) {
        return None;
    }
    let (magnitude, direction) = magnitude_and_direction(field)?;
    if !(magnitude > settings.threshold) {
        return None;
    }
    let length = settings.segment_length(magnitude);
    Some(FieldSegment {
        key: SegmentKey(index),
        start: *point,
        end: point + direction * length,
        magnitude,
        length,
        line_width: settings.line_width(magnitude),
    })
}

/// Norm and unit direction of a finite vector, scaled by its largest component
/// first so that large finite samples do not overflow to infinity.
fn magnitude_and_direction(field: &Vec3) -> Option<(f64, Vec3)> {
    let scale = field.amax();
    if scale == 0.0 {
        return None;
    }
    let scaled = field / scale;
    let magnitude = (scale * scaled.norm()).min(f64::MAX);
    Some((magnitude, scaled.normalize()))
}
