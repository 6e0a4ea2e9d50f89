//! Solver output: sampled positions and index-aligned field vectors.

use crate::Vec3;
use serde::{Deserialize, Serialize};

/// Which field channel of a snapshot to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldChannel {
    #[default]
    Electric,
    Magnetic,
}

/// One complete solve result.
///
/// `electric_field[i]` (and `magnetic_field[i]` when present) belongs to
/// `points[i]`. Snapshots are never edited after creation; a new solve builds a
/// new one and the session swaps the `Arc`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSnapshot {
    #[serde(default)]
    pub points: Vec<Vec3>,
    #[serde(default)]
    pub electric_field: Vec<Vec3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magnetic_field: Option<Vec<Vec3>>,
}

impl FieldSnapshot {
    pub fn new(points: Vec<Vec3>, electric_field: Vec<Vec3>) -> Self {
        Self {
            points,
            electric_field,
            magnetic_field: None,
        }
    }

    pub fn with_magnetic_field(mut self, magnetic_field: Vec<Vec3>) -> Self {
        self.magnetic_field = Some(magnetic_field);
        self
    }

    /// Vectors of `channel`, or an empty slice when the channel is absent.
    pub fn channel(&self, channel: FieldChannel) -> &[Vec3] {
        match channel {
            FieldChannel::Electric => &self.electric_field,
            FieldChannel::Magnetic => self.magnetic_field.as_deref().unwrap_or(&[]),
        }
    }

    /// Number of samples that have both a position and an electric vector.
    pub fn sample_count(&self) -> usize {
        self.points.len().min(self.electric_field.len())
    }

    /// True when every present channel has exactly one vector per point.
    pub fn is_aligned(&self) -> bool {
        let electric = self.electric_field.len() == self.points.len();
        let magnetic = self
            .magnetic_field
            .as_ref()
            .map_or(true, |field| field.len() == self.points.len());
        electric && magnetic
    }

    pub fn is_empty(&self) -> bool {
        self.sample_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_lists_deserialize_as_empty() {
        let snapshot: FieldSnapshot = serde_json::from_str("{}").unwrap();
        assert!(snapshot.is_empty());
        assert!(snapshot.magnetic_field.is_none());

        let snapshot: FieldSnapshot =
            serde_json::from_str(r#"{"points": [[0.0, 0.0, 0.0]]}"#).unwrap();
        assert_eq!(snapshot.points.len(), 1);
        assert!(snapshot.is_empty());
        assert!(!snapshot.is_aligned());
    }

    #[test]
    fn absent_magnetic_channel_reads_as_empty() {
        let snapshot = FieldSnapshot::new(vec![Vec3::zeros()], vec![Vec3::z()]);
        assert_eq!(snapshot.channel(FieldChannel::Electric).len(), 1);
        assert!(snapshot.channel(FieldChannel::Magnetic).is_empty());
        assert!(snapshot.is_aligned());

        let with_b = snapshot.with_magnetic_field(vec![Vec3::y(), Vec3::y()]);
        assert!(!with_b.is_aligned());
    }
}
