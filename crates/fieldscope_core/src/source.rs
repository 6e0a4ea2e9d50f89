//! User-placed electromagnetic emitters.

use crate::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Magnitude of a freshly placed point charge, in coulombs.
pub const DEFAULT_CHARGE_MAGNITUDE: f64 = 1e-9;
/// Strength of a freshly placed current loop.
pub const DEFAULT_CURRENT_STRENGTH: f64 = 0.1;

/// Registry-unique identifier. Ids increase with creation order and are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(pub u64);

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "source-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Charge,
    #[serde(rename = "current")]
    CurrentLoop,
}

impl SourceKind {
    /// Parses the names the UI uses for its source selector.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "charge" => Some(SourceKind::Charge),
            "current" | "current_loop" | "current-loop" => Some(SourceKind::CurrentLoop),
            _ => None,
        }
    }
}

/// Geometry of a straight current element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurrentPath {
    pub start: Vec3,
    pub end: Vec3,
    pub direction: Vec3,
}

impl CurrentPath {
    /// Unit-length element along +x starting at `start`.
    pub fn along_x(start: Vec3) -> Self {
        let direction = Vec3::x();
        Self {
            start,
            end: start + direction,
            direction,
        }
    }

    fn translated(&self, offset: Vec3) -> Self {
        Self {
            start: self.start + offset,
            end: self.end + offset,
            direction: self.direction,
        }
    }
}

/// A charge or current loop.
///
/// `id` and `kind` are fixed at construction; the only way to change `position`
/// is [`Source::moved_to`], which returns a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    id: SourceId,
    #[serde(rename = "type")]
    kind: SourceKind,
    position: Vec3,
    strength: f64,
    #[serde(default, flatten)]
    current: Option<CurrentPath>,
}

impl Source {
    pub fn charge(id: SourceId, position: Vec3, strength: f64) -> Self {
        Self {
            id,
            kind: SourceKind::Charge,
            position,
            strength,
            current: None,
        }
    }

    pub fn current_loop(id: SourceId, position: Vec3, strength: f64) -> Self {
        Self {
            id,
            kind: SourceKind::CurrentLoop,
            position,
            strength,
            current: Some(CurrentPath::along_x(position)),
        }
    }

    pub fn id(&self) -> SourceId {
        self.id
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn strength(&self) -> f64 {
        self.strength
    }

    /// Present exactly when `kind` is `CurrentLoop`.
    pub fn current(&self) -> Option<&CurrentPath> {
        self.current.as_ref()
    }

    /// Copy of this source at `position`. A current path moves rigidly with it.
    pub fn moved_to(&self, position: Vec3) -> Self {
        let offset = position - self.position;
        Self {
            position,
            current: self.current.map(|path| path.translated(offset)),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_loop_defaults_to_unit_x_element() {
        let source = Source::current_loop(SourceId(3), Vec3::new(1.0, 2.0, 3.0), 0.1);
        let path = source.current().expect("current loop has a path");
        assert_eq!(path.start, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(path.end, Vec3::new(2.0, 2.0, 3.0));
        assert_eq!(path.direction, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn moving_a_current_loop_translates_its_path() {
        let source = Source::current_loop(SourceId(1), Vec3::zeros(), 0.1);
        let moved = source.moved_to(Vec3::new(0.0, -1.0, 0.5));
        let path = moved.current().unwrap();
        assert_eq!(path.start, Vec3::new(0.0, -1.0, 0.5));
        assert_eq!(path.end, Vec3::new(1.0, -1.0, 0.5));
        assert_eq!(moved.id(), source.id());
        assert_eq!(moved.kind(), SourceKind::CurrentLoop);
        // moved_to returns a copy; the receiver is untouched
        assert_eq!(source.position(), Vec3::zeros());
    }

    #[test]
    fn kind_names_match_the_ui_selector() {
        assert_eq!(SourceKind::from_name("charge"), Some(SourceKind::Charge));
        assert_eq!(SourceKind::from_name("current"), Some(SourceKind::CurrentLoop));
        assert_eq!(SourceKind::from_name("dipole"), None);
    }

    #[test]
    fn source_serializes_with_type_tag() {
        let source = Source::charge(SourceId(7), Vec3::new(0.0, 1.0, 0.0), -1e-9);
        let value = serde_json::to_value(&source).unwrap();
        assert_eq!(value["type"], "charge");
        assert_eq!(value["id"], 7);
        assert!(value.get("start").is_none());

        let looped = Source::current_loop(SourceId(8), Vec3::zeros(), 0.1);
        let value = serde_json::to_value(&looped).unwrap();
        assert_eq!(value["type"], "current");
        assert!(value.get("direction").is_some());
    }
}
