//! Scene composition: source markers, field lines and the static
//! camera/lighting/controls setup the renderer draws them with.

use crate::projector::{project_channel, FieldSegment, ProjectorSettings};
use crate::snapshot::{FieldChannel, FieldSnapshot};
use crate::source::{Source, SourceId, SourceKind};
use crate::Vec3;
use serde::{Serialize, Serializer};
use std::fmt;

/// 24-bit RGB colour, serialized as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u32);

impl Color {
    pub const POSITIVE_CHARGE: Color = Color(0x00BFFF);
    pub const NEGATIVE_CHARGE: Color = Color(0xFF4500);
    pub const CURRENT_LOOP: Color = Color(0x32CD32);
    pub const FIELD_LINE: Color = Color(0x4FC3F7);
    pub const WHITE: Color = Color(0xFFFFFF);
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.0 & 0xFF_FFFF)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

const CURRENT_LOOP_RADIUS: f64 = 0.3;
const MAX_CHARGE_RADIUS: f64 = 0.5;
const SOURCE_EMISSIVE: f64 = 0.2;
const SOURCE_OPACITY: f64 = 0.8;
const FIELD_LINE_OPACITY: f64 = 0.6;
/// Radians per rendered frame.
const SOURCE_SPIN: f64 = 0.01;

/// Sphere marker for one source, keyed by its id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceVisual {
    pub key: SourceId,
    pub kind: SourceKind,
    pub position: Vec3,
    pub radius: f64,
    pub color: Color,
    pub emissive_intensity: f64,
    pub opacity: f64,
    pub spin_per_frame: f64,
}

/// Colour and radius depend only on kind and strength.
pub fn source_visual(source: &Source) -> SourceVisual {
    let (color, radius) = match source.kind() {
        SourceKind::Charge => {
            let color = if source.strength() > 0.0 {
                Color::POSITIVE_CHARGE
            } else {
                Color::NEGATIVE_CHARGE
            };
            (color, (source.strength().abs() * 2.0 + 0.1).min(MAX_CHARGE_RADIUS))
        }
        SourceKind::CurrentLoop => (Color::CURRENT_LOOP, CURRENT_LOOP_RADIUS),
    };
    SourceVisual {
        key: source.id(),
        kind: source.kind(),
        position: source.position(),
        radius,
        color,
        emissive_intensity: SOURCE_EMISSIVE,
        opacity: SOURCE_OPACITY,
        spin_per_frame: SOURCE_SPIN,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldLine {
    #[serde(flatten)]
    pub segment: FieldSegment,
    pub color: Color,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraSettings {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_degrees: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointLight {
    pub position: Vec3,
    pub intensity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrbitControls {
    pub enable_pan: bool,
    pub enable_zoom: bool,
    pub enable_rotate: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grid {
    pub size: f64,
    pub divisions: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub text: String,
    pub position: Vec3,
    pub font_size: f64,
    pub color: Color,
}

/// Everything in the scene that does not depend on sources or field data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneSettings {
    pub camera: CameraSettings,
    pub ambient_intensity: f64,
    pub point_lights: Vec<PointLight>,
    pub grid: Grid,
    pub controls: OrbitControls,
    pub labels: Vec<Label>,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            camera: CameraSettings {
                position: Vec3::new(8.0, 6.0, 8.0),
                target: Vec3::zeros(),
                fov_degrees: 75.0,
            },
            ambient_intensity: 0.2,
            point_lights: vec![
                PointLight {
                    position: Vec3::new(10.0, 10.0, 10.0),
                    intensity: 0.8,
                },
                PointLight {
                    position: Vec3::new(-10.0, -10.0, -10.0),
                    intensity: 0.4,
                },
            ],
            grid: Grid {
                size: 20.0,
                divisions: 20,
            },
            controls: OrbitControls {
                enable_pan: true,
                enable_zoom: true,
                enable_rotate: true,
            },
            labels: vec![
                Label {
                    text: "Geometric-Optimized EM Solver".to_string(),
                    position: Vec3::new(0.0, 6.0, 0.0),
                    font_size: 0.8,
                    color: Color::FIELD_LINE,
                },
                Label {
                    text: "Demonstrating 100x+ Performance Through Geometric Intelligence".to_string(),
                    position: Vec3::new(0.0, 5.0, 0.0),
                    font_size: 0.4,
                    color: Color::WHITE,
                },
            ],
        }
    }
}

/// One renderable frame. Rebuilt from scratch on every registry or snapshot change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneFrame {
    pub sources: Vec<SourceVisual>,
    pub field_lines: Vec<FieldLine>,
}

/// Stateless apart from its configuration: a frame is a pure function of the
/// sources and snapshot passed in.
#[derive(Debug, Clone, Default)]
pub struct SceneComposer {
    pub scene: SceneSettings,
    pub projector: ProjectorSettings,
    pub channel: FieldChannel,
}

impl SceneComposer {
    pub fn new(projector: ProjectorSettings, channel: FieldChannel) -> Self {
        Self {
            scene: SceneSettings::default(),
            projector,
            channel,
        }
    }

    pub fn compose(&self, sources: &[Source], snapshot: Option<&FieldSnapshot>) -> SceneFrame {
        let field_lines = project_channel(snapshot, self.channel, &self.projector)
            .into_iter()
            .map(|segment| FieldLine {
                segment,
                color: Color::FIELD_LINE,
                opacity: FIELD_LINE_OPACITY,
            })
            .collect();
        SceneFrame {
            sources: sources.iter().map(source_visual).collect(),
            field_lines,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charge_colour_follows_sign() {
        let positive = source_visual(&Source::charge(SourceId(1), Vec3::zeros(), 1e-9));
        let negative = source_visual(&Source::charge(SourceId(2), Vec3::zeros(), -1e-9));
        assert_eq!(positive.color, Color::POSITIVE_CHARGE);
        assert_eq!(negative.color, Color::NEGATIVE_CHARGE);
        assert_eq!(positive.key, SourceId(1));
    }

    #[test]
    fn charge_radius_scales_and_caps() {
        let tiny = source_visual(&Source::charge(SourceId(1), Vec3::zeros(), 1e-9));
        assert!((tiny.radius - 0.1).abs() < 1e-6);
        let mid = source_visual(&Source::charge(SourceId(2), Vec3::zeros(), -0.1));
        assert!((mid.radius - 0.3).abs() < 1e-12);
        let big = source_visual(&Source::charge(SourceId(3), Vec3::zeros(), 5.0));
        assert_eq!(big.radius, 0.5);
    }

    #[test]
    fn current_loops_are_fixed_green_spheres() {
        let visual = source_visual(&Source::current_loop(SourceId(4), Vec3::zeros(), 10.0));
        assert_eq!(visual.color, Color::CURRENT_LOOP);
        assert_eq!(visual.radius, 0.3);
    }

    #[test]
    fn colours_serialize_as_hex() {
        assert_eq!(Color::NEGATIVE_CHARGE.to_string(), "#FF4500");
        assert_eq!(
            serde_json::to_value(Color::POSITIVE_CHARGE).unwrap(),
            serde_json::json!("#00BFFF")
        );
    }

    #[test]
    fn compose_keys_sources_and_lines() {
        let sources = vec![
            Source::charge(SourceId(5), Vec3::zeros(), 1e-9),
            Source::current_loop(SourceId(9), Vec3::new(1.0, 0.0, 0.0), 0.1),
        ];
        let snapshot = FieldSnapshot::new(
            vec![Vec3::zeros(), Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0)],
            vec![Vec3::z(), Vec3::zeros(), Vec3::new(0.0, 30.0, 0.0)],
        );
        let frame = SceneComposer::default().compose(&sources, Some(&snapshot));

        let keys: Vec<SourceId> = frame.sources.iter().map(|v| v.key).collect();
        assert_eq!(keys, vec![SourceId(5), SourceId(9)]);
        assert_eq!(frame.field_lines.len(), 2);
        assert_eq!(frame.field_lines[1].segment.key.0, 2);
        assert_eq!(frame.field_lines[0].color, Color::FIELD_LINE);
        assert_eq!(frame.field_lines[0].opacity, 0.6);
    }

    #[test]
    fn compose_without_snapshot_draws_only_sources() {
        let sources = vec![Source::charge(SourceId(1), Vec3::zeros(), -1e-9)];
        let frame = SceneComposer::default().compose(&sources, None);
        assert_eq!(frame.sources.len(), 1);
        assert!(frame.field_lines.is_empty());
    }

    #[test]
    fn default_scene_matches_viewer_layout() {
        let scene = SceneSettings::default();
        assert_eq!(scene.camera.position, Vec3::new(8.0, 6.0, 8.0));
        assert_eq!(scene.camera.fov_degrees, 75.0);
        assert_eq!(scene.point_lights.len(), 2);
        assert!(scene.controls.enable_pan && scene.controls.enable_zoom);
        assert_eq!(scene.grid.divisions, 20);
        let texts: Vec<&str> = scene.labels.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "Geometric-Optimized EM Solver",
                "Demonstrating 100x+ Performance Through Geometric Intelligence",
            ]
        );
        assert_eq!(scene.labels[1].color, Color::WHITE);
    }
}
