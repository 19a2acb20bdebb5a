//! Gallery manifest: the declarative description of one scene.
//!
//! Mirrors the JSON structure exactly. Everything the runtime varies per
//! gallery lives here: the scenery model, the walkable bounds and motion
//! tuning, the interactive surface set, and the ambient audio source.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::navigation::{DEFAULT_BOUNDS, MOVE_SPEED, SCROLL_DAMPING, VELOCITY_EPSILON};
use crate::engine::camera::navigation::{NavBounds, NavigationController};

/// What to do when the imported scene carries no camera node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraPolicy {
    /// Refuse readiness and surface a fatal error.
    FailFast,
    /// Adopt a default pose and proceed.
    #[default]
    FallbackCamera,
}

/// Walk bounds and motion tuning, all optional in the JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationSettings {
    /// `[min_x, max_x, min_z, max_z]`
    #[serde(default = "default_bounds")]
    pub bounds: [f32; 4],
    #[serde(default = "default_move_speed")]
    pub move_speed: f32,
    #[serde(default = "default_damping")]
    pub damping: f32,
}

fn default_bounds() -> [f32; 4] {
    DEFAULT_BOUNDS
}

fn default_move_speed() -> f32 {
    MOVE_SPEED
}

fn default_damping() -> f32 {
    SCROLL_DAMPING
}

impl Default for NavigationSettings {
    fn default() -> Self {
        Self {
            bounds: DEFAULT_BOUNDS,
            move_speed: MOVE_SPEED,
            damping: SCROLL_DAMPING,
        }
    }
}

impl NavigationSettings {
    pub fn to_controller(&self) -> NavigationController {
        let [min_x, max_x, min_z, max_z] = self.bounds;
        NavigationController {
            move_speed: self.move_speed,
            damping: self.damping,
            velocity_epsilon: VELOCITY_EPSILON,
            bounds: NavBounds {
                min_x,
                max_x,
                min_z,
                max_z,
            },
        }
    }
}

/// One video-textured surface and its caption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceDefinition {
    pub name: String,
    pub caption: String,
    pub media_url: String,
    #[serde(default)]
    pub muted: bool,
    /// Alpha-channel sources force the canvas-sampled decode path.
    #[serde(default)]
    pub needs_alpha: bool,
    pub position: [f32; 3],
    #[serde(default)]
    pub yaw_degrees: f32,
    /// `[width, height]` in world units.
    pub size: [f32; 2],
}

/// Complete gallery manifest as a Bevy asset. Inserted as a resource once
/// loaded so later systems can read it without re-fetching the handle.
#[derive(Asset, TypePath, Resource, Debug, Clone, Serialize, Deserialize)]
pub struct GalleryManifest {
    /// GLTF scenery; `None` renders the generated backdrop only.
    #[serde(default)]
    pub scene_model: Option<String>,
    #[serde(default)]
    pub camera_policy: CameraPolicy,
    #[serde(default)]
    pub navigation: NavigationSettings,
    pub surfaces: Vec<SurfaceDefinition>,
    #[serde(default)]
    pub ambient_audio: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_manifest_fills_defaults() {
        let manifest: GalleryManifest = serde_json::from_str(
            r#"{
                "surfaces": [{
                    "name": "reel",
                    "caption": "Showreel, 2024",
                    "media_url": "media/reel.mp4",
                    "position": [0.0, 2.0, -6.0],
                    "size": [4.0, 2.25]
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(manifest.camera_policy, CameraPolicy::FallbackCamera);
        assert!(manifest.scene_model.is_none());
        assert_eq!(manifest.navigation.bounds, DEFAULT_BOUNDS);
        assert!(!manifest.surfaces[0].muted);
        assert!(!manifest.surfaces[0].needs_alpha);
        assert_eq!(manifest.surfaces[0].yaw_degrees, 0.0);
    }

    #[test]
    fn navigation_settings_build_the_controller() {
        let settings = NavigationSettings {
            bounds: [-10.0, 10.0, -4.0, 4.0],
            move_speed: 3.5,
            damping: 0.8,
        };
        let controller = settings.to_controller();
        assert_eq!(controller.move_speed, 3.5);
        assert_eq!(controller.bounds.max_x, 10.0);
        assert_eq!(controller.bounds.min_z, -4.0);
    }

    #[test]
    fn camera_policy_parses_snake_case() {
        let policy: CameraPolicy = serde_json::from_str("\"fail_fast\"").unwrap();
        assert_eq!(policy, CameraPolicy::FailFast);
    }
}
