//! Primary camera setup, imported-camera adoption, and viewport resizes.
//!
//! The scenery may carry a camera node. Its pose is adopted once, after
//! which the navigation controller owns the transform. A scene without a
//! camera resolves per the manifest policy: adopt a default pose, or refuse
//! readiness entirely.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::engine::assets::scene_manifest::{CameraPolicy, GalleryManifest};
use crate::engine::core::app_state::{ReadinessEffectEvent, ViewportResizeRequested};
use crate::engine::core::readiness::{LoadEvent, ReadinessMachine};
use crate::engine::loading::progress::LoadableAssetSet;
use crate::engine::loading::SCENERY_ASSET_ID;

use super::PrimaryCamera;

/// Whether a usable camera pose exists yet. The readiness machine refuses
/// the `Ready` transition until `resolved()` holds.
#[derive(Resource, Default)]
pub struct CameraRig {
    pub adopted: bool,
    pub failed: bool,
}

impl CameraRig {
    pub fn resolved(&self) -> bool {
        self.adopted && !self.failed
    }
}

pub fn spawn_primary_camera(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 1.6, 10.0).looking_at(Vec3::new(0.0, 1.6, 0.0), Vec3::Y),
        PrimaryCamera,
    ));
}

/// Adopt the first camera node the scenery import produces, or fall back
/// per policy once the scenery has finished without one.
pub fn adopt_imported_camera(
    mut rig: ResMut<CameraRig>,
    manifest: Option<Res<GalleryManifest>>,
    asset_set: Res<LoadableAssetSet>,
    imported: Query<(Entity, &GlobalTransform), (With<Camera3d>, Without<PrimaryCamera>)>,
    mut primary: Query<&mut Transform, (With<Camera3d>, With<PrimaryCamera>)>,
    mut commands: Commands,
    mut machine: ResMut<ReadinessMachine>,
    mut effects: EventWriter<ReadinessEffectEvent>,
) {
    if rig.adopted || rig.failed {
        return;
    }
    let Some(manifest) = manifest else {
        return;
    };

    if let Some((entity, global)) = imported.iter().next() {
        if let Ok(mut transform) = primary.single_mut() {
            let (_, rotation, translation) = global.to_scale_rotation_translation();
            transform.translation = translation;
            transform.rotation = rotation;
        }
        // The imported node must not keep rendering alongside the primary.
        commands.entity(entity).despawn();
        rig.adopted = true;
        info!("imported camera pose adopted");
        return;
    }

    let scenery_done =
        manifest.scene_model.is_none() || asset_set.is_loaded(SCENERY_ASSET_ID);
    if !scenery_done {
        return;
    }

    match manifest.camera_policy {
        CameraPolicy::FallbackCamera => {
            rig.adopted = true;
            info!("no imported camera; keeping the default pose");
        }
        CameraPolicy::FailFast => {
            rig.failed = true;
            for effect in machine.on_load_event(&LoadEvent::Failed {
                id: "scene-camera".to_string(),
            }) {
                effects.write(ReadinessEffectEvent(effect));
            }
        }
    }
}

/// Resize the render surface on request. Callable at any time, including
/// before the camera resolves; the aspect ratio follows the window.
pub fn apply_viewport_resize(
    mut resizes: EventReader<ViewportResizeRequested>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    for resize in resizes.read() {
        if let Ok(mut window) = windows.single_mut() {
            window.resolution.set(resize.width, resize.height);
        }
    }
}
