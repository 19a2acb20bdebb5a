//! Spawning of the interactive video surfaces described by the manifest.

use bevy::prelude::*;

use crate::constants::interaction::SURFACE_PICK_DEPTH;
use crate::engine::assets::scene_manifest::GalleryManifest;
use crate::engine::media::adapter::MediaSurface;
use crate::engine::media::{HostMediaCapabilities, MediaRequest, create_adapter};
use crate::interaction::hover::InteractiveSurface;

/// Spawn one quad per manifest surface with its media adapter attached.
/// Returns the names whose media source could not be created; the caller
/// reports those as failed assets.
pub fn spawn_gallery_surfaces(
    commands: &mut Commands,
    manifest: &GalleryManifest,
    capabilities: &HostMediaCapabilities,
    images: &mut Assets<Image>,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) -> Vec<String> {
    let mut failed = Vec::new();

    for definition in &manifest.surfaces {
        let request = MediaRequest {
            url: &definition.media_url,
            muted: definition.muted,
            needs_alpha: definition.needs_alpha,
        };
        let adapter = match create_adapter(capabilities, &request, images) {
            Ok(adapter) => adapter,
            Err(reason) => {
                warn!("surface '{}' media unavailable: {reason}", definition.name);
                failed.push(definition.name.clone());
                continue;
            }
        };

        let [width, height] = definition.size;
        let material = materials.add(StandardMaterial {
            base_color_texture: Some(adapter.texture().clone()),
            unlit: true,
            alpha_mode: if definition.needs_alpha {
                AlphaMode::Blend
            } else {
                AlphaMode::Opaque
            },
            ..default()
        });

        commands.spawn((
            Mesh3d(meshes.add(Rectangle::new(width, height))),
            MeshMaterial3d(material),
            Transform::from_translation(Vec3::from(definition.position))
                .with_rotation(Quat::from_rotation_y(definition.yaw_degrees.to_radians())),
            InteractiveSurface {
                name: definition.name.clone(),
                caption: definition.caption.clone(),
                half_extents: Vec3::new(width * 0.5, height * 0.5, SURFACE_PICK_DEPTH * 0.5),
            },
            MediaSurface { adapter },
        ));
    }

    failed
}
