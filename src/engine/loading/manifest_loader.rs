//! Manifest loading and one-shot scene ingestion.
//!
//! The manifest drives everything: once it resolves, the navigation
//! controller is tuned, the asset set is registered, the scenery model and
//! ambient audio start fetching, and the surface set is spawned. A manifest
//! fetch failure is fatal since nothing can be described without it.

use bevy::asset::LoadState;
use bevy::gltf::GltfAssetLabel;
use bevy::prelude::*;

use crate::engine::assets::scene_manifest::GalleryManifest;
use crate::engine::audio;
use crate::engine::camera::navigation::NavigationController;
use crate::engine::core::app_state::ReadinessEffectEvent;
use crate::engine::core::readiness::{LoadEvent, ReadinessMachine};
use crate::engine::media::HostMediaCapabilities;
use crate::engine::scene::surfaces::spawn_gallery_surfaces;

use super::progress::LoadableAssetSet;
use super::{AMBIENT_ASSET_ID, SCENERY_ASSET_ID, SceneModelHandle};

pub const MANIFEST_PATH: &str = "gallery/manifest.json";

#[derive(Resource, Default)]
pub struct ManifestLoader {
    handle: Option<Handle<GalleryManifest>>,
    ingested: bool,
}

impl ManifestLoader {
    pub fn ingested(&self) -> bool {
        self.ingested
    }
}

/// Kick off the manifest fetch.
pub fn start_loading(mut loader: ResMut<ManifestLoader>, asset_server: Res<AssetServer>) {
    info!("loading gallery manifest: {MANIFEST_PATH}");
    loader.handle = Some(asset_server.load(MANIFEST_PATH));
}

/// Ingest the manifest once it resolves and stand the scene up.
pub fn ingest_manifest(
    mut loader: ResMut<ManifestLoader>,
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    manifests: Res<Assets<GalleryManifest>>,
    mut machine: ResMut<ReadinessMachine>,
    mut effects: EventWriter<ReadinessEffectEvent>,
    mut asset_set: ResMut<LoadableAssetSet>,
    mut controller: ResMut<NavigationController>,
    mut model: ResMut<SceneModelHandle>,
    capabilities: Res<HostMediaCapabilities>,
    mut images: ResMut<Assets<Image>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if loader.ingested {
        return;
    }
    let Some(handle) = loader.handle.clone() else {
        return;
    };

    if matches!(
        asset_server.get_load_state(&handle),
        Some(LoadState::Failed(_))
    ) {
        loader.ingested = true;
        emit(
            &mut machine,
            &mut effects,
            &LoadEvent::Failed {
                id: "manifest".to_string(),
            },
        );
        return;
    }

    let Some(manifest) = manifests.get(&handle) else {
        return;
    };
    let manifest = manifest.clone();
    loader.ingested = true;
    info!("gallery manifest loaded: {} surfaces", manifest.surfaces.len());

    *controller = manifest.navigation.to_controller();

    // Register the whole asset set up front so progress percentages are
    // stable from the first report.
    if manifest.scene_model.is_some() {
        asset_set.register(SCENERY_ASSET_ID);
    }
    for surface in &manifest.surfaces {
        asset_set.register(surface.name.clone());
    }
    if manifest.ambient_audio.is_some() {
        asset_set.register(AMBIENT_ASSET_ID);
    }

    if let Some(path) = &manifest.scene_model {
        let scene: Handle<Scene> =
            asset_server.load(GltfAssetLabel::Scene(0).from_asset(path.clone()));
        commands.spawn(SceneRoot(scene.clone()));
        model.scene = Some(scene);
        emit(
            &mut machine,
            &mut effects,
            &LoadEvent::Started {
                id: SCENERY_ASSET_ID.to_string(),
            },
        );
    }

    if let Some(url) = &manifest.ambient_audio {
        match audio::create_ambient_audio(url) {
            Ok(()) => emit(
                &mut machine,
                &mut effects,
                &LoadEvent::Started {
                    id: AMBIENT_ASSET_ID.to_string(),
                },
            ),
            Err(reason) => {
                warn!("ambient audio source unavailable: {reason}");
                asset_set.mark_failed(AMBIENT_ASSET_ID);
                emit(
                    &mut machine,
                    &mut effects,
                    &LoadEvent::Failed {
                        id: AMBIENT_ASSET_ID.to_string(),
                    },
                );
            }
        }
    }

    let failed_surfaces = spawn_gallery_surfaces(
        &mut commands,
        &manifest,
        &capabilities,
        &mut images,
        &mut meshes,
        &mut materials,
    );
    for surface in &manifest.surfaces {
        if !failed_surfaces.contains(&surface.name) {
            emit(
                &mut machine,
                &mut effects,
                &LoadEvent::Started {
                    id: surface.name.clone(),
                },
            );
        }
    }
    for name in failed_surfaces {
        asset_set.mark_failed(&name);
        emit(&mut machine, &mut effects, &LoadEvent::Failed { id: name });
    }

    commands.insert_resource(manifest);
}

fn emit(
    machine: &mut ReadinessMachine,
    effects: &mut EventWriter<ReadinessEffectEvent>,
    event: &LoadEvent,
) {
    for effect in machine.on_load_event(event) {
        effects.write(ReadinessEffectEvent(effect));
    }
}
