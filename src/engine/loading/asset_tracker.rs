//! Per-frame readiness polling for the registered asset set.
//!
//! Translates collaborator state (scene spawner, media elements, ambient
//! audio) into load events for the readiness machine. Failed assets are
//! never retried here; failure is forwarded once and becomes fatal.

use bevy::asset::LoadState;
use bevy::prelude::*;
use bevy::scene::SceneInstance;

use crate::engine::assets::scene_manifest::GalleryManifest;
use crate::engine::audio;
use crate::engine::core::app_state::ReadinessEffectEvent;
use crate::engine::core::readiness::{LoadEvent, ReadinessMachine};
use crate::engine::media::adapter::MediaSurface;
use crate::interaction::hover::InteractiveSurface;

use super::manifest_loader::ManifestLoader;
use super::progress::LoadableAssetSet;
use super::{AMBIENT_ASSET_ID, SCENERY_ASSET_ID, SceneModelHandle};

pub fn poll_asset_readiness(
    loader: Res<ManifestLoader>,
    manifest: Option<Res<GalleryManifest>>,
    mut asset_set: ResMut<LoadableAssetSet>,
    mut machine: ResMut<ReadinessMachine>,
    mut effects: EventWriter<ReadinessEffectEvent>,
    model: Res<SceneModelHandle>,
    asset_server: Res<AssetServer>,
    scene_spawner: Res<SceneSpawner>,
    scene_instances: Query<&SceneInstance>,
    surfaces: Query<(&InteractiveSurface, &MediaSurface)>,
) {
    if !loader.ingested() {
        return;
    }
    let Some(manifest) = manifest else {
        return;
    };

    let mut progressed = false;
    let mut failures: Vec<String> = Vec::new();

    if let Some(scene) = &model.scene {
        if !asset_set.is_loaded(SCENERY_ASSET_ID) {
            if matches!(
                asset_server.get_load_state(scene),
                Some(LoadState::Failed(_))
            ) {
                if asset_set.mark_failed(SCENERY_ASSET_ID) {
                    failures.push(SCENERY_ASSET_ID.to_string());
                }
            } else {
                let spawned = scene_instances
                    .iter()
                    .any(|instance| scene_spawner.instance_is_ready(**instance));
                if spawned {
                    progressed |= asset_set.mark_loaded(SCENERY_ASSET_ID);
                }
            }
        }
    }

    for (surface, media) in &surfaces {
        if media.adapter.has_failed() {
            if asset_set.mark_failed(&surface.name) {
                failures.push(surface.name.clone());
            }
        } else if media.adapter.is_ready() {
            progressed |= asset_set.mark_loaded(&surface.name);
        }
    }

    if manifest.ambient_audio.is_some() && !asset_set.is_loaded(AMBIENT_ASSET_ID) {
        if audio::ambient_failed() {
            if asset_set.mark_failed(AMBIENT_ASSET_ID) {
                failures.push(AMBIENT_ASSET_ID.to_string());
            }
        } else if audio::ambient_ready() {
            progressed |= asset_set.mark_loaded(AMBIENT_ASSET_ID);
        }
    }

    for id in failures {
        error!("asset '{id}' failed to load");
        emit(&mut machine, &mut effects, &LoadEvent::Failed { id });
    }

    if progressed {
        emit(
            &mut machine,
            &mut effects,
            &LoadEvent::Progressed {
                loaded: asset_set.loaded_count(),
                total: asset_set.total(),
            },
        );
    }

    if asset_set.take_completion() {
        info!("asset set complete; awaiting unlock gesture");
        emit(&mut machine, &mut effects, &LoadEvent::Completed);
    }
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
