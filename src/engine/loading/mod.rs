//! Startup loading pipeline: manifest, scenery, media, ambient audio.
//!
//! The manifest resolves first and registers the asset set; polling then
//! feeds load events into the readiness machine until the set completes or
//! a required asset fails.

/// Collaborator-state polling that feeds the readiness machine.
pub mod asset_tracker;
/// Manifest fetch and one-shot scene ingestion.
pub mod manifest_loader;
/// The loadable asset set and its progress bookkeeping.
pub mod progress;

use bevy::prelude::*;

pub const SCENERY_ASSET_ID: &str = "scenery-model";
pub const AMBIENT_ASSET_ID: &str = "ambient-audio";

/// Handle of the scenery GLTF once requested.
#[derive(Resource, Default)]
pub struct SceneModelHandle {
    pub scene: Option<Handle<Scene>>,
}
