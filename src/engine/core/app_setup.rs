//! Application construction and schedule wiring.
//!
//! Within one frame the interaction systems run strictly in sequence:
//! input translation, navigation, hover arbitration, caption sink, media
//! upkeep. Hover decisions therefore always see the current frame's
//! post-navigation camera pose, and sampling sees this frame's playback
//! decisions.

use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::prelude::*;
use bevy::render::extract_resource::ExtractResourcePlugin;
use bevy_common_assets::json::JsonAssetPlugin;

use crate::engine::assets::scene_manifest::GalleryManifest;
use crate::engine::audio::{
    AudioUnlockState, UnlockOutcomes, dispose_ambient_on_teardown, drain_unlock_outcomes,
};
use crate::engine::camera::import::{
    CameraRig, adopt_imported_camera, apply_viewport_resize, spawn_primary_camera,
};
use crate::engine::camera::navigation::{InputState, NavigationController, camera_navigation};
use crate::engine::core::app_state::{
    AppState, ReadinessEffectEvent, TeardownRequested, UnlockGesture, ViewportResizeRequested,
    apply_readiness_effects, exit_on_teardown, handle_unlock_gesture, spawn_status_ui,
    unlock_on_primary_input,
};
use crate::engine::core::readiness::ReadinessMachine;
use crate::engine::core::window_config::create_default_plugins;
use crate::engine::loading::SceneModelHandle;
use crate::engine::loading::asset_tracker::poll_asset_readiness;
use crate::engine::loading::manifest_loader::{ManifestLoader, ingest_manifest, start_loading};
use crate::engine::loading::progress::LoadableAssetSet;
use crate::engine::media::{
    DirectCopyList, HostMediaCapabilities, collect_direct_frames, dispose_media_on_teardown,
    update_media_textures,
};
use crate::engine::scene::spawn_lighting;
use crate::engine::scene::starfield::spawn_starfield;
use crate::engine::systems::fps_tracking::{fps_text_update_system, spawn_fps_text};
use crate::interaction::caption::{
    CaptionPanelState, apply_caption_panel, notify_caption_state, spawn_caption_panel,
};
use crate::interaction::hover::{HoverState, hover_arbiter, start_gated_playback_on_unlock};
use crate::interaction::input::{
    keyboard_navigation_input, touch_navigation_input, wheel_navigation_input,
};
use crate::rpc::web_rpc::WebRpcPlugin;

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .init_state::<AppState>()
        .add_plugins(FrameTimeDiagnosticsPlugin::default())
        // Registers the gallery manifest as a loadable JSON asset type.
        .add_plugins(JsonAssetPlugin::<GalleryManifest>::new(&["json"]))
        .add_plugins(ExtractResourcePlugin::<DirectCopyList>::default())
        .add_plugins(WebRpcPlugin);

    app.init_resource::<ReadinessMachine>()
        .init_resource::<LoadableAssetSet>()
        .init_resource::<ManifestLoader>()
        .init_resource::<SceneModelHandle>()
        .init_resource::<NavigationController>()
        .init_resource::<InputState>()
        .init_resource::<HoverState>()
        .init_resource::<CaptionPanelState>()
        .init_resource::<CameraRig>()
        .init_resource::<DirectCopyList>()
        .init_resource::<AudioUnlockState>()
        .init_resource::<UnlockOutcomes>()
        .insert_resource(HostMediaCapabilities::detect())
        .add_event::<UnlockGesture>()
        .add_event::<TeardownRequested>()
        .add_event::<ViewportResizeRequested>()
        .add_event::<ReadinessEffectEvent>();

    // Direct video frames are copied GPU-side in the render world.
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(render_app) = app.get_sub_app_mut(bevy::render::RenderApp) {
            render_app.add_systems(
                bevy::render::Render,
                crate::engine::media::frame_copy::copy_direct_video_frames
                    .in_set(bevy::render::RenderSet::Queue),
            );
        }
    }

    app.add_systems(
        Startup,
        (
            spawn_primary_camera,
            spawn_status_ui,
            spawn_caption_panel,
            spawn_fps_text,
            spawn_starfield,
            spawn_lighting,
            start_loading,
        ),
    );

    // Loading phase: manifest ingestion, asset polling, camera adoption.
    // Failure detection stays live while awaiting the unlock gesture.
    app.add_systems(
        Update,
        (ingest_manifest, poll_asset_readiness, adopt_imported_camera)
            .chain()
            .run_if(in_state(AppState::Loading).or(in_state(AppState::AwaitingUnlock))),
    );

    app.add_systems(
        Update,
        unlock_on_primary_input.run_if(in_state(AppState::AwaitingUnlock)),
    );

    // The per-frame interaction loop, strictly ordered within the frame.
    app.add_systems(
        Update,
        (
            keyboard_navigation_input,
            wheel_navigation_input,
            touch_navigation_input,
            camera_navigation,
            hover_arbiter,
            start_gated_playback_on_unlock,
            apply_caption_panel,
            notify_caption_state,
            update_media_textures,
            collect_direct_frames,
        )
            .chain()
            .run_if(in_state(AppState::Ready)),
    );

    // Lifecycle plumbing that runs in every state.
    app.add_systems(
        Update,
        (
            (handle_unlock_gesture, apply_readiness_effects).chain(),
            drain_unlock_outcomes,
            apply_viewport_resize,
            fps_text_update_system,
            (
                dispose_media_on_teardown,
                dispose_ambient_on_teardown,
                exit_on_teardown,
            )
                .chain(),
        ),
    );

    app
}
