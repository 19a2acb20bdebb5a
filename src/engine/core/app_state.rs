//! App states mirroring the readiness machine, the external control events,
//! and the shell that applies readiness effects to the world.

use bevy::prelude::*;

use crate::engine::audio::{self, AudioUnlockState, UnlockOutcomes};
use crate::engine::camera::import::CameraRig;
use crate::engine::core::readiness::{ReadinessEffect, ReadinessMachine};
use crate::rpc::web_rpc::WebRpcInterface;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum AppState {
    #[default]
    Loading,
    AwaitingUnlock,
    Ready,
    Error,
}

/// The user gesture that may unlock audio. Fired by the hosting page over
/// RPC or by a click/Enter press while the affordance is visible.
#[derive(Event)]
pub struct UnlockGesture;

/// Hard stop: no further frame work, every adapter disposed, then exit.
#[derive(Event)]
pub struct TeardownRequested;

/// Host-driven viewport size change; valid at any time, camera or not.
#[derive(Event)]
pub struct ViewportResizeRequested {
    pub width: f32,
    pub height: f32,
}

/// Carrier for readiness-machine effects from emitters to the applier.
#[derive(Event)]
pub struct ReadinessEffectEvent(pub ReadinessEffect);

/// On-canvas status line: progress, unlock hint, or a fatal message.
#[derive(Component)]
pub struct StatusText;

pub fn spawn_status_ui(mut commands: Commands) {
    commands
        .spawn(Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                Text::new("Loading 0%"),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(Color::srgb(0.85, 0.87, 0.95)),
                Node {
                    position_type: PositionType::Absolute,
                    bottom: Val::Px(24.0),
                    left: Val::Px(24.0),
                    ..default()
                },
                StatusText,
            ));
        });
}

/// Route unlock gestures through the machine. The camera gate is checked
/// here: readiness is refused if the camera never resolved.
pub fn handle_unlock_gesture(
    mut gestures: EventReader<UnlockGesture>,
    mut machine: ResMut<ReadinessMachine>,
    rig: Res<CameraRig>,
    mut effects: EventWriter<ReadinessEffectEvent>,
) {
    for _ in gestures.read() {
        for effect in machine.on_unlock_gesture(rig.resolved()) {
            effects.write(ReadinessEffectEvent(effect));
        }
    }
}

/// Click or Enter acts as the unlock gesture while the affordance is shown;
/// the hosting page's enter button arrives through RPC instead.
pub fn unlock_on_primary_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    touches: Res<Touches>,
    mut gestures: EventWriter<UnlockGesture>,
) {
    if keyboard.just_pressed(KeyCode::Enter)
        || mouse.just_pressed(MouseButton::Left)
        || touches.any_just_pressed()
    {
        gestures.write(UnlockGesture);
    }
}

/// Apply machine effects: state transitions, status text, overlay
/// notifications, and the audio unlock kick-off.
pub fn apply_readiness_effects(
    mut effects: EventReader<ReadinessEffectEvent>,
    mut next_state: ResMut<NextState<AppState>>,
    mut rpc: ResMut<WebRpcInterface>,
    mut status: Query<&mut Text, With<StatusText>>,
    outcomes: Res<UnlockOutcomes>,
    mut unlock_state: ResMut<AudioUnlockState>,
) {
    for ReadinessEffectEvent(effect) in effects.read() {
        match effect {
            ReadinessEffect::ReportPercent(percent) => {
                if let Ok(mut text) = status.single_mut() {
                    text.0 = format!("Loading {percent}%");
                }
                rpc.send_notification(
                    "loading_progress",
                    serde_json::json!({ "percent": percent }),
                );
            }
            ReadinessEffect::RevealUnlockAffordance => {
                next_state.set(AppState::AwaitingUnlock);
                if let Ok(mut text) = status.single_mut() {
                    text.0 = "Click or press Enter to step inside".to_string();
                }
                rpc.send_notification(
                    "readiness_changed",
                    serde_json::json!({ "state": "awaiting_unlock" }),
                );
            }
            ReadinessEffect::BeginAudioUnlock => {
                *unlock_state = AudioUnlockState::Pending;
                audio::begin_unlock(&outcomes);
            }
            ReadinessEffect::StartFrameLoop => {
                next_state.set(AppState::Ready);
                if let Ok(mut text) = status.single_mut() {
                    text.0 = String::new();
                }
                rpc.send_notification(
                    "readiness_changed",
                    serde_json::json!({ "state": "ready" }),
                );
                info!("gallery ready");
            }
            ReadinessEffect::ReportFatal(message) => {
                next_state.set(AppState::Error);
                if let Ok(mut text) = status.single_mut() {
                    text.0 = message.clone();
                }
                rpc.send_notification(
                    "fatal_error",
                    serde_json::json!({ "message": message }),
                );
                error!("{message}");
            }
        }
    }
}

pub fn exit_on_teardown(
    mut teardown: EventReader<TeardownRequested>,
    mut exit: EventWriter<AppExit>,
) {
    if teardown.read().next().is_some() {
        info!("teardown requested; stopping the frame loop");
        exit.write(AppExit::Success);
    }
}
