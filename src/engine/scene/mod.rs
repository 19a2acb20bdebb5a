//! Declarative scene setup: backdrop, lighting, and the surface set.

/// Deterministic starfield backdrop.
pub mod starfield;
/// Manifest-driven interactive surface spawning.
pub mod surfaces;

use bevy::prelude::*;

/// Dim key light for the imported scenery; the surfaces are unlit.
pub fn spawn_lighting(mut commands: Commands) {
    commands.spawn((
        DirectionalLight {
            illuminance: 2_000.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::ZYX,
            0.0,
            0.9,
            -std::f32::consts::FRAC_PI_4,
        )),
    ));
}
