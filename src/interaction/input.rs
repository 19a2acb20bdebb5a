//! Translation of raw key, wheel, and touch events into `InputState`.
//!
//! Only the translation rules live here; event dispatch belongs to the
//! window host. Browser default handling for the navigation keys is
//! suppressed via the window configuration.

use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;

use crate::constants::navigation::{TOUCH_SENSITIVITY, WHEEL_PIXEL_SCALE, WHEEL_SENSITIVITY};
use crate::engine::camera::navigation::InputState;

/// Key flags are level-triggered: held keys stay set, releases clear them.
pub fn keyboard_navigation_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut input: ResMut<InputState>,
) {
    input.keys.forward = keyboard.any_pressed([KeyCode::KeyW, KeyCode::ArrowUp]);
    input.keys.back = keyboard.any_pressed([KeyCode::KeyS, KeyCode::ArrowDown]);
    input.keys.strafe_left = keyboard.any_pressed([KeyCode::KeyA, KeyCode::ArrowLeft]);
    input.keys.strafe_right = keyboard.any_pressed([KeyCode::KeyD, KeyCode::ArrowRight]);
}

/// Wheel deltas accumulate into the scroll velocity. Pixel-unit events are
/// scaled to line equivalents first. The host reports wheel-up as positive,
/// so the sign is negated to keep wheel-down and swipe-down moving the
/// camera the same way.
pub fn wheel_navigation_input(
    mut wheel_events: EventReader<MouseWheel>,
    mut input: ResMut<InputState>,
) {
    for event in wheel_events.read() {
        let lines = match event.unit {
            MouseScrollUnit::Line => event.y,
            MouseScrollUnit::Pixel => event.y * WHEEL_PIXEL_SCALE,
        };
        input.scroll_velocity -= lines * WHEEL_SENSITIVITY;
    }
}

/// While a drag is in progress it owns the velocity outright: the per-tick
/// drag delta overwrites the accumulator and damping is suspended. Once the
/// last touch lifts, whatever velocity the drag left behind decays normally.
pub fn touch_navigation_input(touches: Res<Touches>, mut input: ResMut<InputState>) {
    let mut delta_y = 0.0;
    let mut dragging = false;
    for touch in touches.iter() {
        dragging = true;
        delta_y += touch.delta().y;
    }

    if dragging {
        input.touch_drag_active = true;
        input.scroll_velocity = -delta_y * TOUCH_SENSITIVITY;
    } else {
        input.touch_drag_active = false;
    }
}
