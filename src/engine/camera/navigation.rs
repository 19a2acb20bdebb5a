//! First-person walk navigation over a rectangular floor area.
//!
//! Discrete key motion and a damped scroll-velocity accumulator are combined
//! each tick along the camera's live forward/right basis, then clamped to the
//! walkable bounds. The controller is a plain struct so the motion policy can
//! be exercised without a window or render host.

use bevy::prelude::*;

use crate::constants::navigation::{
    DEFAULT_BOUNDS, MOVE_SPEED, SCROLL_DAMPING, VELOCITY_EPSILON,
};

/// Boolean key flags for the four walk directions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavKeys {
    pub forward: bool,
    pub back: bool,
    pub strafe_left: bool,
    pub strafe_right: bool,
}

/// All continuous input feeding the controller. Key events set the flags,
/// wheel and touch deltas feed the velocity accumulator, and the tick decays
/// it. While a touch drag is active the drag owns the velocity outright and
/// damping is suspended until the drag ends.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct InputState {
    pub keys: NavKeys,
    pub scroll_velocity: f32,
    pub touch_drag_active: bool,
}

/// Rectangular walk area on the XZ plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavBounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl Default for NavBounds {
    fn default() -> Self {
        let [min_x, max_x, min_z, max_z] = DEFAULT_BOUNDS;
        Self {
            min_x,
            max_x,
            min_z,
            max_z,
        }
    }
}

impl NavBounds {
    /// Clamp X and Z independently; Y passes through untouched.
    pub fn clamp(&self, position: Vec3) -> Vec3 {
        Vec3::new(
            position.x.clamp(self.min_x, self.max_x),
            position.y,
            position.z.clamp(self.min_z, self.max_z),
        )
    }
}

#[derive(Resource, Debug, Clone, Copy)]
pub struct NavigationController {
    pub move_speed: f32,
    pub damping: f32,
    pub velocity_epsilon: f32,
    pub bounds: NavBounds,
}

impl Default for NavigationController {
    fn default() -> Self {
        Self {
            move_speed: MOVE_SPEED,
            damping: SCROLL_DAMPING,
            velocity_epsilon: VELOCITY_EPSILON,
            bounds: NavBounds::default(),
        }
    }
}

impl NavigationController {
    /// Advance one tick. The basis is recomputed from the live rotation so
    /// motion always follows the current view; Y never changes. Returns the
    /// new position and mutates the velocity accumulator in place.
    pub fn tick(&self, dt: f32, rotation: Quat, input: &mut InputState, position: Vec3) -> Vec3 {
        let forward = flatten(rotation * Vec3::NEG_Z);
        let right = flatten(rotation * Vec3::X);

        let mut pos = position;

        // Discrete motion: active flags compose additively. Diagonals are
        // intentionally not normalised. The result is clamped but the keys
        // stay live for the next tick.
        let mut step = Vec3::ZERO;
        if input.keys.forward {
            step += forward;
        }
        if input.keys.back {
            step -= forward;
        }
        if input.keys.strafe_right {
            step += right;
        }
        if input.keys.strafe_left {
            step -= right;
        }
        if step != Vec3::ZERO {
            pos = self.bounds.clamp(pos + step * self.move_speed * dt);
        }

        // Velocity motion along the right axis. A step that would cross a
        // bound clamps the position and kills the velocity, no bounce.
        if input.scroll_velocity != 0.0 {
            let candidate = pos + right * (input.scroll_velocity * dt);
            let clamped = self.bounds.clamp(candidate);
            if clamped != candidate {
                input.scroll_velocity = 0.0;
            }
            pos = clamped;
        }

        // Exponential damping with a snap-to-zero noise floor. Suspended
        // while a touch drag is overwriting the velocity each tick.
        if !input.touch_drag_active {
            if input.scroll_velocity.abs() > self.velocity_epsilon {
                input.scroll_velocity *= self.damping;
            } else {
                input.scroll_velocity = 0.0;
            }
        }

        Vec3::new(pos.x, position.y, pos.z)
    }
}

/// Project a basis vector onto the walk plane and renormalise. A camera
/// pitched straight up or down yields zero, which simply stalls that axis.
fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z).normalize_or_zero()
}

/// Per-frame shell: reads the live camera transform, runs the pure tick, and
/// writes the clamped position back.
pub fn camera_navigation(
    time: Res<Time>,
    controller: Res<NavigationController>,
    mut input: ResMut<InputState>,
    mut cameras: Query<&mut Transform, (With<Camera3d>, With<super::PrimaryCamera>)>,
) {
    let Ok(mut transform) = cameras.single_mut() else {
        return;
    };

    let rotation = transform.rotation;
    transform.translation = controller.tick(
        time.delta_secs(),
        rotation,
        &mut input,
        transform.translation,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(bounds: NavBounds) -> NavigationController {
        NavigationController {
            move_speed: 5.0,
            damping: 0.75,
            velocity_epsilon: 0.005,
            bounds,
        }
    }

    fn wide_bounds() -> NavBounds {
        NavBounds {
            min_x: -50.0,
            max_x: 50.0,
            min_z: -50.0,
            max_z: 50.0,
        }
    }

    #[test]
    fn position_stays_inside_bounds_for_any_tick_sequence() {
        let nav = controller(wide_bounds());
        let mut input = InputState {
            keys: NavKeys {
                forward: true,
                strafe_right: true,
                ..Default::default()
            },
            scroll_velocity: 40.0,
            ..Default::default()
        };

        let mut pos = Vec3::new(48.0, 1.6, 47.0);
        for _ in 0..500 {
            pos = nav.tick(0.016, Quat::from_rotation_y(0.7), &mut input, pos);
            assert!(pos.x >= -50.0 && pos.x <= 50.0);
            assert!(pos.z >= -50.0 && pos.z <= 50.0);
        }
    }

    #[test]
    fn forward_key_clamps_at_the_boundary() {
        let nav = controller(wide_bounds());
        let mut input = InputState {
            keys: NavKeys {
                forward: true,
                ..Default::default()
            },
            ..Default::default()
        };

        // Yaw -90 degrees: forward points along +X.
        let rotation = Quat::from_rotation_y(-std::f32::consts::FRAC_PI_2);
        let pos = nav.tick(0.1, rotation, &mut input, Vec3::new(49.9, 1.6, 0.0));
        assert_eq!(pos.x, 50.0);
        // The flag is untouched; keys are re-evaluated next tick.
        assert!(input.keys.forward);
    }

    #[test]
    fn diagonal_motion_composes_additively() {
        let nav = controller(wide_bounds());
        let mut input = InputState {
            keys: NavKeys {
                forward: true,
                strafe_right: true,
                ..Default::default()
            },
            ..Default::default()
        };

        let pos = nav.tick(1.0, Quat::IDENTITY, &mut input, Vec3::new(0.0, 1.6, 0.0));
        // Forward is -Z, right is +X; both contribute the full step length.
        assert!((pos.x - 5.0).abs() < 1e-4);
        assert!((pos.z + 5.0).abs() < 1e-4);
    }

    #[test]
    fn velocity_step_applies_then_damps() {
        let nav = controller(wide_bounds());
        // Wheel delta 100 at sensitivity 0.01 has already fed the accumulator.
        let mut input = InputState {
            scroll_velocity: 1.0,
            ..Default::default()
        };

        let pos = nav.tick(0.1, Quat::IDENTITY, &mut input, Vec3::new(0.0, 1.6, 0.0));
        // Motion used the pre-damping velocity along +X (the right axis).
        assert!((pos.x - 0.1).abs() < 1e-5);
        assert!((input.scroll_velocity - 0.75).abs() < 1e-6);
    }

    #[test]
    fn crossing_a_bound_zeroes_the_velocity() {
        let nav = controller(wide_bounds());
        let mut input = InputState {
            scroll_velocity: 100.0,
            ..Default::default()
        };

        let pos = nav.tick(0.5, Quat::IDENTITY, &mut input, Vec3::new(49.0, 1.6, 0.0));
        assert_eq!(pos.x, 50.0);
        assert_eq!(input.scroll_velocity, 0.0);
    }

    #[test]
    fn damping_converges_to_exactly_zero() {
        let nav = controller(wide_bounds());
        let mut input = InputState {
            scroll_velocity: 3.0,
            ..Default::default()
        };

        let mut pos = Vec3::new(0.0, 1.6, 0.0);
        let mut ticks = 0;
        while input.scroll_velocity != 0.0 {
            pos = nav.tick(0.016, Quat::IDENTITY, &mut input, pos);
            ticks += 1;
            assert!(ticks < 200, "velocity never reached zero");
        }
        assert_eq!(input.scroll_velocity, 0.0);
    }

    #[test]
    fn touch_drag_suspends_damping() {
        let nav = controller(wide_bounds());
        let mut input = InputState {
            scroll_velocity: 2.0,
            touch_drag_active: true,
            ..Default::default()
        };

        nav.tick(0.016, Quat::IDENTITY, &mut input, Vec3::new(0.0, 1.6, 0.0));
        assert_eq!(input.scroll_velocity, 2.0);

        input.touch_drag_active = false;
        nav.tick(0.016, Quat::IDENTITY, &mut input, Vec3::new(0.0, 1.6, 0.0));
        assert!((input.scroll_velocity - 1.5).abs() < 1e-6);
    }

    #[test]
    fn pitched_camera_still_moves_on_the_plane() {
        let nav = controller(wide_bounds());
        let mut input = InputState {
            keys: NavKeys {
                forward: true,
                ..Default::default()
            },
            ..Default::default()
        };

        // Slight downward pitch; Y must stay fixed and planar speed full.
        let rotation = Quat::from_euler(EulerRot::YXZ, 0.3, -0.4, 0.0);
        let pos = nav.tick(1.0, rotation, &mut input, Vec3::new(0.0, 1.6, 0.0));
        assert_eq!(pos.y, 1.6);
        let planar = Vec2::new(pos.x, pos.z).length();
        assert!((planar - 5.0).abs() < 1e-4);
    }
}
