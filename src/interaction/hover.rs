//! Hover arbitration over the fixed interactive surface set.
//!
//! Each frame one ray is cast from the camera through the pointer and at
//! most one surface becomes active: the nearest intersection wins. Activation
//! drives the surface's media adapter and the caption panel. The transition
//! rules live on `HoverState` as plain methods so the arbitration policy is
//! testable without a camera or window.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::engine::audio::AudioUnlockState;
use crate::engine::camera::PrimaryCamera;
use crate::engine::media::adapter::{MediaState, MediaSurface};
use super::caption::CaptionPanelState;
use super::ray::ray_surface_hit;

/// One renderable surface eligible for hover. The set is fixed once the
/// scene is spawned; it never grows or shrinks afterward.
#[derive(Component)]
pub struct InteractiveSurface {
    pub name: String,
    pub caption: String,
    pub half_extents: Vec3,
}

/// At most one currently-active surface. Mutated only by the arbiter.
#[derive(Resource, Default)]
pub struct HoverState {
    pub active: Option<Entity>,
}

/// Adapter side effects requested by one arbitration step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverCommand {
    Pause(Entity),
    Play(Entity),
}

impl HoverState {
    /// Apply the transition rules for one tick. `play_allowed` is the audio
    /// gate: muted sources and unlocked hosts may start playback, everything
    /// else stays paused while the hover reference still moves to the new
    /// surface, so no play request is retried on later unchanged ticks.
    pub fn arbitrate(
        &mut self,
        resolved: Option<Entity>,
        play_allowed: impl FnOnce(Entity) -> bool,
    ) -> Vec<HoverCommand> {
        if resolved == self.active {
            return Vec::new();
        }

        let mut commands = Vec::new();
        if let Some(previous) = self.active {
            commands.push(HoverCommand::Pause(previous));
        }
        if let Some(next) = resolved {
            if play_allowed(next) {
                commands.push(HoverCommand::Play(next));
            }
        }
        self.active = resolved;
        commands
    }
}

/// Nearest positive-distance hit wins ties between overlapping surfaces.
pub fn nearest_hit(hits: impl IntoIterator<Item = (Entity, f32)>) -> Option<Entity> {
    hits.into_iter()
        .filter(|(_, t)| *t > 0.0)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(entity, _)| entity)
}

/// Per-frame arbitration, run after navigation so the ray uses this frame's
/// post-navigation camera pose.
pub fn hover_arbiter(
    windows: Query<&Window, With<PrimaryWindow>>,
    touches: Res<Touches>,
    cameras: Query<(&GlobalTransform, &Camera), With<PrimaryCamera>>,
    surfaces: Query<(Entity, &GlobalTransform, &InteractiveSurface)>,
    mut adapters: Query<&mut MediaSurface>,
    unlock: Res<AudioUnlockState>,
    mut hover: ResMut<HoverState>,
    mut caption: ResMut<CaptionPanelState>,
) {
    let pointer = windows.single().ok().and_then(|window| {
        window
            .cursor_position()
            .or_else(|| touches.iter().next().map(|touch| touch.position()))
    });

    let resolved = pointer.and_then(|pointer| {
        let (camera_transform, camera) = cameras.single().ok()?;
        let ray = camera.viewport_to_world(camera_transform, pointer).ok()?;
        let origin = ray.origin;
        let direction = ray.direction.as_vec3();

        nearest_hit(surfaces.iter().filter_map(|(entity, transform, surface)| {
            ray_surface_hit(origin, direction, transform, surface.half_extents)
                .map(|t| (entity, t))
        }))
    });

    let audio_unlocked = *unlock == AudioUnlockState::Unlocked;
    let commands = hover.arbitrate(resolved, |entity| {
        adapters
            .get(entity)
            .map(|surface| surface.adapter.is_muted() || audio_unlocked)
            .unwrap_or(false)
    });

    for command in commands {
        match command {
            HoverCommand::Pause(entity) => {
                if let Ok(mut surface) = adapters.get_mut(entity) {
                    surface.adapter.pause();
                }
            }
            HoverCommand::Play(entity) => {
                if let Ok(mut surface) = adapters.get_mut(entity) {
                    // Per-surface playback failure is isolated: log it and
                    // leave this surface silent, everything else unaffected.
                    if let Err(err) = surface.adapter.play() {
                        warn!("{err}");
                    }
                }
            }
        }
    }

    match (hover.active, pointer) {
        (Some(active), Some(pointer)) => {
            if let Ok((_, _, surface)) = surfaces.get(active) {
                caption.show(surface.name.clone(), surface.caption.clone(), pointer);
            }
        }
        _ => caption.hide(),
    }
}

/// Decision for the late-unlock case: a surface that was hovered while the
/// audio gate was closed starts playing once when the gate opens, provided
/// it is still the active hover.
pub fn start_gated_playback_on_unlock(
    unlock: Res<AudioUnlockState>,
    hover: Res<HoverState>,
    mut adapters: Query<&mut MediaSurface>,
) {
    if !unlock.is_changed() || *unlock != AudioUnlockState::Unlocked {
        return;
    }
    let Some(active) = hover.active else {
        return;
    };
    if let Ok(mut surface) = adapters.get_mut(active) {
        if surface.adapter.state() == MediaState::Idle {
            if let Err(err) = surface.adapter.play() {
                warn!("{err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn entity(index: u32) -> Entity {
        Entity::from_raw(index)
    }

    #[test]
    fn unchanged_resolution_produces_no_commands() {
        let mut hover = HoverState::default();
        assert!(hover.arbitrate(None, |_| true).is_empty());

        hover.arbitrate(Some(entity(1)), |_| true);
        assert!(hover.arbitrate(Some(entity(1)), |_| true).is_empty());
    }

    #[test]
    fn entering_a_surface_starts_playback() {
        let mut hover = HoverState::default();
        let commands = hover.arbitrate(Some(entity(1)), |_| true);
        assert_eq!(commands, vec![HoverCommand::Play(entity(1))]);
        assert_eq!(hover.active, Some(entity(1)));
    }

    #[test]
    fn leaving_pauses_exactly_once() {
        let mut hover = HoverState::default();
        hover.arbitrate(Some(entity(1)), |_| true);

        let commands = hover.arbitrate(None, |_| true);
        assert_eq!(commands, vec![HoverCommand::Pause(entity(1))]);
        assert_eq!(hover.active, None);

        // Pointer keeps missing everything; no further pause is issued.
        assert!(hover.arbitrate(None, |_| true).is_empty());
    }

    #[test]
    fn switching_surfaces_pauses_then_plays() {
        let mut hover = HoverState::default();
        hover.arbitrate(Some(entity(1)), |_| true);

        let commands = hover.arbitrate(Some(entity(2)), |_| true);
        assert_eq!(
            commands,
            vec![
                HoverCommand::Pause(entity(1)),
                HoverCommand::Play(entity(2)),
            ]
        );
    }

    #[test]
    fn gated_surface_is_held_without_retry() {
        let mut hover = HoverState::default();
        let commands = hover.arbitrate(Some(entity(1)), |_| false);
        assert!(commands.is_empty());
        // The hover reference still moved, so later ticks are no-ops rather
        // than a play-retry storm.
        assert_eq!(hover.active, Some(entity(1)));
        assert!(hover.arbitrate(Some(entity(1)), |_| false).is_empty());
    }

    #[test]
    fn at_most_one_surface_plays_across_any_sequence() {
        let mut hover = HoverState::default();
        let mut playing: HashSet<Entity> = HashSet::new();

        let sequence = [
            Some(entity(1)),
            Some(entity(1)),
            Some(entity(2)),
            None,
            Some(entity(3)),
            Some(entity(2)),
            Some(entity(2)),
            None,
            None,
            Some(entity(1)),
        ];
        for resolved in sequence {
            for command in hover.arbitrate(resolved, |_| true) {
                match command {
                    HoverCommand::Play(e) => {
                        playing.insert(e);
                    }
                    HoverCommand::Pause(e) => {
                        playing.remove(&e);
                    }
                }
            }
            assert!(playing.len() <= 1);
        }
    }

    #[test]
    fn nearest_intersection_breaks_ties() {
        let hit = nearest_hit([(entity(1), 4.0), (entity(2), 2.5), (entity(3), 7.0)]);
        assert_eq!(hit, Some(entity(2)));
    }

    #[test]
    fn hits_behind_the_camera_are_discarded() {
        assert_eq!(nearest_hit([(entity(1), -3.0)]), None);
        assert_eq!(nearest_hit([]), None);
    }
}
