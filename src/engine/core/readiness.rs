//! Event-sourced readiness machine gating the interactive frame loop.
//!
//! Asset tracking feeds load events in, the unlock gesture feeds the single
//! user-driven transition, and every transition is returned as a list of
//! effects for the shell systems to apply. The machine itself touches no
//! ECS state, which keeps the unlock gating testable without a render host.

use bevy::prelude::*;

/// Lifecycle states. `Ready` and `Error` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Loading,
    AwaitingUnlock,
    Ready,
    Error,
}

/// Load-lifecycle events translated from the asset collaborators.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadEvent {
    Started { id: String },
    Progressed { loaded: usize, total: usize },
    Completed,
    Failed { id: String },
}

/// Side effects requested by a transition, applied by the shell systems.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadinessEffect {
    /// Update the visible loading progress text.
    ReportPercent(u32),
    /// The whole asset set resolved; reveal the enter affordance.
    RevealUnlockAffordance,
    /// Resume the audio context and start ambient playback, best effort.
    BeginAudioUnlock,
    /// Enter the per-frame interaction loop.
    StartFrameLoop,
    /// A loop-fatal condition; replace the loading indicator with this message.
    ReportFatal(String),
}

#[derive(Resource)]
pub struct ReadinessMachine {
    state: Readiness,
    percent: u32,
}

impl Default for ReadinessMachine {
    fn default() -> Self {
        Self {
            state: Readiness::Loading,
            percent: 0,
        }
    }
}

impl ReadinessMachine {
    pub fn state(&self) -> Readiness {
        self.state
    }

    pub fn percent(&self) -> u32 {
        self.percent
    }

    /// Feed one load event through the transition table.
    pub fn on_load_event(&mut self, event: &LoadEvent) -> Vec<ReadinessEffect> {
        match (self.state, event) {
            // Terminal states ignore everything, including late completions.
            (Readiness::Ready | Readiness::Error, _) => Vec::new(),

            (Readiness::Loading, LoadEvent::Started { .. }) => Vec::new(),

            (Readiness::Loading, LoadEvent::Progressed { loaded, total }) => {
                self.percent = percent_of(*loaded, *total);
                vec![ReadinessEffect::ReportPercent(self.percent)]
            }

            (Readiness::Loading, LoadEvent::Completed) => {
                self.state = Readiness::AwaitingUnlock;
                self.percent = 100;
                vec![
                    ReadinessEffect::ReportPercent(100),
                    ReadinessEffect::RevealUnlockAffordance,
                ]
            }

            // Already past loading; a duplicate completion is a no-op.
            (Readiness::AwaitingUnlock, LoadEvent::Completed) => Vec::new(),
            (Readiness::AwaitingUnlock, LoadEvent::Started { .. }) => Vec::new(),
            (Readiness::AwaitingUnlock, LoadEvent::Progressed { .. }) => Vec::new(),

            (Readiness::Loading | Readiness::AwaitingUnlock, LoadEvent::Failed { id }) => {
                self.state = Readiness::Error;
                vec![ReadinessEffect::ReportFatal(format!(
                    "failed to load required asset '{id}'"
                ))]
            }
        }
    }

    /// The only transition out of `AwaitingUnlock`. Idempotent: gestures in
    /// any other state return no effects. A camera that never resolved makes
    /// this refuse readiness and end in `Error` instead; the frame loop must
    /// not start without a valid camera.
    pub fn on_unlock_gesture(&mut self, camera_resolved: bool) -> Vec<ReadinessEffect> {
        if self.state != Readiness::AwaitingUnlock {
            return Vec::new();
        }

        if !camera_resolved {
            self.state = Readiness::Error;
            return vec![ReadinessEffect::ReportFatal(
                "scene camera failed to resolve".to_string(),
            )];
        }

        self.state = Readiness::Ready;
        vec![
            ReadinessEffect::BeginAudioUnlock,
            ReadinessEffect::StartFrameLoop,
        ]
    }
}

fn percent_of(loaded: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((loaded as f64 / total as f64) * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progressed(loaded: usize, total: usize) -> LoadEvent {
        LoadEvent::Progressed { loaded, total }
    }

    #[test]
    fn progress_reports_rounded_percent() {
        let mut machine = ReadinessMachine::default();

        let effects = machine.on_load_event(&progressed(1, 3));
        assert_eq!(effects, vec![ReadinessEffect::ReportPercent(33)]);
        let effects = machine.on_load_event(&progressed(2, 3));
        assert_eq!(effects, vec![ReadinessEffect::ReportPercent(67)]);
        let effects = machine.on_load_event(&progressed(3, 3));
        assert_eq!(effects, vec![ReadinessEffect::ReportPercent(100)]);
        assert_eq!(machine.state(), Readiness::Loading);
    }

    #[test]
    fn completion_reveals_unlock_affordance_once() {
        let mut machine = ReadinessMachine::default();
        machine.on_load_event(&progressed(3, 3));

        let effects = machine.on_load_event(&LoadEvent::Completed);
        assert!(effects.contains(&ReadinessEffect::RevealUnlockAffordance));
        assert_eq!(machine.state(), Readiness::AwaitingUnlock);

        // A duplicate terminal completion is a no-op.
        assert!(machine.on_load_event(&LoadEvent::Completed).is_empty());
    }

    #[test]
    fn unlock_gesture_is_idempotent() {
        let mut machine = ReadinessMachine::default();
        machine.on_load_event(&LoadEvent::Completed);

        let first = machine.on_unlock_gesture(true);
        assert_eq!(
            first,
            vec![
                ReadinessEffect::BeginAudioUnlock,
                ReadinessEffect::StartFrameLoop,
            ]
        );
        assert_eq!(machine.state(), Readiness::Ready);

        // Exactly one Ready transition and one audio start.
        assert!(machine.on_unlock_gesture(true).is_empty());
        assert!(machine.on_unlock_gesture(true).is_empty());
    }

    #[test]
    fn unlock_before_completion_is_ignored() {
        let mut machine = ReadinessMachine::default();
        assert!(machine.on_unlock_gesture(true).is_empty());
        assert_eq!(machine.state(), Readiness::Loading);
    }

    #[test]
    fn unlock_without_camera_refuses_readiness() {
        let mut machine = ReadinessMachine::default();
        machine.on_load_event(&LoadEvent::Completed);

        let effects = machine.on_unlock_gesture(false);
        assert!(matches!(
            effects.as_slice(),
            [ReadinessEffect::ReportFatal(_)]
        ));
        assert_eq!(machine.state(), Readiness::Error);

        // Terminal: further gestures and events do nothing.
        assert!(machine.on_unlock_gesture(true).is_empty());
        assert!(machine.on_load_event(&LoadEvent::Completed).is_empty());
    }

    #[test]
    fn asset_failure_is_fatal_in_both_pre_ready_states() {
        let mut machine = ReadinessMachine::default();
        let effects = machine.on_load_event(&LoadEvent::Failed {
            id: "atrium-model".to_string(),
        });
        assert!(matches!(
            effects.as_slice(),
            [ReadinessEffect::ReportFatal(_)]
        ));
        assert_eq!(machine.state(), Readiness::Error);

        let mut machine = ReadinessMachine::default();
        machine.on_load_event(&LoadEvent::Completed);
        machine.on_load_event(&LoadEvent::Failed {
            id: "ambient-audio".to_string(),
        });
        assert_eq!(machine.state(), Readiness::Error);
        assert!(machine.on_unlock_gesture(true).is_empty());
    }

    #[test]
    fn full_set_reports_one_hundred_percent() {
        let mut machine = ReadinessMachine::default();
        let effects = machine.on_load_event(&progressed(3, 3));
        assert_eq!(effects, vec![ReadinessEffect::ReportPercent(100)]);
        let effects = machine.on_load_event(&LoadEvent::Completed);
        assert!(effects.contains(&ReadinessEffect::ReportPercent(100)));
        assert!(effects.contains(&ReadinessEffect::RevealUnlockAffordance));
    }
}
