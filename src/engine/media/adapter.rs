//! One lifecycle contract over the two video decode pipelines.
//!
//! A surface's texture is either fed directly from the decoder (GPU-side
//! frame copies) or sampled through an off-screen canvas when the host
//! cannot decode the needed codec or alpha channel directly. The variant is
//! chosen once at surface setup; per-frame code only calls the trait.

use bevy::prelude::*;

/// Playback lifecycle of one media source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaState {
    Idle,
    Playing,
    Disposed,
}

/// Non-fatal, per-surface playback failure. The surface stays paused and
/// the rest of the scene is unaffected.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaPlaybackError(pub String);

impl std::fmt::Display for MediaPlaybackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "media playback failed: {}", self.0)
    }
}

impl std::error::Error for MediaPlaybackError {}

/// Capability interface shared by both decode pipelines.
pub trait MediaTexture: Send + Sync {
    /// Whether decoded frames reach the texture without manual sampling.
    fn supports_direct_texture(&self) -> bool;

    fn state(&self) -> MediaState;

    /// Muted sources may start playing before the audio context unlocks.
    fn is_muted(&self) -> bool;

    /// Shared read-only rendering texture.
    fn texture(&self) -> &Handle<Image>;

    /// Source handle for the render-world frame copier. Only the direct
    /// variant exposes one; sampled textures are filled CPU-side.
    fn direct_copy_source(&self) -> Option<super::registry::MediaSourceId> {
        None
    }

    /// True once the source has decoded enough to present a frame.
    fn is_ready(&self) -> bool;

    /// True if the underlying source hit a decode or network error.
    fn has_failed(&self) -> bool;

    /// Request playback. A no-op after `dispose()`.
    fn play(&mut self) -> Result<(), MediaPlaybackError>;

    /// Request pause. A no-op after `dispose()`.
    fn pause(&mut self);

    /// Per-tick upkeep. The sampled variant copies the current frame here;
    /// the direct variant only keeps the texture extent in sync with the
    /// source. Runs every tick regardless of play/pause so a just-resumed
    /// source is live without a one-frame lag.
    fn update(&mut self, images: &mut Assets<Image>);

    /// Idempotent teardown: halts sampling, releases the decode resource
    /// and the texture. Later `play()`/`pause()` calls are no-ops.
    fn dispose(&mut self, images: &mut Assets<Image>);
}

/// Component owning a surface's adapter. The surface that created the
/// adapter is its sole owner; everything else sees only the texture handle.
#[derive(Component)]
pub struct MediaSurface {
    pub adapter: Box<dyn MediaTexture>,
}

/// State transitions shared by both variants. Keeps the Idle/Playing/
/// Disposed rules in one place so the variants only wire in their source
/// side effects when a transition actually fires.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PlaybackLifecycle {
    state: MediaState,
}

impl PlaybackLifecycle {
    pub(crate) fn new() -> Self {
        Self {
            state: MediaState::Idle,
        }
    }

    pub(crate) fn state(&self) -> MediaState {
        self.state
    }

    /// Idle -> Playing. Returns whether the transition fired.
    pub(crate) fn request_play(&mut self) -> bool {
        if self.state == MediaState::Idle {
            self.state = MediaState::Playing;
            true
        } else {
            false
        }
    }

    /// Playing -> Idle. Returns whether the transition fired.
    pub(crate) fn request_pause(&mut self) -> bool {
        if self.state == MediaState::Playing {
            self.state = MediaState::Idle;
            true
        } else {
            false
        }
    }

    /// Any -> Disposed. Returns true only on the first call.
    pub(crate) fn dispose(&mut self) -> bool {
        if self.state == MediaState::Disposed {
            false
        } else {
            self.state = MediaState::Disposed;
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn play_and_pause_toggle_between_idle_and_playing() {
        let mut lifecycle = PlaybackLifecycle::new();
        assert_eq!(lifecycle.state(), MediaState::Idle);

        assert!(lifecycle.request_play());
        assert_eq!(lifecycle.state(), MediaState::Playing);
        // Redundant play does not fire the source side effect again.
        assert!(!lifecycle.request_play());

        assert!(lifecycle.request_pause());
        assert_eq!(lifecycle.state(), MediaState::Idle);
        assert!(!lifecycle.request_pause());
    }

    #[test]
    fn dispose_is_idempotent() {
        let mut lifecycle = PlaybackLifecycle::new();
        lifecycle.request_play();

        assert!(lifecycle.dispose());
        assert_eq!(lifecycle.state(), MediaState::Disposed);
        assert!(!lifecycle.dispose());
        assert!(!lifecycle.dispose());
    }

    #[test]
    fn playback_requests_after_dispose_are_no_ops() {
        let mut lifecycle = PlaybackLifecycle::new();
        lifecycle.dispose();

        assert!(!lifecycle.request_play());
        assert!(!lifecycle.request_pause());
        assert_eq!(lifecycle.state(), MediaState::Disposed);
    }
}
