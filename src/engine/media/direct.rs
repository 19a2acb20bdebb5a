//! Direct decode pipeline: frames land in the texture GPU-side.
//!
//! Playback state delegates to the source element; the per-frame copy is
//! done by the render-world copier (`frame_copy`), so `update` only keeps
//! the texture extent in sync with the decoded frame size.

use bevy::prelude::*;

use super::adapter::{MediaPlaybackError, MediaState, MediaTexture, PlaybackLifecycle};
use super::registry::{self, MediaSourceId};
use super::resize_texture;

pub struct DirectVideoTexture {
    source: MediaSourceId,
    texture: Handle<Image>,
    muted: bool,
    lifecycle: PlaybackLifecycle,
    frame_size: Option<(u32, u32)>,
}

impl DirectVideoTexture {
    pub fn new(source: MediaSourceId, texture: Handle<Image>, muted: bool) -> Self {
        Self {
            source,
            texture,
            muted,
            lifecycle: PlaybackLifecycle::new(),
            frame_size: None,
        }
    }
}

impl MediaTexture for DirectVideoTexture {
    fn supports_direct_texture(&self) -> bool {
        true
    }

    fn state(&self) -> MediaState {
        self.lifecycle.state()
    }

    fn is_muted(&self) -> bool {
        self.muted
    }

    fn texture(&self) -> &Handle<Image> {
        &self.texture
    }

    fn direct_copy_source(&self) -> Option<MediaSourceId> {
        Some(self.source)
    }

    fn is_ready(&self) -> bool {
        registry::is_ready(self.source)
    }

    fn has_failed(&self) -> bool {
        registry::has_failed(self.source)
    }

    fn play(&mut self) -> Result<(), MediaPlaybackError> {
        if !self.lifecycle.request_play() {
            return Ok(());
        }
        registry::play(self.source).map_err(|reason| {
            // Keep the state honest: the source never started.
            self.lifecycle.request_pause();
            MediaPlaybackError(reason)
        })
    }

    fn pause(&mut self) {
        if self.lifecycle.request_pause() {
            registry::pause(self.source);
        }
    }

    fn update(&mut self, images: &mut Assets<Image>) {
        if self.lifecycle.state() == MediaState::Disposed {
            return;
        }
        // Resize once real dimensions are known so the GPU copy extents
        // match the decoded frames exactly.
        if let Some(size) = registry::frame_size(self.source) {
            if self.frame_size != Some(size) {
                resize_texture(images, &self.texture, size);
                self.frame_size = Some(size);
            }
        }
    }

    fn dispose(&mut self, images: &mut Assets<Image>) {
        if self.lifecycle.dispose() {
            registry::dispose(self.source);
            images.remove(self.texture.id());
        }
    }
}
