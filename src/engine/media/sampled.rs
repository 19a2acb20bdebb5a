//! Sampled decode pipeline: the fallback when the host cannot decode the
//! needed codec or alpha channel straight into a texture.
//!
//! A hidden off-screen canvas redraws the source's current frame and the
//! RGBA bytes are copied into the texture at native resolution. Sampling
//! runs every tick whether or not the source is paused, so a just-resumed
//! source presents its live frame immediately.

use bevy::prelude::*;

use super::adapter::{MediaPlaybackError, MediaState, MediaTexture, PlaybackLifecycle};
use super::registry::{self, MediaSourceId};
use super::resize_texture;

pub struct SampledVideoTexture {
    source: MediaSourceId,
    texture: Handle<Image>,
    muted: bool,
    lifecycle: PlaybackLifecycle,
    frame_size: Option<(u32, u32)>,
}

impl SampledVideoTexture {
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

impl MediaTexture for SampledVideoTexture {
    fn supports_direct_texture(&self) -> bool {
        false
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

        let Some(size) = registry::frame_size(self.source) else {
            return;
        };
        if self.frame_size != Some(size) {
            resize_texture(images, &self.texture, size);
            self.frame_size = Some(size);
        }

        let (width, height) = size;
        let Some(rgba) = registry::sample_frame(self.source, width, height) else {
            return;
        };
        if let Some(image) = images.get_mut(&self.texture) {
            if let Some(data) = image.data.as_mut() {
                if data.len() == rgba.len() {
                    data.copy_from_slice(&rgba);
                }
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
