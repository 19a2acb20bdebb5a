//! Media texture pipeline behind one lifecycle contract.
//!
//! Two decode pipelines feed surface textures: the direct variant copies
//! decoded frames GPU-side in the render world, the sampled variant redraws
//! frames through an off-screen canvas when direct decoding of the needed
//! codec or alpha channel is unavailable. The variant is selected once per
//! surface at setup time from the host capabilities and the source's needs.

/// Capability trait and playback lifecycle shared by both variants.
pub mod adapter;
/// GPU-side frame delivery; per-frame copies happen in the render world.
pub mod direct;
/// Render-world copier moving decoded frames into direct textures.
#[cfg(target_arch = "wasm32")]
pub mod frame_copy;
/// Thread-local store of browser media elements keyed by copyable ids.
pub mod registry;
/// Canvas-sampled frame delivery for codecs the host cannot decode directly.
pub mod sampled;

use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};

use crate::constants::scene::PLACEHOLDER_TEXTURE_SIZE;
use adapter::{MediaState, MediaSurface, MediaTexture};
use direct::DirectVideoTexture;
use registry::MediaSourceId;
use sampled::SampledVideoTexture;

/// What the host's decode pipeline can feed a texture without sampling.
/// Probed once at startup and never re-evaluated per frame.
#[derive(Resource, Debug, Clone, Copy)]
pub struct HostMediaCapabilities {
    pub supports_direct_texture: bool,
}

impl HostMediaCapabilities {
    pub fn detect() -> Self {
        // WebGPU hosts copy decoded frames straight into textures; native
        // builds carry inert media sources and always take the sampled path.
        Self {
            supports_direct_texture: cfg!(target_arch = "wasm32"),
        }
    }
}

/// Everything needed to wire one surface's media source.
pub struct MediaRequest<'a> {
    pub url: &'a str,
    pub muted: bool,
    /// Alpha-channel sources need the sampled path even on direct hosts.
    pub needs_alpha: bool,
}

/// Create the adapter for one surface, choosing the variant exactly once.
pub fn create_adapter(
    capabilities: &HostMediaCapabilities,
    request: &MediaRequest,
    images: &mut Assets<Image>,
) -> Result<Box<dyn MediaTexture>, String> {
    let source = registry::create_video_source(request.url, request.muted)?;
    let texture = images.add(placeholder_texture());

    let adapter: Box<dyn MediaTexture> =
        if capabilities.supports_direct_texture && !request.needs_alpha {
            Box::new(DirectVideoTexture::new(source, texture, request.muted))
        } else {
            Box::new(SampledVideoTexture::new(source, texture, request.muted))
        };
    Ok(adapter)
}

/// Opaque dark placeholder shown until the source reports real dimensions.
fn placeholder_texture() -> Image {
    blank_texture(PLACEHOLDER_TEXTURE_SIZE, PLACEHOLDER_TEXTURE_SIZE)
}

fn blank_texture(width: u32, height: u32) -> Image {
    Image::new_fill(
        Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        &[8, 8, 12, 255],
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
    )
}

/// Swap the texture for one sized to the decoded frames. Existing material
/// references keep working because the handle is unchanged.
pub(crate) fn resize_texture(images: &mut Assets<Image>, handle: &Handle<Image>, size: (u32, u32)) {
    images.insert(handle.id(), blank_texture(size.0, size.1));
}

/// Direct surfaces whose frames the render world should copy this frame.
#[derive(Resource, Default, Clone, bevy::render::extract_resource::ExtractResource)]
pub struct DirectCopyList(pub Vec<(MediaSourceId, Handle<Image>)>);

/// Per-tick adapter upkeep. Runs after hover arbitration so sampling always
/// sees this frame's playback decisions.
pub fn update_media_textures(
    mut images: ResMut<Assets<Image>>,
    mut surfaces: Query<&mut MediaSurface>,
) {
    for mut surface in &mut surfaces {
        surface.adapter.update(&mut images);
    }
}

/// Rebuild the render-world copy list: direct adapters with decoded data.
pub fn collect_direct_frames(
    mut list: ResMut<DirectCopyList>,
    surfaces: Query<&MediaSurface>,
) {
    list.0.clear();
    for surface in &surfaces {
        let adapter = &surface.adapter;
        if adapter.supports_direct_texture()
            && adapter.state() == MediaState::Playing
            && adapter.is_ready()
        {
            if let Some(source) = adapter.direct_copy_source() {
                list.0.push((source, adapter.texture().clone()));
            }
        }
    }
}

/// Dispose every still-live adapter when the teardown signal arrives.
pub fn dispose_media_on_teardown(
    mut teardown: EventReader<crate::engine::core::app_state::TeardownRequested>,
    mut images: ResMut<Assets<Image>>,
    mut surfaces: Query<&mut MediaSurface>,
) {
    if teardown.read().next().is_none() {
        return;
    }
    for mut surface in &mut surfaces {
        surface.adapter.dispose(&mut images);
    }
    info!("media adapters disposed");
}
