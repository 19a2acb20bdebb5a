//! Render-world copier for direct video textures.
//!
//! Runs in the render schedule each frame and asks the browser to move the
//! current decoded frame into the surface texture GPU-side, with no CPU
//! readback. The main world keeps the texture extent matched to the source,
//! so a size mismatch here just skips the copy for a frame.

use bevy::prelude::*;
use bevy::render::render_asset::RenderAssets;
use bevy::render::render_resource::{
    CopyExternalImageDestInfo, CopyExternalImageSourceInfo, Extent3d, ExternalImageSource,
    Origin2d, Origin3d, PredefinedColorSpace, TextureAspect,
};
use bevy::render::renderer::RenderQueue;
use bevy::render::texture::GpuImage;

use super::DirectCopyList;
use super::registry;

pub fn copy_direct_video_frames(
    list: Res<DirectCopyList>,
    queue: Res<RenderQueue>,
    gpu_images: Res<RenderAssets<GpuImage>>,
) {
    for (source, handle) in &list.0 {
        let Some(gpu_image) = gpu_images.get(handle.id()) else {
            continue;
        };

        registry::with_video(*source, |video| {
            let (width, height) = (video.video_width(), video.video_height());
            if width == 0
                || height == 0
                || gpu_image.size.width != width
                || gpu_image.size.height != height
            {
                return;
            }

            queue.copy_external_image_to_texture(
                &CopyExternalImageSourceInfo {
                    source: ExternalImageSource::HTMLVideoElement(video.clone()),
                    origin: Origin2d::ZERO,
                    flip_y: false,
                },
                CopyExternalImageDestInfo {
                    texture: &gpu_image.texture,
                    mip_level: 0,
                    origin: Origin3d::ZERO,
                    aspect: TextureAspect::All,
                    color_space: PredefinedColorSpace::Srgb,
                    premultiplied_alpha: false,
                },
                Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
            );
        });
    }
}
