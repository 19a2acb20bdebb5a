//! Browser-side media element store.
//!
//! `HtmlVideoElement` handles are not `Send`, so they cannot live inside ECS
//! storage. Adapters hold a small copyable id instead and every web call
//! goes through this thread-local registry; on native targets the same API
//! compiles to inert stubs so the rest of the engine is unchanged.

use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(target_arch = "wasm32")]
use std::cell::RefCell;
#[cfg(target_arch = "wasm32")]
use std::collections::HashMap;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;

/// Key of one registered media source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MediaSourceId(u32);

static NEXT_SOURCE_ID: AtomicU32 = AtomicU32::new(1);

fn next_id() -> MediaSourceId {
    MediaSourceId(NEXT_SOURCE_ID.fetch_add(1, Ordering::Relaxed))
}

// Decoded enough to present the current frame (HAVE_CURRENT_DATA).
#[cfg(target_arch = "wasm32")]
const READY_STATE_CURRENT_DATA: u16 = 2;

#[cfg(target_arch = "wasm32")]
struct WebMediaSource {
    video: web_sys::HtmlVideoElement,
    canvas: Option<(web_sys::HtmlCanvasElement, web_sys::CanvasRenderingContext2d)>,
}

#[cfg(target_arch = "wasm32")]
thread_local! {
    static SOURCES: RefCell<HashMap<MediaSourceId, WebMediaSource>> =
        RefCell::new(HashMap::new());
}

/// Create a hidden, preloading video element for the given URL.
#[cfg(target_arch = "wasm32")]
pub fn create_video_source(url: &str, muted: bool) -> Result<MediaSourceId, String> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| "no document".to_string())?;

    let video: web_sys::HtmlVideoElement = document
        .create_element("video")
        .map_err(|e| format!("{e:?}"))?
        .dyn_into()
        .map_err(|_| "element is not a video".to_string())?;

    video.set_src(url);
    video.set_muted(muted);
    video.set_loop(true);
    video.set_preload("auto");
    video.set_cross_origin(Some("anonymous"));
    // Required on mobile browsers; no fullscreen takeover on play.
    video
        .set_attribute("playsinline", "")
        .map_err(|e| format!("{e:?}"))?;

    let id = next_id();
    SOURCES.with(|sources| {
        sources.borrow_mut().insert(
            id,
            WebMediaSource {
                video,
                canvas: None,
            },
        );
    });
    Ok(id)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn create_video_source(_url: &str, _muted: bool) -> Result<MediaSourceId, String> {
    Ok(next_id())
}

#[cfg(target_arch = "wasm32")]
pub fn play(id: MediaSourceId) -> Result<(), String> {
    SOURCES.with(|sources| {
        let sources = sources.borrow();
        let source = sources.get(&id).ok_or("unknown media source")?;
        // The returned promise resolves once playback actually starts;
        // rejections surface through the element's error state.
        source.video.play().map(|_| ()).map_err(|e| format!("{e:?}"))
    })
}

#[cfg(not(target_arch = "wasm32"))]
pub fn play(_id: MediaSourceId) -> Result<(), String> {
    Ok(())
}

#[cfg(target_arch = "wasm32")]
pub fn pause(id: MediaSourceId) {
    SOURCES.with(|sources| {
        if let Some(source) = sources.borrow().get(&id) {
            let _ = source.video.pause();
        }
    });
}

#[cfg(not(target_arch = "wasm32"))]
pub fn pause(_id: MediaSourceId) {}

/// Current decoded frame size, once the metadata is known.
#[cfg(target_arch = "wasm32")]
pub fn frame_size(id: MediaSourceId) -> Option<(u32, u32)> {
    SOURCES.with(|sources| {
        let sources = sources.borrow();
        let source = sources.get(&id)?;
        let (w, h) = (source.video.video_width(), source.video.video_height());
        (w > 0 && h > 0).then_some((w, h))
    })
}

#[cfg(not(target_arch = "wasm32"))]
pub fn frame_size(_id: MediaSourceId) -> Option<(u32, u32)> {
    None
}

#[cfg(target_arch = "wasm32")]
pub fn is_ready(id: MediaSourceId) -> bool {
    SOURCES.with(|sources| {
        sources
            .borrow()
            .get(&id)
            .is_some_and(|s| s.video.ready_state() >= READY_STATE_CURRENT_DATA)
    })
}

#[cfg(not(target_arch = "wasm32"))]
pub fn is_ready(_id: MediaSourceId) -> bool {
    true
}

#[cfg(target_arch = "wasm32")]
pub fn has_failed(id: MediaSourceId) -> bool {
    SOURCES.with(|sources| {
        sources
            .borrow()
            .get(&id)
            .is_some_and(|s| s.video.error().is_some())
    })
}

#[cfg(not(target_arch = "wasm32"))]
pub fn has_failed(_id: MediaSourceId) -> bool {
    false
}

/// Draw the current frame into the source's off-screen canvas and return the
/// RGBA bytes, lazily creating and resizing the canvas to the frame size.
#[cfg(target_arch = "wasm32")]
pub fn sample_frame(id: MediaSourceId, width: u32, height: u32) -> Option<Vec<u8>> {
    SOURCES.with(|sources| {
        let mut sources = sources.borrow_mut();
        let source = sources.get_mut(&id)?;

        if source.canvas.is_none() {
            let document = web_sys::window()?.document()?;
            let canvas: web_sys::HtmlCanvasElement = document
                .create_element("canvas")
                .ok()?
                .dyn_into()
                .ok()?;
            let context: web_sys::CanvasRenderingContext2d =
                canvas.get_context("2d").ok()??.dyn_into().ok()?;
            source.canvas = Some((canvas, context));
        }

        let (canvas, context) = source.canvas.as_ref()?;
        if canvas.width() != width || canvas.height() != height {
            canvas.set_width(width);
            canvas.set_height(height);
        }

        context
            .draw_image_with_html_video_element(&source.video, 0.0, 0.0)
            .ok()?;
        let image_data = context
            .get_image_data(0.0, 0.0, width as f64, height as f64)
            .ok()?;
        Some(image_data.data().0)
    })
}

#[cfg(not(target_arch = "wasm32"))]
pub fn sample_frame(_id: MediaSourceId, _width: u32, _height: u32) -> Option<Vec<u8>> {
    None
}

/// Run a closure against the live video element, for the render-world frame
/// copier. No-op if the source was disposed.
#[cfg(target_arch = "wasm32")]
pub fn with_video<R>(
    id: MediaSourceId,
    f: impl FnOnce(&web_sys::HtmlVideoElement) -> R,
) -> Option<R> {
    SOURCES.with(|sources| sources.borrow().get(&id).map(|s| f(&s.video)))
}

/// Release the decode resources: stop playback, detach the network source,
/// drop the element and any sampling canvas.
#[cfg(target_arch = "wasm32")]
pub fn dispose(id: MediaSourceId) {
    SOURCES.with(|sources| {
        if let Some(source) = sources.borrow_mut().remove(&id) {
            let _ = source.video.pause();
            source.video.set_src("");
            let _ = source.video.load();
        }
    });
}

#[cfg(not(target_arch = "wasm32"))]
pub fn dispose(_id: MediaSourceId) {}
