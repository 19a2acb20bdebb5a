//! Audio-context unlock and ambient playback.
//!
//! Browsers keep audio suspended until a user gesture. The unlock attempt
//! resolves asynchronously, so its outcome travels through a shared queue
//! drained at frame start; failure is non-fatal and only leaves the
//! experience silent. Ambient playback is best effort on the unlock edge.

use std::sync::{Arc, Mutex};

use bevy::prelude::*;

#[cfg(target_arch = "wasm32")]
use std::cell::RefCell;

use crate::engine::core::app_state::TeardownRequested;

/// Whether media with sound may start. `Unlocked` is the gate the hover
/// arbiter checks for unmuted sources.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AudioUnlockState {
    #[default]
    Locked,
    Pending,
    Unlocked,
    Failed,
}

/// Resume results pushed from the async unlock attempt, drained per frame.
#[derive(Resource, Clone, Default)]
pub struct UnlockOutcomes(pub Arc<Mutex<Vec<bool>>>);

#[cfg(target_arch = "wasm32")]
thread_local! {
    static AUDIO_CONTEXT: RefCell<Option<web_sys::AudioContext>> = RefCell::new(None);
    static AMBIENT: RefCell<Option<web_sys::HtmlAudioElement>> = RefCell::new(None);
}

/// Start the unlock attempt and, best effort, ambient playback. All three
/// context states are handled: running needs nothing, suspended resumes
/// asynchronously, closed cannot recover and reports failure.
#[cfg(target_arch = "wasm32")]
pub fn begin_unlock(outcomes: &UnlockOutcomes) {
    use wasm_bindgen_futures::{JsFuture, spawn_local};

    let push = |ok: bool| {
        if let Ok(mut queue) = outcomes.0.lock() {
            queue.push(ok);
        }
    };

    let context = AUDIO_CONTEXT.with(|slot| {
        let mut slot = slot.borrow_mut();
        if slot.is_none() {
            *slot = web_sys::AudioContext::new().ok();
        }
        slot.clone()
    });

    match context {
        None => push(false),
        Some(context) => match context.state() {
            web_sys::AudioContextState::Running => push(true),
            web_sys::AudioContextState::Closed => push(false),
            web_sys::AudioContextState::Suspended => match context.resume() {
                Err(_) => push(false),
                Ok(promise) => {
                    let queue = outcomes.0.clone();
                    spawn_local(async move {
                        let resumed = JsFuture::from(promise).await.is_ok();
                        if let Ok(mut pending) = queue.lock() {
                            pending.push(resumed);
                        }
                    });
                }
            },
            _ => push(false),
        },
    }

    play_ambient();
}

#[cfg(not(target_arch = "wasm32"))]
pub fn begin_unlock(outcomes: &UnlockOutcomes) {
    // No gesture gate outside the browser.
    if let Ok(mut queue) = outcomes.0.lock() {
        queue.push(true);
    }
}

/// Create the preloading ambient audio element.
#[cfg(target_arch = "wasm32")]
pub fn create_ambient_audio(url: &str) -> Result<(), String> {
    let audio = web_sys::HtmlAudioElement::new_with_src(url).map_err(|e| format!("{e:?}"))?;
    audio.set_loop(true);
    audio.set_preload("auto");
    audio.set_cross_origin(Some("anonymous"));
    AMBIENT.with(|slot| *slot.borrow_mut() = Some(audio));
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn create_ambient_audio(_url: &str) -> Result<(), String> {
    Ok(())
}

#[cfg(target_arch = "wasm32")]
pub fn ambient_ready() -> bool {
    AMBIENT.with(|slot| {
        slot.borrow()
            .as_ref()
            .is_none_or(|audio| audio.ready_state() >= 2)
    })
}

#[cfg(not(target_arch = "wasm32"))]
pub fn ambient_ready() -> bool {
    true
}

#[cfg(target_arch = "wasm32")]
pub fn ambient_failed() -> bool {
    AMBIENT.with(|slot| {
        slot.borrow()
            .as_ref()
            .is_some_and(|audio| audio.error().is_some())
    })
}

#[cfg(not(target_arch = "wasm32"))]
pub fn ambient_failed() -> bool {
    false
}

#[cfg(target_arch = "wasm32")]
fn play_ambient() {
    AMBIENT.with(|slot| {
        if let Some(audio) = slot.borrow().as_ref() {
            if audio.play().is_err() {
                warn!("ambient audio did not start");
            }
        }
    });
}

#[cfg(target_arch = "wasm32")]
fn stop_ambient() {
    AMBIENT.with(|slot| {
        if let Some(audio) = slot.borrow_mut().take() {
            let _ = audio.pause();
            audio.set_src("");
        }
    });
}

#[cfg(not(target_arch = "wasm32"))]
fn stop_ambient() {}

/// Move resume results into the unlock gate. Runs every frame; the queue is
/// empty except right after an unlock attempt.
pub fn drain_unlock_outcomes(
    outcomes: Res<UnlockOutcomes>,
    mut state: ResMut<AudioUnlockState>,
) {
    let drained = match outcomes.0.lock() {
        Ok(mut queue) => std::mem::take(&mut *queue),
        Err(_) => return,
    };

    for resumed in drained {
        if resumed {
            *state = AudioUnlockState::Unlocked;
        } else {
            *state = AudioUnlockState::Failed;
            warn!("audio unlock failed; continuing without sound");
        }
    }
}

pub fn dispose_ambient_on_teardown(mut teardown: EventReader<TeardownRequested>) {
    if teardown.read().next().is_some() {
        stop_ambient();
    }
}
