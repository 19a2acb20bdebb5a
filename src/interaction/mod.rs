//! Pointer-driven interaction over the gallery scene.
//!
//! Hover arbitration maps the pointer to at most one active surface per
//! frame and drives that surface's media playback and caption panel. Input
//! translation feeds the navigation accumulator from keys, wheel, and touch.

/// Caption panel placement (pure) and the UI node sink.
pub mod caption;
/// Hover state machine, surface set, and the per-frame arbiter.
pub mod hover;
/// Key, wheel, and touch translation into `InputState`.
pub mod input;
/// Slab-method ray intersection used for surface picking.
pub mod ray;
