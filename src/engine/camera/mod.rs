//! Camera ownership and navigation.
//!
//! One primary camera renders the gallery. Its pose comes from the scenery
//! import (or a fallback policy) and is then owned exclusively by the
//! navigation controller: X and Z move inside the walk bounds, Y stays
//! where the import put it.

/// Primary camera setup, imported-pose adoption, viewport resizes.
pub mod import;
/// The clamped, damped walk controller and its input state.
pub mod navigation;

use bevy::prelude::*;

/// Marker for the camera the navigation controller owns.
#[derive(Component)]
pub struct PrimaryCamera;
