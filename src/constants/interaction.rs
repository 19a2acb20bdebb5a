use bevy::prelude::*;

/// Offset from the pointer to the caption panel's top-left corner (logical px)
pub const CAPTION_OFFSET: Vec2 = Vec2::new(18.0, 14.0);

/// Nominal caption panel footprint used for viewport clamping (logical px)
pub const CAPTION_PANEL_SIZE: Vec2 = Vec2::new(260.0, 72.0);

/// Pick depth of an interactive surface along its local normal
pub const SURFACE_PICK_DEPTH: f32 = 0.25;
