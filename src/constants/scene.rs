/// Number of points in the starfield backdrop
pub const STAR_COUNT: usize = 900;

/// Radius of the spherical shell the stars are scattered over
pub const STARFIELD_RADIUS: f32 = 180.0;

/// Seed for the deterministic star scatter
pub const STARFIELD_SEED: u32 = 0x9e37_79b9;

/// Placeholder texture edge length before a media source reports its size
pub const PLACEHOLDER_TEXTURE_SIZE: u32 = 2;
