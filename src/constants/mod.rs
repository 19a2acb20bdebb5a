//! Shared tuning values for navigation, interaction, and scene setup.
//!
//! Manifest files may override the navigation values per gallery; the
//! constants here are the fallbacks applied when a field is omitted.

pub mod interaction;
pub mod navigation;
pub mod scene;
