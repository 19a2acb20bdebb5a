//! Asset-facing types for the gallery scene.

/// Manifest schema and the navigation/camera policies it carries.
pub mod scene_manifest;
