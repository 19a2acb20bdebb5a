//! Application lifecycle: readiness sequencing, app states, and setup.

/// App construction and schedule wiring.
pub mod app_setup;
/// App states, control events, and the readiness-effect shell.
pub mod app_state;
/// The pure event-sourced readiness machine.
pub mod readiness;
/// Window and plugin-group configuration.
pub mod window_config;
