//! Frontend communication layer.

/// JSON-RPC 2.0 bridge over `postMessage` for the DOM overlay.
pub mod web_rpc;
