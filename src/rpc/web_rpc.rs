//! JSON-RPC 2.0 bridge to the hosting page.
//!
//! The DOM overlay (loading indicator, enter button, error panel) lives in
//! the page, not in the canvas. Outgoing notifications keep it in sync with
//! the readiness machine and the caption panel; incoming requests carry the
//! unlock gesture, viewport resizes, and the teardown signal.

use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::core::app_state::{
    TeardownRequested, UnlockGesture, ViewportResizeRequested,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

/// JSON-RPC 2.0 request structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<serde_json::Value>,
    pub error: Option<RpcError>,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 notification for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

/// JSON-RPC error structure following the specification.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

impl RpcError {
    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
            data: None,
        }
    }
}

/// Resource managing bidirectional RPC traffic with the hosting page.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    /// Queue a notification for the hosting page, no response expected.
    pub fn send_notification(&mut self, method: &str, params: serde_json::Value) {
        self.outgoing_notifications.push(RpcNotification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        });
    }

    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }
}

/// Plugin establishing the RPC layer for iframe-based deployment.
pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .add_event::<IncomingRpcMessage>()
            .add_systems(
                Update,
                (
                    process_incoming_messages,
                    handle_rpc_messages,
                    send_outgoing_messages,
                )
                    .chain(),
            );

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

/// Resource wrapping the thread-safe message queue fed by the JS listener.
#[derive(Resource)]
struct MessageQueue(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

/// Event representing one incoming RPC message from the page.
#[derive(Event)]
struct IncomingRpcMessage {
    content: String,
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(mut commands: Commands) {
    use std::sync::{Arc, Mutex};

    let message_queue: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let queue_clone = message_queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message: String = data.into();
            // Cheap shape check before queuing; full parsing happens in the
            // frame loop.
            if message.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    if let Some(window) = window() {
        window
            .add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
            .expect("failed to register message listener");
    }

    // Ownership moves to the JS side for the page's lifetime.
    closure.forget();
    commands.insert_resource(MessageQueue(message_queue));
}

fn process_incoming_messages(
    message_queue: Option<Res<MessageQueue>>,
    mut message_events: EventWriter<IncomingRpcMessage>,
) {
    let Some(queue_res) = message_queue else {
        return;
    };

    let messages = if let Ok(mut queue) = queue_res.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    for content in messages {
        message_events.write(IncomingRpcMessage { content });
    }
}

fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    diagnostics: Res<DiagnosticsStore>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut unlock: EventWriter<UnlockGesture>,
    mut resize: EventWriter<ViewportResizeRequested>,
    mut teardown: EventWriter<TeardownRequested>,
) {
    for event in events.read() {
        match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => {
                if let Some(response) = handle_rpc_request(
                    &request,
                    &diagnostics,
                    &mut unlock,
                    &mut resize,
                    &mut teardown,
                ) {
                    rpc_interface.queue_response(response);
                }
            }
            Err(parse_error) => {
                warn!("unparseable RPC message: {parse_error}");
            }
        }
    }
}

fn handle_rpc_request(
    request: &RpcRequest,
    diagnostics: &DiagnosticsStore,
    unlock: &mut EventWriter<UnlockGesture>,
    resize: &mut EventWriter<ViewportResizeRequested>,
    teardown: &mut EventWriter<TeardownRequested>,
) -> Option<RpcResponse> {
    // Only requests with ids get responses; notifications have none.
    let id = request.id.clone()?;

    let result = match request.method.as_str() {
        "unlock_gesture" => {
            unlock.write(UnlockGesture);
            Ok(serde_json::json!({ "success": true }))
        }
        "viewport_resize" => handle_viewport_resize(&request.params, resize),
        "teardown" => {
            teardown.write(TeardownRequested);
            Ok(serde_json::json!({ "success": true }))
        }
        "get_fps" => handle_get_fps(diagnostics),
        _ => {
            warn!("unknown RPC method: {}", request.method);
            return Some(error_response(
                id,
                -32601,
                "Method not found",
                Some(serde_json::json!({ "method": request.method })),
            ));
        }
    };

    match result {
        Ok(value) => Some(RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(value),
            error: None,
            id: Some(id),
        }),
        Err(error) => Some(RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id: Some(id),
        }),
    }
}

fn handle_viewport_resize(
    params: &serde_json::Value,
    resize: &mut EventWriter<ViewportResizeRequested>,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct ResizeParams {
        width: f32,
        height: f32,
    }

    let params = serde_json::from_value::<ResizeParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("expected 'width' and 'height'"))?;
    if params.width <= 0.0 || params.height <= 0.0 {
        return Err(RpcError::invalid_params("viewport dimensions must be positive"));
    }

    resize.write(ViewportResizeRequested {
        width: params.width,
        height: params.height,
    });
    Ok(serde_json::json!({ "success": true }))
}

fn handle_get_fps(diagnostics: &DiagnosticsStore) -> Result<serde_json::Value, RpcError> {
    let fps = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|diagnostic| diagnostic.smoothed())
        .unwrap_or(0.0) as f32;

    Ok(serde_json::json!({ "fps": fps }))
}

fn error_response(
    id: serde_json::Value,
    code: i32,
    message: &str,
    data: Option<serde_json::Value>,
) -> RpcResponse {
    RpcResponse {
        jsonrpc: "2.0".to_string(),
        result: None,
        error: Some(RpcError {
            code,
            message: message.to_string(),
            data,
        }),
        id: Some(id),
    }
}

/// Flush queued notifications and responses to the parent window.
fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>) {
    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }
    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

fn send_message_to_parent<T: Serialize>(message: &T) {
    #[cfg(target_arch = "wasm32")]
    {
        match serde_json::to_string(message) {
            Ok(json) => {
                if let Some(window) = window() {
                    if let Some(parent) = window.parent().ok().flatten() {
                        if let Err(e) = parent.post_message(&JsValue::from_str(&json), "*") {
                            error!("failed to post message to parent: {e:?}");
                        }
                    }
                }
            }
            Err(e) => {
                error!("failed to serialise RPC message: {e}");
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_parse_with_and_without_params() {
        let request: RpcRequest = serde_json::from_str(
            r#"{"jsonrpc":"2.0","method":"unlock_gesture","id":1}"#,
        )
        .unwrap();
        assert_eq!(request.method, "unlock_gesture");
        assert!(request.params.is_null());

        let request: RpcRequest = serde_json::from_str(
            r#"{"jsonrpc":"2.0","method":"viewport_resize","params":{"width":800.0,"height":600.0},"id":2}"#,
        )
        .unwrap();
        assert_eq!(request.params["width"], 800.0);
    }

    #[test]
    fn notifications_serialise_to_the_wire_shape() {
        let mut interface = WebRpcInterface::default();
        interface.send_notification("loading_progress", serde_json::json!({ "percent": 40 }));

        let wire = serde_json::to_value(&interface.outgoing_notifications[0]).unwrap();
        assert_eq!(wire["jsonrpc"], "2.0");
        assert_eq!(wire["method"], "loading_progress");
        assert_eq!(wire["params"]["percent"], 40);
    }
}
