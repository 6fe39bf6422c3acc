#![allow(clippy::needless_pass_by_value, reason = "tauri commands receive their arguments by value")]

use crate::bridge::{BridgeController, MethodCall, MethodResult};
use crate::platform::OverlayAction;
use crate::safe_lock;
use serde::Serialize;
use tauri::{AppHandle, Manager, State};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayStatusResponse {
    pub running: bool,
    pub showing: bool,
    pub blocked_package: Option<String>,
}

// Commands that open or destroy windows run on the async runtime, off the
// main thread. Building a webview from a main-thread command deadlocks on
// Windows, and dismissal must not run inside the event loop turn.

#[tauri::command(async)]
pub fn show_block_overlay(app: AppHandle, package_name: Option<String>) -> bool {
    app.state::<BridgeController>()
        .show_block_overlay(package_name.as_deref())
}

#[tauri::command(async)]
pub fn stop_block_overlay(app: AppHandle) -> bool {
    app.state::<BridgeController>().stop_block_overlay()
}

/// Method-channel style entry point; unknown methods answer `notImplemented`.
#[tauri::command(async)]
pub fn bridge_call(app: AppHandle, call: MethodCall) -> MethodResult {
    app.state::<BridgeController>().handle(&call)
}

/// Invoked by the overlay webview's close / go back buttons
#[tauri::command(async)]
pub fn overlay_action(app: AppHandle, action: OverlayAction) {
    let bridge = app.state::<BridgeController>();
    safe_lock(bridge.service(), "OverlayService").handle_action(action);
}

#[tauri::command]
pub fn overlay_status(bridge: State<BridgeController>) -> OverlayStatusResponse {
    let service = safe_lock(bridge.service(), "OverlayService");
    OverlayStatusResponse {
        running: service.is_running(),
        showing: service.is_showing(),
        blocked_package: service.blocked_package().map(str::to_string),
    }
}
