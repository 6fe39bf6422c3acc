//! Tauri adapters for the overlay: webview window service, main-thread
//! dispatch, event channel and the "home" launcher.

use crate::constants::OVERLAY_WINDOW_LABEL;
use crate::error::OverlayError;
use crate::notifier::OutboundChannel;
use crate::platform::{HomeLauncher, LayoutParams, OverlayView, ViewId, WindowService};
use crate::ui_thread::{UiTask, UiThread};
use log::debug;
use serde_json::Value;
use tauri::{AppHandle, Emitter, Manager, WebviewUrl, WebviewWindowBuilder};

/// Event the overlay page listens on to refresh its label
const OVERLAY_UPDATED_EVENT: &str = "overlay-updated";

fn label(id: ViewId) -> String {
    format!("{OVERLAY_WINDOW_LABEL}-{}", id.0)
}

/// Each overlay is its own undecorated, always-on-top webview window.
pub struct TauriWindowService {
    app: AppHandle,
    next_id: u64,
}

impl TauriWindowService {
    pub fn new(app: AppHandle) -> Self {
        Self { app, next_id: 0 }
    }
}

impl WindowService for TauriWindowService {
    fn add_view(&mut self, view: &OverlayView, params: &LayoutParams) -> Result<ViewId, OverlayError> {
        self.next_id += 1;
        let id = ViewId(self.next_id);

        let payload = serde_json::to_string(view).map_err(|e| OverlayError::Attach(e.to_string()))?;
        let init_script = format!("window.__BLOCK_OVERLAY__ = {payload};");

        // Touch-modal overlays take the whole screen; pass-through ones stay a maximized window
        let fullscreen = !params.flags.not_touch_modal;

        let builder = WebviewWindowBuilder::new(&self.app, label(id), WebviewUrl::App("overlay.html".into()))
            .title("Focus mode")
            .decorations(false)
            .always_on_top(true)
            .skip_taskbar(true)
            .resizable(false)
            .fullscreen(fullscreen)
            .maximized(true)
            .center()
            .focused(true)
            .initialization_script(&init_script);

        // macOS needs the private API feature for transparent webviews
        #[cfg(not(target_os = "macos"))]
        let builder = builder.transparent(params.format == crate::platform::PixelFormat::Translucent);

        builder.build().map_err(|e| OverlayError::Attach(e.to_string()))?;
        debug!("TauriWindowService: opened {}", label(id));
        Ok(id)
    }

    fn update_view(&mut self, id: ViewId, view: &OverlayView) -> Result<(), OverlayError> {
        let window = self
            .app
            .get_webview_window(&label(id))
            .ok_or(OverlayError::UnknownView(id.0))?;
        window
            .emit(OVERLAY_UPDATED_EVENT, view)
            .map_err(|e| OverlayError::Update(e.to_string()))
    }

    fn remove_view(&mut self, id: ViewId) -> Result<(), OverlayError> {
        let window = self
            .app
            .get_webview_window(&label(id))
            .ok_or(OverlayError::UnknownView(id.0))?;
        window.destroy().map_err(|e| OverlayError::Detach(e.to_string()))
    }
}

/// Posts onto the event loop thread.
///
/// Runs the task inline when called from the main thread; wrap it in
/// [`OffThread`](crate::ui_thread::OffThread) before handing it to a notifier.
pub struct TauriUiThread(AppHandle);

impl TauriUiThread {
    pub fn new(app: AppHandle) -> Self {
        Self(app)
    }
}

impl UiThread for TauriUiThread {
    fn post(&self, task: UiTask) -> Result<(), OverlayError> {
        self.0
            .run_on_main_thread(task)
            .map_err(|e| OverlayError::Dispatch(e.to_string()))
    }
}

/// Outbound methods become global events of the same name
pub struct EventChannel(AppHandle);

impl EventChannel {
    pub fn new(app: AppHandle) -> Self {
        Self(app)
    }
}

impl OutboundChannel for EventChannel {
    fn invoke_method(&self, method: &str, arguments: Value) -> Result<(), OverlayError> {
        self.0
            .emit(method, arguments)
            .map_err(|e| OverlayError::Dispatch(e.to_string()))
    }
}

/// The desktop "home screen" is the main window
pub struct MainWindowLauncher(AppHandle);

impl MainWindowLauncher {
    pub fn new(app: AppHandle) -> Self {
        Self(app)
    }
}

impl HomeLauncher for MainWindowLauncher {
    fn launch_home(&self) -> Result<(), OverlayError> {
        let window = self
            .0
            .get_webview_window("main")
            .ok_or_else(|| OverlayError::LaunchHome("main window missing".into()))?;
        window.show().map_err(|e| OverlayError::LaunchHome(e.to_string()))?;
        window.set_focus().map_err(|e| OverlayError::LaunchHome(e.to_string()))
    }
}
