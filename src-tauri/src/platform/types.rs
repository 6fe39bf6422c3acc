use crate::error::OverlayError;
use serde::{Deserialize, Serialize};

/// Opaque id a window service hands out for an added view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId(pub u64);

/// Size of the overlay along one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    MatchParent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gravity {
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Translucent,
}

/// System window layer the overlay is placed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowType {
    ApplicationOverlay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowFlags {
    pub keep_screen_on: bool,
    pub layout_in_screen: bool,
    pub not_touch_modal: bool,
    pub watch_outside_touch: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutParams {
    pub width: Dimension,
    pub height: Dimension,
    pub window_type: WindowType,
    pub flags: WindowFlags,
    pub format: PixelFormat,
    pub gravity: Gravity,
}

/// Interactive controls on the overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OverlayAction {
    Close,
    GoBack,
}

/// Content of the overlay view tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverlayView {
    pub message: String,
    pub package_name: String,
    pub controls: Vec<OverlayAction>,
}

/// OS window service able to host system-level overlays
pub trait WindowService: Send {
    fn add_view(&mut self, view: &OverlayView, params: &LayoutParams) -> Result<ViewId, OverlayError>;
    fn update_view(&mut self, id: ViewId, view: &OverlayView) -> Result<(), OverlayError>;
    fn remove_view(&mut self, id: ViewId) -> Result<(), OverlayError>;
}

/// Stops the background processes of a blocked app
pub trait ProcessTerminator: Send + Sync {
    fn kill_background_processes(&self, package: &str) -> Result<(), OverlayError>;
}

/// Brings the user back to the home screen
pub trait HomeLauncher: Send + Sync {
    fn launch_home(&self) -> Result<(), OverlayError>;
}
