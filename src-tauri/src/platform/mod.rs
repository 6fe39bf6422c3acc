pub mod types;

pub use types::{
    Dimension, Gravity, HomeLauncher, LayoutParams, OverlayAction, OverlayView, PixelFormat,
    ProcessTerminator, ViewId, WindowFlags, WindowService, WindowType,
};

pub mod headless;

pub use headless::HeadlessWindowService;

#[cfg(target_os = "android")]
pub mod android;

#[cfg(not(target_os = "android"))]
pub mod desktop;

#[cfg(target_os = "android")]
pub use android::{AmHomeLauncher as NativeHomeLauncher, AmProcessTerminator as NativeTerminator};

#[cfg(not(target_os = "android"))]
pub use desktop::{LogOnlyLauncher as NativeHomeLauncher, PkillTerminator as NativeTerminator};
