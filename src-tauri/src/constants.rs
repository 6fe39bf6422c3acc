// src-tauri/src/constants.rs

/// Method channel shared with the host application
pub const CHANNEL: &str = "app_blocker";

/// Inbound: show (or update) the block overlay for a package
pub const METHOD_SHOW_BLOCK_OVERLAY: &str = "showBlockOverlay";

/// Inbound: stop the overlay service entirely
pub const METHOD_STOP_BLOCK_OVERLAY: &str = "stopBlockOverlay";

/// Outbound: the user dismissed the overlay
pub const METHOD_ON_OVERLAY_DISMISSED: &str = "onOverlayDismissed";

/// Package name used when a request carries none
pub const UNKNOWN_PACKAGE: &str = "Unknown App";

/// Fixed label rendered on the overlay
pub const BLOCK_MESSAGE: &str = "This app is blocked during focus time";

/// Window label of the overlay in the desktop shell
pub const OVERLAY_WINDOW_LABEL: &str = "block-overlay";

/// Largest frame accepted by the stdio transport (1 MiB)
pub const MAX_FRAME_SIZE: usize = 1024 * 1024;
