use thiserror::Error;

/// Platform failures around the overlay and its collaborators
#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("Failed to attach overlay window: {0}")]
    Attach(String),

    #[error("Failed to update overlay window: {0}")]
    Update(String),

    #[error("Failed to detach overlay window: {0}")]
    Detach(String),

    #[error("Failed to stop '{package}': {reason}")]
    Terminate { package: String, reason: String },

    #[error("Failed to launch home screen: {0}")]
    LaunchHome(String),

    #[error("Failed to reach UI thread: {0}")]
    Dispatch(String),

    #[error("Unknown overlay window {0}")]
    UnknownView(u64),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// For Tauri command returns - converts OverlayError to String
impl From<OverlayError> for String {
    fn from(e: OverlayError) -> Self {
        e.to_string()
    }
}

/// Configuration loading failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine project directories")]
    NoProjectDirs,

    #[error("Could not read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Framing failures on the stdio bridge transport
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("Frame too large: {len} bytes (max: {max} bytes)")]
    TooLarge { len: usize, max: usize },

    #[error("Malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FrameError {
    /// True when the peer closed the stream between frames
    pub fn is_eof(&self) -> bool {
        matches!(self, FrameError::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof)
    }
}
