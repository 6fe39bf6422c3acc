use crate::error::ConfigError;
use directories::ProjectDirs;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "FOCUSGUARD_CONFIG";

/// How the overlay treats touches that land outside it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchPolicy {
    /// Every touch is swallowed by the overlay
    BlockOutside,
    /// Touches outside the overlay reach the app beneath
    PassThroughOutside,
}

/// Named policy bundles matching the two overlay behaviours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// Kill the blocked app, notify the host, update in place
    #[default]
    Enforcing,
    /// Hide silently, keep the first package shown
    Passive,
}

/// Switches that decide what the presenter does on show and dismiss
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayPolicy {
    pub terminate_on_dismiss: bool,
    pub notify_on_dismiss: bool,
    pub update_in_place: bool,
    pub touch: TouchPolicy,
}

impl OverlayPolicy {
    pub fn enforcing() -> Self {
        Self {
            terminate_on_dismiss: true,
            notify_on_dismiss: true,
            update_in_place: true,
            touch: TouchPolicy::BlockOutside,
        }
    }

    pub fn passive() -> Self {
        Self {
            terminate_on_dismiss: false,
            notify_on_dismiss: false,
            update_in_place: false,
            touch: TouchPolicy::PassThroughOutside,
        }
    }
}

impl Default for OverlayPolicy {
    fn default() -> Self {
        Self::enforcing()
    }
}

impl From<Preset> for OverlayPolicy {
    fn from(preset: Preset) -> Self {
        match preset {
            Preset::Enforcing => Self::enforcing(),
            Preset::Passive => Self::passive(),
        }
    }
}

/// Application configuration stored in JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub preset: Preset,
    #[serde(default)]
    pub terminate_on_dismiss: Option<bool>,
    #[serde(default)]
    pub notify_on_dismiss: Option<bool>,
    #[serde(default)]
    pub update_in_place: Option<bool>,
    #[serde(default)]
    pub touch: Option<TouchPolicy>,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_log_filter() -> String {
    "info".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            preset: Preset::default(),
            terminate_on_dismiss: None,
            notify_on_dismiss: None,
            update_in_place: None,
            touch: None,
            log_filter: default_log_filter(),
        }
    }
}

impl AppConfig {
    /// Preset policy with any per-flag overrides applied
    pub fn policy(&self) -> OverlayPolicy {
        let base = OverlayPolicy::from(self.preset);
        OverlayPolicy {
            terminate_on_dismiss: self.terminate_on_dismiss.unwrap_or(base.terminate_on_dismiss),
            notify_on_dismiss: self.notify_on_dismiss.unwrap_or(base.notify_on_dismiss),
            update_in_place: self.update_in_place.unwrap_or(base.update_in_place),
            touch: self.touch.unwrap_or(base.touch),
        }
    }

    /// Read a config file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Load from the standard location, falling back to defaults on any error.
    pub fn load() -> Self {
        let path = match config_path() {
            Ok(path) => path,
            Err(e) => {
                warn!("Config: {e}, using defaults");
                return Self::default();
            }
        };

        match Self::load_from(&path) {
            Ok(config) => {
                info!("Config: loaded {}", path.display());
                config
            }
            Err(e) => {
                warn!("Config: {e} ({}), using defaults", path.display());
                Self::default()
            }
        }
    }
}

/// Config file path: `$FOCUSGUARD_CONFIG` or `<config dir>/config.json`
pub fn config_path() -> Result<PathBuf, ConfigError> {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return Ok(PathBuf::from(path));
    }
    let proj_dirs =
        ProjectDirs::from("com", "focusguard", "Focusguard").ok_or(ConfigError::NoProjectDirs)?;
    Ok(proj_dirs.config_dir().join("config.json"))
}
