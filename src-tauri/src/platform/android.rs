use super::{HomeLauncher, ProcessTerminator};
use crate::error::OverlayError;
use log::debug;
use std::process::Command;

const ACTIVITY_MANAGER: &str = "/system/bin/am";

/// Runs `am <args>` and maps a non-zero exit to an error string
fn am(args: &[&str]) -> Result<(), String> {
    let out = Command::new(ACTIVITY_MANAGER)
        .args(args)
        .output()
        .map_err(|e| e.to_string())?;
    if out.status.success() {
        Ok(())
    } else {
        Err(String::from_utf8_lossy(&out.stderr).trim().to_string())
    }
}

/// `am kill` only reaps background processes; a foregrounded app survives.
pub struct AmProcessTerminator;

impl ProcessTerminator for AmProcessTerminator {
    fn kill_background_processes(&self, package: &str) -> Result<(), OverlayError> {
        am(&["kill", package]).map_err(|reason| OverlayError::Terminate {
            package: package.to_string(),
            reason,
        })?;
        debug!("AmProcessTerminator: killed background processes of {package}");
        Ok(())
    }
}

pub struct AmHomeLauncher;

impl HomeLauncher for AmHomeLauncher {
    fn launch_home(&self) -> Result<(), OverlayError> {
        am(&[
            "start",
            "-a",
            "android.intent.action.MAIN",
            "-c",
            "android.intent.category.HOME",
            // FLAG_ACTIVITY_NEW_TASK
            "-f",
            "0x10000000",
        ])
        .map_err(OverlayError::LaunchHome)
    }
}
