use super::{HomeLauncher, ProcessTerminator};
use crate::error::OverlayError;
use log::{debug, info};
use std::process::Command;

/// Desktop apps have no package id; the last dotted segment is the process name.
fn process_name(package: &str) -> &str {
    package.rsplit('.').next().unwrap_or(package)
}

/// Linux keeps only this many bytes of a process name (`comm`)
#[cfg(any(target_os = "linux", test))]
const COMM_LEN: usize = 15;

/// `pkill -x` compares against the truncated `comm`, so longer names never match.
#[cfg(any(target_os = "linux", test))]
fn comm_name(name: &str) -> &str {
    let mut end = name.len().min(COMM_LEN);
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    name.get(..end).unwrap_or(name)
}

/// Kills desktop processes by exact name.
///
/// Best-effort and coarse: the package id is reduced to its last dotted
/// segment, so `com.example.game` stops every process named `game`, in the
/// foreground or not, whoever started it.
pub struct PkillTerminator;

impl ProcessTerminator for PkillTerminator {
    fn kill_background_processes(&self, package: &str) -> Result<(), OverlayError> {
        let name = process_name(package);

        #[cfg(windows)]
        let output = Command::new("taskkill")
            .args(["/F", "/IM", &format!("{name}.exe")])
            .output();
        #[cfg(target_os = "linux")]
        let output = Command::new("pkill").args(["-x", comm_name(name)]).output();
        #[cfg(not(any(windows, target_os = "linux")))]
        let output = Command::new("pkill").args(["-x", name]).output();

        let out = output.map_err(|e| OverlayError::Terminate {
            package: package.to_string(),
            reason: e.to_string(),
        })?;

        // pkill exits 1 when nothing matched, which is not a failure here
        match out.status.code() {
            Some(0 | 1) => {
                debug!("PkillTerminator: stopped {name} ({package})");
                Ok(())
            }
            _ => Err(OverlayError::Terminate {
                package: package.to_string(),
                reason: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            }),
        }
    }
}

/// Used by the headless host, where there is no home screen to return to.
pub struct LogOnlyLauncher;

impl HomeLauncher for LogOnlyLauncher {
    fn launch_home(&self) -> Result<(), OverlayError> {
        info!("LogOnlyLauncher: returning to home screen");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_name_uses_last_segment() {
        assert_eq!(process_name("com.example.game"), "game");
        assert_eq!(process_name("firefox"), "firefox");
    }

    #[test]
    fn test_comm_name_truncates_long_names() {
        assert_eq!(comm_name("game"), "game");
        assert_eq!(comm_name("thunderbird-bin-helper"), "thunderbird-bin");
        // Never splits a multi-byte character
        assert_eq!(comm_name("ééééééééé"), "ééééééé");
    }

    #[test]
    fn test_log_only_launcher_succeeds() {
        assert!(LogOnlyLauncher.launch_home().is_ok());
    }
}
