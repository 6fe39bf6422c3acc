use crate::config::OverlayPolicy;
use crate::constants::{BLOCK_MESSAGE, UNKNOWN_PACKAGE};
use crate::notifier::DismissListener;
use crate::platform::{HomeLauncher, OverlayAction, OverlayView, ProcessTerminator, WindowService};
use crate::window::{OverlayWindowManager, WindowAttachment};
use log::{debug, error, info, warn};
use std::sync::Arc;

/// Platform pieces a presenter is built from
pub struct Collaborators {
    pub window_service: Box<dyn WindowService>,
    pub terminator: Arc<dyn ProcessTerminator>,
    pub launcher: Arc<dyn HomeLauncher>,
    pub listener: Option<Arc<dyn DismissListener>>,
}

/// The attachment and the package only exist together.
enum OverlayState {
    Idle,
    Showing {
        attachment: WindowAttachment,
        package: String,
    },
}

/// View tree rendered for a blocked package
pub fn blocking_view(package: &str) -> OverlayView {
    OverlayView {
        message: BLOCK_MESSAGE.to_string(),
        package_name: package.to_string(),
        controls: vec![OverlayAction::Close, OverlayAction::GoBack],
    }
}

/// Owns the block overlay and decides what show and dismiss requests do.
///
/// Two states: Idle (nothing on screen) and Showing (one overlay attached for
/// one package). Repeated show requests never stack a second overlay.
pub struct BlockOverlayPresenter {
    policy: OverlayPolicy,
    window: OverlayWindowManager,
    terminator: Arc<dyn ProcessTerminator>,
    launcher: Arc<dyn HomeLauncher>,
    listener: Option<Arc<dyn DismissListener>>,
    state: OverlayState,
}

impl BlockOverlayPresenter {
    pub fn new(policy: OverlayPolicy, collaborators: Collaborators) -> Self {
        let Collaborators {
            window_service,
            terminator,
            launcher,
            listener,
        } = collaborators;

        Self {
            policy,
            window: OverlayWindowManager::new(window_service, policy.touch),
            terminator,
            launcher,
            listener,
            state: OverlayState::Idle,
        }
    }

    pub fn policy(&self) -> OverlayPolicy {
        self.policy
    }

    pub fn is_showing(&self) -> bool {
        matches!(self.state, OverlayState::Showing { .. })
    }

    pub fn blocked_package(&self) -> Option<&str> {
        match &self.state {
            OverlayState::Showing { package, .. } => Some(package),
            OverlayState::Idle => None,
        }
    }

    /// Show the overlay for `package`, or refresh the one already showing.
    pub fn request(&mut self, package: Option<&str>) {
        let package = package.unwrap_or(UNKNOWN_PACKAGE).to_string();
        info!("BlockOverlay: blocking app {package}");

        if let OverlayState::Showing {
            attachment,
            package: current,
        } = &mut self.state
        {
            if self.policy.update_in_place {
                debug!("BlockOverlay: updating existing overlay");
                if let Err(e) = self.window.update(attachment, &blocking_view(&package)) {
                    warn!("BlockOverlay: {e}");
                }
                *current = package;
            } else {
                info!("BlockOverlay: overlay already showing for {current}");
            }
            return;
        }

        self.show(package);
    }

    fn show(&mut self, package: String) {
        debug!("BlockOverlay: showing blocking overlay");
        match self.window.attach(&blocking_view(&package)) {
            Ok(attachment) => {
                self.state = OverlayState::Showing { attachment, package };
                info!("BlockOverlay: overlay displayed");
            }
            Err(e) => error!("BlockOverlay: could not display overlay for {package}: {e}"),
        }
    }

    /// Click on one of the overlay's controls. Both controls dismiss.
    pub fn handle_action(&mut self, action: OverlayAction) {
        match action {
            OverlayAction::Close => info!("BlockOverlay: close clicked"),
            OverlayAction::GoBack => info!("BlockOverlay: go back clicked"),
        }
        self.dismiss();
    }

    /// User dismissal: optionally stop the blocked app, hide the overlay,
    /// optionally tell the host, then go to the home screen.
    pub fn dismiss(&mut self) {
        let OverlayState::Showing { attachment, package } =
            std::mem::replace(&mut self.state, OverlayState::Idle)
        else {
            debug!("BlockOverlay: dismiss ignored, no overlay showing");
            return;
        };

        if self.policy.terminate_on_dismiss {
            self.terminate(&package);
        }

        self.remove(attachment);

        if self.policy.notify_on_dismiss {
            if let Some(listener) = &self.listener {
                listener.overlay_dismissed();
            }
        }

        if let Err(e) = self.launcher.launch_home() {
            warn!("BlockOverlay: {e}");
        }
    }

    /// Best effort; a foregrounded app may survive.
    fn terminate(&self, package: &str) {
        match self.terminator.kill_background_processes(package) {
            Ok(()) => info!("BlockOverlay: force closed app {package}"),
            Err(e) => error!("BlockOverlay: error force closing app: {e}"),
        }
    }

    fn remove(&mut self, attachment: WindowAttachment) {
        debug!("BlockOverlay: removing overlay");
        if let Err(e) = self.window.detach(attachment) {
            error!("BlockOverlay: {e}");
        }
    }

    /// Host teardown. Safe to call in any state and more than once.
    pub fn destroy(&mut self) {
        if let OverlayState::Showing { attachment, .. } =
            std::mem::replace(&mut self.state, OverlayState::Idle)
        {
            self.remove(attachment);
        }
    }

    /// The visible task went away; the overlay outlives it.
    pub fn task_removed(&self) {
        info!("BlockOverlay: task removed, overlay kept");
    }
}

impl Drop for BlockOverlayPresenter {
    fn drop(&mut self) {
        self.destroy();
    }
}
