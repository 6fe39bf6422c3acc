use crate::config::OverlayPolicy;
use crate::platform::OverlayAction;
use crate::presenter::{BlockOverlayPresenter, Collaborators};
use log::{debug, info};
use serde::Deserialize;

/// Start request delivered to the overlay service. Carries a single
/// `packageName` extra.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StartCommand {
    #[serde(rename = "packageName", default)]
    pub package_name: Option<String>,
}

impl StartCommand {
    pub fn for_package(package_name: Option<&str>) -> Self {
        Self {
            package_name: package_name.map(str::to_string),
        }
    }
}

/// What the host should do if the process dies while the service runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartMode {
    /// Recreate the service after the process is killed
    Sticky,
}

type CollaboratorFactory = Box<dyn Fn() -> Collaborators + Send>;

/// Long-running host of the presenter.
///
/// The presenter is created on the first start and lives until `stop`.
/// Removing the visible task does not stop it.
pub struct OverlayService {
    policy: OverlayPolicy,
    factory: CollaboratorFactory,
    presenter: Option<BlockOverlayPresenter>,
}

impl OverlayService {
    pub fn new<F>(policy: OverlayPolicy, factory: F) -> Self
    where
        F: Fn() -> Collaborators + Send + 'static,
    {
        Self {
            policy,
            factory: Box::new(factory),
            presenter: None,
        }
    }

    pub fn start(&mut self, command: StartCommand) -> StartMode {
        let policy = self.policy;
        let factory = &self.factory;
        let presenter = self.presenter.get_or_insert_with(|| {
            info!("OverlayService: created");
            BlockOverlayPresenter::new(policy, factory())
        });
        presenter.request(command.package_name.as_deref());
        StartMode::Sticky
    }

    pub fn stop(&mut self) {
        if let Some(mut presenter) = self.presenter.take() {
            presenter.destroy();
            info!("OverlayService: destroyed");
        } else {
            debug!("OverlayService: stop ignored, not running");
        }
    }

    pub fn task_removed(&self) {
        if let Some(presenter) = &self.presenter {
            presenter.task_removed();
        }
    }

    pub fn handle_action(&mut self, action: OverlayAction) {
        match self.presenter.as_mut() {
            Some(presenter) => presenter.handle_action(action),
            None => debug!("OverlayService: {action:?} ignored, not running"),
        }
    }

    pub fn is_running(&self) -> bool {
        self.presenter.is_some()
    }

    pub fn is_showing(&self) -> bool {
        self.presenter.as_ref().is_some_and(BlockOverlayPresenter::is_showing)
    }

    pub fn blocked_package(&self) -> Option<&str> {
        self.presenter.as_ref().and_then(BlockOverlayPresenter::blocked_package)
    }
}
