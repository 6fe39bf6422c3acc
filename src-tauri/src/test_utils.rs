//! Shared test fakes for focusguard.
//!
//! Every fake appends to a common [`Journal`] so tests can assert the order in
//! which the presenter talks to its collaborators.

#![cfg(test)]

use crate::error::OverlayError;
use crate::notifier::{DismissListener, OutboundChannel};
use crate::platform::{HomeLauncher, LayoutParams, OverlayView, ProcessTerminator, ViewId, WindowService};
use crate::presenter::Collaborators;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub use crate::presenter::blocking_view;

/// Ordered record of collaborator calls, e.g. `add:pkg`, `kill:pkg`, `remove`.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn record(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|e| e.starts_with(prefix)).count()
    }
}

/// What a [`RecordingWindowService`] currently has on screen
#[derive(Default)]
pub struct WindowLog {
    pub live: HashMap<ViewId, OverlayView>,
    pub removed: usize,
    pub last_params: Option<LayoutParams>,
}

pub struct RecordingWindowService {
    log: Arc<Mutex<WindowLog>>,
    journal: Journal,
    next_id: u64,
    fail_attach: bool,
}

impl RecordingWindowService {
    pub fn new() -> (Self, Arc<Mutex<WindowLog>>) {
        Self::with_journal(Journal::default())
    }

    pub fn with_journal(journal: Journal) -> (Self, Arc<Mutex<WindowLog>>) {
        let log = Arc::new(Mutex::new(WindowLog::default()));
        (Self::shared(journal, Arc::clone(&log)), log)
    }

    pub fn shared(journal: Journal, log: Arc<Mutex<WindowLog>>) -> Self {
        Self {
            log,
            journal,
            next_id: 0,
            fail_attach: false,
        }
    }

    pub fn failing_attach(mut self) -> Self {
        self.fail_attach = true;
        self
    }
}

impl WindowService for RecordingWindowService {
    fn add_view(&mut self, view: &OverlayView, params: &LayoutParams) -> Result<ViewId, OverlayError> {
        if self.fail_attach {
            return Err(OverlayError::Attach("permission denied".into()));
        }
        self.next_id += 1;
        let id = ViewId(self.next_id);
        let mut log = self.log.lock().unwrap();
        log.live.insert(id, view.clone());
        log.last_params = Some(*params);
        self.journal.record(format!("add:{}", view.package_name));
        Ok(id)
    }

    fn update_view(&mut self, id: ViewId, view: &OverlayView) -> Result<(), OverlayError> {
        let mut log = self.log.lock().unwrap();
        let slot = log.live.get_mut(&id).ok_or(OverlayError::UnknownView(id.0))?;
        *slot = view.clone();
        self.journal.record(format!("update:{}", view.package_name));
        Ok(())
    }

    fn remove_view(&mut self, id: ViewId) -> Result<(), OverlayError> {
        let mut log = self.log.lock().unwrap();
        log.live.remove(&id).ok_or(OverlayError::UnknownView(id.0))?;
        log.removed += 1;
        self.journal.record("remove");
        Ok(())
    }
}

pub struct RecordingTerminator {
    journal: Journal,
    fail: bool,
}

impl RecordingTerminator {
    pub fn new(journal: Journal) -> Self {
        Self { journal, fail: false }
    }

    pub fn failing(journal: Journal) -> Self {
        Self { journal, fail: true }
    }
}

impl ProcessTerminator for RecordingTerminator {
    fn kill_background_processes(&self, package: &str) -> Result<(), OverlayError> {
        self.journal.record(format!("kill:{package}"));
        if self.fail {
            return Err(OverlayError::Terminate {
                package: package.to_string(),
                reason: "not permitted".into(),
            });
        }
        Ok(())
    }
}

pub struct RecordingLauncher(pub Journal);

impl HomeLauncher for RecordingLauncher {
    fn launch_home(&self) -> Result<(), OverlayError> {
        self.0.record("home");
        Ok(())
    }
}

pub struct RecordingListener(pub Journal);

impl DismissListener for RecordingListener {
    fn overlay_dismissed(&self) {
        self.0.record("dismissed");
    }
}

/// Outbound channel remembering every invoked method
#[derive(Default)]
pub struct RecordingChannel {
    calls: Mutex<Vec<(String, Value)>>,
}

impl RecordingChannel {
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

impl OutboundChannel for RecordingChannel {
    fn invoke_method(&self, method: &str, arguments: Value) -> Result<(), OverlayError> {
        self.calls.lock().unwrap().push((method.to_string(), arguments));
        Ok(())
    }
}

/// Shared state behind the fakes returned by [`collaborators`]
pub struct TestParts {
    pub journal: Journal,
    pub windows: Arc<Mutex<WindowLog>>,
}

impl TestParts {
    pub fn new() -> Self {
        Self {
            journal: Journal::default(),
            windows: Arc::new(Mutex::new(WindowLog::default())),
        }
    }
}

/// Recording fakes wired to `parts`, with a listener that journals `dismissed`.
pub fn collaborators(parts: &TestParts) -> Collaborators {
    Collaborators {
        window_service: Box::new(RecordingWindowService::shared(
            parts.journal.clone(),
            Arc::clone(&parts.windows),
        )),
        terminator: Arc::new(RecordingTerminator::new(parts.journal.clone())),
        launcher: Arc::new(RecordingLauncher(parts.journal.clone())),
        listener: Some(Arc::new(RecordingListener(parts.journal.clone()))),
    }
}
