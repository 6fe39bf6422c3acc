use crate::error::OverlayError;
use crate::safe_lock;
use log::error;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

pub type UiTask = Box<dyn FnOnce() + Send + 'static>;

/// Message queue of the thread that owns the overlay views.
///
/// `post` never runs the task inline: callers always observe it on a later turn.
pub trait UiThread: Send + Sync {
    fn post(&self, task: UiTask) -> Result<(), OverlayError>;
}

/// In-process queue drained by the loop that owns it.
#[derive(Clone, Default)]
pub struct MainQueue {
    tasks: Arc<Mutex<VecDeque<UiTask>>>,
}

impl MainQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        safe_lock(&self.tasks, "MainQueue").len()
    }

    /// Run queued tasks until the queue is empty, including tasks posted
    /// while draining. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            // Lock is released before the task runs so it may post again
            let next = safe_lock(&self.tasks, "MainQueue").pop_front();
            let Some(task) = next else {
                return ran;
            };
            task();
            ran += 1;
        }
    }
}

impl UiThread for MainQueue {
    fn post(&self, task: UiTask) -> Result<(), OverlayError> {
        safe_lock(&self.tasks, "MainQueue").push_back(task);
        Ok(())
    }
}

/// Forwards every post to `inner` from a job handed to `spawn`.
///
/// For event loops whose own post runs the task inline when called on the
/// loop thread. `spawn` must run the job on some other thread.
pub struct OffThread<U> {
    inner: Arc<U>,
    spawn: Box<dyn Fn(UiTask) + Send + Sync>,
}

impl<U: UiThread + 'static> OffThread<U> {
    pub fn new<S>(inner: U, spawn: S) -> Self
    where
        S: Fn(UiTask) + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(inner),
            spawn: Box::new(spawn),
        }
    }
}

impl<U: UiThread + 'static> UiThread for OffThread<U> {
    fn post(&self, task: UiTask) -> Result<(), OverlayError> {
        let inner = Arc::clone(&self.inner);
        (self.spawn)(Box::new(move || {
            if let Err(e) = inner.post(task) {
                error!("OffThread: could not post to UI thread: {e}");
            }
        }));
        Ok(())
    }
}
