use super::{LayoutParams, OverlayView, ViewId, WindowService};
use crate::error::OverlayError;
use log::info;
use std::collections::HashMap;

/// Window service for hosts without a display. Keeps the views in memory and
/// logs what a real compositor would draw.
#[derive(Default)]
pub struct HeadlessWindowService {
    next_id: u64,
    views: HashMap<ViewId, OverlayView>,
}

impl HeadlessWindowService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view_count(&self) -> usize {
        self.views.len()
    }
}

impl WindowService for HeadlessWindowService {
    fn add_view(&mut self, view: &OverlayView, params: &LayoutParams) -> Result<ViewId, OverlayError> {
        self.next_id += 1;
        let id = ViewId(self.next_id);
        info!(
            "HeadlessWindowService: overlay {} for {} ({:?}, {:?}): {}",
            id.0, view.package_name, params.gravity, params.format, view.message
        );
        self.views.insert(id, view.clone());
        Ok(id)
    }

    fn update_view(&mut self, id: ViewId, view: &OverlayView) -> Result<(), OverlayError> {
        let slot = self.views.get_mut(&id).ok_or(OverlayError::UnknownView(id.0))?;
        info!("HeadlessWindowService: overlay {} now shows {}", id.0, view.package_name);
        *slot = view.clone();
        Ok(())
    }

    fn remove_view(&mut self, id: ViewId) -> Result<(), OverlayError> {
        self.views.remove(&id).ok_or(OverlayError::UnknownView(id.0))?;
        info!("HeadlessWindowService: overlay {} removed", id.0);
        Ok(())
    }
}
