use crate::config::TouchPolicy;
use crate::error::OverlayError;
use crate::platform::{
    Dimension, Gravity, LayoutParams, OverlayView, PixelFormat, ViewId, WindowFlags, WindowService,
    WindowType,
};
use log::debug;

/// A view currently added to the screen. Not `Clone`: detaching consumes it,
/// so a view can only ever be removed once.
#[derive(Debug, PartialEq, Eq)]
pub struct WindowAttachment {
    id: ViewId,
}

impl WindowAttachment {
    pub fn id(&self) -> ViewId {
        self.id
    }
}

/// Thin wrapper adding full-screen, centered, translucent overlays to a window service.
pub struct OverlayWindowManager {
    service: Box<dyn WindowService>,
    touch: TouchPolicy,
}

impl OverlayWindowManager {
    pub fn new(service: Box<dyn WindowService>, touch: TouchPolicy) -> Self {
        Self { service, touch }
    }

    pub fn layout_params(&self) -> LayoutParams {
        layout_params_for(self.touch)
    }

    pub fn attach(&mut self, view: &OverlayView) -> Result<WindowAttachment, OverlayError> {
        let params = self.layout_params();
        let id = self.service.add_view(view, &params)?;
        debug!("OverlayWindowManager: attached view {}", id.0);
        Ok(WindowAttachment { id })
    }

    pub fn update(&mut self, attachment: &WindowAttachment, view: &OverlayView) -> Result<(), OverlayError> {
        self.service.update_view(attachment.id, view)
    }

    pub fn detach(&mut self, attachment: WindowAttachment) -> Result<(), OverlayError> {
        self.service.remove_view(attachment.id)?;
        debug!("OverlayWindowManager: detached view {}", attachment.id.0);
        Ok(())
    }
}

pub fn layout_params_for(touch: TouchPolicy) -> LayoutParams {
    let flags = match touch {
        TouchPolicy::BlockOutside => WindowFlags {
            keep_screen_on: true,
            layout_in_screen: true,
            not_touch_modal: false,
            watch_outside_touch: false,
        },
        TouchPolicy::PassThroughOutside => WindowFlags {
            keep_screen_on: true,
            layout_in_screen: true,
            not_touch_modal: true,
            watch_outside_touch: true,
        },
    };

    LayoutParams {
        width: Dimension::MatchParent,
        height: Dimension::MatchParent,
        window_type: WindowType::ApplicationOverlay,
        flags,
        format: PixelFormat::Translucent,
        gravity: Gravity::Center,
    }
}
