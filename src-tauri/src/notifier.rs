use crate::constants::METHOD_ON_OVERLAY_DISMISSED;
use crate::error::OverlayError;
use crate::ui_thread::UiThread;
use log::{debug, error, warn};
use serde_json::Value;
use std::sync::Arc;

/// Receives user-initiated overlay dismissals
pub trait DismissListener: Send + Sync {
    fn overlay_dismissed(&self);
}

/// Outbound half of the host method channel
pub trait OutboundChannel: Send + Sync {
    fn invoke_method(&self, method: &str, arguments: Value) -> Result<(), OverlayError>;
}

/// Relays dismissals to the host as `onOverlayDismissed`, always via the UI-thread queue.
pub struct ChannelNotifier {
    ui: Arc<dyn UiThread>,
    channel: Arc<dyn OutboundChannel>,
}

impl ChannelNotifier {
    pub fn new(ui: Arc<dyn UiThread>, channel: Arc<dyn OutboundChannel>) -> Self {
        Self { ui, channel }
    }
}

impl DismissListener for ChannelNotifier {
    fn overlay_dismissed(&self) {
        let channel = Arc::clone(&self.channel);
        let posted = self.ui.post(Box::new(move || {
            match channel.invoke_method(METHOD_ON_OVERLAY_DISMISSED, Value::Null) {
                Ok(()) => debug!("ChannelNotifier: {METHOD_ON_OVERLAY_DISMISSED} delivered"),
                Err(e) => warn!("ChannelNotifier: {METHOD_ON_OVERLAY_DISMISSED} not delivered: {e}"),
            }
        }));

        if let Err(e) = posted {
            error!("ChannelNotifier: could not post dismissal: {e}");
        }
    }
}
