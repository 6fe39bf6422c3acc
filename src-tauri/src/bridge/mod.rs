//! Command bridge between the host application and the overlay service.
//!
//! The host sends `showBlockOverlay` / `stopBlockOverlay` method calls over the
//! `app_blocker` channel; every other method name is answered with
//! "not implemented".

pub mod stdio;

use crate::constants::{METHOD_SHOW_BLOCK_OVERLAY, METHOD_STOP_BLOCK_OVERLAY};
use crate::safe_lock;
use crate::service::{OverlayService, StartCommand};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// Inbound method call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }
}

/// Answer to a method call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum MethodResult {
    Success { value: Value },
    NotImplemented,
}

impl MethodResult {
    pub fn success(value: impl Into<Value>) -> Self {
        MethodResult::Success { value: value.into() }
    }
}

/// The commands the bridge understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeCommand {
    ShowBlockOverlay(StartCommand),
    StopBlockOverlay,
}

impl BridgeCommand {
    /// `None` for unknown methods. Malformed arguments degrade to "no package".
    pub fn parse(call: &MethodCall) -> Option<Self> {
        match call.method.as_str() {
            METHOD_SHOW_BLOCK_OVERLAY => {
                let command = serde_json::from_value(call.arguments.clone()).unwrap_or_default();
                Some(BridgeCommand::ShowBlockOverlay(command))
            }
            METHOD_STOP_BLOCK_OVERLAY => Some(BridgeCommand::StopBlockOverlay),
            _ => None,
        }
    }
}

/// Translates bridge commands into overlay service lifecycle calls.
#[derive(Clone)]
pub struct BridgeController {
    service: Arc<Mutex<OverlayService>>,
}

impl BridgeController {
    pub fn new(service: Arc<Mutex<OverlayService>>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &Arc<Mutex<OverlayService>> {
        &self.service
    }

    pub fn handle(&self, call: &MethodCall) -> MethodResult {
        match BridgeCommand::parse(call) {
            Some(BridgeCommand::ShowBlockOverlay(command)) => {
                MethodResult::success(self.start(command))
            }
            Some(BridgeCommand::StopBlockOverlay) => MethodResult::success(self.stop_block_overlay()),
            None => {
                warn!("Bridge: method '{}' not implemented", call.method);
                MethodResult::NotImplemented
            }
        }
    }

    /// Always reports success.
    pub fn show_block_overlay(&self, package_name: Option<&str>) -> bool {
        self.start(StartCommand::for_package(package_name))
    }

    /// Always reports success.
    pub fn stop_block_overlay(&self) -> bool {
        info!("Bridge: stopping block overlay");
        safe_lock(&self.service, "OverlayService").stop();
        true
    }

    fn start(&self, command: StartCommand) -> bool {
        info!("Bridge: showing block overlay");
        safe_lock(&self.service, "OverlayService").start(command);
        true
    }
}
