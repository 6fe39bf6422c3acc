//! Headless bridge host for Focusguard
//!
//! Serves the `app_blocker` method channel over stdin/stdout using
//! length-prefixed JSON frames. Logs go to stderr.

use focusguard_lib::{
    bridge::stdio::StdioHost,
    config::AppConfig,
    constants::CHANNEL,
    init_logging,
    platform::{HeadlessWindowService, NativeHomeLauncher, NativeTerminator},
    presenter::Collaborators,
};
use log::{error, info};
use std::io;
use std::sync::Arc;

fn main() {
    let config = AppConfig::load();
    init_logging(&config.log_filter);

    let policy = config.policy();
    info!("focusguard-bridge: serving {CHANNEL} with {policy:?}");

    let mut host = StdioHost::new(io::stdin().lock(), io::stdout(), policy, || Collaborators {
        window_service: Box::new(HeadlessWindowService::new()),
        terminator: Arc::new(NativeTerminator),
        launcher: Arc::new(NativeHomeLauncher),
        listener: None,
    });

    // Returns once the host closes its end of the pipe
    if let Err(e) = host.run() {
        error!("focusguard-bridge: {e}");
        std::process::exit(1);
    }
}
