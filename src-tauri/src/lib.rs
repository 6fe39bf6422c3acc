pub mod bridge;
pub mod config;
pub mod constants;
pub mod error;
pub mod notifier;
pub mod platform;
pub mod presenter;
pub mod service;
#[cfg(test)]
mod test_utils;
pub mod ui_thread;
pub mod window;

#[cfg(feature = "desktop")]
mod commands;
#[cfg(feature = "desktop")]
mod shell;

use log::warn;
use std::sync::{Mutex, MutexGuard};

#[cfg(feature = "desktop")]
use crate::{
    bridge::BridgeController,
    config::AppConfig,
    notifier::{ChannelNotifier, DismissListener, OutboundChannel},
    platform::NativeTerminator,
    presenter::Collaborators,
    service::OverlayService,
    ui_thread::{OffThread, UiThread},
};
#[cfg(feature = "desktop")]
use log::{error, info};
#[cfg(feature = "desktop")]
use std::sync::Arc;
#[cfg(feature = "desktop")]
use tauri::{
    menu::{Menu, MenuItem, PredefinedMenuItem},
    tray::TrayIconBuilder,
    webview::WebviewWindowBuilder,
    AppHandle, Manager, RunEvent, WindowEvent,
};

/// Lock a mutex, recovering from poisoning if necessary
pub(crate) fn safe_lock<'a, T>(mutex: &'a Mutex<T>, context: &str) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!("{context} mutex was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

/// Install `env_logger`; `RUST_LOG` wins over `default_filter`.
pub fn init_logging(default_filter: &str) {
    let env = env_logger::Env::default().default_filter_or(default_filter);
    // A second call (tests, embedding hosts) keeps the first logger
    let _ = env_logger::Builder::from_env(env).try_init();
}

#[cfg(feature = "desktop")]
fn with_service(app: &AppHandle, f: impl FnOnce(&mut OverlayService)) {
    if let Some(bridge) = app.try_state::<BridgeController>() {
        let mut service = safe_lock(bridge.service(), "OverlayService");
        f(&mut service);
    }
}

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    let config = AppConfig::load();
    init_logging(&config.log_filter);
    let policy = config.policy();
    info!("Focusguard starting with {policy:?}");

    tauri::Builder::default()
        .setup(move |app| {
            let handle = app.handle().clone();

            let ui: Arc<dyn UiThread> = Arc::new(OffThread::new(
                shell::TauriUiThread::new(handle.clone()),
                |job| {
                    tauri::async_runtime::spawn(async move { job() });
                },
            ));
            let channel: Arc<dyn OutboundChannel> = Arc::new(shell::EventChannel::new(handle.clone()));
            let listener: Arc<dyn DismissListener> = Arc::new(ChannelNotifier::new(ui, channel));

            let service = OverlayService::new(policy, move || Collaborators {
                window_service: Box::new(shell::TauriWindowService::new(handle.clone())),
                terminator: Arc::new(NativeTerminator),
                launcher: Arc::new(shell::MainWindowLauncher::new(handle.clone())),
                listener: Some(Arc::clone(&listener)),
            });
            app.manage(BridgeController::new(Arc::new(Mutex::new(service))));

            let _main_window = WebviewWindowBuilder::new(app, "main", tauri::WebviewUrl::default())
                .title("Focusguard")
                .inner_size(420.0, 320.0)
                .resizable(false)
                .center()
                .build()?;

            let open = MenuItem::with_id(app, "open", "Open Focusguard", true, None::<&str>)?;
            let separator = PredefinedMenuItem::separator(app)?;
            let stop = MenuItem::with_id(app, "stop_overlay", "Stop Overlay", true, None::<&str>)?;
            let quit = MenuItem::with_id(app, "quit", "Quit Focusguard", true, None::<&str>)?;
            let menu = Menu::with_items(app, &[&open, &separator, &stop, &separator, &quit])?;

            let mut tray = TrayIconBuilder::new()
                .menu(&menu)
                .show_menu_on_left_click(true)
                .tooltip("Focusguard");
            if let Some(icon) = app.default_window_icon() {
                tray = tray.icon(icon.clone());
            }
            tray.on_menu_event(|app, event| match event.id.0.as_str() {
                "open" => {
                    if let Some(window) = app.get_webview_window("main") {
                        let _ = window.show();
                        let _ = window.set_focus();
                    }
                }
                "stop_overlay" => with_service(app, OverlayService::stop),
                "quit" => {
                    with_service(app, OverlayService::stop);
                    app.exit(0);
                }
                other => error!("Unknown tray menu item: {other}"),
            })
            .build(app)?;

            Ok(())
        })
        .on_window_event(|window, event| {
            // Closing the main window only removes the task; the overlay service keeps running
            if window.label() == "main" {
                if let WindowEvent::CloseRequested { api, .. } = event {
                    api.prevent_close();
                    let _ = window.hide();
                    with_service(window.app_handle(), |service| service.task_removed());
                }
            }
        })
        .invoke_handler(tauri::generate_handler![
            commands::show_block_overlay,
            commands::stop_block_overlay,
            commands::bridge_call,
            commands::overlay_action,
            commands::overlay_status,
        ])
        .build(tauri::generate_context!())
        .expect("error while building tauri application")
        .run(|app, event| {
            if let RunEvent::ExitRequested { api, code, .. } = &event {
                // Keep running tray-only unless exit was asked for explicitly
                if code.is_none() {
                    api.prevent_exit();
                }
            }
            if let RunEvent::Exit = event {
                with_service(app, OverlayService::stop);
            }
        });
}
