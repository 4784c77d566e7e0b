// Warn on unused code to catch dead code early
#![warn(unused)]
// Warn on unused dependencies to catch platform-specific cfg mismatches
#![warn(unused_crate_dependencies)]
// Warn on redundant path prefixes (e.g., std::path::Path when Path is imported)
#![warn(unused_qualifications)]
// Use log::* macros instead of println!/eprintln! for proper log level control
#![deny(clippy::print_stdout, clippy::print_stderr)]

//noinspection RsUnusedImport
// tempfile is only used by tests
#[cfg(test)]
use tempfile as _;

pub mod config;
pub mod dbus;
pub mod file_system;
pub mod floating_bar;
pub mod ignore_poison;
pub mod places;
pub mod preferences;
pub mod views;

use std::sync::Arc;

use tokio::runtime::Handle;

use config::AppConfig;
use file_system::{FileOperations, LocalFileOperations};
use preferences::SettingsStore;

/// Starts the file manager services and runs until interrupted.
pub async fn run() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let config = AppConfig::from_env();
    // Held for the process lifetime so every setting change is persisted
    let _settings = Arc::new(SettingsStore::open(&config.settings_path));
    log::info!("Settings loaded from {}", config.settings_path.display());

    let operations: Arc<dyn FileOperations> = Arc::new(LocalFileOperations::new(Handle::current(), config.copy));

    #[cfg(target_os = "linux")]
    let bus = if config.dbus.enabled {
        match dbus::DBusManager::start(&config.dbus, Arc::clone(&operations)).await {
            Ok(manager) => Some(manager),
            Err(e) => {
                log::warn!("Failed to start D-Bus service: {}", e);
                None
            }
        }
    } else {
        log::info!("D-Bus service disabled");
        None
    };
    #[cfg(not(target_os = "linux"))]
    {
        let _ = &operations;
        if config.dbus.enabled {
            log::warn!("{}", dbus::DBusError::Unsupported);
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
    log::info!("Shutting down");

    #[cfg(target_os = "linux")]
    if let Some(manager) = bus
        && let Err(e) = manager.stop().await
    {
        log::warn!("Failed to stop D-Bus service: {}", e);
    }
}
