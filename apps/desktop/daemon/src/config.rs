//! Application configuration.
//!
//! Priority: environment variables > defaults.

use std::env;
use std::path::PathBuf;

use crate::file_system::write_operations::{ConflictResolution, CopyConfig};

/// Configuration for the file-operations bus service.
#[derive(Debug, Clone)]
pub struct DBusConfig {
    /// Whether the service is started at all
    pub enabled: bool,
    /// Bus address to use instead of the session bus (for sandboxes and tests)
    pub address: Option<String>,
}

/// Top-level configuration, built once in `run()`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub dbus: DBusConfig,
    /// JSON file the settings store persists to
    pub settings_path: PathBuf,
    pub copy: CopyConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        // Priority for enabled:
        // 1. NAUTILUS_DBUS_ENABLED env var
        // 2. Default: enabled
        let enabled = env::var("NAUTILUS_DBUS_ENABLED")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(true);

        let address = env::var("NAUTILUS_DBUS_ADDRESS").ok().filter(|v| !v.is_empty());

        let settings_path = env::var("NAUTILUS_SETTINGS_PATH")
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_settings_path);

        let conflict_resolution = env::var("NAUTILUS_CONFLICT_RESOLUTION")
            .ok()
            .and_then(|v| {
                let parsed = ConflictResolution::parse(&v);
                if parsed.is_none() {
                    log::warn!("Ignoring unknown NAUTILUS_CONFLICT_RESOLUTION={}", v);
                }
                parsed
            })
            .unwrap_or_default();

        Self {
            dbus: DBusConfig { enabled, address },
            settings_path,
            copy: CopyConfig {
                conflict_resolution,
                ..CopyConfig::default()
            },
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// `~/.config/nautilus/settings.json`, or the working directory when there is no config dir.
pub fn default_settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("nautilus")
        .join("settings.json")
}
