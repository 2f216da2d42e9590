use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app::error::AppError;

pub const DEFAULT_API_BASE_URL: &str = "https://cbhms.ucc-bsit.org/LinkApi/";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UiSettings {
    pub window_width: i32,
    pub window_height: i32,
    pub theme: String,
    pub font_size: i32,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            window_width: 1200,
            window_height: 800,
            theme: "light".to_string(),
            font_size: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackingSettings {
    /// Seconds between dashboard refreshes of the active-customer board.
    pub refresh_interval: i32,
    pub show_offline_devices: bool,
    pub sos_sound_enabled: bool,
}

impl Default for TrackingSettings {
    fn default() -> Self {
        Self {
            refresh_interval: 30,
            show_offline_devices: false,
            sos_sound_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingSettings {
    pub log_level: String,
    pub log_to_file: bool,
    pub max_log_files: i32,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            log_level: "INFO".to_string(),
            log_to_file: true,
            max_log_files: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub ui: UiSettings,
    #[serde(default)]
    pub tracking: TrackingSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub version: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiSettings::default(),
            ui: UiSettings::default(),
            tracking: TrackingSettings::default(),
            logging: LoggingSettings::default(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

pub fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var("LINK_RESPONSE_CONFIG_PATH") {
        return PathBuf::from(path);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".link_response_config.json")
}

pub fn backup_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".link_response_config.backup.json")
}

pub fn load_config() -> Result<AppConfig, AppError> {
    load_config_from_path(&config_path())
}

pub fn save_config(config: &AppConfig) -> Result<(), AppError> {
    save_config_to_path(config, &config_path(), &backup_config_path())
}

pub fn load_config_from_path(path: &Path) -> Result<AppConfig, AppError> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let raw = fs::read_to_string(path)
        .map_err(|err| AppError::system(format!("Failed to read config: {err}"), ""))?;
    let value: serde_json::Value = serde_json::from_str(&raw)
        .map_err(|err| AppError::system(format!("Failed to parse config: {err}"), ""))?;
    let mut config: AppConfig = serde_json::from_value(value.clone()).unwrap_or_default();
    config = apply_legacy_overrides(config, &value);
    Ok(validate_config(config))
}

pub fn save_config_to_path(
    config: &AppConfig,
    path: &Path,
    backup_path: &Path,
) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    if path.exists() {
        let _ = fs::copy(path, backup_path);
    }
    let payload = serde_json::to_string_pretty(config)
        .map_err(|err| AppError::system(format!("Failed to serialize config: {err}"), ""))?;
    fs::write(path, payload)
        .map_err(|err| AppError::system(format!("Failed to write config: {err}"), ""))?;
    Ok(())
}

/// Early builds stored a flat file with top-level keys; merge those so an
/// upgrade does not silently reset the server URL.
fn apply_legacy_overrides(mut config: AppConfig, value: &serde_json::Value) -> AppConfig {
    if let Some(base_url) = value.get("base_url").and_then(|v| v.as_str()) {
        config.api.base_url = base_url.to_string();
    }
    if let Some(timeout) = value.get("request_timeout").and_then(|v| v.as_u64()) {
        config.api.timeout_secs = timeout;
    }
    if let Some(refresh_interval) = value.get("refresh_interval").and_then(|v| v.as_i64()) {
        config.tracking.refresh_interval = refresh_interval as i32;
    }
    if let Some(theme) = value.get("theme").and_then(|v| v.as_str()) {
        config.ui.theme = theme.to_string();
    }
    config
}

fn validate_config(mut config: AppConfig) -> AppConfig {
    if config.api.base_url.trim().is_empty() {
        config.api.base_url = DEFAULT_API_BASE_URL.to_string();
    }
    if !config.api.base_url.ends_with('/') {
        config.api.base_url.push('/');
    }
    if config.api.timeout_secs == 0 || config.api.timeout_secs > 120 {
        config.api.timeout_secs = 15;
    }
    if config.tracking.refresh_interval < 1 {
        config.tracking.refresh_interval = 30;
    }
    if config.ui.font_size < 8 || config.ui.font_size > 24 {
        config.ui.font_size = 10;
    }
    if config.logging.max_log_files < 1 {
        config.logging.max_log_files = 10;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_legacy_values() {
        let value = serde_json::json!({
            "base_url": "http://192.168.1.5/LinkApi",
            "request_timeout": 30,
            "refresh_interval": 10,
            "theme": "dark"
        });
        let mut config: AppConfig = serde_json::from_value(value.clone()).unwrap_or_default();
        config = apply_legacy_overrides(config, &value);
        let config = validate_config(config);

        assert_eq!(config.api.base_url, "http://192.168.1.5/LinkApi/");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.tracking.refresh_interval, 10);
        assert_eq!(config.ui.theme, "dark");
    }

    #[test]
    fn clamps_invalid_values() {
        let mut config = AppConfig::default();
        config.api.base_url = "  ".to_string();
        config.api.timeout_secs = 0;
        config.tracking.refresh_interval = 0;
        config.ui.font_size = 99;
        let validated = validate_config(config);

        assert_eq!(validated.api.base_url, DEFAULT_API_BASE_URL);
        assert_eq!(validated.api.timeout_secs, 15);
        assert_eq!(validated.tracking.refresh_interval, 30);
        assert_eq!(validated.ui.font_size, 10);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::TempDir::new().expect("tmp");
        let config = load_config_from_path(&dir.path().join("nope.json")).expect("load");
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn save_creates_backup_of_previous_file() {
        let dir = tempfile::TempDir::new().expect("tmp");
        let path = dir.path().join("config.json");
        let backup = dir.path().join("config.backup.json");

        let config = AppConfig::default();
        save_config_to_path(&config, &path, &backup).expect("first save");
        assert!(!backup.exists());

        let mut changed = config.clone();
        changed.ui.theme = "dark".to_string();
        save_config_to_path(&changed, &path, &backup).expect("second save");
        assert!(backup.exists());

        let reloaded = load_config_from_path(&path).expect("reload");
        assert_eq!(reloaded.ui.theme, "dark");
    }
}
