use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeError;
use tracing::warn;

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "WeekenderEvents";
const APP_NAME: &str = "WeekenderPricing";

pub const DEFAULT_LOG_FILTER: &str = "weekender_pricing=info";

/// User settings for the command line front end.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricingSettings {
    /// Rules export used when `--rules` is not given.
    #[serde(default)]
    pub rules_path: Option<PathBuf>,
    /// Prefix for prices printed by the CLI.
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            rules_path: None,
            currency_symbol: default_currency_symbol(),
            log_filter: default_log_filter(),
        }
    }
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

pub fn settings_file() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join("settings.json"))
}

/// Loads settings from the platform config directory, falling back to defaults.
pub fn load_settings() -> PricingSettings {
    settings_file()
        .and_then(|path| load_settings_from(&path))
        .unwrap_or_default()
}

pub fn load_settings_from(path: &Path) -> Option<PricingSettings> {
    let data = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&data) {
        Ok(settings) => Some(settings),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "ignoring unreadable settings file");
            None
        }
    }
}

pub fn save_settings(settings: &PricingSettings) -> Result<PathBuf, SettingsSaveError> {
    let path = settings_file().ok_or(SettingsSaveError::StorageUnavailable)?;
    save_settings_to(&path, settings)?;
    Ok(path)
}

pub fn save_settings_to(path: &Path, settings: &PricingSettings) -> Result<(), SettingsSaveError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsSaveError {
    #[error("config directory unavailable")]
    StorageUnavailable,
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] SerdeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = PricingSettings {
            rules_path: Some(PathBuf::from("/srv/venue/rules.json")),
            currency_symbol: "€".to_string(),
            log_filter: "debug".to_string(),
        };

        save_settings_to(&path, &settings).unwrap();
        assert_eq!(load_settings_from(&path), Some(settings));
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "currency_symbol": "£" }"#).unwrap();

        let settings = load_settings_from(&path).unwrap();
        assert_eq!(settings.currency_symbol, "£");
        assert_eq!(settings.rules_path, None);
        assert_eq!(settings.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn broken_or_missing_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        assert_eq!(load_settings_from(&path), None);

        fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_settings_from(&path), None);
    }
}
