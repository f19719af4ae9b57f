use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::watch;

use crate::model::settings::ViewSettings;

#[derive(Debug, Deserialize, Serialize, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub youtrack: ViewSettings,
}

pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".youtrack-boards")
}

pub fn config_path() -> PathBuf {
    data_dir().join("config.toml")
}

pub fn log_path() -> PathBuf {
    data_dir().join("ytb.log")
}

pub fn load_config() -> Result<AppConfig> {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    let config: AppConfig =
        toml::from_str(&contents).with_context(|| "Failed to parse config.toml")?;
    Ok(config)
}

pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;
    Ok(())
}

/// Live view settings. Views hold a receiver and re-read it on every listing;
/// the app watches for changes to refresh the affected panes.
pub struct SettingsStore {
    tx: watch::Sender<ViewSettings>,
    path: Option<PathBuf>,
}

impl SettingsStore {
    /// `path` is where changes are persisted; `None` keeps them in memory.
    pub fn new(initial: ViewSettings, path: Option<PathBuf>) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx, path }
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewSettings> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> ViewSettings {
        *self.tx.borrow()
    }

    /// Apply `f`, persist and notify subscribers. Returns whether anything changed.
    pub fn update(&self, f: impl FnOnce(&mut ViewSettings)) -> Result<bool> {
        let changed = self.tx.send_if_modified(|settings| {
            let before = *settings;
            f(settings);
            *settings != before
        });
        if changed {
            let settings = self.current();
            tracing::info!(?settings, "view settings changed");
            if let Some(path) = &self.path {
                save_config_to(path, &AppConfig { youtrack: settings })?;
            }
        }
        Ok(changed)
    }
}
