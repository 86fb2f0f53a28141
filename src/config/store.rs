//! Settings store
//!
//! `ConfigStore` is what the coordinator consumes. `SettingsStore` backs it
//! with a JSON file under the user config dir, or keeps it in memory when no
//! path is given. Every write records the changed key so the caller can
//! forward it as a settings-changed signal.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::{Settings, SettingsKey};
use crate::placement::DesiredConfiguration;

/// Configuration as seen by the placement core
pub trait ConfigStore {
    fn settings(&self) -> &Settings;

    /// The `transfer-indicators` mapping
    fn desired_configuration(&self) -> DesiredConfiguration {
        DesiredConfiguration::from(self.settings().transfer_indicators.clone())
    }

    fn set_desired_configuration(&mut self, desired: &DesiredConfiguration) -> Result<()>;

    /// Publish the transferable indicators for the preferences picker
    fn set_available_indicators(&mut self, names: Vec<String>) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct SettingsStore {
    settings: Settings,
    path: Option<PathBuf>,
    changed: Vec<SettingsKey>,
}

impl SettingsStore {
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(crate::constants::config::APP_DIR);
        path.push(crate::constants::config::FILENAME);
        path
    }

    /// Store that never touches the filesystem
    pub fn in_memory(settings: Settings) -> Self {
        Self {
            settings,
            path: None,
            changed: Vec::new(),
        }
    }

    /// Load from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_path())
    }

    /// Load from `path`; a missing file yields defaults
    pub fn load_from(path: PathBuf) -> Result<Self> {
        let settings = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {:?}", path))?;
            let settings: Settings = serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse settings JSON from {:?}", path))?;
            info!(path = %path.display(), transfers = settings.transfer_indicators.len(), "Loaded settings");
            settings
        } else {
            info!(path = %path.display(), "Settings file not found, using defaults");
            Settings::default()
        };
        Ok(Self {
            settings,
            path: Some(path),
            changed: Vec::new(),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write the settings file (no-op for in-memory stores)
    pub fn save(&self) -> Result<()> {
        let Some(path) = self.path.as_ref() else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create settings directory {:?}", parent))?;
        }
        let json = serde_json::to_string_pretty(&self.settings).context("Failed to serialize settings to JSON")?;
        fs::write(path, json).with_context(|| format!("Failed to write settings to {:?}", path))?;
        debug!(path = %path.display(), "Saved settings");
        Ok(())
    }

    /// Apply an edit, persist it and remember which key changed
    pub fn update<F>(&mut self, key: SettingsKey, edit: F) -> Result<()>
    where
        F: FnOnce(&mut Settings),
    {
        let before = self.settings.clone();
        edit(&mut self.settings);
        if self.settings == before {
            return Ok(());
        }
        self.changed.push(key);
        self.save()
            .with_context(|| format!("Failed to persist change to '{}'", key))
    }

    /// Set one key from a JSON value, validated against the schema
    pub fn set_value(&mut self, key: SettingsKey, value: serde_json::Value) -> Result<()> {
        let mut json = serde_json::to_value(&self.settings).context("Failed to serialize settings to JSON")?;
        if let Some(object) = json.as_object_mut() {
            object.insert(key.as_str().to_string(), value);
        }
        let updated: Settings =
            serde_json::from_value(json).with_context(|| format!("Invalid value for '{}'", key))?;
        self.update(key, move |s| *s = updated)
    }

    pub fn set_transfer(&mut self, iname: &str, monitor_index: u32) -> Result<()> {
        let mut map = self.settings.transfer_indicators.clone();
        map.insert(iname.to_string(), monitor_index);
        self.set_desired_configuration(&DesiredConfiguration::from(map))
    }

    /// Returns whether a transfer was configured for `iname`
    pub fn clear_transfer(&mut self, iname: &str) -> Result<bool> {
        let mut map = self.settings.transfer_indicators.clone();
        let present = map.remove(iname).is_some();
        self.set_desired_configuration(&DesiredConfiguration::from(map))?;
        Ok(present)
    }

    /// Keys changed since the last call, in write order, without repeats
    pub fn take_changes(&mut self) -> Vec<SettingsKey> {
        let mut keys = Vec::new();
        for key in self.changed.drain(..) {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }
}

impl ConfigStore for SettingsStore {
    fn settings(&self) -> &Settings {
        &self.settings
    }

    fn set_desired_configuration(&mut self, desired: &DesiredConfiguration) -> Result<()> {
        let map = desired.as_map().clone();
        self.update(SettingsKey::TransferIndicators, move |s| s.transfer_indicators = map)
    }

    fn set_available_indicators(&mut self, names: Vec<String>) -> Result<()> {
        self.update(SettingsKey::AvailableIndicators, move |s| s.available_indicators = names)
    }
}
