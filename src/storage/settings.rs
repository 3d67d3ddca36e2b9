//! Key-value settings persisted in `settings.json`

use std::fs;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use super::file_storage::Result;

#[derive(Debug, Clone)]
pub struct SettingsStore {
    data_dir: PathBuf,
}

impl SettingsStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    fn settings_path(&self) -> PathBuf {
        self.data_dir.join("settings.json")
    }

    fn load(&self) -> Result<Map<String, Value>> {
        let path = self.settings_path();
        if !path.exists() {
            return Ok(Map::new());
        }

        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, settings: &Map<String, Value>) -> Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        fs::write(self.settings_path(), serde_json::to_string_pretty(settings)?)?;
        Ok(())
    }

    /// Read a setting, `None` when the key was never saved
    pub fn get_setting<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.load()?.remove(key) {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub fn save_setting<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let mut settings = self.load()?;
        settings.insert(key.to_string(), serde_json::to_value(value)?);
        self.save(&settings)?;
        log::info!("Saved setting '{}'", key);
        Ok(())
    }

    pub fn remove_setting(&self, key: &str) -> Result<()> {
        let mut settings = self.load()?;
        if settings.remove(key).is_some() {
            self.save(&settings)?;
        }
        Ok(())
    }
}
