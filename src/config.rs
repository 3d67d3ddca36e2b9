//! Application configuration, stored as `config.json` in the data directory

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::focus::DEFAULT_MIN_SESSION_SECS;
use crate::grades::debounce::DEFAULT_DEBOUNCE;
use crate::grades::DEFAULT_PASSING_GRADE;
use crate::storage::{FileStorage, Result};

pub const CONFIG_FILE: &str = "config.json";

/// Environment variable that overrides the default data directory
pub const DATA_DIR_ENV: &str = "STUDYFLOW_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    /// Passing grade for new grade schemes
    pub default_passing_grade: f64,
    /// Quiet period before a grade change triggers recalculation
    pub recalc_debounce_ms: u64,
    /// Focus sessions shorter than this are discarded
    pub min_focus_session_secs: u64,
    /// Survival grades above this are flagged as difficult
    pub difficult_threshold: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_passing_grade: DEFAULT_PASSING_GRADE,
            recalc_debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
            min_focus_session_secs: DEFAULT_MIN_SESSION_SECS,
            difficult_threshold: 10.0,
        }
    }
}

impl AppConfig {
    /// Delay for `RecalcDebouncer`
    pub fn recalc_debounce(&self) -> Duration {
        Duration::from_millis(self.recalc_debounce_ms)
    }

    pub fn path(data_dir: &Path) -> PathBuf {
        data_dir.join(CONFIG_FILE)
    }

    /// Load the configuration; a missing file gives the defaults
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = Self::path(data_dir);
        if !path.exists() {
            log::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn save(&self, data_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(data_dir)?;
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(Self::path(data_dir), data)?;
        Ok(())
    }
}

/// Pick the data directory: an explicit path, then `STUDYFLOW_DATA_DIR`,
/// then the platform default
pub fn resolve_data_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    match std::env::var_os(DATA_DIR_ENV) {
        Some(dir) if !dir.is_empty() => Ok(PathBuf::from(dir)),
        _ => FileStorage::default_data_dir(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = AppConfig::load(temp_dir.path()).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.default_passing_grade, 6.0);
        assert_eq!(config.recalc_debounce_ms, 120);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join(CONFIG_FILE),
            r#"{ "defaultPassingGrade": 5.0 }"#,
        )
        .unwrap();

        let config = AppConfig::load(temp_dir.path()).unwrap();
        assert_eq!(config.default_passing_grade, 5.0);
        assert_eq!(config.min_focus_session_secs, 10);
        assert_eq!(config.difficult_threshold, 10.0);
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("nested");
        let config = AppConfig {
            recalc_debounce_ms: 300,
            ..Default::default()
        };
        config.save(&dir).unwrap();
        let loaded = AppConfig::load(&dir).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.recalc_debounce(), Duration::from_millis(300));
    }

    #[test]
    fn test_explicit_data_dir_wins() {
        let dir = PathBuf::from("/tmp/studyflow-explicit");
        assert_eq!(resolve_data_dir(Some(dir.clone())).unwrap(), dir);
    }
}
