use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::record_store::{Record, RecordStore};
use super::settings::SettingsStore;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Data directory not found")]
    DataDirNotFound,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Root of the on-disk data directory.
///
/// Every entity kind lives in its own `<collection>.json` file below the
/// base path; settings live in `settings.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// Get the default data directory
    pub fn default_data_dir() -> Result<PathBuf> {
        dirs::data_local_dir()
            .map(|p| p.join("studyflow"))
            .ok_or(StorageError::DataDirNotFound)
    }

    /// Initialize storage directories
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.base_path)?;
        Ok(())
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Open the record store for one entity kind
    pub fn store<T: Record>(&self) -> RecordStore<T> {
        RecordStore::new(self.base_path.clone())
    }

    /// Open the key-value settings store
    pub fn settings(&self) -> SettingsStore {
        SettingsStore::new(self.base_path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("nested").join("studyflow");
        let storage = FileStorage::new(base.clone());

        storage.init().unwrap();

        assert!(base.is_dir());
        assert_eq!(storage.base_path(), base.as_path());
    }
}
