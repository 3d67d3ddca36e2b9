mod file_storage;
mod record_store;
mod settings;

pub use file_storage::{FileStorage, Result, StorageError};
pub use record_store::{Record, RecordStore};
pub use settings::SettingsStore;
