//! Locker storage implementation

use uuid::Uuid;

use super::models::*;
use crate::storage::{FileStorage, RecordStore, StorageError};

type Result<T> = std::result::Result<T, StorageError>;

/// Storage for locker entries
pub struct LockerStorage {
    files: RecordStore<LockerFile>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl LockerStorage {
    pub fn new(storage: &FileStorage) -> Self {
        Self {
            files: storage.store(),
        }
    }

    fn apply(file: &mut LockerFile, request: FileRequest) -> Result<()> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(StorageError::InvalidOperation(
                "File name cannot be empty".to_string(),
            ));
        }

        file.name = name.to_string();
        file.file_type = request.file_type;
        file.subject_id = request.subject_id;
        file.event_id = request.event_id;
        file.url = non_blank(request.url);
        file.description = non_blank(request.description);
        file.size = request.size;
        Ok(())
    }

    /// All entries, newest first, optionally of one type
    pub fn list_files(&self, file_type: Option<FileType>) -> Result<Vec<LockerFile>> {
        let mut files: Vec<LockerFile> = self
            .files
            .get_all()?
            .into_iter()
            .filter(|f| file_type.map_or(true, |t| f.file_type == t))
            .collect();
        files.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(files)
    }

    pub fn list_files_for_subject(&self, subject_id: Uuid) -> Result<Vec<LockerFile>> {
        let mut files = self.files.get_all_by_foreign_key(subject_id)?;
        files.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(files)
    }

    pub fn get_file(&self, id: Uuid) -> Result<Option<LockerFile>> {
        self.files.get_by_id(id)
    }

    pub fn add_file(&self, request: FileRequest) -> Result<LockerFile> {
        let mut file = LockerFile::new(String::new(), request.file_type);
        Self::apply(&mut file, request)?;
        self.files.put(&file)?;
        log::info!("Added {} '{}' to locker", file.file_type.label(), file.name);
        Ok(file)
    }

    /// Edit an entry, keeping its creation time
    pub fn update_file(&self, id: Uuid, request: FileRequest) -> Result<LockerFile> {
        let mut file = self
            .get_file(id)?
            .ok_or_else(|| StorageError::NotFound(format!("File {}", id)))?;
        Self::apply(&mut file, request)?;
        self.files.put(&file)?;
        Ok(file)
    }

    pub fn delete_file(&self, id: Uuid) -> Result<bool> {
        self.files.delete(id)
    }

    pub fn stats(&self) -> Result<LockerStats> {
        Ok(LockerStats::from_files(&self.files.get_all()?))
    }

    /// Detach entries from a deleted subject; they stay in the locker as general files
    pub fn unlink_subject(&self, subject_id: Uuid) -> Result<usize> {
        let linked = self.files.get_all_by_foreign_key(subject_id)?;
        for mut file in linked.iter().cloned() {
            file.subject_id = None;
            self.files.put(&file)?;
        }
        Ok(linked.len())
    }
}
