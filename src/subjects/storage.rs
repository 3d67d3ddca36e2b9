//! Subject storage implementation

use uuid::Uuid;

use super::models::*;
use crate::storage::{FileStorage, RecordStore, StorageError};

type Result<T> = std::result::Result<T, StorageError>;

/// Storage for subjects
pub struct SubjectStorage {
    subjects: RecordStore<Subject>,
}

impl SubjectStorage {
    pub fn new(storage: &FileStorage) -> Self {
        Self {
            subjects: storage.store(),
        }
    }

    /// List all subjects, sorted by name
    pub fn list_subjects(&self) -> Result<Vec<Subject>> {
        let mut subjects = self.subjects.get_all()?;
        subjects.sort_by_key(|s| s.name.to_lowercase());
        Ok(subjects)
    }

    pub fn get_subject(&self, id: Uuid) -> Result<Option<Subject>> {
        self.subjects.get_by_id(id)
    }

    pub fn create_subject(&self, name: &str, color: Option<String>) -> Result<Subject> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StorageError::InvalidOperation(
                "Subject name cannot be empty".to_string(),
            ));
        }

        let subject = Subject::new(name.to_string(), color);
        self.subjects.put(&subject)?;
        log::info!("Created subject '{}' ({})", subject.name, subject.id);
        Ok(subject)
    }

    /// Replace a subject. `created_at` of the stored version is kept.
    pub fn update_subject(&self, subject: &Subject) -> Result<Subject> {
        let existing = self
            .subjects
            .get_by_id(subject.id)?
            .ok_or_else(|| StorageError::NotFound(format!("Subject {}", subject.id)))?;

        let mut updated = subject.clone();
        updated.created_at = existing.created_at;
        self.subjects.put(&updated)?;
        Ok(updated)
    }

    /// Delete the subject record only. Dependent records are removed by the
    /// caller (see the grade book and roadmap).
    pub fn delete_subject(&self, id: Uuid) -> Result<bool> {
        let removed = self.subjects.delete(id)?;
        if removed {
            log::info!("Deleted subject {}", id);
        }
        Ok(removed)
    }

    /// Subjects matching a query: an exact id, else an exact
    /// case-insensitive name, else every case-insensitive name prefix match
    pub fn find_subjects(&self, query: &str) -> Result<Vec<Subject>> {
        let subjects = self.list_subjects()?;

        if let Ok(id) = Uuid::parse_str(query.trim()) {
            return Ok(subjects.into_iter().filter(|s| s.id == id).collect());
        }

        let query = query.trim().to_lowercase();
        if let Some(exact) = subjects.iter().find(|s| s.name.to_lowercase() == query) {
            return Ok(vec![exact.clone()]);
        }

        Ok(subjects
            .into_iter()
            .filter(|s| s.name.to_lowercase().starts_with(&query))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_storage() -> (SubjectStorage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path().to_path_buf());
        (SubjectStorage::new(&storage), temp_dir)
    }

    #[test]
    fn test_create_and_list_sorted() {
        let (storage, _temp) = create_test_storage();
        storage.create_subject("física", None).unwrap();
        storage.create_subject("Álgebra", None).unwrap();
        storage.create_subject("Cálculo", Some("#22c55e".into())).unwrap();

        let names: Vec<String> = storage
            .list_subjects()
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Cálculo", "física", "Álgebra"]);
    }

    #[test]
    fn test_empty_name_rejected() {
        let (storage, _temp) = create_test_storage();
        assert!(matches!(
            storage.create_subject("   ", None),
            Err(StorageError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_find_subjects() {
        let (storage, _temp) = create_test_storage();
        let calc1 = storage.create_subject("Cálculo I", None).unwrap();
        storage.create_subject("Cálculo II", None).unwrap();
        storage.create_subject("Física", None).unwrap();

        assert_eq!(storage.find_subjects("cálculo").unwrap().len(), 2);
        assert_eq!(storage.find_subjects("cálculo i").unwrap(), vec![calc1.clone()]);
        assert_eq!(storage.find_subjects("FÍS").unwrap().len(), 1);
        assert_eq!(storage.find_subjects(&calc1.id.to_string()).unwrap(), vec![calc1]);
        assert!(storage.find_subjects("química").unwrap().is_empty());
    }

    #[test]
    fn test_update_keeps_created_at() {
        let (storage, _temp) = create_test_storage();
        let subject = storage.create_subject("Física", None).unwrap();

        let mut edited = subject.clone();
        edited.name = "Física Experimental".into();
        edited.created_at = chrono::Utc::now() + chrono::Duration::days(3);

        let updated = storage.update_subject(&edited).unwrap();
        assert_eq!(updated.created_at, subject.created_at);
        assert_eq!(updated.name, "Física Experimental");
    }

    #[test]
    fn test_delete() {
        let (storage, _temp) = create_test_storage();
        let subject = storage.create_subject("Física", None).unwrap();
        assert!(storage.delete_subject(subject.id).unwrap());
        assert!(!storage.delete_subject(subject.id).unwrap());
        assert!(storage.get_subject(subject.id).unwrap().is_none());
    }
}
