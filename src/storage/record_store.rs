//! Generic record persistence
//!
//! Each collection is stored as a single JSON array:
//! ```text
//! {data_dir}/
//! ├── subjects.json
//! ├── gradeSchemes.json
//! ├── grades.json
//! ├── flashcards.json
//! └── ...
//! ```
//!
//! Writes are full-value replaces keyed by id, so the last write wins.

use std::fs;
use std::marker::PhantomData;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use super::file_storage::Result;

/// A persistable entity
pub trait Record: Serialize + DeserializeOwned + Clone {
    /// File stem of the collection this record lives in
    const COLLECTION: &'static str;

    /// Primary key
    fn id(&self) -> Uuid;

    /// Secondary index (the owning subject), if the record has one
    fn foreign_key(&self) -> Option<Uuid> {
        None
    }
}

/// File-backed store for one record kind
#[derive(Debug, Clone)]
pub struct RecordStore<T: Record> {
    data_dir: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: Record> RecordStore<T> {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            _marker: PhantomData,
        }
    }

    fn collection_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.json", T::COLLECTION))
    }

    /// List every record in the collection
    pub fn get_all(&self) -> Result<Vec<T>> {
        let path = self.collection_path();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        let records: Vec<T> = serde_json::from_str(&content)?;
        Ok(records)
    }

    /// Get a record by primary key
    pub fn get_by_id(&self, id: Uuid) -> Result<Option<T>> {
        Ok(self.get_all()?.into_iter().find(|r| r.id() == id))
    }

    /// List all records whose foreign key equals `key`
    pub fn get_all_by_foreign_key(&self, key: Uuid) -> Result<Vec<T>> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|r| r.foreign_key() == Some(key))
            .collect())
    }

    /// Insert or replace a record
    pub fn put(&self, record: &T) -> Result<()> {
        let mut records = self.get_all()?;
        let id = record.id();
        match records.iter().position(|r| r.id() == id) {
            Some(pos) => records[pos] = record.clone(),
            None => records.push(record.clone()),
        }
        self.save_all(&records)
    }

    /// Delete a record. Returns whether anything was removed.
    pub fn delete(&self, id: Uuid) -> Result<bool> {
        let mut records = self.get_all()?;
        let len_before = records.len();
        records.retain(|r| r.id() != id);

        if records.len() == len_before {
            return Ok(false);
        }
        self.save_all(&records)?;
        Ok(true)
    }

    /// Delete every record matching the predicate, returning how many went
    pub fn delete_where<F>(&self, predicate: F) -> Result<usize>
    where
        F: Fn(&T) -> bool,
    {
        let mut records = self.get_all()?;
        let len_before = records.len();
        records.retain(|r| !predicate(r));

        let removed = len_before - records.len();
        if removed > 0 {
            self.save_all(&records)?;
        }
        Ok(removed)
    }

    pub fn count(&self) -> Result<usize> {
        Ok(self.get_all()?.len())
    }

    pub fn clear(&self) -> Result<()> {
        self.save_all(&[])
    }

    fn save_all(&self, records: &[T]) -> Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        let json = serde_json::to_string_pretty(records)?;
        fs::write(self.collection_path(), json)?;
        log::debug!("Saved {} record(s) to {}", records.len(), T::COLLECTION);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: Uuid,
        owner: Option<Uuid>,
        text: String,
    }

    impl Record for Note {
        const COLLECTION: &'static str = "notes";

        fn id(&self) -> Uuid {
            self.id
        }

        fn foreign_key(&self) -> Option<Uuid> {
            self.owner
        }
    }

    fn note(owner: Option<Uuid>, text: &str) -> Note {
        Note {
            id: Uuid::new_v4(),
            owner,
            text: text.to_string(),
        }
    }

    fn create_test_storage() -> (RecordStore<Note>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = RecordStore::new(temp_dir.path().to_path_buf());
        (store, temp_dir)
    }

    #[test]
    fn test_empty_collection() {
        let (store, _temp) = create_test_storage();
        assert!(store.get_all().unwrap().is_empty());
        assert_eq!(store.get_by_id(Uuid::new_v4()).unwrap(), None);
    }

    #[test]
    fn test_put_replaces_by_id() {
        let (store, _temp) = create_test_storage();

        let mut n = note(None, "first");
        store.put(&n).unwrap();
        n.text = "second".to_string();
        store.put(&n).unwrap();

        let all = store.get_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].text, "second");
    }

    #[test]
    fn test_foreign_key_index() {
        let (store, _temp) = create_test_storage();
        let owner = Uuid::new_v4();

        store.put(&note(Some(owner), "a")).unwrap();
        store.put(&note(Some(owner), "b")).unwrap();
        store.put(&note(Some(Uuid::new_v4()), "c")).unwrap();
        store.put(&note(None, "d")).unwrap();

        let owned = store.get_all_by_foreign_key(owner).unwrap();
        assert_eq!(owned.len(), 2);
        assert!(owned.iter().all(|n| n.owner == Some(owner)));
    }

    #[test]
    fn test_delete() {
        let (store, _temp) = create_test_storage();
        let n = note(None, "gone");
        store.put(&n).unwrap();

        assert!(store.delete(n.id).unwrap());
        assert!(!store.delete(n.id).unwrap());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_delete_where() {
        let (store, _temp) = create_test_storage();
        let owner = Uuid::new_v4();
        store.put(&note(Some(owner), "a")).unwrap();
        store.put(&note(Some(owner), "b")).unwrap();
        store.put(&note(None, "c")).unwrap();

        let removed = store.delete_where(|n| n.owner == Some(owner)).unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.count().unwrap(), 1);
    }
}
