//! Roadmap topic storage implementation

use uuid::Uuid;

use super::models::*;
use crate::storage::{FileStorage, RecordStore, StorageError};

type Result<T> = std::result::Result<T, StorageError>;

/// Storage for roadmap topics
pub struct RoadmapStorage {
    topics: RecordStore<Topic>,
}

fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StorageError::InvalidOperation(
            "Topic name cannot be empty".to_string(),
        ));
    }
    Ok(name.to_string())
}

impl RoadmapStorage {
    pub fn new(storage: &FileStorage) -> Self {
        Self {
            topics: storage.store(),
        }
    }

    /// Topics of a subject in roadmap order
    pub fn list_topics(&self, subject_id: Uuid) -> Result<Vec<Topic>> {
        let mut topics = self.topics.get_all_by_foreign_key(subject_id)?;
        topics.sort_by_key(|t| t.order);
        Ok(topics)
    }

    pub fn get_topic(&self, id: Uuid) -> Result<Option<Topic>> {
        self.topics.get_by_id(id)
    }

    /// Add a topic. Without an explicit order it goes to the end.
    pub fn add_topic(&self, subject_id: Uuid, name: &str, order: Option<u32>) -> Result<Topic> {
        let name = validate_name(name)?;
        let order = match order {
            Some(order) => order,
            None => self.topics.get_all_by_foreign_key(subject_id)?.len() as u32,
        };

        let topic = Topic::new(subject_id, name, order);
        self.topics.put(&topic)?;
        log::info!("Added topic '{}' to subject {}", topic.name, subject_id);
        Ok(topic)
    }

    /// Rename or reorder a topic; completion is kept
    pub fn update_topic(&self, id: Uuid, name: &str, order: Option<u32>) -> Result<Topic> {
        let mut topic = self
            .get_topic(id)?
            .ok_or_else(|| StorageError::NotFound(format!("Topic {}", id)))?;
        topic.name = validate_name(name)?;
        if let Some(order) = order {
            topic.order = order;
        }
        self.topics.put(&topic)?;
        Ok(topic)
    }

    pub fn toggle_topic(&self, id: Uuid) -> Result<Topic> {
        let mut topic = self
            .get_topic(id)?
            .ok_or_else(|| StorageError::NotFound(format!("Topic {}", id)))?;
        topic.completed = !topic.completed;
        self.topics.put(&topic)?;
        Ok(topic)
    }

    pub fn delete_topic(&self, id: Uuid) -> Result<bool> {
        self.topics.delete(id)
    }

    pub fn progress(&self, subject_id: Uuid) -> Result<RoadmapProgress> {
        Ok(RoadmapProgress::from_topics(&self.list_topics(subject_id)?))
    }

    /// Remove every topic of a subject
    pub fn remove_subject(&self, subject_id: Uuid) -> Result<usize> {
        self.topics.delete_where(|t| t.subject_id == subject_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_storage() -> (RoadmapStorage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path().to_path_buf());
        (RoadmapStorage::new(&storage), temp_dir)
    }

    #[test]
    fn test_new_topics_append() {
        let (storage, _temp) = create_test_storage();
        let subject = Uuid::new_v4();

        let first = storage.add_topic(subject, "Limites", None).unwrap();
        let second = storage.add_topic(subject, "Derivadas", None).unwrap();
        let other = storage.add_topic(Uuid::new_v4(), "Vetores", None).unwrap();

        assert_eq!(first.order, 0);
        assert_eq!(second.order, 1);
        assert_eq!(other.order, 0);
    }

    #[test]
    fn test_list_sorted_by_order() {
        let (storage, _temp) = create_test_storage();
        let subject = Uuid::new_v4();

        storage.add_topic(subject, "Integrais", Some(5)).unwrap();
        storage.add_topic(subject, "Limites", Some(0)).unwrap();
        storage.add_topic(subject, "Derivadas", Some(2)).unwrap();

        let names: Vec<String> = storage
            .list_topics(subject)
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["Limites", "Derivadas", "Integrais"]);
    }

    #[test]
    fn test_toggle_and_progress() {
        let (storage, _temp) = create_test_storage();
        let subject = Uuid::new_v4();

        let a = storage.add_topic(subject, "A", None).unwrap();
        storage.add_topic(subject, "B", None).unwrap();
        storage.add_topic(subject, "C", None).unwrap();

        assert!(storage.toggle_topic(a.id).unwrap().completed);
        assert_eq!(storage.progress(subject).unwrap().percent, 33);

        assert!(!storage.toggle_topic(a.id).unwrap().completed);
        assert_eq!(storage.progress(subject).unwrap().percent, 0);
    }

    #[test]
    fn test_update_keeps_completion() {
        let (storage, _temp) = create_test_storage();
        let subject = Uuid::new_v4();

        let topic = storage.add_topic(subject, "Séries", None).unwrap();
        storage.toggle_topic(topic.id).unwrap();

        let updated = storage.update_topic(topic.id, "Séries de Taylor", Some(3)).unwrap();
        assert!(updated.completed);
        assert_eq!(updated.order, 3);
        assert!(storage.update_topic(topic.id, " ", None).is_err());
    }

    #[test]
    fn test_remove_subject() {
        let (storage, _temp) = create_test_storage();
        let subject = Uuid::new_v4();
        let other = Uuid::new_v4();

        storage.add_topic(subject, "A", None).unwrap();
        storage.add_topic(subject, "B", None).unwrap();
        storage.add_topic(other, "C", None).unwrap();

        assert_eq!(storage.remove_subject(subject).unwrap(), 2);
        assert!(storage.list_topics(subject).unwrap().is_empty());
        assert_eq!(storage.list_topics(other).unwrap().len(), 1);
    }
}
