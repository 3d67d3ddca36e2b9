//! Storage operations for flashcards
//!
//! Cards live in `flashcards.json`, scheduling state inline with each card.

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use super::models::*;
use super::session::ReviewSession;
use crate::storage::{FileStorage, RecordStore, StorageError};

#[derive(Error, Debug)]
pub enum FlashcardError {
    #[error("Front and back of a card cannot be empty")]
    EmptyFace,

    #[error("Card not found: {0}")]
    CardNotFound(Uuid),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, FlashcardError>;

/// Trimmed front and back, or `EmptyFace`
fn check_faces(front: &str, back: &str) -> Result<(String, String)> {
    let front = front.trim();
    let back = back.trim();
    if front.is_empty() || back.is_empty() {
        return Err(FlashcardError::EmptyFace);
    }
    Ok((front.to_string(), back.to_string()))
}

/// Storage manager for flashcard operations
pub struct FlashcardStorage {
    cards: RecordStore<Flashcard>,
}

impl FlashcardStorage {
    pub fn new(storage: &FileStorage) -> Self {
        Self {
            cards: storage.store(),
        }
    }

    // ==================== Card Operations ====================

    pub fn list_cards(&self) -> Result<Vec<Flashcard>> {
        Ok(self.cards.get_all()?)
    }

    pub fn list_cards_for_subject(&self, subject_id: Uuid) -> Result<Vec<Flashcard>> {
        Ok(self.cards.get_all_by_foreign_key(subject_id)?)
    }

    pub fn get_card(&self, card_id: Uuid) -> Result<Flashcard> {
        self.cards
            .get_by_id(card_id)?
            .ok_or(FlashcardError::CardNotFound(card_id))
    }

    pub fn create_card(&self, front: &str, back: &str, subject_id: Option<Uuid>) -> Result<Flashcard> {
        let (front, back) = check_faces(front, back)?;
        let card = Flashcard::new(front, back, subject_id);
        self.cards.put(&card)?;
        log::info!("Created flashcard {}", card.id);
        Ok(card)
    }

    /// Edit the content of a card. Scheduling state is kept.
    pub fn update_card(
        &self,
        card_id: Uuid,
        front: &str,
        back: &str,
        subject_id: Option<Uuid>,
    ) -> Result<Flashcard> {
        let (front, back) = check_faces(front, back)?;
        let mut card = self.get_card(card_id)?;
        card.front = front;
        card.back = back;
        card.subject_id = subject_id;
        card.updated_at = Utc::now();
        self.cards.put(&card)?;
        Ok(card)
    }

    pub fn delete_card(&self, card_id: Uuid) -> Result<()> {
        if !self.cards.delete(card_id)? {
            return Err(FlashcardError::CardNotFound(card_id));
        }
        log::info!("Deleted flashcard {}", card_id);
        Ok(())
    }

    /// Detach cards from a deleted subject; the cards themselves stay
    pub fn unlink_subject(&self, subject_id: Uuid) -> Result<usize> {
        let linked = self.list_cards_for_subject(subject_id)?;
        for mut card in linked.iter().cloned() {
            card.subject_id = None;
            self.cards.put(&card)?;
        }
        Ok(linked.len())
    }

    // ==================== Review Operations ====================

    /// Cards due right now
    pub fn get_due_cards(&self) -> Result<Vec<Flashcard>> {
        let now = Utc::now();
        Ok(self
            .list_cards()?
            .into_iter()
            .filter(|c| c.is_due(now))
            .collect())
    }

    pub fn start_session(&self) -> Result<ReviewSession> {
        Ok(ReviewSession::start(self.list_cards()?, Utc::now()))
    }

    /// Rate the current card of a session and persist its new schedule.
    /// The card stays in the deck if the write fails.
    pub fn rate_current(
        &self,
        session: &mut ReviewSession,
        quality: Quality,
    ) -> Result<Option<Flashcard>> {
        let Some(card) = session.rescheduled(quality, Utc::now()) else {
            return Ok(None);
        };
        self.cards.put(&card)?;
        session.advance();
        Ok(Some(card))
    }

    /// Rate a single card outside of a session
    pub fn submit_review(&self, card_id: Uuid, quality: Quality) -> Result<Flashcard> {
        let mut card = self.get_card(card_id)?;
        let now = Utc::now();
        card.scheduling = super::algorithm::review_with(&card.scheduling, quality, now);
        card.updated_at = now;
        self.cards.put(&card)?;
        Ok(card)
    }

    pub fn get_review_stats(&self) -> Result<ReviewStats> {
        Ok(ReviewStats::from_cards(&self.list_cards()?, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_storage() -> (FlashcardStorage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path().to_path_buf());
        (FlashcardStorage::new(&storage), temp_dir)
    }

    #[test]
    fn test_create_rejects_empty_faces() {
        let (storage, _temp) = create_test_storage();
        assert!(matches!(storage.create_card("  ", "A", None), Err(FlashcardError::EmptyFace)));
        assert!(matches!(storage.create_card("Q", "", None), Err(FlashcardError::EmptyFace)));
        assert!(storage.list_cards().unwrap().is_empty());
    }

    #[test]
    fn test_edit_preserves_scheduling() {
        let (storage, _temp) = create_test_storage();
        let card = storage.create_card(" What is 2+2? ", "4", None).unwrap();
        assert_eq!(card.front, "What is 2+2?");

        let reviewed = storage.submit_review(card.id, Quality::Good).unwrap();
        let edited = storage.update_card(card.id, "What is 2 + 2?", "Four", None).unwrap();

        assert_eq!(edited.scheduling, reviewed.scheduling);
        assert_eq!(storage.get_card(card.id).unwrap().back, "Four");
    }

    #[test]
    fn test_missing_card() {
        let (storage, _temp) = create_test_storage();
        let id = Uuid::new_v4();
        assert!(matches!(storage.get_card(id), Err(FlashcardError::CardNotFound(_))));
        assert!(matches!(storage.delete_card(id), Err(FlashcardError::CardNotFound(_))));
    }

    #[test]
    fn test_session_persists_ratings() {
        let (storage, _temp) = create_test_storage();
        storage.create_card("Q1", "A1", None).unwrap();
        storage.create_card("Q2", "A2", None).unwrap();

        let mut session = storage.start_session().unwrap();
        assert_eq!(session.remaining(), 2);

        storage.rate_current(&mut session, Quality::Good).unwrap();
        storage.rate_current(&mut session, Quality::Again).unwrap();
        assert!(session.is_finished());
        assert!(storage.rate_current(&mut session, Quality::Good).unwrap().is_none());

        // Both were scheduled at least a day out
        assert!(storage.get_due_cards().unwrap().is_empty());

        let stats = storage.get_review_stats().unwrap();
        assert_eq!(stats.total_cards, 2);
        assert_eq!(stats.due_cards, 0);
        assert_eq!(stats.new_cards, 0);
        assert_eq!(stats.learning_cards, 2);
    }

    #[test]
    fn test_failed_write_keeps_card_in_session() {
        let (storage, temp) = create_test_storage();
        storage.create_card("Q1", "A1", None).unwrap();
        let mut session = storage.start_session().unwrap();

        // A directory in place of the collection file makes every write fail
        let path = temp.path().join("flashcards.json");
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        assert!(storage.rate_current(&mut session, Quality::Good).is_err());
        assert_eq!(session.remaining(), 1);
        assert_eq!(session.reviewed(), 0);
    }

    #[test]
    fn test_repeated_easy_reviews_cap_interval() {
        let (storage, _temp) = create_test_storage();
        let card = storage.create_card("Q", "A", None).unwrap();

        let mut reviewed = card.clone();
        for _ in 0..40 {
            reviewed = storage.submit_review(card.id, Quality::Easy).unwrap();
        }
        assert_eq!(reviewed.scheduling.interval, crate::flashcards::algorithm::MAX_INTERVAL_DAYS);
        assert_eq!(storage.get_card(card.id).unwrap().scheduling, reviewed.scheduling);
    }

    #[test]
    fn test_unlink_subject() {
        let (storage, _temp) = create_test_storage();
        let subject = Uuid::new_v4();
        storage.create_card("Q", "A", Some(subject)).unwrap();
        storage.create_card("Q", "A", None).unwrap();

        assert_eq!(storage.unlink_subject(subject).unwrap(), 1);
        assert!(storage.list_cards_for_subject(subject).unwrap().is_empty());
        assert_eq!(storage.list_cards().unwrap().len(), 2);
    }
}
