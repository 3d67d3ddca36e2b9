//! Review session: a working deck of due cards and a cursor into it

use chrono::{DateTime, Utc};

use super::algorithm::review_with;
use super::models::{Flashcard, Quality};

/// The deck is a snapshot of the cards due when the session started.
/// Rated cards leave the deck and are not re-admitted, even if they become
/// due again, until a new session starts.
#[derive(Debug, Clone, Default)]
pub struct ReviewSession {
    deck: Vec<Flashcard>,
    index: usize,
    reviewed: usize,
}

impl ReviewSession {
    /// Start a session over the cards due at `now`
    pub fn start(cards: Vec<Flashcard>, now: DateTime<Utc>) -> Self {
        let deck: Vec<Flashcard> = cards.into_iter().filter(|c| c.is_due(now)).collect();
        log::debug!("Review session started with {} due card(s)", deck.len());
        Self {
            deck,
            index: 0,
            reviewed: 0,
        }
    }

    pub fn current(&self) -> Option<&Flashcard> {
        self.deck.get(self.index)
    }

    /// Zero-based cursor position
    pub fn position(&self) -> usize {
        self.index
    }

    pub fn remaining(&self) -> usize {
        self.deck.len()
    }

    pub fn reviewed(&self) -> usize {
        self.reviewed
    }

    pub fn is_finished(&self) -> bool {
        self.deck.is_empty()
    }

    /// Rate the current card. The card leaves the deck and its rescheduled
    /// version is returned for persisting; `None` when the deck is empty.
    pub fn rate(&mut self, quality: Quality, now: DateTime<Utc>) -> Option<Flashcard> {
        let card = self.rescheduled(quality, now)?;
        self.advance();
        Some(card)
    }

    /// The current card as it would be after `quality`. The deck is untouched.
    pub fn rescheduled(&self, quality: Quality, now: DateTime<Utc>) -> Option<Flashcard> {
        let mut card = self.current()?.clone();
        card.scheduling = review_with(&card.scheduling, quality, now);
        card.updated_at = now;
        Some(card)
    }

    /// Drop the current card from the deck once its rating is stored
    pub fn advance(&mut self) {
        if self.index >= self.deck.len() {
            return;
        }
        self.deck.remove(self.index);
        if self.index >= self.deck.len() {
            self.index = 0;
        }
        self.reviewed += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn cards(n: usize) -> Vec<Flashcard> {
        (0..n)
            .map(|i| Flashcard::new(format!("Q{}", i), format!("A{}", i), None))
            .collect()
    }

    #[test]
    fn test_snapshot_only_due_cards() {
        let now = Utc::now();
        let mut all = cards(3);
        all[1].scheduling.next_review = Some(now + Duration::days(2));

        let session = ReviewSession::start(all, now);
        assert_eq!(session.remaining(), 2);
        assert_eq!(session.current().map(|c| c.front.as_str()), Some("Q0"));
    }

    #[test]
    fn test_rate_removes_card() {
        let now = Utc::now();
        let mut session = ReviewSession::start(cards(2), now);

        let rated = session.rate(Quality::Good, now).unwrap();
        assert_eq!(rated.front, "Q0");
        assert_eq!(rated.scheduling.repetitions, 1);
        assert_eq!(session.remaining(), 1);
        assert_eq!(session.current().map(|c| c.front.as_str()), Some("Q1"));
    }

    #[test]
    fn test_again_card_is_not_readmitted() {
        let now = Utc::now();
        let mut session = ReviewSession::start(cards(1), now);

        let rated = session.rate(Quality::Again, now).unwrap();
        assert_eq!(rated.scheduling.interval, 1);
        assert!(session.is_finished());
        assert!(session.current().is_none());
        assert!(session.rate(Quality::Good, now).is_none());
        assert_eq!(session.reviewed(), 1);
    }

    #[test]
    fn test_rescheduled_keeps_deck() {
        let now = Utc::now();
        let mut session = ReviewSession::start(cards(2), now);

        let preview = session.rescheduled(Quality::Good, now).unwrap();
        assert_eq!(preview.scheduling.repetitions, 1);
        assert_eq!(session.remaining(), 2);
        assert_eq!(session.reviewed(), 0);

        session.advance();
        assert_eq!(session.remaining(), 1);
        assert_eq!(session.current().map(|c| c.front.as_str()), Some("Q1"));
    }

    #[test]
    fn test_index_wraps_to_start() {
        let now = Utc::now();
        let mut session = ReviewSession::start(cards(3), now);
        session.index = 2;

        session.rate(Quality::Easy, now).unwrap();
        assert_eq!(session.position(), 0);
        assert_eq!(session.current().map(|c| c.front.as_str()), Some("Q0"));
    }
}
