//! Data models for the flashcard system

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::storage::Record;

/// Repetitions after which a card counts as mastered
pub const MASTERED_REPETITIONS: u32 = 5;

/// A flashcard with question (front) and answer (back)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub id: Uuid,
    pub front: String,
    pub back: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub subject_id: Option<Uuid>,
    #[serde(flatten)]
    pub scheduling: SchedulingState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Flashcard {
    pub fn new(front: String, back: String, subject_id: Option<Uuid>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            front,
            back,
            subject_id,
            scheduling: SchedulingState::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.scheduling.is_due(now)
    }

    pub fn state(&self) -> CardState {
        self.scheduling.state()
    }
}

impl Record for Flashcard {
    const COLLECTION: &'static str = "flashcards";

    fn id(&self) -> Uuid {
        self.id
    }

    fn foreign_key(&self) -> Option<Uuid> {
        self.subject_id
    }
}

/// SM-2 scheduling state of a card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingState {
    /// SM-2 ease factor, never below 1.3
    #[serde(default = "default_ease_factor")]
    pub ease_factor: f64,
    /// Current interval in days
    #[serde(default)]
    pub interval: u32,
    /// Consecutive successful reviews
    #[serde(default)]
    pub repetitions: u32,
    #[serde(default)]
    pub next_review: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_reviewed: Option<DateTime<Utc>>,
}

fn default_ease_factor() -> f64 {
    2.5
}

impl Default for SchedulingState {
    fn default() -> Self {
        Self {
            ease_factor: default_ease_factor(),
            interval: 0,
            repetitions: 0,
            next_review: None,
            last_reviewed: None,
        }
    }
}

impl SchedulingState {
    /// Due when never scheduled or when the scheduled moment has arrived
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review.map_or(true, |next| next <= now)
    }

    pub fn state(&self) -> CardState {
        if self.last_reviewed.is_none() {
            CardState::New
        } else if self.repetitions >= MASTERED_REPETITIONS {
            CardState::Mastered
        } else {
            CardState::Learning
        }
    }
}

/// Where a card is in the learning process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CardState {
    /// Never reviewed
    New,
    /// Reviewed, not yet mastered (includes cards reset by a failed review)
    Learning,
    /// At least [`MASTERED_REPETITIONS`] consecutive successful reviews
    Mastered,
}

impl CardState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Learning => "learning",
            Self::Mastered => "mastered",
        }
    }
}

/// Answer quality, one per review button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Quality {
    Again,
    Hard,
    Good,
    Easy,
}

impl Quality {
    /// SM-2 quality on the 0-5 scale
    pub fn score(&self) -> u8 {
        match self {
            Self::Again => 0,
            Self::Hard => 3,
            Self::Good => 4,
            Self::Easy => 5,
        }
    }

    pub fn all() -> [Quality; 4] {
        [Self::Again, Self::Hard, Self::Good, Self::Easy]
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "again" | "0" => Some(Self::Again),
            "hard" | "3" => Some(Self::Hard),
            "good" | "4" => Some(Self::Good),
            "easy" | "5" => Some(Self::Easy),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Again => "again",
            Self::Hard => "hard",
            Self::Good => "good",
            Self::Easy => "easy",
        }
    }
}

/// Statistics over a set of cards
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    pub total_cards: usize,
    pub due_cards: usize,
    pub new_cards: usize,
    pub learning_cards: usize,
    pub mastered_cards: usize,
}

impl ReviewStats {
    pub fn from_cards(cards: &[Flashcard], now: DateTime<Utc>) -> Self {
        let mut stats = Self {
            total_cards: cards.len(),
            ..Self::default()
        };

        for card in cards {
            match card.state() {
                CardState::New => stats.new_cards += 1,
                CardState::Learning => stats.learning_cards += 1,
                CardState::Mastered => stats.mastered_cards += 1,
            }
            if card.is_due(now) {
                stats.due_cards += 1;
            }
        }

        stats
    }
}
