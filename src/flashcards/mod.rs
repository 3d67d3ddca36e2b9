//! Flashcards and spaced repetition
//!
//! This module provides:
//! - Flashcard CRUD, optionally linked to a subject
//! - SM-2 spaced repetition algorithm
//! - Review sessions over the cards currently due

pub mod algorithm;
pub mod models;
pub mod session;
pub mod storage;

pub use models::*;
pub use session::ReviewSession;
pub use storage::{FlashcardError, FlashcardStorage};
