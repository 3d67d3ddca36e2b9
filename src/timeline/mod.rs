//! Academic timeline: exams, assignments, events and reminders

pub mod models;
pub mod storage;

pub use models::*;
pub use storage::EventStorage;
