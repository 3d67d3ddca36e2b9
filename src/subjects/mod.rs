//! Subjects (disciplines) of the semester

pub mod models;
pub mod storage;

pub use models::*;
pub use storage::SubjectStorage;
