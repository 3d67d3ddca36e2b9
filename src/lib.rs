//! StudyFlow: a personal study manager.
//!
//! The library holds the domain logic and the file-backed storage; the
//! `studyflow-cli` binary is a thin front end over it.

pub mod config;
pub mod flashcards;
pub mod focus;
pub mod grades;
pub mod locker;
pub mod roadmap;
pub mod storage;
pub mod subjects;
pub mod timeline;

pub use config::AppConfig;
pub use storage::{FileStorage, StorageError};
