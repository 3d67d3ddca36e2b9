//! Digital locker: PDFs, images, links and notes, optionally tied to a
//! subject or an event

pub mod models;
pub mod storage;

pub use models::*;
pub use storage::LockerStorage;
