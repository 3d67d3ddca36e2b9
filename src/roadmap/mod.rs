//! Subject roadmaps: ordered topic checklists with progress

pub mod models;
pub mod storage;

pub use models::*;
pub use storage::RoadmapStorage;
