pub mod cards;
pub mod config;
pub mod events;
pub mod files;
pub mod focus;
pub mod formula;
pub mod grades;
pub mod subjects;
pub mod topics;
pub mod vars;
