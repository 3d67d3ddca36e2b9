//! Focus mode: a pomodoro-style timer and the study sessions it records

pub mod models;
pub mod storage;
pub mod timer;

pub use models::*;
pub use storage::{FocusError, FocusStorage};
pub use timer::{format_timer, FocusTimer, TimerState};
