//! Focus timer state machine
//!
//! The timer does not own a clock thread. Whoever drives it calls
//! [`FocusTimer::tick`] once per second while it runs, the same way the
//! front end's interval did.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Ready,
    Running,
    Paused,
}

impl TimerState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ready => "Pronto",
            Self::Running => "Em foco...",
            Self::Paused => "Pausado",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusTimer {
    elapsed_secs: u64,
    running: bool,
    /// Set on the first start, cleared by reset
    started_at: Option<DateTime<Utc>>,
}

impl Default for FocusTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl FocusTimer {
    pub fn new() -> Self {
        Self {
            elapsed_secs: 0,
            running: false,
            started_at: None,
        }
    }

    pub fn start(&mut self, now: DateTime<Utc>) {
        self.running = true;
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Start when stopped, pause when running
    pub fn toggle(&mut self, now: DateTime<Utc>) {
        if self.running {
            self.pause();
        } else {
            self.start(now);
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Advance one second; ignored while paused
    pub fn tick(&mut self) {
        if self.running {
            self.elapsed_secs += 1;
        }
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn state(&self) -> TimerState {
        if self.running {
            TimerState::Running
        } else if self.elapsed_secs > 0 || self.started_at.is_some() {
            TimerState::Paused
        } else {
            TimerState::Ready
        }
    }

    pub fn display(&self) -> String {
        format_timer(self.elapsed_secs)
    }
}

/// `MM:SS`, or `H:MM:SS` from one hour on
pub fn format_timer(total_secs: u64) -> String {
    let h = total_secs / 3600;
    let m = (total_secs % 3600) / 60;
    let s = total_secs % 60;
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{:02}:{:02}", m, s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticks_only_count_while_running() {
        let mut timer = FocusTimer::new();
        timer.tick();
        assert_eq!(timer.elapsed_secs(), 0);
        assert_eq!(timer.state(), TimerState::Ready);

        let t0 = Utc::now();
        timer.start(t0);
        for _ in 0..3 {
            timer.tick();
        }
        timer.pause();
        timer.tick();
        assert_eq!(timer.elapsed_secs(), 3);
        assert_eq!(timer.state(), TimerState::Paused);

        timer.start(t0 + chrono::Duration::minutes(5));
        assert_eq!(timer.started_at(), Some(t0));
    }

    #[test]
    fn test_toggle_and_reset() {
        let mut timer = FocusTimer::new();
        timer.toggle(Utc::now());
        assert!(timer.is_running());
        timer.tick();
        timer.toggle(Utc::now());
        assert!(!timer.is_running());

        timer.reset();
        assert_eq!(timer, FocusTimer::new());
        assert_eq!(timer.display(), "00:00");
    }

    #[test]
    fn test_format_timer() {
        assert_eq!(format_timer(0), "00:00");
        assert_eq!(format_timer(65), "01:05");
        assert_eq!(format_timer(3599), "59:59");
        assert_eq!(format_timer(3600), "1:00:00");
        assert_eq!(format_timer(2 * 3600 + 61), "2:01:01");
    }
}
