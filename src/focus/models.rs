//! Focus session data models

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::storage::Record;

/// Sessions shorter than this are discarded
pub const DEFAULT_MIN_SESSION_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusSession {
    pub id: Uuid,
    /// `None` is general study
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub subject_id: Option<Uuid>,
    /// Local day the session was recorded on
    pub date: NaiveDate,
    /// Minutes, one decimal
    pub duration: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: DateTime<Utc>,
}

impl Record for FocusSession {
    const COLLECTION: &'static str = "focusSessions";

    fn id(&self) -> Uuid {
        self.id
    }

    fn foreign_key(&self) -> Option<Uuid> {
        self.subject_id
    }
}

/// Seconds to minutes, rounded to one decimal
pub fn secs_to_minutes(secs: u64) -> f64 {
    (secs as f64 / 60.0 * 10.0).round() / 10.0
}

/// Study time of one subject, or of general study when `subject_id` is `None`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    pub subject_id: Option<Uuid>,
    pub minutes: f64,
}

/// Minutes per subject, most studied first
pub fn ranking(sessions: &[FocusSession]) -> Vec<RankingEntry> {
    let mut totals: HashMap<Option<Uuid>, f64> = HashMap::new();
    for session in sessions {
        *totals.entry(session.subject_id).or_insert(0.0) += session.duration;
    }

    let mut entries: Vec<RankingEntry> = totals
        .into_iter()
        .map(|(subject_id, minutes)| RankingEntry {
            subject_id,
            minutes,
        })
        .collect();
    entries.sort_by(|a, b| b.minutes.total_cmp(&a.minutes));
    entries
}

pub fn total_minutes_on(sessions: &[FocusSession], day: NaiveDate) -> f64 {
    sessions
        .iter()
        .filter(|s| s.date == day)
        .map(|s| s.duration)
        .sum()
}

/// `45min`, `1h 30min` or `2h`
pub fn format_duration(minutes: f64) -> String {
    let total = minutes.max(0.0).round() as u64;
    if total < 60 {
        return format!("{}min", total);
    }
    let (h, m) = (total / 60, total % 60);
    if m == 0 {
        format!("{}h", h)
    } else {
        format!("{}h {}min", h, m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(subject_id: Option<Uuid>, date: &str, duration: f64) -> FocusSession {
        FocusSession {
            id: Uuid::new_v4(),
            subject_id,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            duration,
            started_at: None,
            ended_at: Utc::now(),
        }
    }

    #[test]
    fn test_secs_to_minutes() {
        assert_eq!(secs_to_minutes(10), 0.2);
        assert_eq!(secs_to_minutes(90), 1.5);
        assert_eq!(secs_to_minutes(1500), 25.0);
    }

    #[test]
    fn test_ranking_groups_and_sorts() {
        let calc = Some(Uuid::new_v4());
        let fis = Some(Uuid::new_v4());
        let sessions = vec![
            session(calc, "2026-03-10", 25.0),
            session(None, "2026-03-10", 10.0),
            session(fis, "2026-03-09", 50.0),
            session(calc, "2026-03-08", 30.5),
        ];

        let ranked = ranking(&sessions);
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].subject_id, calc);
        assert_eq!(ranked[0].minutes, 55.5);
        assert_eq!(ranked[1].subject_id, fis);
        assert_eq!(ranked[2].subject_id, None);
    }

    #[test]
    fn test_total_minutes_on() {
        let sessions = vec![
            session(None, "2026-03-10", 25.0),
            session(None, "2026-03-10", 5.5),
            session(None, "2026-03-09", 50.0),
        ];
        let day = NaiveDate::parse_from_str("2026-03-10", "%Y-%m-%d").unwrap();
        assert_eq!(total_minutes_on(&sessions, day), 30.5);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.2), "0min");
        assert_eq!(format_duration(45.0), "45min");
        assert_eq!(format_duration(90.0), "1h 30min");
        assert_eq!(format_duration(120.0), "2h");
        assert_eq!(format_duration(119.8), "2h");
    }
}
