//! Timeline data models: exams, assignments, events and reminders

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::storage::Record;

/// How long before a timed event its reminder fires
pub const REMINDER_LEAD_MINUTES: i64 = 10;

/// Days ahead that count as "this week"
pub const WEEK_HORIZON_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Prova,
    Trabalho,
    Evento,
    Lembrete,
}

impl EventType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Prova => "Prova",
            Self::Trabalho => "Trabalho",
            Self::Evento => "Evento",
            Self::Lembrete => "Lembrete",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "prova" | "exam" => Some(Self::Prova),
            "trabalho" | "assignment" => Some(Self::Trabalho),
            "evento" | "event" => Some(Self::Evento),
            "lembrete" | "reminder" => Some(Self::Lembrete),
            _ => None,
        }
    }
}

impl Default for EventType {
    fn default() -> Self {
        Self::Prova
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "type", default)]
    pub event_type: EventType,
    pub date: NaiveDate,
    /// `HH:MM`; events without a time are all-day
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub subject_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn new(title: String, event_type: EventType, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            event_type,
            date,
            time: None,
            subject_id: None,
            location: None,
            notes: None,
            completed: false,
            created_at: Utc::now(),
        }
    }

    /// Local moment the reminder should fire, for timed events only
    pub fn reminder_at(&self) -> Option<NaiveDateTime> {
        let time = NaiveTime::parse_from_str(self.time.as_deref()?, "%H:%M").ok()?;
        Some(self.date.and_time(time) - Duration::minutes(REMINDER_LEAD_MINUTES))
    }
}

impl Record for Event {
    const COLLECTION: &'static str = "events";

    fn id(&self) -> Uuid {
        self.id
    }

    fn foreign_key(&self) -> Option<Uuid> {
        self.subject_id
    }
}

/// Fields for creating or editing an event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest {
    pub title: String,
    pub event_type: EventType,
    pub date: NaiveDate,
    pub time: Option<String>,
    pub subject_id: Option<Uuid>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventFilter {
    /// Today onwards, soonest first
    #[default]
    Upcoming,
    /// Before today, most recent first
    Past,
    /// Everything, soonest first
    All,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineStats {
    pub upcoming: usize,
    /// Upcoming within the next seven days
    pub this_week: usize,
    /// Past and not completed
    pub overdue: usize,
}

/// Apply a filter and sort by date, then time (all-day events first)
pub fn filter_events(events: Vec<Event>, filter: EventFilter, today: NaiveDate) -> Vec<Event> {
    let mut filtered: Vec<Event> = events
        .into_iter()
        .filter(|e| match filter {
            EventFilter::Upcoming => e.date >= today,
            EventFilter::Past => e.date < today,
            EventFilter::All => true,
        })
        .collect();

    filtered.sort_by(|a, b| {
        let by_date = a.date.cmp(&b.date);
        let by_date = if filter == EventFilter::Past {
            by_date.reverse()
        } else {
            by_date
        };
        by_date.then_with(|| {
            a.time
                .as_deref()
                .unwrap_or("")
                .cmp(b.time.as_deref().unwrap_or(""))
        })
    });
    filtered
}

pub fn timeline_stats(events: &[Event], today: NaiveDate) -> TimelineStats {
    let horizon = today + Duration::days(WEEK_HORIZON_DAYS);
    TimelineStats {
        upcoming: events.iter().filter(|e| e.date >= today).count(),
        this_week: events
            .iter()
            .filter(|e| e.date >= today && e.date <= horizon)
            .count(),
        overdue: events
            .iter()
            .filter(|e| e.date < today && !e.completed)
            .count(),
    }
}

/// Day relative to today: `Hoje`, `Amanhã`, `Em 3 dias`, or the date itself
pub fn relative_day(date: NaiveDate, today: NaiveDate) -> String {
    let diff = (date - today).num_days();
    match diff {
        0 => "Hoje".to_string(),
        1 => "Amanhã".to_string(),
        -1 => "Ontem".to_string(),
        2..=7 => format!("Em {} dias", diff),
        -7..=-2 => format!("{} dias atrás", -diff),
        _ => date.format("%d/%m/%Y").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn event(title: &str, date: &str, time: Option<&str>) -> Event {
        let mut e = Event::new(title.to_string(), EventType::Prova, day(date));
        e.time = time.map(String::from);
        e
    }

    fn titles(events: &[Event]) -> Vec<&str> {
        events.iter().map(|e| e.title.as_str()).collect()
    }

    #[test]
    fn test_upcoming_sorted_by_date_then_time() {
        let today = day("2026-03-10");
        let events = vec![
            event("late", "2026-03-12", Some("14:00")),
            event("past", "2026-03-01", None),
            event("early", "2026-03-12", Some("08:00")),
            event("today", "2026-03-10", None),
        ];
        let upcoming = filter_events(events, EventFilter::Upcoming, today);
        assert_eq!(titles(&upcoming), vec!["today", "early", "late"]);
    }

    #[test]
    fn test_past_most_recent_first() {
        let today = day("2026-03-10");
        let events = vec![
            event("old", "2026-01-05", None),
            event("recent", "2026-03-09", None),
            event("future", "2026-04-01", None),
        ];
        let past = filter_events(events.clone(), EventFilter::Past, today);
        assert_eq!(titles(&past), vec!["recent", "old"]);

        let all = filter_events(events, EventFilter::All, today);
        assert_eq!(titles(&all), vec!["old", "recent", "future"]);
    }

    #[test]
    fn test_stats() {
        let today = day("2026-03-10");
        let mut done = event("done", "2026-03-01", None);
        done.completed = true;
        let events = vec![
            event("tomorrow", "2026-03-11", None),
            event("in a week", "2026-03-17", None),
            event("next month", "2026-04-20", None),
            event("missed", "2026-03-02", None),
            done,
        ];
        assert_eq!(
            timeline_stats(&events, today),
            TimelineStats {
                upcoming: 3,
                this_week: 2,
                overdue: 1,
            }
        );
    }

    #[test]
    fn test_relative_day() {
        let today = day("2026-03-10");
        assert_eq!(relative_day(today, today), "Hoje");
        assert_eq!(relative_day(day("2026-03-11"), today), "Amanhã");
        assert_eq!(relative_day(day("2026-03-09"), today), "Ontem");
        assert_eq!(relative_day(day("2026-03-15"), today), "Em 5 dias");
        assert_eq!(relative_day(day("2026-03-05"), today), "5 dias atrás");
        assert_eq!(relative_day(day("2026-05-01"), today), "01/05/2026");
    }

    #[test]
    fn test_reminder_at() {
        let timed = event("exam", "2026-03-10", Some("08:05"));
        assert_eq!(
            timed.reminder_at().map(|t| t.format("%Y-%m-%d %H:%M").to_string()),
            Some("2026-03-10 07:55".to_string())
        );
        assert_eq!(event("all day", "2026-03-10", None).reminder_at(), None);
    }

    #[test]
    fn test_type_serialized_lowercase() {
        let json = serde_json::to_value(event("x", "2026-03-10", None)).unwrap();
        assert_eq!(json["type"], "prova");
        assert_eq!(json["date"], "2026-03-10");
    }
}
