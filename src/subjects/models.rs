//! Subject data models

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::storage::Record;

/// Colours offered for subjects; the first is the default
pub const SUBJECT_COLORS: [&str; 12] = [
    "#6366f1", "#8b5cf6", "#a855f7", "#3b82f6", "#06b6d4", "#22c55e", "#f59e0b", "#ef4444",
    "#ec4899", "#14b8a6", "#f97316", "#64748b",
];

/// Class days, Monday to Saturday
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Seg,
    Ter,
    Qua,
    Qui,
    Sex,
    Sab,
}

impl Weekday {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Seg => "Seg",
            Self::Ter => "Ter",
            Self::Qua => "Qua",
            Self::Qui => "Qui",
            Self::Sex => "Sex",
            Self::Sab => "Sáb",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "seg" | "mon" => Some(Self::Seg),
            "ter" | "tue" => Some(Self::Ter),
            "qua" | "wed" => Some(Self::Qua),
            "qui" | "thu" => Some(Self::Qui),
            "sex" | "fri" => Some(Self::Sex),
            "sab" | "sáb" | "sat" => Some(Self::Sab),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub teacher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub room: Option<String>,
    #[serde(default)]
    pub days: Vec<Weekday>,
    /// `HH:MM`
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub time_start: Option<String>,
    /// `HH:MM`
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub time_end: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Subject {
    pub fn new(name: String, color: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            color: color.unwrap_or_else(|| SUBJECT_COLORS[0].to_string()),
            teacher: None,
            room: None,
            days: Vec::new(),
            time_start: None,
            time_end: None,
            created_at: Utc::now(),
        }
    }

    /// Class schedule such as `Seg/Qua 08:00-10:00`, empty when unknown
    pub fn schedule(&self) -> String {
        let mut parts = Vec::new();
        if !self.days.is_empty() {
            let days: Vec<&str> = self.days.iter().map(|d| d.label()).collect();
            parts.push(days.join("/"));
        }
        match (&self.time_start, &self.time_end) {
            (Some(start), Some(end)) => parts.push(format!("{}-{}", start, end)),
            (Some(start), None) => parts.push(start.clone()),
            _ => {}
        }
        parts.join(" ")
    }
}

impl Record for Subject {
    const COLLECTION: &'static str = "subjects";

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Normalize a clock time to zero-padded `HH:MM`.
/// Returns `None` for anything that is not a valid time of day.
pub fn normalize_time(input: &str) -> Option<String> {
    NaiveTime::parse_from_str(input.trim(), "%H:%M")
        .ok()
        .map(|t| t.format("%H:%M").to_string())
}
