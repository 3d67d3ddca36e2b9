//! Roadmap data models: ordered study topics per subject

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::storage::Record;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: Uuid,
    pub subject_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub completed: bool,
}

impl Topic {
    pub fn new(subject_id: Uuid, name: String, order: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject_id,
            name,
            order,
            completed: false,
        }
    }
}

impl Record for Topic {
    const COLLECTION: &'static str = "topics";

    fn id(&self) -> Uuid {
        self.id
    }

    fn foreign_key(&self) -> Option<Uuid> {
        Some(self.subject_id)
    }
}

/// Completion of one subject's roadmap
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapProgress {
    pub completed: usize,
    pub total: usize,
    /// Rounded to the nearest whole percent; 0 when there are no topics
    pub percent: u32,
}

impl RoadmapProgress {
    pub fn from_topics(topics: &[Topic]) -> Self {
        let total = topics.len();
        let completed = topics.iter().filter(|t| t.completed).count();
        let percent = if total == 0 {
            0
        } else {
            (completed as f64 / total as f64 * 100.0).round() as u32
        };
        Self {
            completed,
            total,
            percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topics(done: &[bool]) -> Vec<Topic> {
        let subject = Uuid::new_v4();
        done.iter()
            .enumerate()
            .map(|(i, &completed)| {
                let mut t = Topic::new(subject, format!("Tópico {}", i + 1), i as u32);
                t.completed = completed;
                t
            })
            .collect()
    }

    #[test]
    fn test_progress_empty() {
        assert_eq!(RoadmapProgress::from_topics(&[]), RoadmapProgress::default());
    }

    #[test]
    fn test_progress_rounds() {
        let progress = RoadmapProgress::from_topics(&topics(&[true, false, false]));
        assert_eq!(progress.completed, 1);
        assert_eq!(progress.total, 3);
        assert_eq!(progress.percent, 33);

        let progress = RoadmapProgress::from_topics(&topics(&[true, true, false]));
        assert_eq!(progress.percent, 67);

        let progress = RoadmapProgress::from_topics(&topics(&[true, true]));
        assert_eq!(progress.percent, 100);
    }
}
