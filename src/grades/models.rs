//! Data models for the grade book

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::analyzer::extract_vars;
use crate::storage::Record;

/// Default passing grade on the 0-10 scale
pub const DEFAULT_PASSING_GRADE: f64 = 6.0;

/// How a subject's final grade is computed. One per subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeScheme {
    pub id: Uuid,
    pub subject_id: Uuid,
    pub formula: String,
    #[serde(default = "default_passing_grade")]
    pub passing_grade: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_passing_grade() -> f64 {
    DEFAULT_PASSING_GRADE
}

impl GradeScheme {
    pub fn new(subject_id: Uuid, formula: String, passing_grade: f64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            subject_id,
            formula,
            passing_grade,
            created_at: now,
            updated_at: now,
        }
    }

    /// Variables referenced by the formula, in display order
    pub fn variables(&self) -> Vec<String> {
        extract_vars(&self.formula)
    }
}

impl Record for GradeScheme {
    const COLLECTION: &'static str = "gradeSchemes";

    fn id(&self) -> Uuid {
        self.id
    }

    fn foreign_key(&self) -> Option<Uuid> {
        Some(self.subject_id)
    }
}

/// A filled-in grade. An unfilled variable has no entry at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeEntry {
    pub id: Uuid,
    pub subject_id: Uuid,
    /// Upper-cased variable name, e.g. `P1`
    pub variable: String,
    pub value: f64,
    pub updated_at: DateTime<Utc>,
}

impl GradeEntry {
    pub fn new(subject_id: Uuid, variable: &str, value: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject_id,
            variable: variable.to_ascii_uppercase(),
            value,
            updated_at: Utc::now(),
        }
    }
}

impl Record for GradeEntry {
    const COLLECTION: &'static str = "grades";

    fn id(&self) -> Uuid {
        self.id
    }

    fn foreign_key(&self) -> Option<Uuid> {
        Some(self.subject_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_serializes_camel_case() {
        let scheme = GradeScheme::new(Uuid::new_v4(), "(P1+P2)/2".to_string(), 6.0);
        let json = serde_json::to_value(&scheme).unwrap();
        assert!(json.get("subjectId").is_some());
        assert!(json.get("passingGrade").is_some());
    }

    #[test]
    fn test_missing_passing_grade_defaults() {
        let json = serde_json::json!({
            "id": Uuid::new_v4(),
            "subjectId": Uuid::new_v4(),
            "formula": "P1",
            "createdAt": Utc::now(),
            "updatedAt": Utc::now(),
        });
        let scheme: GradeScheme = serde_json::from_value(json).unwrap();
        assert_eq!(scheme.passing_grade, DEFAULT_PASSING_GRADE);
    }

    #[test]
    fn test_entry_variable_is_upper_cased() {
        let entry = GradeEntry::new(Uuid::new_v4(), "p1", 7.5);
        assert_eq!(entry.variable, "P1");
    }
}
