//! Per-subject grade summary: current result, status and survival grade

use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use super::evaluator::evaluate;
use super::models::{GradeEntry, GradeScheme, DEFAULT_PASSING_GRADE};
use super::survival::calc_survival;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GradeStatus {
    /// No formula, or nothing filled in yet
    Pending,
    /// Some variables filled in
    Partial,
    /// Everything filled in and at or above the passing grade
    Passing,
    /// Everything filled in and below the passing grade
    Failing,
}

impl GradeStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Partial => "partial",
            Self::Passing => "passing",
            Self::Failing => "failing",
        }
    }
}

/// One input field of the grade book
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableGrade {
    pub name: String,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurvivalGrade {
    /// Grade every remaining assessment needs
    pub needed: f64,
    /// Needed grade is above the difficulty threshold
    pub difficult: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeSummary {
    pub subject_id: Uuid,
    pub formula: Option<String>,
    pub passing_grade: f64,
    pub variables: Vec<VariableGrade>,
    pub filled: usize,
    /// Formula result with unfilled variables counted as 0
    pub current: Option<f64>,
    pub status: GradeStatus,
    pub survival: Option<SurvivalGrade>,
}

impl GradeSummary {
    pub fn total(&self) -> usize {
        self.variables.len()
    }
}

/// Summarize a subject's grades.
///
/// `entries` may contain values for variables the formula no longer uses;
/// those are ignored.
pub fn summarize(
    subject_id: Uuid,
    scheme: Option<&GradeScheme>,
    entries: &[GradeEntry],
    difficult_threshold: f64,
) -> GradeSummary {
    let filled_values: HashMap<String, f64> = entries
        .iter()
        .map(|e| (e.variable.clone(), e.value))
        .collect();

    let Some(scheme) = scheme.filter(|s| !s.formula.trim().is_empty()) else {
        return GradeSummary {
            subject_id,
            formula: None,
            passing_grade: scheme.map_or(DEFAULT_PASSING_GRADE, |s| s.passing_grade),
            variables: Vec::new(),
            filled: 0,
            current: None,
            status: GradeStatus::Pending,
            survival: None,
        };
    };

    let names = scheme.variables();
    let variables: Vec<VariableGrade> = names
        .iter()
        .map(|name| VariableGrade {
            name: name.clone(),
            value: filled_values.get(name).copied(),
        })
        .collect();

    let known: HashMap<String, f64> = variables
        .iter()
        .filter_map(|v| v.value.map(|value| (v.name.clone(), value)))
        .collect();
    let filled = known.len();
    let all_filled = !names.is_empty() && filled == names.len();

    let current = if filled > 0 {
        let full: HashMap<String, f64> = names
            .iter()
            .map(|name| (name.clone(), known.get(name).copied().unwrap_or(0.0)))
            .collect();
        Some(evaluate(&scheme.formula, &full))
    } else {
        None
    };

    let status = match current {
        None => GradeStatus::Pending,
        Some(result) if all_filled && result >= scheme.passing_grade => GradeStatus::Passing,
        Some(_) if all_filled => GradeStatus::Failing,
        Some(_) => GradeStatus::Partial,
    };

    let survival = if status == GradeStatus::Partial {
        calc_survival(&scheme.formula, &known, &names, scheme.passing_grade).map(|needed| {
            SurvivalGrade {
                needed,
                difficult: needed > difficult_threshold,
            }
        })
    } else {
        None
    };

    GradeSummary {
        subject_id,
        formula: Some(scheme.formula.clone()),
        passing_grade: scheme.passing_grade,
        variables,
        filled,
        current,
        status,
        survival,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheme(formula: &str) -> GradeScheme {
        GradeScheme::new(Uuid::new_v4(), formula.to_string(), 6.0)
    }

    fn entries(scheme: &GradeScheme, pairs: &[(&str, f64)]) -> Vec<GradeEntry> {
        pairs
            .iter()
            .map(|(name, value)| GradeEntry::new(scheme.subject_id, name, *value))
            .collect()
    }

    #[test]
    fn test_no_scheme_is_pending() {
        let summary = summarize(Uuid::new_v4(), None, &[], 10.0);
        assert_eq!(summary.status, GradeStatus::Pending);
        assert_eq!(summary.formula, None);
        assert_eq!(summary.passing_grade, DEFAULT_PASSING_GRADE);
    }

    #[test]
    fn test_nothing_filled_is_pending() {
        let scheme = scheme("(P1 + P2) / 2");
        let summary = summarize(scheme.subject_id, Some(&scheme), &[], 10.0);
        assert_eq!(summary.status, GradeStatus::Pending);
        assert_eq!(summary.total(), 2);
        assert_eq!(summary.current, None);
        assert_eq!(summary.survival, None);
    }

    #[test]
    fn test_partial_with_survival() {
        let scheme = scheme("(P1 + P2) / 2");
        let grades = entries(&scheme, &[("P1", 10.0)]);
        let summary = summarize(scheme.subject_id, Some(&scheme), &grades, 10.0);

        assert_eq!(summary.status, GradeStatus::Partial);
        assert_eq!(summary.filled, 1);
        assert_eq!(summary.current, Some(5.0));
        assert_eq!(
            summary.survival,
            Some(SurvivalGrade {
                needed: 2.0,
                difficult: false
            })
        );
    }

    #[test]
    fn test_difficult_survival() {
        let scheme = scheme("(P1 + P2) / 2");
        let grades = entries(&scheme, &[("P1", 0.5)]);
        let summary = summarize(scheme.subject_id, Some(&scheme), &grades, 10.0);

        let survival = summary.survival.unwrap();
        assert_eq!(survival.needed, 11.5);
        assert!(survival.difficult);
    }

    #[test]
    fn test_passing_and_failing() {
        let scheme = scheme("P1 * 40% + P2 * 60%");

        let passing = entries(&scheme, &[("P1", 6.0), ("P2", 7.0)]);
        let summary = summarize(scheme.subject_id, Some(&scheme), &passing, 10.0);
        assert_eq!(summary.status, GradeStatus::Passing);
        assert_eq!(summary.survival, None);

        let failing = entries(&scheme, &[("P1", 2.0), ("P2", 5.0)]);
        let summary = summarize(scheme.subject_id, Some(&scheme), &failing, 10.0);
        assert_eq!(summary.status, GradeStatus::Failing);
    }

    #[test]
    fn test_stale_entries_ignored() {
        let scheme = scheme("P1");
        let grades = entries(&scheme, &[("T9", 10.0)]);
        let summary = summarize(scheme.subject_id, Some(&scheme), &grades, 10.0);
        assert_eq!(summary.status, GradeStatus::Pending);
        assert_eq!(summary.filled, 0);
    }
}
