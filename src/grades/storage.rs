//! Grade book storage: grade schemes, grade entries and variable types
//!
//! Schemes live in `gradeSchemes.json` (one per subject), entries in
//! `grades.json` (one per subject and variable) and custom variable types
//! in `settings.json`.

use std::collections::HashMap;

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use super::analyzer::{bracket_info, closing_sequence, extract_vars};
use super::evaluator::evaluate;
use super::models::{GradeEntry, GradeScheme};
use super::summary::{summarize, GradeSummary};
use super::variables::{VariableType, VariableTypes};
use crate::storage::{FileStorage, RecordStore, SettingsStore, StorageError};

/// Value given to every variable when test-evaluating a formula before save
const TRIAL_VALUE: f64 = 5.0;

#[derive(Error, Debug)]
pub enum GradeError {
    #[error("Formula is empty")]
    EmptyFormula,

    #[error("Formula needs at least one variable (e.g. P1)")]
    NoVariables,

    #[error("Invalid formula: {0}")]
    InvalidFormula(String),

    #[error("Letter '{0}' is already in use")]
    DuplicateVariableLetter(char),

    #[error("Variable letter must be a single letter A-Z, got '{0}'")]
    InvalidVariableLetter(String),

    #[error("Variable name cannot be empty")]
    EmptyVariableName,

    #[error("Passing grade must be between 0 and 10, got {0}")]
    PassingGradeOutOfRange(f64),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, GradeError>;

/// Check a formula before it is persisted, returning the formula to store.
///
/// Unclosed brackets are closed rather than rejected.
pub fn prepare_formula(formula: &str) -> Result<String> {
    let formula = formula.trim();
    if formula.is_empty() {
        return Err(GradeError::EmptyFormula);
    }

    let mut formula = formula.to_string();
    if !bracket_info(&formula).balanced {
        let closers = closing_sequence(&formula);
        if !closers.is_empty() {
            log::info!("Auto-closing {} bracket(s) in '{}'", closers.len(), formula);
            formula.push_str(&closers);
        }
    }

    let variables = extract_vars(&formula);
    if variables.is_empty() {
        return Err(GradeError::NoVariables);
    }

    let trial: HashMap<String, f64> = variables.into_iter().map(|v| (v, TRIAL_VALUE)).collect();
    let result = evaluate(&formula, &trial);
    if !result.is_finite() {
        return Err(GradeError::InvalidFormula(formula));
    }

    Ok(formula)
}

fn check_passing_grade(passing_grade: f64) -> Result<()> {
    if (0.0..=10.0).contains(&passing_grade) {
        Ok(())
    } else {
        Err(GradeError::PassingGradeOutOfRange(passing_grade))
    }
}

/// Storage manager for grade schemes and entries
pub struct GradeBook {
    schemes: RecordStore<GradeScheme>,
    grades: RecordStore<GradeEntry>,
    settings: SettingsStore,
    difficult_threshold: f64,
}

impl GradeBook {
    pub fn new(storage: &FileStorage) -> Self {
        Self {
            schemes: storage.store(),
            grades: storage.store(),
            settings: storage.settings(),
            difficult_threshold: 10.0,
        }
    }

    /// Survival grades above this are flagged as difficult
    pub fn with_difficult_threshold(mut self, threshold: f64) -> Self {
        self.difficult_threshold = threshold;
        self
    }

    // ===== Schemes =====

    pub fn get_scheme(&self, subject_id: Uuid) -> Result<Option<GradeScheme>> {
        Ok(self
            .schemes
            .get_all_by_foreign_key(subject_id)?
            .into_iter()
            .next())
    }

    pub fn list_schemes(&self) -> Result<Vec<GradeScheme>> {
        Ok(self.schemes.get_all()?)
    }

    /// Validate and store a subject's formula, replacing any previous one.
    /// Existing grade entries are kept.
    pub fn save_scheme(
        &self,
        subject_id: Uuid,
        formula: &str,
        passing_grade: f64,
    ) -> Result<GradeScheme> {
        let formula = prepare_formula(formula)?;
        check_passing_grade(passing_grade)?;

        let scheme = match self.get_scheme(subject_id)? {
            Some(mut existing) => {
                existing.formula = formula;
                existing.passing_grade = passing_grade;
                existing.updated_at = Utc::now();
                existing
            }
            None => GradeScheme::new(subject_id, formula, passing_grade),
        };

        self.schemes.put(&scheme)?;
        log::info!("Saved grade scheme for subject {}: {}", subject_id, scheme.formula);
        Ok(scheme)
    }

    pub fn delete_scheme(&self, subject_id: Uuid) -> Result<bool> {
        let removed = self.schemes.delete_where(|s| s.subject_id == subject_id)?;
        Ok(removed > 0)
    }

    // ===== Grade entries =====

    pub fn grades_for(&self, subject_id: Uuid) -> Result<Vec<GradeEntry>> {
        Ok(self.grades.get_all_by_foreign_key(subject_id)?)
    }

    /// Set or clear one variable's grade. `None` removes the entry, which is
    /// how an unfilled variable is represented.
    pub fn set_grade(
        &self,
        subject_id: Uuid,
        variable: &str,
        value: Option<f64>,
    ) -> Result<Option<GradeEntry>> {
        let variable = variable.trim().to_ascii_uppercase();
        let existing = self
            .grades_for(subject_id)?
            .into_iter()
            .find(|g| g.variable == variable);

        match (value, existing) {
            (Some(value), Some(mut entry)) => {
                entry.value = value;
                entry.updated_at = Utc::now();
                self.grades.put(&entry)?;
                Ok(Some(entry))
            }
            (Some(value), None) => {
                let entry = GradeEntry::new(subject_id, &variable, value);
                self.grades.put(&entry)?;
                Ok(Some(entry))
            }
            (None, Some(entry)) => {
                self.grades.delete(entry.id)?;
                log::debug!("Cleared {} for subject {}", variable, subject_id);
                Ok(None)
            }
            (None, None) => Ok(None),
        }
    }

    /// Remove every grade entry of a subject
    pub fn clear_grades(&self, subject_id: Uuid) -> Result<usize> {
        let removed = self.grades.delete_where(|g| g.subject_id == subject_id)?;
        log::info!("Cleared {} grade(s) for subject {}", removed, subject_id);
        Ok(removed)
    }

    pub fn summary(&self, subject_id: Uuid) -> Result<GradeSummary> {
        let scheme = self.get_scheme(subject_id)?;
        let entries = self.grades_for(subject_id)?;
        Ok(summarize(
            subject_id,
            scheme.as_ref(),
            &entries,
            self.difficult_threshold,
        ))
    }

    /// Drop the scheme and grades of a deleted subject
    pub fn remove_subject(&self, subject_id: Uuid) -> Result<()> {
        self.delete_scheme(subject_id)?;
        self.clear_grades(subject_id)?;
        Ok(())
    }

    // ===== Variable types =====

    pub fn variable_types(&self) -> Result<VariableTypes> {
        VariableTypes::load(&self.settings)
    }

    pub fn add_variable_type(&self, letter: &str, name: &str) -> Result<VariableType> {
        let mut types = self.variable_types()?;
        let added = types.add(letter, name)?;
        types.save(&self.settings)?;
        Ok(added)
    }

    pub fn remove_variable_type(&self, letter: char) -> Result<bool> {
        let mut types = self.variable_types()?;
        let removed = types.remove(letter);
        if removed {
            types.save(&self.settings)?;
        }
        Ok(removed)
    }
}
