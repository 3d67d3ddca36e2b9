//! Grade formulas and the grade book
//!
//! This module provides:
//! - A small formula language (variables, numbers, `%`, brackets, `+ - * /`)
//!   with a tokenizer and a never-failing evaluator
//! - Static analysis: variable extraction, bracket balance, highlighting
//! - The survival solver (grade still needed to pass)
//! - Grade schemes and entries per subject, with variable types
//! - Debounced recalculation for live grade input

pub mod analyzer;
pub mod builder;
pub mod debounce;
pub mod evaluator;
pub mod highlight;
pub mod models;
pub mod storage;
pub mod summary;
pub mod survival;
pub mod tokenizer;
pub mod variables;

pub use analyzer::{bracket_info, closing_sequence, extract_vars, BracketInfo};
pub use builder::{FormulaBuilder, FormulaStatus};
pub use debounce::RecalcDebouncer;
pub use evaluator::evaluate;
pub use highlight::{highlight, Span, SpanKind};
pub use models::*;
pub use storage::{prepare_formula, GradeBook, GradeError};
pub use summary::{GradeStatus, GradeSummary, SurvivalGrade, VariableGrade};
pub use survival::calc_survival;
pub use tokenizer::{tokenize, Token};
pub use variables::{VariableType, VariableTypes};
