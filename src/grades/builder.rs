//! Formula builder
//!
//! Editing context for a formula being assembled piece by piece (buttons in
//! a UI, arguments on the command line). Every operation mutates the builder
//! and the current state is read back with [`FormulaBuilder::status`].

use std::collections::HashMap;

use serde::Serialize;

use super::analyzer::{bracket_info, closing_sequence, extract_vars, split_var, BracketInfo};
use super::evaluator::evaluate;

/// Value given to every variable in the builder's preview evaluation
pub const PREVIEW_VALUE: f64 = 7.0;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormulaBuilder {
    formula: String,
}

/// Snapshot of the builder shown alongside the formula
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaStatus {
    pub variables: Vec<String>,
    pub brackets: BracketInfo,
    /// Result with every variable set to [`PREVIEW_VALUE`]; only computed
    /// when the formula has variables and balanced brackets
    pub preview: Option<f64>,
}

impl FormulaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_formula(formula: impl Into<String>) -> Self {
        Self {
            formula: formula.into(),
        }
    }

    pub fn formula(&self) -> &str {
        &self.formula
    }

    pub fn into_formula(self) -> String {
        self.formula
    }

    pub fn is_empty(&self) -> bool {
        self.formula.trim().is_empty()
    }

    /// Number the next variable of this letter would get
    pub fn next_index(&self, letter: char) -> u64 {
        let letter = letter.to_ascii_uppercase().to_string();
        extract_vars(&self.formula)
            .iter()
            .filter_map(|var| {
                let (prefix, digits) = split_var(var);
                (prefix == letter).then(|| digits.parse::<u64>().ok()).flatten()
            })
            .max()
            .unwrap_or(0)
            + 1
    }

    /// Append the next numbered variable of a type, returning its name
    pub fn insert_var(&mut self, letter: char) -> String {
        let name = format!("{}{}", letter.to_ascii_uppercase(), self.next_index(letter));
        self.formula.push_str(&name);
        name
    }

    /// Append raw text: digits, operators (` + `), brackets, `%`
    pub fn insert_char(&mut self, text: &str) {
        self.formula.push_str(text);
    }

    /// Delete backwards. A trailing variable goes as a whole; otherwise one
    /// character. Trailing whitespace is dropped first.
    pub fn backspace(&mut self) {
        let trimmed_len = self.formula.trim_end().len();
        self.formula.truncate(trimmed_len);
        if self.formula.is_empty() {
            return;
        }

        let var_len = trailing_var_len(&self.formula);
        if var_len > 0 {
            self.formula.truncate(self.formula.len() - var_len);
        } else {
            self.formula.pop();
        }
    }

    pub fn clear(&mut self) {
        self.formula.clear();
    }

    pub fn set_formula(&mut self, formula: impl Into<String>) {
        self.formula = formula.into();
    }

    /// Close every bracket left open, innermost first. Returns how many
    /// closers were appended.
    pub fn auto_close(&mut self) -> usize {
        let closers = closing_sequence(&self.formula);
        self.formula.push_str(&closers);
        closers.len()
    }

    pub fn status(&self) -> FormulaStatus {
        let variables = extract_vars(&self.formula);
        let brackets = bracket_info(&self.formula);

        let preview = if !variables.is_empty() && brackets.balanced {
            let values: HashMap<String, f64> = variables
                .iter()
                .map(|v| (v.clone(), PREVIEW_VALUE))
                .collect();
            Some(evaluate(&self.formula, &values))
        } else {
            None
        };

        FormulaStatus {
            variables,
            brackets,
            preview,
        }
    }
}

/// Byte length of a `letters+digits` run at the end of the formula, 0 if the
/// formula does not end in a variable
fn trailing_var_len(formula: &str) -> usize {
    let digits = formula
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .count();
    if digits == 0 {
        return 0;
    }
    let letters = formula
        .chars()
        .rev()
        .skip(digits)
        .take_while(|c| c.is_ascii_alphabetic())
        .count();
    if letters == 0 {
        return 0;
    }
    digits + letters
}
