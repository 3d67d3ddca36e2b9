//! Static checks over a raw formula string: variable extraction and bracket
//! balance. Both work on characters, not on the token stream.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::tokenizer::{is_close_bracket, is_open_bracket};

/// ASCII letters immediately followed by ASCII digits, e.g. `P1`, `T12`
static VARIABLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z]+[0-9]+").expect("Invalid regex"));

/// Distinct variables referenced by a formula, upper-cased and sorted by
/// letter prefix, then numerically by suffix.
///
/// A bare letter without digits (`P`) is not a variable.
pub fn extract_vars(formula: &str) -> Vec<String> {
    let unique: BTreeSet<String> = VARIABLE_RE
        .find_iter(formula)
        .map(|m| m.as_str().to_ascii_uppercase())
        .collect();

    let mut vars: Vec<String> = unique.into_iter().collect();
    vars.sort_by(|a, b| compare_vars(a, b));
    vars
}

/// Split `P12` into (`P`, `12`)
pub fn split_var(name: &str) -> (&str, &str) {
    let split = name
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(name.len());
    name.split_at(split)
}

fn compare_vars(a: &str, b: &str) -> Ordering {
    let (letters_a, digits_a) = split_var(a);
    let (letters_b, digits_b) = split_var(b);
    letters_a
        .cmp(letters_b)
        .then_with(|| compare_digit_strings(digits_a, digits_b))
        .then_with(|| a.cmp(b))
}

/// Numeric comparison of two digit strings of any length
fn compare_digit_strings(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Bracket balance report for a formula
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketInfo {
    pub balanced: bool,
    /// `(` left open at the end of the formula
    pub open_parens: usize,
    /// `[` left open at the end of the formula
    pub open_brackets: usize,
    /// Character positions of every bracket without a partner
    pub unmatched: BTreeSet<usize>,
}

impl BracketInfo {
    pub fn total_open(&self) -> usize {
        self.open_parens + self.open_brackets
    }
}

fn partner_of(close: char) -> char {
    if close == ')' {
        '('
    } else {
        '['
    }
}

fn closer_of(open: char) -> char {
    if open == '(' {
        ')'
    } else {
        ']'
    }
}

/// Opens still on the stack at the end of the scan, plus unmatched closes
fn scan_brackets(formula: &str) -> (Vec<(usize, char)>, BTreeSet<usize>) {
    let mut stack: Vec<(usize, char)> = Vec::new();
    let mut unmatched = BTreeSet::new();

    for (idx, ch) in formula.chars().enumerate() {
        if is_open_bracket(ch) {
            stack.push((idx, ch));
        } else if is_close_bracket(ch) {
            match stack.last() {
                Some(&(_, open)) if open == partner_of(ch) => {
                    stack.pop();
                }
                _ => {
                    unmatched.insert(idx);
                }
            }
        }
    }

    (stack, unmatched)
}

/// Check bracket balance. A `)` only closes a `(` and a `]` only closes a
/// `[`; a close that meets the wrong kind is itself unmatched and leaves the
/// open on the stack.
pub fn bracket_info(formula: &str) -> BracketInfo {
    let (stack, mut unmatched) = scan_brackets(formula);

    let open_parens = stack.iter().filter(|(_, ch)| *ch == '(').count();
    let open_brackets = stack.len() - open_parens;
    unmatched.extend(stack.iter().map(|(idx, _)| *idx));

    BracketInfo {
        balanced: unmatched.is_empty(),
        open_parens,
        open_brackets,
        unmatched,
    }
}

/// Closing characters that would close every bracket still open at the end
/// of the formula, innermost first.
pub fn closing_sequence(formula: &str) -> String {
    let (stack, _) = scan_brackets(formula);
    stack.iter().rev().map(|(_, open)| closer_of(*open)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_vars_basic() {
        assert_eq!(extract_vars("(P1 + P2) / 2"), vec!["P1", "P2"]);
    }

    #[test]
    fn test_bare_letter_is_not_a_variable() {
        assert!(extract_vars("P * 2").is_empty());
        assert!(extract_vars("").is_empty());
    }

    #[test]
    fn test_non_ascii_digits_are_not_variable_suffixes() {
        // Arabic-Indic one; the tokenizer reads it as a bare `P`
        assert_eq!(extract_vars("P\u{0661} + P1"), vec!["P1"]);
    }

    #[test]
    fn test_extract_vars_sorting_and_dedup() {
        let vars = extract_vars("t2 + P10 + P2 + p2 + T1 + P1");
        assert_eq!(vars, vec!["P1", "P2", "P10", "T1", "T2"]);
    }

    #[test]
    fn test_extract_vars_multi_letter_prefix() {
        let vars = extract_vars("AB3 + A12 + B1");
        assert_eq!(vars, vec!["A12", "AB3", "B1"]);
    }

    #[test]
    fn test_extract_vars_is_stable() {
        let formula = "(P3 + T1) * 40% + P1";
        assert_eq!(extract_vars(formula), extract_vars(formula));
    }

    #[test]
    fn test_split_var() {
        assert_eq!(split_var("P12"), ("P", "12"));
        assert_eq!(split_var("AB3"), ("AB", "3"));
        assert_eq!(split_var("X"), ("X", ""));
    }

    #[test]
    fn test_balanced() {
        let info = bracket_info("[(P1 + P2) / 2] * 60%");
        assert!(info.balanced);
        assert_eq!(info.total_open(), 0);
        assert!(info.unmatched.is_empty());
    }

    #[test]
    fn test_kind_mismatch() {
        let info = bracket_info("(P1+[T1)");
        assert!(!info.balanced);
        assert_eq!(info.open_parens, 1);
        assert_eq!(info.open_brackets, 1);
        assert!(info.unmatched.contains(&7));
        assert_eq!(info.unmatched, BTreeSet::from([0, 4, 7]));
    }

    #[test]
    fn test_extra_close() {
        let info = bracket_info("P1)");
        assert!(!info.balanced);
        assert_eq!(info.total_open(), 0);
        assert_eq!(info.unmatched, BTreeSet::from([2]));
    }

    #[test]
    fn test_unclosed_counts() {
        let info = bracket_info("((P1 + [P2");
        assert_eq!(info.open_parens, 2);
        assert_eq!(info.open_brackets, 1);
        assert_eq!(info.total_open(), 3);
    }

    #[test]
    fn test_closing_sequence_is_innermost_first() {
        assert_eq!(closing_sequence("([P1 + (P2"), ")])");
        assert_eq!(closing_sequence("(P1)"), "");
    }
}
