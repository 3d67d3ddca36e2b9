//! Syntax highlighting for formulas
//!
//! Produces presentation-neutral spans; terminal and JSON rendering live in
//! the CLI.

use std::collections::BTreeSet;

use serde::Serialize;

use super::analyzer::bracket_info;
use super::tokenizer::{is_close_bracket, is_number_char, is_open_bracket};

/// Bracket colours, cycled by nesting depth
pub const BRACKET_PALETTE: [&str; 5] = ["#6366f1", "#3b82f6", "#06b6d4", "#22c55e", "#f59e0b"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SpanKind {
    Variable,
    Number,
    Operator,
    /// A bracket with a partner, coloured by its nesting depth
    Bracket { depth: usize, color: &'static str },
    UnmatchedBracket,
    /// Whitespace and anything outside the grammar, passed through as-is
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Span {
    #[serde(flatten)]
    pub kind: SpanKind,
    pub text: String,
    /// Character offset of the span in the formula
    pub start: usize,
}

impl Span {
    /// Text as shown to the user: `*` and `/` become `×` and `÷`
    pub fn display_text(&self) -> &str {
        match (&self.kind, self.text.as_str()) {
            (SpanKind::Operator, "*") => "×",
            (SpanKind::Operator, "/") => "÷",
            (_, text) => text,
        }
    }
}

fn palette_color(depth: isize) -> (usize, &'static str) {
    let depth = depth.max(0) as usize;
    (depth, BRACKET_PALETTE[depth % BRACKET_PALETTE.len()])
}

/// Highlight a formula, computing bracket balance on the way
pub fn highlight(formula: &str) -> Vec<Span> {
    let info = bracket_info(formula);
    highlight_with(formula, &info.unmatched)
}

/// Highlight a formula given the set of unmatched bracket positions.
///
/// Depth tracking counts every bracket, matched or not, so colours of the
/// brackets after a stray close shift the same way the user sees them.
pub fn highlight_with(formula: &str, unmatched: &BTreeSet<usize>) -> Vec<Span> {
    let chars: Vec<char> = formula.chars().collect();
    let mut spans: Vec<Span> = Vec::new();
    let mut depth: isize = 0;
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        let start = i;

        let kind = if ch.is_ascii_alphabetic() {
            while i < chars.len() && chars[i].is_ascii_alphanumeric() {
                i += 1;
            }
            SpanKind::Variable
        } else if is_number_char(ch) {
            while i < chars.len() && is_number_char(chars[i]) {
                i += 1;
            }
            SpanKind::Number
        } else if is_open_bracket(ch) {
            i += 1;
            let kind = if unmatched.contains(&start) {
                SpanKind::UnmatchedBracket
            } else {
                let (depth, color) = palette_color(depth);
                SpanKind::Bracket { depth, color }
            };
            depth += 1;
            kind
        } else if is_close_bracket(ch) {
            i += 1;
            depth -= 1;
            if unmatched.contains(&start) {
                SpanKind::UnmatchedBracket
            } else {
                let (depth, color) = palette_color(depth);
                SpanKind::Bracket { depth, color }
            }
        } else if "+-*/%".contains(ch) {
            i += 1;
            SpanKind::Operator
        } else {
            i += 1;
            SpanKind::Text
        };

        let text: String = chars[start..i].iter().collect();

        // Merge consecutive plain text so whitespace runs stay one span
        if kind == SpanKind::Text {
            if let Some(last) = spans.last_mut() {
                if last.kind == SpanKind::Text {
                    last.text.push_str(&text);
                    continue;
                }
            }
        }

        spans.push(Span { kind, text, start });
    }

    spans
}
