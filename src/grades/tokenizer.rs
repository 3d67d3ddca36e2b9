//! Formula tokenizer
//!
//! Turns a grade formula such as `(P1 + P2) * 40% + T1 * 0.6` into a flat
//! token stream. Scanning is permissive: characters outside the grammar are
//! skipped rather than reported.

/// Binary (and unary minus) operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '+' => Some(Self::Add),
            '-' => Some(Self::Sub),
            '*' => Some(Self::Mul),
            '/' => Some(Self::Div),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Upper-cased alphanumeric run starting with a letter
    Var(String),
    Num(f64),
    Op(Operator),
    /// `%`, divides the preceding primary by 100
    Pct,
    /// `(` or `[`
    Open,
    /// `)` or `]`
    Close,
}

pub fn is_open_bracket(ch: char) -> bool {
    ch == '(' || ch == '['
}

pub fn is_close_bracket(ch: char) -> bool {
    ch == ')' || ch == ']'
}

pub(crate) fn is_number_char(ch: char) -> bool {
    ch.is_ascii_digit() || ch == '.'
}

/// Tokenize a formula string
pub fn tokenize(formula: &str) -> Vec<Token> {
    let chars: Vec<char> = formula.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];

        if ch.is_whitespace() {
            i += 1;
        } else if ch.is_ascii_alphabetic() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_alphanumeric() {
                i += 1;
            }
            let name: String = chars[start..i].iter().collect();
            tokens.push(Token::Var(name.to_ascii_uppercase()));
        } else if is_number_char(ch) {
            let start = i;
            while i < chars.len() && is_number_char(chars[i]) {
                i += 1;
            }
            let literal: String = chars[start..i].iter().collect();
            tokens.push(Token::Num(parse_number_prefix(&literal)));
        } else if ch == '%' {
            tokens.push(Token::Pct);
            i += 1;
        } else if let Some(op) = Operator::from_char(ch) {
            tokens.push(Token::Op(op));
            i += 1;
        } else if is_open_bracket(ch) {
            tokens.push(Token::Open);
            i += 1;
        } else if is_close_bracket(ch) {
            tokens.push(Token::Close);
            i += 1;
        } else {
            i += 1;
        }
    }

    tokens
}

/// Parse the longest valid decimal prefix of a digit/dot run.
///
/// `"1.5.2"` reads as 1.5 and a lone `"."` reads as 0.
fn parse_number_prefix(literal: &str) -> f64 {
    let mut end = 0;
    let mut seen_dot = false;
    for (idx, ch) in literal.char_indices() {
        if ch == '.' {
            if seen_dot {
                break;
            }
            seen_dot = true;
        }
        end = idx + ch.len_utf8();
    }

    let prefix = &literal[..end];
    if !prefix.chars().any(|c| c.is_ascii_digit()) {
        return 0.0;
    }
    prefix.parse::<f64>().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weighted_formula() {
        let tokens = tokenize("(p1 + P2) * 40%");
        assert_eq!(
            tokens,
            vec![
                Token::Open,
                Token::Var("P1".to_string()),
                Token::Op(Operator::Add),
                Token::Var("P2".to_string()),
                Token::Close,
                Token::Op(Operator::Mul),
                Token::Num(40.0),
                Token::Pct,
            ]
        );
    }

    #[test]
    fn test_square_brackets_are_plain_nesting() {
        let tokens = tokenize("[P1]");
        assert_eq!(
            tokens,
            vec![Token::Open, Token::Var("P1".to_string()), Token::Close]
        );
    }

    #[test]
    fn test_variable_run_absorbs_trailing_letters() {
        assert_eq!(tokenize("ab12c"), vec![Token::Var("AB12C".to_string())]);
    }

    #[test]
    fn test_unknown_characters_are_skipped() {
        assert_eq!(
            tokenize("P1 ^ & 2"),
            vec![Token::Var("P1".to_string()), Token::Num(2.0)]
        );
    }

    #[test]
    fn test_number_prefix() {
        assert_eq!(tokenize("1.5.2"), vec![Token::Num(1.5)]);
        assert_eq!(tokenize(".25"), vec![Token::Num(0.25)]);
        assert_eq!(tokenize("7."), vec![Token::Num(7.0)]);
        assert_eq!(tokenize("."), vec![Token::Num(0.0)]);
    }

    #[test]
    fn test_empty_formula() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   ").is_empty());
    }
}
