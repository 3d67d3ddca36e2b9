//! Recursive-descent formula evaluator
//!
//! Grammar, highest precedence first:
//!
//! ```text
//! primary := NUM | VAR | OPEN expr CLOSE      (each optionally followed by `%`)
//! unary   := '-' unary | primary
//! term    := unary (('*' | '/') unary)*
//! expr    := term (('+' | '-') term)*
//! ```
//!
//! Evaluation never fails. Missing variables read as 0, division by zero
//! yields 0 for the whole term, and stray tokens where a primary is expected
//! read as 0. Use the analyzer to validate a formula before trusting it.

use std::collections::HashMap;

use super::tokenizer::{tokenize, Operator, Token};

/// Nesting depth past which further brackets and minus signs read as 0
const MAX_NESTING: usize = 256;

/// Evaluate a formula string against a variable mapping
pub fn evaluate(formula: &str, variables: &HashMap<String, f64>) -> f64 {
    evaluate_tokens(&tokenize(formula), variables)
}

/// Evaluate an already tokenized formula.
///
/// The result is always finite; overflow or non-finite inputs collapse to 0.
pub fn evaluate_tokens(tokens: &[Token], variables: &HashMap<String, f64>) -> f64 {
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
        variables,
    };
    let value = parser.expr();
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
    variables: &'a HashMap<String, f64>,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn peek_op(&self) -> Option<Operator> {
        match self.peek() {
            Some(Token::Op(op)) => Some(*op),
            _ => None,
        }
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expr(&mut self) -> f64 {
        let mut left = self.term();
        while let Some(op @ (Operator::Add | Operator::Sub)) = self.peek_op() {
            self.advance();
            let right = self.term();
            left = if op == Operator::Add {
                left + right
            } else {
                left - right
            };
        }
        left
    }

    fn term(&mut self) -> f64 {
        let mut left = self.unary();
        while let Some(op @ (Operator::Mul | Operator::Div)) = self.peek_op() {
            self.advance();
            let right = self.unary();
            left = match op {
                Operator::Mul => left * right,
                _ if right == 0.0 => 0.0,
                _ => left / right,
            };
        }
        left
    }

    fn unary(&mut self) -> f64 {
        if self.peek_op() == Some(Operator::Sub) {
            self.advance();
            if self.depth >= MAX_NESTING {
                return 0.0;
            }
            self.depth += 1;
            let value = -self.unary();
            self.depth -= 1;
            return value;
        }
        self.primary()
    }

    fn primary(&mut self) -> f64 {
        let value = match self.advance() {
            None => return 0.0,
            Some(Token::Num(n)) => *n,
            Some(Token::Var(name)) => self.variables.get(name).copied().unwrap_or(0.0),
            Some(Token::Open) => {
                if self.depth >= MAX_NESTING {
                    return 0.0;
                }
                self.depth += 1;
                let inner = self.expr();
                self.depth -= 1;
                if matches!(self.peek(), Some(Token::Close)) {
                    self.advance();
                }
                inner
            }
            Some(_) => return 0.0,
        };
        self.percent(value)
    }

    fn percent(&mut self, value: f64) -> f64 {
        if matches!(self.peek(), Some(Token::Pct)) {
            self.advance();
            return value / 100.0;
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_vars(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_basic_arithmetic() {
        let vars = make_vars(&[("P1", 10.0), ("P2", 5.0)]);

        assert_eq!(evaluate("P1 + P2", &vars), 15.0);
        assert_eq!(evaluate("P1 - P2", &vars), 5.0);
        assert_eq!(evaluate("P1 * P2", &vars), 50.0);
        assert_eq!(evaluate("P1 / P2", &vars), 2.0);
    }

    #[test]
    fn test_operator_precedence() {
        let vars = make_vars(&[("A1", 10.0), ("B1", 5.0), ("C1", 2.0)]);

        assert_eq!(evaluate("A1 + B1 * C1", &vars), 20.0);
        assert_eq!(evaluate("(A1 + B1) * C1", &vars), 30.0);
        assert_eq!(evaluate("[A1 + B1] * C1", &vars), 30.0);
    }

    #[test]
    fn test_left_associativity() {
        let vars = HashMap::new();
        assert_eq!(evaluate("10 - 4 - 3", &vars), 3.0);
        assert_eq!(evaluate("64 / 4 / 2", &vars), 8.0);
    }

    #[test]
    fn test_percent_binds_to_primary() {
        let vars = make_vars(&[("P1", 10.0)]);
        assert_eq!(evaluate("P1 * 40%", &vars), 4.0);
        assert_eq!(evaluate("(P1 + 10)%", &vars), 0.2);
    }

    #[test]
    fn test_weighted_average() {
        let vars = make_vars(&[("P1", 8.0), ("P2", 6.0), ("T1", 10.0)]);
        let result = evaluate("(P1 + P2) / 2 * 70% + T1 * 30%", &vars);
        assert!((result - 7.9).abs() < 1e-9);
    }

    #[test]
    fn test_division_by_zero_is_zero() {
        let vars = make_vars(&[("P1", 5.0)]);
        assert_eq!(evaluate("P1 / 0", &vars), 0.0);
        assert_eq!(evaluate("P1 / (P2 - P2)", &vars), 0.0);
        assert_eq!(evaluate("P1 / 0 * 3 + 1", &vars), 1.0);
    }

    #[test]
    fn test_missing_variable_is_zero() {
        let vars = make_vars(&[("P1", 10.0)]);
        assert_eq!(evaluate("P1 + P2", &vars), 10.0);
    }

    #[test]
    fn test_unary_minus() {
        let vars = make_vars(&[("P1", 4.0)]);
        assert_eq!(evaluate("-P1", &vars), -4.0);
        assert_eq!(evaluate("--P1", &vars), 4.0);
        assert_eq!(evaluate("2 * -P1", &vars), -8.0);
    }

    #[test]
    fn test_malformed_input_degrades() {
        let vars = make_vars(&[("P1", 3.0)]);
        assert_eq!(evaluate("", &vars), 0.0);
        assert_eq!(evaluate("P1 +", &vars), 3.0);
        assert_eq!(evaluate("* P1", &vars), 0.0);
        assert_eq!(evaluate("(P1 + 1", &vars), 4.0);
        assert_eq!(evaluate("%", &vars), 0.0);
        assert_eq!(evaluate("P1 ) + 100", &vars), 3.0);
    }

    #[test]
    fn test_result_is_always_finite() {
        let vars = make_vars(&[("P1", f64::MAX), ("P2", f64::NAN)]);
        assert_eq!(evaluate("P1 * 10", &vars), 0.0);
        assert_eq!(evaluate("P2 + 1", &vars), 0.0);
    }

    #[test]
    fn test_deep_nesting_does_not_overflow() {
        let formula = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
        let result = evaluate(&formula, &HashMap::new());
        assert!(result.is_finite());

        let minus = format!("{}5", "-".repeat(10_000));
        assert!(evaluate(&minus, &HashMap::new()).is_finite());
    }
}
