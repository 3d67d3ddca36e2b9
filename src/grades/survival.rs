//! Survival grade solver
//!
//! Finds the smallest uniform grade the still-unknown variables need for a
//! formula to reach the passing threshold.

use std::collections::HashMap;

use super::evaluator::evaluate_tokens;
use super::tokenizer::tokenize;

/// Lower bound of the search range
pub const SEARCH_MIN: f64 = 0.0;
/// Upper bound of the search range; results above 10 are reported anyway
pub const SEARCH_MAX: f64 = 15.0;
const ITERATIONS: usize = 60;

/// Minimal value `x` such that setting every unknown variable to `x` makes the
/// formula reach `threshold`.
///
/// `variables` is the full variable list of the formula; those missing from
/// `known` are the unknowns. Returns `None` when nothing is unknown.
///
/// The search assumes the formula does not decrease as the unknowns grow.
/// For formulas that subtract or divide by a variable the answer is whichever
/// bound the bisection settles on, and may be meaningless. If the threshold is
/// out of reach even at the upper bound, the upper bound is returned.
pub fn calc_survival(
    formula: &str,
    known: &HashMap<String, f64>,
    variables: &[String],
    threshold: f64,
) -> Option<f64> {
    let unknowns: Vec<&String> = variables.iter().filter(|v| !known.contains_key(*v)).collect();
    if unknowns.is_empty() {
        return None;
    }

    let tokens = tokenize(formula);
    let mut trial = known.clone();
    let mut lo = SEARCH_MIN;
    let mut hi = SEARCH_MAX;

    for _ in 0..ITERATIONS {
        let mid = (lo + hi) / 2.0;
        for name in &unknowns {
            trial.insert((*name).clone(), mid);
        }
        if evaluate_tokens(&tokens, &trial) >= threshold {
            hi = mid;
        } else {
            lo = mid;
        }
    }

    let needed = round_up_one_decimal(hi);
    log::debug!(
        "Survival for '{}' at threshold {}: {} unknown(s) need {}",
        formula,
        threshold,
        unknowns.len(),
        needed
    );
    Some(needed)
}

/// Round up to one decimal place.
///
/// Bisection converges to within float noise of exact tenths (2.0 comes out as
/// 2.0000000000000004), so a tiny tolerance is taken off before rounding up.
fn round_up_one_decimal(value: f64) -> f64 {
    let rounded = ((value * 10.0) - 1e-9).ceil() / 10.0;
    // ceil of a tiny negative is -0.0
    if rounded <= 0.0 {
        0.0
    } else {
        rounded
    }
}
