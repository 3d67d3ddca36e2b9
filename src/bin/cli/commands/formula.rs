use std::collections::HashMap;

use anyhow::Result;

use studyflow_lib::grades::{
    calc_survival, closing_sequence, evaluate, extract_vars, highlight, prepare_formula,
    FormulaBuilder,
};

use crate::render::terminal::{grade, paint, render_formula, Color};
use crate::OutputFormat;

/// Parse a `NAME=VALUE` assignment given with `--var`. Names are upper-cased
/// like formula variables.
pub fn parse_assignment(s: &str) -> Result<(String, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing variable name in '{}'", s));
    }
    let value: f64 = value
        .trim()
        .replace(',', ".")
        .parse()
        .map_err(|_| format!("'{}' is not a number", value.trim()))?;
    Ok((name.to_ascii_uppercase(), value))
}

fn to_map(vars: &[(String, f64)]) -> HashMap<String, f64> {
    vars.iter().cloned().collect()
}

pub fn run_eval(formula: &str, vars: &[(String, f64)], format: &OutputFormat) -> Result<()> {
    let values = to_map(vars);
    let result = evaluate(formula, &values);
    let missing: Vec<String> = extract_vars(formula)
        .into_iter()
        .filter(|v| !values.contains_key(v))
        .collect();

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "formula": formula,
                "result": result,
                "missing": missing,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("{}", grade(result));
            if !missing.is_empty() {
                eprintln!("Treated as 0: {}", missing.join(", "));
            }
        }
    }

    Ok(())
}

pub fn run_vars(formula: &str, format: &OutputFormat) -> Result<()> {
    let vars = extract_vars(formula);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&vars)?),
        OutputFormat::Plain => {
            if vars.is_empty() {
                println!("No variables.");
            } else {
                println!("{}", vars.join(" "));
            }
        }
    }

    Ok(())
}

pub fn run_check(formula: &str, format: &OutputFormat, use_color: bool) -> Result<()> {
    let status = FormulaBuilder::from_formula(formula).status();
    let closers = closing_sequence(formula);
    let verdict = prepare_formula(formula);

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "status": status,
                "closingSequence": closers,
                "saveAs": verdict.as_ref().ok(),
                "error": verdict.as_ref().err().map(|e| e.to_string()),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("Formula:   {}", render_formula(&highlight(formula), use_color));
            let vars = if status.variables.is_empty() {
                "(none)".to_string()
            } else {
                status.variables.join(" ")
            };
            println!("Variables: {}", vars);

            if status.brackets.balanced {
                println!("Brackets:  {}", paint("balanced", Color::GREEN, use_color));
            } else {
                println!(
                    "Brackets:  {} ({} open, {} unmatched){}",
                    paint("unbalanced", Color::YELLOW, use_color),
                    status.brackets.total_open(),
                    status.brackets.unmatched.len(),
                    if closers.is_empty() {
                        String::new()
                    } else {
                        format!(", auto-close appends '{}'", closers)
                    }
                );
            }
            if let Some(preview) = status.preview {
                println!("Preview:   {} (every variable = 7)", grade(preview));
            }

            match verdict {
                Ok(saved) if saved != formula.trim() => println!("Saves as:  {}", saved),
                Ok(_) => println!("Ready to save."),
                Err(e) => println!("{}", paint(&format!("Cannot save: {}", e), Color::RED, use_color)),
            }
        }
    }

    Ok(())
}

pub fn run_highlight(formula: &str, format: &OutputFormat, use_color: bool) -> Result<()> {
    let spans = highlight(formula);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&spans)?),
        OutputFormat::Plain => println!("{}", render_formula(&spans, use_color)),
    }

    Ok(())
}

pub fn run_survival(
    formula: &str,
    passing: f64,
    vars: &[(String, f64)],
    difficult_threshold: f64,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let known = to_map(vars);
    let variables = extract_vars(formula);
    let needed = calc_survival(formula, &known, &variables, passing);

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "formula": formula,
                "passing": passing,
                "needed": needed,
                "difficult": needed.map(|n| n > difficult_threshold),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => match needed {
            None => {
                let current = evaluate(formula, &known);
                let verdict = if current >= passing {
                    paint("passing", Color::GREEN, use_color)
                } else {
                    paint("failing", Color::RED, use_color)
                };
                println!("Every variable is known: {} ({})", grade(current), verdict);
            }
            Some(needed) => {
                let unknowns: Vec<&String> =
                    variables.iter().filter(|v| !known.contains_key(*v)).collect();
                let text = format!("Need {} on {}", grade(needed), unknowns
                    .iter()
                    .map(|v| v.as_str())
                    .collect::<Vec<_>>()
                    .join(", "));
                if needed > difficult_threshold {
                    println!("{} (difficult)", paint(&text, Color::RED, use_color));
                } else {
                    println!("{}", text);
                }
            }
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(parse_assignment("P1=7.5"), Ok(("P1".to_string(), 7.5)));
        assert_eq!(parse_assignment(" T2 = 8,5 "), Ok(("T2".to_string(), 8.5)));
        assert!(parse_assignment("P1").is_err());
        assert!(parse_assignment("=3").is_err());
        assert!(parse_assignment("P1=abc").is_err());
    }

    #[test]
    fn test_lowercase_assignment_matches_formula() {
        assert_eq!(parse_assignment("p1=10"), Ok(("P1".to_string(), 10.0)));

        let vars = to_map(&[parse_assignment("p1=10").unwrap()]);
        assert_eq!(evaluate("P1", &vars), 10.0);
        let names = extract_vars("(P1+P2)/2");
        assert_eq!(calc_survival("(P1+P2)/2", &vars, &names, 6.0), Some(2.0));
    }
}
