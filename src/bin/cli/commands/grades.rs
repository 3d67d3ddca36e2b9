use anyhow::{Context, Result};

use studyflow_lib::grades::{highlight, GradeBook, GradeStatus, GradeSummary, RecalcDebouncer};
use studyflow_lib::subjects::Subject;

use crate::app::App;
use crate::commands::formula::parse_assignment;
use crate::render::terminal::{grade, paint, render_formula, swatch, Color};
use crate::OutputFormat;

pub fn run_set_formula(
    app: &App,
    subject: &str,
    formula: &str,
    passing: Option<f64>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let subject = app.find_subject(subject)?;
    let passing = match passing {
        Some(p) => p,
        None => app
            .grades
            .get_scheme(subject.id)?
            .map_or(app.config.default_passing_grade, |s| s.passing_grade),
    };

    let scheme = app.grades.save_scheme(subject.id, formula, passing)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&scheme)?),
        OutputFormat::Plain => {
            println!("Formula saved for {}:", subject.name);
            println!("  {}", render_formula(&highlight(&scheme.formula), use_color));
            if scheme.formula != formula.trim() {
                println!("  (brackets closed automatically)");
            }
            println!("  Variables: {}", scheme.variables().join(" "));
            println!("  Passing grade: {}", grade(scheme.passing_grade));
        }
    }

    Ok(())
}

pub fn run_set(
    app: &App,
    subject: &str,
    variable: &str,
    value: Option<f64>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let subject = app.find_subject(subject)?;
    let scheme = app
        .grades
        .get_scheme(subject.id)?
        .with_context(|| format!("{} has no grade formula yet; use `grades set-formula`", subject.name))?;

    let variable = variable.trim().to_ascii_uppercase();
    if !scheme.variables().contains(&variable) {
        log::warn!("{} is not used by the formula of {}", variable, subject.name);
    }

    app.grades.set_grade(subject.id, &variable, value)?;
    let summary = app.grades.summary(subject.id)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Plain => print_summary(app, &subject, &summary, use_color)?,
    }

    Ok(())
}

pub fn run_show(app: &App, subject: Option<&str>, format: &OutputFormat, use_color: bool) -> Result<()> {
    let subjects = match subject {
        Some(query) => vec![app.find_subject(query)?],
        None => app.list_subjects()?,
    };

    let mut summaries = Vec::new();
    for subject in subjects {
        let summary = app.grades.summary(subject.id)?;
        summaries.push((subject, summary));
    }

    match format {
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = summaries
                .iter()
                .map(|(subject, summary)| {
                    serde_json::json!({
                        "subject": subject.name,
                        "summary": summary,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if summaries.is_empty() {
                println!("No subjects yet.");
                return Ok(());
            }
            for (i, (subject, summary)) in summaries.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                print_summary(app, subject, summary, use_color)?;
            }
        }
    }

    Ok(())
}

pub fn run_clear(app: &App, subject: &str, format: &OutputFormat) -> Result<()> {
    let subject = app.find_subject(subject)?;
    let removed = app.grades.clear_grades(subject.id)?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({ "subject": subject.name, "removed": removed });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => println!("Cleared {} grade(s) of {}.", removed, subject.name),
    }

    Ok(())
}

/// `VAR=VALUE` sets a grade, `VAR=` clears it
fn parse_grade_line(line: &str) -> std::result::Result<(String, Option<f64>), String> {
    match line.split_once('=') {
        Some((name, value)) if value.trim().is_empty() => {
            let name = name.trim();
            if name.is_empty() {
                return Err(format!("missing variable name in '{}'", line.trim()));
            }
            Ok((name.to_ascii_uppercase(), None))
        }
        _ => parse_assignment(line).map(|(name, value)| (name, Some(value))),
    }
}

/// Type grades one per line; the summary is recalculated once input pauses
pub fn run_edit(app: &App, subject: &str, use_color: bool) -> Result<()> {
    let subject = app.find_subject(subject)?;
    let scheme = app
        .grades
        .get_scheme(subject.id)?
        .with_context(|| format!("{} has no grade formula yet; use `grades set-formula`", subject.name))?;

    println!("{}  {}", paint(&subject.name, Color::BOLD, use_color), render_formula(&highlight(&scheme.formula), use_color));
    println!("Type VAR=VALUE per line (VAR= clears it). Empty line to finish.");

    let runtime = tokio::runtime::Runtime::new().context("Failed to start grade editor runtime")?;
    runtime.block_on(async {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<String>();
        tokio::task::spawn_blocking(move || {
            for line in std::io::stdin().lines() {
                let Ok(line) = line else { break };
                if line.trim().is_empty() || tx.send(line).is_err() {
                    break;
                }
            }
        });

        let mut debouncer = RecalcDebouncer::from_config(&app.config);
        while let Some(line) = rx.recv().await {
            let (variable, value) = match parse_grade_line(&line) {
                Ok(parsed) => parsed,
                Err(e) => {
                    eprintln!("  {}", e);
                    continue;
                }
            };
            if let Err(e) = app.grades.set_grade(subject.id, &variable, value) {
                eprintln!("  {}", e);
                continue;
            }

            let book = GradeBook::new(&app.storage).with_difficult_threshold(app.config.difficult_threshold);
            let subject_id = subject.id;
            debouncer.schedule(subject_id, async move {
                match book.summary(subject_id) {
                    Ok(summary) => println!("  {}", summary_line(&summary, use_color)),
                    Err(e) => log::warn!("Failed to recalculate grades of {}: {}", subject_id, e),
                }
            });
        }
        debouncer.flush().await;
    });
    runtime.shutdown_background();

    Ok(())
}

fn summary_line(summary: &GradeSummary, use_color: bool) -> String {
    let mut parts = vec![status_text(summary.status, use_color)];
    if let Some(current) = summary.current {
        parts.push(format!("Média {} / {}", grade(current), grade(summary.passing_grade)));
    }
    if let Some(survival) = summary.survival {
        let color = if survival.difficult { Color::RED } else { Color::YELLOW };
        parts.push(paint(&format!("precisa de {}", grade(survival.needed)), color, use_color));
    }
    parts.join(" · ")
}

fn status_text(status: GradeStatus, use_color: bool) -> String {
    match status {
        GradeStatus::Pending => paint("Pendente", Color::GRAY, use_color),
        GradeStatus::Partial => paint("Em andamento", Color::BLUE, use_color),
        GradeStatus::Passing => paint("Aprovado", Color::GREEN, use_color),
        GradeStatus::Failing => paint("Reprovado", Color::RED, use_color),
    }
}

fn print_summary(app: &App, subject: &Subject, summary: &GradeSummary, use_color: bool) -> Result<()> {
    println!(
        "{} {}  {}",
        swatch(&subject.color, use_color),
        paint(&subject.name, Color::BOLD, use_color),
        status_text(summary.status, use_color)
    );

    let Some(formula) = &summary.formula else {
        println!("  (no formula)");
        return Ok(());
    };
    println!("  {}", render_formula(&highlight(formula), use_color));

    let types = app.grades.variable_types()?;
    for var in &summary.variables {
        let value = var
            .value
            .map_or_else(|| paint("-", Color::DIM, use_color), grade);
        println!("  {:<6} {:>5}  {}", var.name, value, types.full_name(&var.name));
    }

    if let Some(current) = summary.current {
        println!(
            "  Média: {} / {} ({}/{} preenchidas)",
            grade(current),
            grade(summary.passing_grade),
            summary.filled,
            summary.total()
        );
    }
    if let Some(survival) = summary.survival {
        let text = format!("Precisa de {} nas restantes", grade(survival.needed));
        if survival.difficult {
            println!("  {}", paint(&format!("{} (difícil)", text), Color::RED, use_color));
        } else {
            println!("  {}", paint(&text, Color::YELLOW, use_color));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_grade_line() {
        assert_eq!(parse_grade_line("p1=7,5"), Ok(("P1".to_string(), Some(7.5))));
        assert_eq!(parse_grade_line(" t2 = "), Ok(("T2".to_string(), None)));
        assert!(parse_grade_line("=").is_err());
        assert!(parse_grade_line("P1").is_err());
        assert!(parse_grade_line("P1=x").is_err());
    }
}
