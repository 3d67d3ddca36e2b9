use anyhow::{bail, Result};

use studyflow_lib::grades::variables::builtin_types;

use crate::app::App;
use crate::render::terminal::{paint, Color};
use crate::OutputFormat;

pub fn run_list(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let types = app.grades.variable_types()?;
    let builtin = builtin_types();

    match format {
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = types
                .all()
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "letter": t.letter,
                        "name": t.name,
                        "builtin": builtin.contains(t),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            for t in types.all() {
                let origin = if builtin.contains(&t) {
                    paint("built-in", Color::DIM, use_color)
                } else {
                    String::new()
                };
                println!("{}  {:<20} {}", paint(&t.letter.to_string(), Color::CYAN, use_color), t.name, origin);
            }
        }
    }

    Ok(())
}

pub fn run_add(app: &App, letter: &str, name: &str, format: &OutputFormat) -> Result<()> {
    let added = app.grades.add_variable_type(letter, name)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&added)?),
        OutputFormat::Plain => println!("Added variable type {} ({}).", added.letter, added.name),
    }

    Ok(())
}

pub fn run_remove(app: &App, letter: &str, format: &OutputFormat) -> Result<()> {
    let mut chars = letter.trim().chars();
    let letter = match (chars.next(), chars.next()) {
        (Some(c), None) => c.to_ascii_uppercase(),
        _ => bail!("Expected a single letter, got '{}'", letter),
    };

    if builtin_types().iter().any(|t| t.letter == letter) {
        bail!("{} is a built-in variable type and cannot be removed", letter);
    }

    let removed = app.grades.remove_variable_type(letter)?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({ "letter": letter, "removed": removed });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if removed {
                println!("Removed variable type {}.", letter);
            } else {
                println!("No custom variable type {}.", letter);
            }
        }
    }

    Ok(())
}
