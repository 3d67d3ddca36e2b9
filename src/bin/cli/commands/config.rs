use anyhow::{bail, Context, Result};

use studyflow_lib::config::AppConfig;

use crate::app::App;
use crate::OutputFormat;

pub fn run_show(app: &App, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&app.config)?),
        OutputFormat::Plain => {
            println!("Data directory:       {}", app.storage.base_path().display());
            println!("Default passing grade: {}", app.config.default_passing_grade);
            println!("Recalc debounce:      {} ms", app.config.recalc_debounce_ms);
            println!("Min focus session:    {} s", app.config.min_focus_session_secs);
            println!("Difficult threshold:  {}", app.config.difficult_threshold);
        }
    }
    Ok(())
}

/// Set one config key (camelCase, as in `config.json`) and save
pub fn run_set(app: &App, key: &str, value: &str) -> Result<()> {
    let mut config = app.config.clone();
    let number = || -> Result<f64> {
        value
            .trim()
            .replace(',', ".")
            .parse::<f64>()
            .with_context(|| format!("'{}' is not a number", value))
    };

    match key {
        "defaultPassingGrade" => {
            let grade = number()?;
            if !(0.0..=10.0).contains(&grade) {
                bail!("Passing grade must be between 0 and 10");
            }
            config.default_passing_grade = grade;
        }
        "difficultThreshold" => config.difficult_threshold = number()?,
        "recalcDebounceMs" => config.recalc_debounce_ms = value.trim().parse().context("Expected milliseconds")?,
        "minFocusSessionSecs" => config.min_focus_session_secs = value.trim().parse().context("Expected seconds")?,
        _ => bail!(
            "Unknown config key '{}'. Keys: defaultPassingGrade, recalcDebounceMs, minFocusSessionSecs, difficultThreshold",
            key
        ),
    }

    config
        .save(app.storage.base_path())
        .context("Failed to save config")?;
    println!("Saved {} to {}", key, AppConfig::path(app.storage.base_path()).display());
    Ok(())
}
