use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;

use studyflow_lib::focus::{format_duration, FocusError, FocusTimer};

use crate::app::App;
use crate::render::terminal::{paint, truncate, Color};
use crate::OutputFormat;

pub fn run_log(app: &App, minutes: f64, subject: Option<&str>, format: &OutputFormat) -> Result<()> {
    let subject = app.find_subject_opt(subject)?;
    let session = app.focus.log_session(subject.as_ref().map(|s| s.id), minutes)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&session)?),
        OutputFormat::Plain => {
            println!(
                "Logged {} of {}.",
                format_duration(session.duration),
                subject.map_or_else(|| "general study".to_string(), |s| s.name)
            );
        }
    }

    Ok(())
}

pub fn run_ranking(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let ranking = app.focus.ranking()?;

    match format {
        OutputFormat::Json => {
            let mut output = Vec::new();
            for entry in &ranking {
                output.push(serde_json::json!({
                    "subjectId": entry.subject_id,
                    "name": app.subject_name(entry.subject_id)?,
                    "minutes": entry.minutes,
                }));
            }
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if ranking.is_empty() {
                println!("No focus sessions yet.");
                return Ok(());
            }
            for (i, entry) in ranking.iter().enumerate() {
                let name = match entry.subject_id {
                    None => "Estudo Geral".to_string(),
                    id => app.subject_name(id)?,
                };
                let medal = match i {
                    0 => paint("1.", Color::YELLOW, use_color),
                    1 => paint("2.", Color::GRAY, use_color),
                    2 => paint("3.", Color::RED, use_color),
                    _ => format!("{}.", i + 1),
                };
                println!("{:>3} {:<30} {}", medal, truncate(&name, 30), format_duration(entry.minutes));
            }
            println!(
                "\nToday: {}  Total: {}",
                format_duration(app.focus.today_minutes()?),
                format_duration(app.focus.total_minutes()?)
            );
        }
    }

    Ok(())
}

pub fn run_sessions(app: &App, limit: usize, format: &OutputFormat) -> Result<()> {
    let sessions = app.focus.recent_sessions(limit)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&sessions)?),
        OutputFormat::Plain => {
            if sessions.is_empty() {
                println!("No focus sessions yet.");
                return Ok(());
            }
            for session in &sessions {
                println!(
                    "{:<8} {}  {:<30} {}",
                    &session.id.to_string()[..8],
                    session.date.format("%d/%m/%Y"),
                    truncate(&app.subject_name(session.subject_id)?, 30),
                    format_duration(session.duration)
                );
            }
        }
    }

    Ok(())
}

pub fn run_remove(app: &App, id: &str, format: &OutputFormat) -> Result<()> {
    let sessions = app.focus.list_sessions()?;
    let prefix = id.trim().to_lowercase();
    let matches: Vec<_> = sessions
        .into_iter()
        .filter(|s| s.id.to_string().starts_with(&prefix))
        .collect();
    let session = match matches.as_slice() {
        [one] => one.clone(),
        [] => anyhow::bail!("No focus session with id '{}'", id),
        _ => anyhow::bail!("Ambiguous focus session id '{}'", id),
    };
    app.focus.delete_session(session.id)?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({ "id": session.id.to_string(), "removed": true });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => println!("Deleted session of {}.", format_duration(session.duration)),
    }

    Ok(())
}

/// Run a live focus timer until Enter or Ctrl-C, then save the session
pub fn run_timer(app: &App, subject: Option<&str>, use_color: bool) -> Result<()> {
    let subject = app.find_subject_opt(subject)?;
    let label = subject
        .as_ref()
        .map_or_else(|| "Estudo Geral".to_string(), |s| s.name.clone());

    let runtime = tokio::runtime::Runtime::new().context("Failed to start timer runtime")?;
    let mut timer = FocusTimer::new();

    runtime.block_on(async {
        let mut ticker = tokio::time::interval(Duration::from_secs(1));
        // The first tick completes immediately
        ticker.tick().await;

        let mut stop = tokio::task::spawn_blocking(|| {
            let mut line = String::new();
            std::io::stdin().read_line(&mut line).map(|_| ())
        });
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        timer.start(Utc::now());
        println!("Focusing on {}. Press Enter to stop.", paint(&label, Color::BOLD, use_color));
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    timer.tick();
                    print!("\r  {} {} ", paint(timer.state().label(), Color::DIM, use_color), timer.display());
                    std::io::stdout().flush().ok();
                }
                _ = &mut stop => break,
                _ = &mut ctrl_c => break,
            }
        }
        println!();
    });
    // Don't wait on the stdin reader when stopped by Ctrl-C
    runtime.shutdown_background();

    match app.focus.finish(&mut timer, subject.map(|s| s.id), Utc::now()) {
        Ok(session) => {
            println!("Saved a {} session.", format_duration(session.duration));
            Ok(())
        }
        Err(FocusError::SessionTooShort { elapsed, minimum }) => {
            println!("Session too short ({}s, minimum {}s); not saved.", elapsed, minimum);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
