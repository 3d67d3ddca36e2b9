use anyhow::{bail, Result};
use chrono::{Local, NaiveDate};

use studyflow_lib::timeline::{relative_day, Event, EventFilter, EventRequest, EventType};

use crate::app::App;
use crate::render::terminal::{paint, truncate, Color};
use crate::OutputFormat;

/// Fields accepted by `events add`
pub struct EventArgs {
    pub title: String,
    pub date: String,
    pub event_type: Option<String>,
    pub time: Option<String>,
    pub subject: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

/// `YYYY-MM-DD` or `DD/MM/YYYY`
fn parse_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();
    match input.to_lowercase().as_str() {
        "hoje" | "today" => return Ok(Local::now().date_naive()),
        "amanha" | "amanhã" | "tomorrow" => {
            return Ok(Local::now().date_naive() + chrono::Duration::days(1))
        }
        _ => {}
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(input, "%d/%m/%Y"))
        .map_err(|_| anyhow::anyhow!("Invalid date '{}', expected YYYY-MM-DD or DD/MM/YYYY", input))
}

fn type_color(event_type: EventType) -> &'static str {
    match event_type {
        EventType::Prova => Color::RED,
        EventType::Trabalho => Color::YELLOW,
        EventType::Evento => Color::BLUE,
        EventType::Lembrete => Color::MAGENTA,
    }
}

pub fn run_list(app: &App, filter: EventFilter, format: &OutputFormat, use_color: bool) -> Result<()> {
    let events = app.events.list_filtered(filter)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&events)?),
        OutputFormat::Plain => {
            if events.is_empty() {
                println!("No events.");
                return Ok(());
            }
            let today = Local::now().date_naive();
            for event in &events {
                print_event(app, event, today, use_color)?;
            }
        }
    }

    Ok(())
}

fn print_event(app: &App, event: &Event, today: NaiveDate, use_color: bool) -> Result<()> {
    let when = match &event.time {
        Some(time) => format!("{} {}", relative_day(event.date, today), time),
        None => relative_day(event.date, today),
    };
    let check = if event.completed { "[x]" } else { "[ ]" };
    let title = if event.completed {
        paint(&event.title, Color::STRIKETHROUGH, use_color)
    } else {
        paint(&event.title, Color::BOLD, use_color)
    };
    let kind = format!("{:<9}", event.event_type.label());

    println!(
        "{} {:<8} {} {:<18} {}",
        check,
        &event.id.to_string()[..8],
        paint(&kind, type_color(event.event_type), use_color),
        truncate(&when, 18),
        title
    );

    let mut details = Vec::new();
    if event.subject_id.is_some() {
        details.push(app.subject_name(event.subject_id)?);
    }
    if let Some(location) = &event.location {
        details.push(location.clone());
    }
    if !details.is_empty() {
        println!("{:>13}{}", "", paint(&details.join(" · "), Color::DIM, use_color));
    }
    Ok(())
}

pub fn run_add(app: &App, args: EventArgs, format: &OutputFormat) -> Result<()> {
    let event_type = match args.event_type.as_deref() {
        Some(raw) => match EventType::parse(raw) {
            Some(t) => t,
            None => bail!("Unknown event type '{}', expected prova, trabalho, evento or lembrete", raw),
        },
        None => EventType::default(),
    };
    let subject = app.find_subject_opt(args.subject.as_deref())?;

    let event = app.events.create_event(EventRequest {
        title: args.title,
        event_type,
        date: parse_date(&args.date)?,
        time: args.time,
        subject_id: subject.map(|s| s.id),
        location: args.location,
        notes: args.notes,
    })?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&event)?),
        OutputFormat::Plain => {
            println!(
                "Added {} \"{}\" on {}",
                event.event_type.label(),
                event.title,
                event.date.format("%d/%m/%Y")
            );
            if let Some(reminder) = event.reminder_at() {
                println!("  Reminder at {}", reminder.format("%d/%m %H:%M"));
            }
            println!("  ID: {}", event.id);
        }
    }

    Ok(())
}

pub fn run_done(app: &App, id: &str, undo: bool, format: &OutputFormat) -> Result<()> {
    let event = app.find_event(id)?;
    let event = app.events.set_completed(event.id, !undo)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&event)?),
        OutputFormat::Plain => {
            let state = if event.completed { "done" } else { "not done" };
            println!("Marked \"{}\" as {}.", event.title, state);
        }
    }

    Ok(())
}

pub fn run_remove(app: &App, id: &str, format: &OutputFormat) -> Result<()> {
    let event = app.find_event(id)?;
    app.events.delete_event(event.id)?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({ "id": event.id.to_string(), "removed": true });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => println!("Deleted \"{}\".", event.title),
    }

    Ok(())
}

pub fn run_today(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let today = Local::now().date_naive();
    let events = app.events.events_on(today)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&events)?),
        OutputFormat::Plain => {
            if events.is_empty() {
                println!("Nothing scheduled for today.");
            }
            for event in &events {
                print_event(app, event, today, use_color)?;
            }
        }
    }

    Ok(())
}

pub fn run_stats(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let stats = app.events.stats()?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        OutputFormat::Plain => {
            println!("Upcoming:  {}", stats.upcoming);
            println!("This week: {}", stats.this_week);
            let overdue = stats.overdue.to_string();
            if stats.overdue > 0 {
                println!("Overdue:   {}", paint(&overdue, Color::RED, use_color));
            } else {
                println!("Overdue:   {}", overdue);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        let expected = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        assert_eq!(parse_date("2026-03-10").unwrap(), expected);
        assert_eq!(parse_date("10/03/2026").unwrap(), expected);
        assert!(parse_date("03/2026").is_err());
        assert_eq!(
            parse_date("amanhã").unwrap(),
            Local::now().date_naive() + chrono::Duration::days(1)
        );
    }
}
