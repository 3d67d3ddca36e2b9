use anyhow::{bail, Context, Result};

use studyflow_lib::subjects::{normalize_time, Subject, Weekday, SUBJECT_COLORS};

use crate::app::App;
use crate::render::terminal::{paint, swatch, Color};
use crate::OutputFormat;

/// Optional subject fields shared by `add` and `edit`
#[derive(Default)]
pub struct SubjectFields {
    pub name: Option<String>,
    pub color: Option<String>,
    pub teacher: Option<String>,
    pub room: Option<String>,
    pub days: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

fn parse_color(color: &str) -> Result<String> {
    let color = color.trim().to_lowercase();
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        bail!("Invalid color '{}', expected #rrggbb (e.g. {})", color, SUBJECT_COLORS[0]);
    }
    Ok(color)
}

fn parse_days(days: &str) -> Result<Vec<Weekday>> {
    let mut parsed = Vec::new();
    for day in days.split(',').map(str::trim).filter(|d| !d.is_empty()) {
        match Weekday::parse(day) {
            Some(d) if !parsed.contains(&d) => parsed.push(d),
            Some(_) => {}
            None => bail!("Unknown day '{}', expected seg, ter, qua, qui, sex or sab", day),
        }
    }
    parsed.sort();
    Ok(parsed)
}

fn parse_time(time: &str) -> Result<Option<String>> {
    if time.trim().is_empty() {
        return Ok(None);
    }
    normalize_time(time)
        .map(Some)
        .with_context(|| format!("Invalid time '{}', expected HH:MM", time))
}

fn non_blank(value: String) -> Option<String> {
    let value = value.trim().to_string();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn apply_fields(subject: &mut Subject, fields: SubjectFields) -> Result<()> {
    if let Some(name) = fields.name {
        let name = name.trim();
        if name.is_empty() {
            bail!("Subject name cannot be empty");
        }
        subject.name = name.to_string();
    }
    if let Some(color) = fields.color {
        subject.color = parse_color(&color)?;
    }
    if let Some(teacher) = fields.teacher {
        subject.teacher = non_blank(teacher);
    }
    if let Some(room) = fields.room {
        subject.room = non_blank(room);
    }
    if let Some(days) = fields.days {
        subject.days = parse_days(&days)?;
    }
    if let Some(start) = fields.start {
        subject.time_start = parse_time(&start)?;
    }
    if let Some(end) = fields.end {
        subject.time_end = parse_time(&end)?;
    }
    Ok(())
}

fn print_subject(subject: &Subject, use_color: bool) {
    let mut details = Vec::new();
    let schedule = subject.schedule();
    if !schedule.is_empty() {
        details.push(schedule);
    }
    if let Some(teacher) = &subject.teacher {
        details.push(teacher.clone());
    }
    if let Some(room) = &subject.room {
        details.push(format!("sala {}", room));
    }

    println!(
        "{} {}{}",
        swatch(&subject.color, use_color),
        paint(&subject.name, Color::BOLD, use_color),
        if details.is_empty() {
            String::new()
        } else {
            paint(&format!("  {}", details.join(" · ")), Color::DIM, use_color)
        }
    );
}

pub fn run_list(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let subjects = app.list_subjects()?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&subjects)?),
        OutputFormat::Plain => {
            if subjects.is_empty() {
                println!("No subjects yet.");
                return Ok(());
            }
            for subject in &subjects {
                print_subject(subject, use_color);
            }
            println!("\n{} subjects total", subjects.len());
        }
    }

    Ok(())
}

pub fn run_add(app: &App, name: &str, mut fields: SubjectFields, format: &OutputFormat, use_color: bool) -> Result<()> {
    let color = fields.color.take().map(|c| parse_color(&c)).transpose()?;
    let mut subject = app.subjects.create_subject(name, color)?;

    apply_fields(&mut subject, fields)?;
    let subject = app.subjects.update_subject(&subject)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&subject)?),
        OutputFormat::Plain => {
            print!("Added ");
            print_subject(&subject, use_color);
            println!("  ID: {}", subject.id);
        }
    }

    Ok(())
}

pub fn run_edit(app: &App, query: &str, fields: SubjectFields, format: &OutputFormat, use_color: bool) -> Result<()> {
    let mut subject = app.find_subject(query)?;
    apply_fields(&mut subject, fields)?;
    let subject = app.subjects.update_subject(&subject)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&subject)?),
        OutputFormat::Plain => {
            print!("Updated ");
            print_subject(&subject, use_color);
        }
    }

    Ok(())
}

pub fn run_remove(app: &App, query: &str, format: &OutputFormat) -> Result<()> {
    let removal = app.delete_subject(query)?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "id": removal.subject.id.to_string(),
                "name": removal.subject.name,
                "topicsRemoved": removal.topics,
                "cardsUnlinked": removal.unlinked_cards,
                "filesUnlinked": removal.unlinked_files,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("Removed {} with its grades and {} roadmap topic(s).", removal.subject.name, removal.topics);
            if removal.unlinked_cards + removal.unlinked_files > 0 {
                println!(
                    "  {} flashcard(s) and {} file(s) kept without a subject.",
                    removal.unlinked_cards, removal.unlinked_files
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_days() {
        let days = parse_days("qua, seg,qua").unwrap();
        assert_eq!(days, vec![Weekday::Seg, Weekday::Qua]);
        assert!(parse_days("seg,dom").is_err());
        assert!(parse_days("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#22C55E").unwrap(), "#22c55e");
        assert!(parse_color("22c55e").is_err());
        assert!(parse_color("#22c55").is_err());
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("8:00").unwrap().as_deref(), Some("08:00"));
        assert_eq!(parse_time(" ").unwrap(), None);
        assert!(parse_time("8h").is_err());
    }
}
