use std::io::{BufRead, Write};

use anyhow::{bail, Result};
use chrono::Utc;

use studyflow_lib::flashcards::algorithm::{format_interval, preview_intervals};
use studyflow_lib::flashcards::{CardState, Flashcard, Quality};

use crate::app::App;
use crate::render::terminal::{paint, truncate, Color};
use crate::OutputFormat;

fn parse_quality(s: &str) -> Result<Quality> {
    match Quality::parse(s) {
        Some(q) => Ok(q),
        None => bail!("Unknown rating '{}', expected again, hard, good or easy", s),
    }
}

/// Card state padded to `width`, colored after padding so escapes don't
/// break the columns
fn state_text(card: &Flashcard, width: usize, use_color: bool) -> String {
    let state = card.state();
    let style = match state {
        CardState::New => Color::BLUE,
        CardState::Learning => Color::YELLOW,
        CardState::Mastered => Color::GREEN,
    };
    paint(&format!("{:<w$}", state.label(), w = width), style, use_color)
}

fn next_review_text(card: &Flashcard) -> String {
    match card.scheduling.next_review {
        Some(at) if at > Utc::now() => at.format("%Y-%m-%d").to_string(),
        _ => "due".to_string(),
    }
}

pub fn run_list(app: &App, subject: Option<&str>, format: &OutputFormat, use_color: bool) -> Result<()> {
    let cards = match app.find_subject_opt(subject)? {
        Some(subject) => app.cards.list_cards_for_subject(subject.id)?,
        None => app.cards.list_cards()?,
    };
    print_cards(app, &cards, format, use_color)
}

pub fn run_due(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let cards = app.cards.get_due_cards()?;
    if cards.is_empty() && matches!(format, OutputFormat::Plain) {
        println!("Nothing to review right now.");
        return Ok(());
    }
    print_cards(app, &cards, format, use_color)
}

fn print_cards(app: &App, cards: &[Flashcard], format: &OutputFormat, use_color: bool) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(cards)?),
        OutputFormat::Plain => {
            if cards.is_empty() {
                println!("No flashcards.");
                return Ok(());
            }

            let front_width = 36;
            println!("{:<8} {:<fw$} {:<16} {:<10} {}", "ID", "Front", "Subject", "State", "Next",
                fw = front_width);
            println!("{} {} {} {} {}",
                "\u{2500}".repeat(8),
                "\u{2500}".repeat(front_width),
                "\u{2500}".repeat(16),
                "\u{2500}".repeat(10),
                "\u{2500}".repeat(10));

            for card in cards {
                let id = card.id.to_string();
                let subject = truncate(&app.subject_name(card.subject_id)?, 16);
                let state = state_text(card, 10, use_color);
                println!("{:<8} {:<fw$} {:<16} {} {}",
                    &id[..8],
                    truncate(&card.front, front_width),
                    subject,
                    state,
                    next_review_text(card),
                    fw = front_width);
            }

            println!("\n{} cards total", cards.len());
        }
    }

    Ok(())
}

pub fn run_add(
    app: &App,
    front: &str,
    back: &str,
    subject: Option<&str>,
    format: &OutputFormat,
) -> Result<()> {
    let subject = app.find_subject_opt(subject)?;
    let card = app.cards.create_card(front, back, subject.as_ref().map(|s| s.id))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&card)?),
        OutputFormat::Plain => {
            println!("Created flashcard \"{}\"", truncate(&card.front, 60));
            if let Some(subject) = subject {
                println!("  Subject: {}", subject.name);
            }
            println!("  ID: {}", card.id);
        }
    }

    Ok(())
}

pub fn run_edit(
    app: &App,
    id: &str,
    front: Option<&str>,
    back: Option<&str>,
    subject: Option<&str>,
    format: &OutputFormat,
) -> Result<()> {
    let card = app.find_card(id)?;
    let subject_id = match subject {
        Some(query) => Some(app.find_subject(query)?.id),
        None => card.subject_id,
    };
    let updated = app.cards.update_card(
        card.id,
        front.unwrap_or(&card.front),
        back.unwrap_or(&card.back),
        subject_id,
    )?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&updated)?),
        OutputFormat::Plain => println!("Updated flashcard \"{}\"", truncate(&updated.front, 60)),
    }

    Ok(())
}

pub fn run_remove(app: &App, id: &str, format: &OutputFormat) -> Result<()> {
    let card = app.find_card(id)?;
    app.cards.delete_card(card.id)?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({ "id": card.id.to_string(), "removed": true });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => println!("Deleted flashcard \"{}\"", truncate(&card.front, 60)),
    }

    Ok(())
}

pub fn run_rate(app: &App, id: &str, rating: &str, format: &OutputFormat) -> Result<()> {
    let quality = parse_quality(rating)?;
    let card = app.find_card(id)?;
    let card = app.cards.submit_review(card.id, quality)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&card)?),
        OutputFormat::Plain => {
            println!(
                "Rated \"{}\" {}: next review in {}",
                truncate(&card.front, 40),
                quality.label(),
                format_interval(card.scheduling.interval)
            );
        }
    }

    Ok(())
}

pub fn run_stats(app: &App, format: &OutputFormat) -> Result<()> {
    let stats = app.cards.get_review_stats()?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        OutputFormat::Plain => {
            println!("Total:    {}", stats.total_cards);
            println!("Due:      {}", stats.due_cards);
            println!("New:      {}", stats.new_cards);
            println!("Learning: {}", stats.learning_cards);
            println!("Mastered: {}", stats.mastered_cards);
        }
    }

    Ok(())
}

/// Interactive review of every due card, reading answers from stdin
pub fn run_review(app: &App, use_color: bool) -> Result<()> {
    let mut session = app.cards.start_session()?;
    if session.is_finished() {
        println!("Nothing to review right now.");
        return Ok(());
    }

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    let mut stdout = std::io::stdout();

    while let Some(card) = session.current().cloned() {
        println!();
        println!("{} ({} left)", paint(&card.front, Color::BOLD, use_color), session.remaining());
        print!("  [enter] show answer ");
        stdout.flush()?;
        if lines.next().transpose()?.is_none() {
            break;
        }
        println!("  {}", card.back);

        let intervals = preview_intervals(&card.scheduling);
        let options: Vec<String> = Quality::all()
            .iter()
            .zip(intervals)
            .enumerate()
            .map(|(i, (q, days))| format!("{}) {} ({})", i + 1, q.label(), format_interval(days)))
            .collect();

        let quality = loop {
            print!("  {} > ", options.join("  "));
            stdout.flush()?;
            let Some(line) = lines.next().transpose()? else {
                println!();
                println!("Reviewed {} card(s).", session.reviewed());
                return Ok(());
            };
            let answer = line.trim();
            let picked = answer
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| Quality::all().get(i).copied())
                .or_else(|| Quality::parse(answer));
            match picked {
                Some(q) => break q,
                None => println!("  {}", paint("Pick 1-4", Color::YELLOW, use_color)),
            }
        };

        app.cards.rate_current(&mut session, quality)?;
    }

    println!();
    println!("Reviewed {} card(s).", session.reviewed());
    Ok(())
}
