use anyhow::Result;

use studyflow_lib::roadmap::RoadmapProgress;
use studyflow_lib::subjects::Subject;

use crate::app::App;
use crate::render::terminal::{paint, progress_bar, swatch, Color};
use crate::OutputFormat;

fn print_header(subject: &Subject, progress: &RoadmapProgress, use_color: bool) {
    println!(
        "{} {}  {}/{}  {} {}%",
        swatch(&subject.color, use_color),
        paint(&subject.name, Color::BOLD, use_color),
        progress.completed,
        progress.total,
        progress_bar(progress.percent, 20),
        progress.percent
    );
}

/// One subject's topics, or the progress of every subject
pub fn run_list(app: &App, subject: Option<&str>, format: &OutputFormat, use_color: bool) -> Result<()> {
    let Some(query) = subject else {
        return run_overview(app, format, use_color);
    };

    let subject = app.find_subject(query)?;
    let topics = app.roadmap.list_topics(subject.id)?;
    let progress = RoadmapProgress::from_topics(&topics);

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "subject": subject.name,
                "progress": progress,
                "topics": topics,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            print_header(&subject, &progress, use_color);
            if topics.is_empty() {
                println!("  No topics yet.");
            }
            for topic in &topics {
                if topic.completed {
                    println!("  [x] {}", paint(&topic.name, Color::DIM, use_color));
                } else {
                    println!("  [ ] {}", topic.name);
                }
            }
        }
    }

    Ok(())
}

fn run_overview(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let subjects = app.list_subjects()?;
    let mut rows = Vec::new();
    for subject in subjects {
        let progress = app.roadmap.progress(subject.id)?;
        rows.push((subject, progress));
    }

    match format {
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = rows
                .iter()
                .map(|(subject, progress)| {
                    serde_json::json!({ "subject": subject.name, "progress": progress })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if rows.is_empty() {
                println!("Add subjects first to build their roadmaps.");
            }
            for (subject, progress) in &rows {
                print_header(subject, progress, use_color);
            }
        }
    }

    Ok(())
}

pub fn run_add(app: &App, subject: &str, name: &str, order: Option<u32>, format: &OutputFormat) -> Result<()> {
    let subject = app.find_subject(subject)?;
    let topic = app.roadmap.add_topic(subject.id, name, order)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&topic)?),
        OutputFormat::Plain => println!("Added topic \"{}\" to {} (#{}).", topic.name, subject.name, topic.order),
    }

    Ok(())
}

pub fn run_edit(
    app: &App,
    subject: &str,
    topic: &str,
    name: Option<&str>,
    order: Option<u32>,
    format: &OutputFormat,
) -> Result<()> {
    let subject = app.find_subject(subject)?;
    let topic = app.find_topic(subject.id, topic)?;
    let updated = app
        .roadmap
        .update_topic(topic.id, name.unwrap_or(&topic.name), order)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&updated)?),
        OutputFormat::Plain => println!("Updated topic \"{}\".", updated.name),
    }

    Ok(())
}

pub fn run_toggle(app: &App, subject: &str, topic: &str, format: &OutputFormat, use_color: bool) -> Result<()> {
    let subject = app.find_subject(subject)?;
    let topic = app.find_topic(subject.id, topic)?;
    let topic = app.roadmap.toggle_topic(topic.id)?;
    let progress = app.roadmap.progress(subject.id)?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({ "topic": topic, "progress": progress });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            let mark = if topic.completed { "[x]" } else { "[ ]" };
            println!("{} {}", mark, topic.name);
            print_header(&subject, &progress, use_color);
        }
    }

    Ok(())
}

pub fn run_remove(app: &App, subject: &str, topic: &str, format: &OutputFormat) -> Result<()> {
    let subject = app.find_subject(subject)?;
    let topic = app.find_topic(subject.id, topic)?;
    app.roadmap.delete_topic(topic.id)?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({ "id": topic.id.to_string(), "removed": true });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => println!("Deleted topic \"{}\".", topic.name),
    }

    Ok(())
}
