use anyhow::{bail, Result};

use studyflow_lib::locker::{format_file_size, FileRequest, FileType, LockerFile};

use crate::app::App;
use crate::render::terminal::{paint, truncate, Color};
use crate::OutputFormat;

/// Fields accepted by `files add` and `files edit`
pub struct FileArgs {
    pub name: Option<String>,
    pub file_type: Option<String>,
    pub subject: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub size: Option<u64>,
}

pub fn parse_type(raw: &str) -> Result<FileType> {
    match FileType::parse(raw) {
        Some(t) => Ok(t),
        None => bail!("Unknown file type '{}', expected pdf, image, link, note or other", raw),
    }
}

fn print_file(app: &App, file: &LockerFile, use_color: bool) -> Result<()> {
    let mut meta = vec![app.subject_name(file.subject_id)?, file.file_type.label().to_string()];
    if let Some(size) = file.size {
        meta.push(format_file_size(size));
    }

    println!(
        "{:<8} {:<40} {}",
        &file.id.to_string()[..8],
        truncate(&file.name, 40),
        paint(&meta.join(" · "), Color::DIM, use_color)
    );
    if let Some(url) = &file.url {
        println!("{:>9}{}", "", paint(url, Color::BLUE, use_color));
    }
    if let Some(description) = &file.description {
        println!("{:>9}{}", "", truncate(description, 70));
    }
    Ok(())
}

pub fn run_list(
    app: &App,
    file_type: Option<FileType>,
    subject: Option<&str>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let files = match app.find_subject_opt(subject)? {
        Some(subject) => app
            .locker
            .list_files_for_subject(subject.id)?
            .into_iter()
            .filter(|f| file_type.map_or(true, |t| f.file_type == t))
            .collect(),
        None => app.locker.list_files(file_type)?,
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&files)?),
        OutputFormat::Plain => {
            if files.is_empty() {
                println!("No files found.");
                return Ok(());
            }
            for file in &files {
                print_file(app, file, use_color)?;
            }

            let stats = app.locker.stats()?;
            println!(
                "\n{} total: {} PDF, {} images, {} links, {} notes",
                stats.total, stats.pdfs, stats.images, stats.links, stats.notes
            );
        }
    }

    Ok(())
}

fn to_request(app: &App, args: FileArgs, base: Option<&LockerFile>) -> Result<FileRequest> {
    let file_type = match args.file_type.as_deref() {
        Some(raw) => parse_type(raw)?,
        None => base.map_or(FileType::default(), |f| f.file_type),
    };
    let subject_id = match args.subject.as_deref() {
        Some(query) => Some(app.find_subject(query)?.id),
        None => base.and_then(|f| f.subject_id),
    };

    Ok(FileRequest {
        name: args
            .name
            .or_else(|| base.map(|f| f.name.clone()))
            .unwrap_or_default(),
        file_type,
        subject_id,
        event_id: base.and_then(|f| f.event_id),
        url: args.url.or_else(|| base.and_then(|f| f.url.clone())),
        description: args
            .description
            .or_else(|| base.and_then(|f| f.description.clone())),
        size: args.size.or_else(|| base.and_then(|f| f.size)),
    })
}

pub fn run_add(app: &App, args: FileArgs, format: &OutputFormat, use_color: bool) -> Result<()> {
    let request = to_request(app, args, None)?;
    let file = app.locker.add_file(request)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&file)?),
        OutputFormat::Plain => {
            print!("Added ");
            print_file(app, &file, use_color)?;
        }
    }

    Ok(())
}

pub fn run_edit(app: &App, id: &str, args: FileArgs, format: &OutputFormat, use_color: bool) -> Result<()> {
    let existing = app.find_file(id)?;
    let request = to_request(app, args, Some(&existing))?;
    let file = app.locker.update_file(existing.id, request)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&file)?),
        OutputFormat::Plain => {
            print!("Updated ");
            print_file(app, &file, use_color)?;
        }
    }

    Ok(())
}

pub fn run_remove(app: &App, id: &str, format: &OutputFormat) -> Result<()> {
    let file = app.find_file(id)?;
    app.locker.delete_file(file.id)?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({ "id": file.id.to_string(), "removed": true });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => println!("Deleted \"{}\".", file.name),
    }

    Ok(())
}
