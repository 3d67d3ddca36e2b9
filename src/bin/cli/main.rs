mod app;
mod commands;
mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use studyflow_lib::config::{resolve_data_dir, AppConfig};
use studyflow_lib::timeline::EventFilter;

use commands::formula::parse_assignment;

#[derive(Parser)]
#[command(name = "studyflow-cli", about = "StudyFlow study manager CLI", version)]
struct Cli {
    /// Data directory (default: platform data dir)
    #[arg(long, global = true, env = "STUDYFLOW_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate and inspect grade formulas without saving anything
    #[command(subcommand)]
    Formula(FormulaCommand),

    /// Grade formulas and grades per subject
    #[command(subcommand)]
    Grades(GradesCommand),

    /// Grade variable types (P = Prova, T = Trabalho, ...)
    #[command(subcommand)]
    Vars(VarsCommand),

    /// Subjects
    #[command(subcommand)]
    Subjects(SubjectsCommand),

    /// Flashcards and spaced-repetition review
    #[command(subcommand)]
    Cards(CardsCommand),

    /// Exams, assignments and reminders
    #[command(subcommand)]
    Events(EventsCommand),

    /// Roadmap topics per subject
    #[command(subcommand)]
    Topics(TopicsCommand),

    /// Locker of PDFs, images, links and notes
    #[command(subcommand)]
    Files(FilesCommand),

    /// Focus timer and study time
    #[command(subcommand)]
    Focus(FocusCommand),

    /// Show or change settings
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand)]
enum FormulaCommand {
    /// Evaluate a formula; unset variables count as 0
    Eval {
        formula: String,
        /// Variable value, e.g. --var P1=7.5
        #[arg(long = "var", value_parser = parse_assignment)]
        vars: Vec<(String, f64)>,
    },
    /// List the variables of a formula
    Vars { formula: String },
    /// Report brackets, variables and whether the formula can be saved
    Check { formula: String },
    /// Print the formula with syntax colors
    Highlight { formula: String },
    /// Grade needed on the unknown variables to reach the passing grade
    Survival {
        formula: String,
        /// Passing grade
        #[arg(long, default_value = "6")]
        passing: f64,
        /// Known variable value, e.g. --var P1=5
        #[arg(long = "var", value_parser = parse_assignment)]
        vars: Vec<(String, f64)>,
    },
}

#[derive(Subcommand)]
enum GradesCommand {
    /// Set the grade formula of a subject
    SetFormula {
        /// Subject name (case-insensitive prefix match) or id
        subject: String,
        formula: String,
        /// Passing grade (default: from config, or the current one)
        #[arg(long)]
        passing: Option<f64>,
    },
    /// Set a grade; omit the value to clear it
    Set {
        subject: String,
        variable: String,
        value: Option<f64>,
    },
    /// Enter grades line by line; the summary updates once typing pauses
    Edit { subject: String },
    /// Show grades of one subject or all subjects
    Show { subject: Option<String> },
    /// Clear every grade of a subject
    Clear { subject: String },
}

#[derive(Subcommand)]
enum VarsCommand {
    /// List variable types
    List,
    /// Add a custom variable type
    Add { letter: String, name: String },
    /// Remove a custom variable type
    Remove { letter: String },
}

#[derive(clap::Args)]
struct SubjectArgs {
    /// Color as #rrggbb
    #[arg(long)]
    color: Option<String>,
    #[arg(long)]
    teacher: Option<String>,
    #[arg(long)]
    room: Option<String>,
    /// Comma-separated class days (seg,ter,qua,qui,sex,sab)
    #[arg(long)]
    days: Option<String>,
    /// Class start time (HH:MM)
    #[arg(long)]
    start: Option<String>,
    /// Class end time (HH:MM)
    #[arg(long)]
    end: Option<String>,
}

impl SubjectArgs {
    fn into_fields(self, name: Option<String>) -> commands::subjects::SubjectFields {
        commands::subjects::SubjectFields {
            name,
            color: self.color,
            teacher: self.teacher,
            room: self.room,
            days: self.days,
            start: self.start,
            end: self.end,
        }
    }
}

#[derive(Subcommand)]
enum SubjectsCommand {
    /// List subjects
    List,
    /// Add a subject
    Add {
        name: String,
        #[command(flatten)]
        fields: SubjectArgs,
    },
    /// Edit a subject
    Edit {
        subject: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        fields: SubjectArgs,
    },
    /// Remove a subject with its grades and roadmap
    Remove { subject: String },
}

#[derive(Subcommand)]
enum CardsCommand {
    /// List flashcards
    List {
        #[arg(long)]
        subject: Option<String>,
    },
    /// Add a flashcard
    Add {
        front: String,
        back: String,
        #[arg(long)]
        subject: Option<String>,
    },
    /// Edit a flashcard; its review schedule is kept
    Edit {
        /// Card id or id prefix
        id: String,
        #[arg(long)]
        front: Option<String>,
        #[arg(long)]
        back: Option<String>,
        #[arg(long)]
        subject: Option<String>,
    },
    /// Delete a flashcard
    Remove { id: String },
    /// List cards due for review
    Due,
    /// Rate one card: again, hard, good or easy
    Rate { id: String, rating: String },
    /// Review every due card interactively
    Review,
    /// Review statistics
    Stats,
}

#[derive(Subcommand)]
enum EventsCommand {
    /// List events (upcoming by default)
    List {
        /// Only past events, most recent first
        #[arg(long, conflicts_with = "all")]
        past: bool,
        /// Every event
        #[arg(long)]
        all: bool,
    },
    /// Events scheduled for today
    Today,
    /// Add an event
    Add {
        title: String,
        /// YYYY-MM-DD, DD/MM/YYYY, hoje or amanhã
        date: String,
        /// prova, trabalho, evento or lembrete
        #[arg(long = "type")]
        event_type: Option<String>,
        /// HH:MM
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Mark an event as done
    Done {
        id: String,
        /// Mark as not done instead
        #[arg(long)]
        undo: bool,
    },
    /// Delete an event
    Remove { id: String },
    /// Upcoming, this week and overdue counts
    Stats,
}

#[derive(Subcommand)]
enum TopicsCommand {
    /// Topics of a subject, or progress of every subject
    List { subject: Option<String> },
    /// Add a topic (appended unless --order is given)
    Add {
        subject: String,
        name: String,
        #[arg(long)]
        order: Option<u32>,
    },
    /// Rename or reorder a topic
    Edit {
        subject: String,
        topic: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        order: Option<u32>,
    },
    /// Toggle a topic done / not done
    Toggle { subject: String, topic: String },
    /// Delete a topic
    Remove { subject: String, topic: String },
}

#[derive(clap::Args)]
struct FileFields {
    /// pdf, image, link, note or other
    #[arg(long = "type")]
    file_type: Option<String>,
    #[arg(long)]
    subject: Option<String>,
    #[arg(long)]
    url: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// Size in bytes
    #[arg(long)]
    size: Option<u64>,
}

impl FileFields {
    fn into_args(self, name: Option<String>) -> commands::files::FileArgs {
        commands::files::FileArgs {
            name,
            file_type: self.file_type,
            subject: self.subject,
            url: self.url,
            description: self.description,
            size: self.size,
        }
    }
}

#[derive(Subcommand)]
enum FilesCommand {
    /// List files, newest first
    List {
        #[arg(long = "type")]
        file_type: Option<String>,
        #[arg(long)]
        subject: Option<String>,
    },
    /// Add a file, link or note
    Add {
        name: String,
        #[command(flatten)]
        fields: FileFields,
    },
    /// Edit a locker entry
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        fields: FileFields,
    },
    /// Delete a locker entry
    Remove { id: String },
}

#[derive(Subcommand)]
enum FocusCommand {
    /// Run a live focus timer
    Start {
        #[arg(long)]
        subject: Option<String>,
    },
    /// Record a session timed elsewhere
    Log {
        minutes: f64,
        #[arg(long)]
        subject: Option<String>,
    },
    /// Study time per subject
    Ranking,
    /// Most recent sessions
    Sessions {
        #[arg(long, default_value = "10")]
        limit: usize,
    },
    /// Delete a session
    Remove { id: String },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show the current settings
    Show,
    /// Change a setting, e.g. `config set defaultPassingGrade 5`
    Set { key: String, value: String },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let use_color = !cli.no_color && atty_check();
    let format = &cli.format;

    match cli.command {
        Command::Formula(subcmd) => match subcmd {
            FormulaCommand::Eval { formula, vars } => {
                commands::formula::run_eval(&formula, &vars, format)?;
            }
            FormulaCommand::Vars { formula } => commands::formula::run_vars(&formula, format)?,
            FormulaCommand::Check { formula } => {
                commands::formula::run_check(&formula, format, use_color)?;
            }
            FormulaCommand::Highlight { formula } => {
                commands::formula::run_highlight(&formula, format, use_color)?;
            }
            FormulaCommand::Survival { formula, passing, vars } => {
                // Formula commands work without a data directory
                let config = resolve_data_dir(cli.data_dir.clone())
                    .and_then(|dir| AppConfig::load(&dir))
                    .unwrap_or_default();
                commands::formula::run_survival(
                    &formula,
                    passing,
                    &vars,
                    config.difficult_threshold,
                    format,
                    use_color,
                )?;
            }
        },
        Command::Grades(subcmd) => {
            let app = app::App::new(cli.data_dir)?;
            match subcmd {
                GradesCommand::SetFormula { subject, formula, passing } => {
                    commands::grades::run_set_formula(&app, &subject, &formula, passing, format, use_color)?;
                }
                GradesCommand::Set { subject, variable, value } => {
                    commands::grades::run_set(&app, &subject, &variable, value, format, use_color)?;
                }
                GradesCommand::Edit { subject } => commands::grades::run_edit(&app, &subject, use_color)?,
                GradesCommand::Show { subject } => {
                    commands::grades::run_show(&app, subject.as_deref(), format, use_color)?;
                }
                GradesCommand::Clear { subject } => commands::grades::run_clear(&app, &subject, format)?,
            }
        }
        Command::Vars(subcmd) => {
            let app = app::App::new(cli.data_dir)?;
            match subcmd {
                VarsCommand::List => commands::vars::run_list(&app, format, use_color)?,
                VarsCommand::Add { letter, name } => commands::vars::run_add(&app, &letter, &name, format)?,
                VarsCommand::Remove { letter } => commands::vars::run_remove(&app, &letter, format)?,
            }
        }
        Command::Subjects(subcmd) => {
            let app = app::App::new(cli.data_dir)?;
            match subcmd {
                SubjectsCommand::List => commands::subjects::run_list(&app, format, use_color)?,
                SubjectsCommand::Add { name, fields } => {
                    commands::subjects::run_add(&app, &name, fields.into_fields(None), format, use_color)?;
                }
                SubjectsCommand::Edit { subject, name, fields } => {
                    commands::subjects::run_edit(&app, &subject, fields.into_fields(name), format, use_color)?;
                }
                SubjectsCommand::Remove { subject } => commands::subjects::run_remove(&app, &subject, format)?,
            }
        }
        Command::Cards(subcmd) => {
            let app = app::App::new(cli.data_dir)?;
            match subcmd {
                CardsCommand::List { subject } => {
                    commands::cards::run_list(&app, subject.as_deref(), format, use_color)?;
                }
                CardsCommand::Add { front, back, subject } => {
                    commands::cards::run_add(&app, &front, &back, subject.as_deref(), format)?;
                }
                CardsCommand::Edit { id, front, back, subject } => {
                    commands::cards::run_edit(
                        &app,
                        &id,
                        front.as_deref(),
                        back.as_deref(),
                        subject.as_deref(),
                        format,
                    )?;
                }
                CardsCommand::Remove { id } => commands::cards::run_remove(&app, &id, format)?,
                CardsCommand::Due => commands::cards::run_due(&app, format, use_color)?,
                CardsCommand::Rate { id, rating } => commands::cards::run_rate(&app, &id, &rating, format)?,
                CardsCommand::Review => commands::cards::run_review(&app, use_color)?,
                CardsCommand::Stats => commands::cards::run_stats(&app, format)?,
            }
        }
        Command::Events(subcmd) => {
            let app = app::App::new(cli.data_dir)?;
            match subcmd {
                EventsCommand::List { past, all } => {
                    let filter = if past {
                        EventFilter::Past
                    } else if all {
                        EventFilter::All
                    } else {
                        EventFilter::Upcoming
                    };
                    commands::events::run_list(&app, filter, format, use_color)?;
                }
                EventsCommand::Today => commands::events::run_today(&app, format, use_color)?,
                EventsCommand::Add { title, date, event_type, time, subject, location, notes } => {
                    let args = commands::events::EventArgs {
                        title,
                        date,
                        event_type,
                        time,
                        subject,
                        location,
                        notes,
                    };
                    commands::events::run_add(&app, args, format)?;
                }
                EventsCommand::Done { id, undo } => commands::events::run_done(&app, &id, undo, format)?,
                EventsCommand::Remove { id } => commands::events::run_remove(&app, &id, format)?,
                EventsCommand::Stats => commands::events::run_stats(&app, format, use_color)?,
            }
        }
        Command::Topics(subcmd) => {
            let app = app::App::new(cli.data_dir)?;
            match subcmd {
                TopicsCommand::List { subject } => {
                    commands::topics::run_list(&app, subject.as_deref(), format, use_color)?;
                }
                TopicsCommand::Add { subject, name, order } => {
                    commands::topics::run_add(&app, &subject, &name, order, format)?;
                }
                TopicsCommand::Edit { subject, topic, name, order } => {
                    commands::topics::run_edit(&app, &subject, &topic, name.as_deref(), order, format)?;
                }
                TopicsCommand::Toggle { subject, topic } => {
                    commands::topics::run_toggle(&app, &subject, &topic, format, use_color)?;
                }
                TopicsCommand::Remove { subject, topic } => {
                    commands::topics::run_remove(&app, &subject, &topic, format)?;
                }
            }
        }
        Command::Files(subcmd) => {
            let app = app::App::new(cli.data_dir)?;
            match subcmd {
                FilesCommand::List { file_type, subject } => {
                    let file_type = file_type
                        .as_deref()
                        .map(commands::files::parse_type)
                        .transpose()?;
                    commands::files::run_list(&app, file_type, subject.as_deref(), format, use_color)?;
                }
                FilesCommand::Add { name, fields } => {
                    commands::files::run_add(&app, fields.into_args(Some(name)), format, use_color)?;
                }
                FilesCommand::Edit { id, name, fields } => {
                    commands::files::run_edit(&app, &id, fields.into_args(name), format, use_color)?;
                }
                FilesCommand::Remove { id } => commands::files::run_remove(&app, &id, format)?,
            }
        }
        Command::Focus(subcmd) => {
            let app = app::App::new(cli.data_dir)?;
            match subcmd {
                FocusCommand::Start { subject } => {
                    commands::focus::run_timer(&app, subject.as_deref(), use_color)?;
                }
                FocusCommand::Log { minutes, subject } => {
                    commands::focus::run_log(&app, minutes, subject.as_deref(), format)?;
                }
                FocusCommand::Ranking => commands::focus::run_ranking(&app, format, use_color)?,
                FocusCommand::Sessions { limit } => commands::focus::run_sessions(&app, limit, format)?,
                FocusCommand::Remove { id } => commands::focus::run_remove(&app, &id, format)?,
            }
        }
        Command::Config(subcmd) => {
            let app = app::App::new(cli.data_dir)?;
            match subcmd {
                ConfigCommand::Show => commands::config::run_show(&app, format)?,
                ConfigCommand::Set { key, value } => commands::config::run_set(&app, &key, &value)?,
            }
        }
    }

    Ok(())
}

/// Check if stdout is a terminal (for color support)
fn atty_check() -> bool {
    unsafe { libc_isatty(1) != 0 }
}

extern "C" {
    #[link_name = "isatty"]
    fn libc_isatty(fd: i32) -> i32;
}
