use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use uuid::Uuid;

use studyflow_lib::config::{resolve_data_dir, AppConfig};
use studyflow_lib::flashcards::{Flashcard, FlashcardStorage};
use studyflow_lib::focus::FocusStorage;
use studyflow_lib::grades::GradeBook;
use studyflow_lib::locker::{LockerFile, LockerStorage};
use studyflow_lib::roadmap::{RoadmapStorage, Topic};
use studyflow_lib::storage::FileStorage;
use studyflow_lib::subjects::{Subject, SubjectStorage};
use studyflow_lib::timeline::{Event, EventStorage};

/// Shared application state for CLI commands
pub struct App {
    pub storage: FileStorage,
    pub config: AppConfig,
    pub subjects: SubjectStorage,
    pub grades: GradeBook,
    pub cards: FlashcardStorage,
    pub events: EventStorage,
    pub locker: LockerStorage,
    pub roadmap: RoadmapStorage,
    pub focus: FocusStorage,
}

/// What deleting a subject took with it
pub struct SubjectRemoval {
    pub subject: Subject,
    pub topics: usize,
    pub unlinked_cards: usize,
    pub unlinked_files: usize,
}

impl App {
    /// Open the data directory (flag, then environment, then default)
    pub fn new(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = resolve_data_dir(data_dir).context("Failed to get data directory")?;

        let storage = FileStorage::new(data_dir.clone());
        storage.init().context("Failed to initialize storage")?;

        let config = AppConfig::load(&data_dir)
            .with_context(|| format!("Failed to read config in {}", data_dir.display()))?;

        Ok(Self {
            subjects: SubjectStorage::new(&storage),
            grades: GradeBook::new(&storage).with_difficult_threshold(config.difficult_threshold),
            cards: FlashcardStorage::new(&storage),
            events: EventStorage::new(&storage),
            locker: LockerStorage::new(&storage),
            roadmap: RoadmapStorage::new(&storage),
            focus: FocusStorage::new(&storage).with_min_session_secs(config.min_focus_session_secs),
            storage,
            config,
        })
    }

    /// Find a subject by id or name (case-insensitive prefix match)
    pub fn find_subject(&self, query: &str) -> Result<Subject> {
        let matches = self
            .subjects
            .find_subjects(query)
            .context("Failed to list subjects")?;

        match matches.len() {
            0 => {
                let all = self.list_subjects()?;
                if all.is_empty() {
                    bail!("No subject matching '{}'. No subjects yet; add one with `subjects add`.", query);
                }
                bail!("No subject matching '{}'. Available subjects:\n{}", query,
                    all.iter().map(|s| format!("  - {}", s.name)).collect::<Vec<_>>().join("\n"))
            }
            1 => Ok(matches[0].clone()),
            _ => bail!("Ambiguous subject name '{}'. Matches:\n{}", query,
                matches.iter().map(|s| format!("  - {}", s.name)).collect::<Vec<_>>().join("\n")),
        }
    }

    /// Resolve an optional subject argument
    pub fn find_subject_opt(&self, query: Option<&str>) -> Result<Option<Subject>> {
        query.map(|q| self.find_subject(q)).transpose()
    }

    /// Find a flashcard by id or unique id prefix
    pub fn find_card(&self, id: &str) -> Result<Flashcard> {
        let cards = self.cards.list_cards().context("Failed to list flashcards")?;
        find_by_id_prefix(cards, id, "flashcard", |c| c.id)
    }

    pub fn find_event(&self, id: &str) -> Result<Event> {
        let events = self.events.list_events().context("Failed to list events")?;
        find_by_id_prefix(events, id, "event", |e| e.id)
    }

    pub fn find_file(&self, id: &str) -> Result<LockerFile> {
        let files = self.locker.list_files(None).context("Failed to list files")?;
        find_by_id_prefix(files, id, "file", |f| f.id)
    }

    /// Find a topic of a subject by id prefix or case-insensitive name prefix
    pub fn find_topic(&self, subject_id: Uuid, query: &str) -> Result<Topic> {
        let topics = self.roadmap.list_topics(subject_id).context("Failed to list topics")?;
        let query_lower = query.trim().to_lowercase();

        if let Some(t) = topics.iter().find(|t| t.name.to_lowercase() == query_lower) {
            return Ok(t.clone());
        }

        let matches: Vec<&Topic> = topics.iter()
            .filter(|t| {
                t.name.to_lowercase().starts_with(&query_lower)
                    || t.id.to_string().starts_with(&query_lower)
            })
            .collect();

        match matches.len() {
            0 => bail!("No topic matching '{}'", query),
            1 => Ok(matches[0].clone()),
            _ => bail!("Ambiguous topic '{}'. Matches:\n{}", query,
                matches.iter().map(|t| format!("  - {}", t.name)).collect::<Vec<_>>().join("\n")),
        }
    }

    pub fn list_subjects(&self) -> Result<Vec<Subject>> {
        self.subjects.list_subjects().context("Failed to list subjects")
    }

    /// Display name for an optional subject link
    pub fn subject_name(&self, subject_id: Option<Uuid>) -> Result<String> {
        let Some(id) = subject_id else {
            return Ok("Geral".to_string());
        };
        Ok(self
            .subjects
            .get_subject(id)
            .context("Failed to read subject")?
            .map_or_else(|| "Desconhecido".to_string(), |s| s.name))
    }

    /// Delete a subject along with its grade scheme, grades and roadmap.
    /// Flashcards and locker files stay, detached from the subject.
    pub fn delete_subject(&self, query: &str) -> Result<SubjectRemoval> {
        let subject = self.find_subject(query)?;

        self.grades
            .remove_subject(subject.id)
            .context("Failed to remove grades")?;
        let topics = self
            .roadmap
            .remove_subject(subject.id)
            .context("Failed to remove roadmap topics")?;
        let unlinked_cards = self
            .cards
            .unlink_subject(subject.id)
            .context("Failed to unlink flashcards")?;
        let unlinked_files = self
            .locker
            .unlink_subject(subject.id)
            .context("Failed to unlink locker files")?;
        self.subjects
            .delete_subject(subject.id)
            .context("Failed to delete subject")?;

        Ok(SubjectRemoval {
            subject,
            topics,
            unlinked_cards,
            unlinked_files,
        })
    }
}

/// Pick the single record whose id starts with `id`
fn find_by_id_prefix<T>(records: Vec<T>, id: &str, what: &str, id_of: impl Fn(&T) -> Uuid) -> Result<T> {
    let prefix = id.trim().to_lowercase();
    if prefix.is_empty() {
        bail!("Empty {} id", what);
    }

    let mut matches: Vec<T> = records
        .into_iter()
        .filter(|r| id_of(r).to_string().starts_with(&prefix))
        .collect();

    match matches.len() {
        0 => bail!("No {} with id '{}'", what, id),
        1 => Ok(matches.remove(0)),
        n => bail!("Ambiguous {} id '{}' ({} matches); use more characters", what, id, n),
    }
}
