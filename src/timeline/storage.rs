//! Timeline event storage implementation

use chrono::{Local, NaiveDate};
use uuid::Uuid;

use super::models::*;
use crate::storage::{FileStorage, RecordStore, StorageError};
use crate::subjects::normalize_time;

type Result<T> = std::result::Result<T, StorageError>;

/// Storage for timeline events
pub struct EventStorage {
    events: RecordStore<Event>,
}

/// Trimmed text, `None` when blank
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl EventStorage {
    pub fn new(storage: &FileStorage) -> Self {
        Self {
            events: storage.store(),
        }
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    /// Validate a request into the fields of an event
    fn apply(event: &mut Event, request: EventRequest) -> Result<()> {
        let title = request.title.trim();
        if title.is_empty() {
            return Err(StorageError::InvalidOperation(
                "Event title cannot be empty".to_string(),
            ));
        }

        let time = match non_blank(request.time) {
            Some(raw) => Some(normalize_time(&raw).ok_or_else(|| {
                StorageError::InvalidOperation(format!("Invalid time '{}', expected HH:MM", raw))
            })?),
            None => None,
        };

        event.title = title.to_string();
        event.event_type = request.event_type;
        event.date = request.date;
        event.time = time;
        event.subject_id = request.subject_id;
        event.location = non_blank(request.location);
        event.notes = non_blank(request.notes);
        Ok(())
    }

    // ===== CRUD Operations =====

    pub fn list_events(&self) -> Result<Vec<Event>> {
        self.events.get_all()
    }

    pub fn get_event(&self, id: Uuid) -> Result<Option<Event>> {
        self.events.get_by_id(id)
    }

    /// Events on one day, in time order
    pub fn events_on(&self, date: NaiveDate) -> Result<Vec<Event>> {
        let on_day: Vec<Event> = self
            .list_events()?
            .into_iter()
            .filter(|e| e.date == date)
            .collect();
        Ok(filter_events(on_day, EventFilter::All, date))
    }

    pub fn create_event(&self, request: EventRequest) -> Result<Event> {
        let mut event = Event::new(String::new(), request.event_type, request.date);
        Self::apply(&mut event, request)?;
        self.events.put(&event)?;
        log::info!("Created {} '{}' on {}", event.event_type.label(), event.title, event.date);
        Ok(event)
    }

    /// Edit an event. Completion state and creation time are kept.
    pub fn update_event(&self, id: Uuid, request: EventRequest) -> Result<Event> {
        let mut event = self
            .get_event(id)?
            .ok_or_else(|| StorageError::NotFound(format!("Event {}", id)))?;
        Self::apply(&mut event, request)?;
        self.events.put(&event)?;
        Ok(event)
    }

    pub fn set_completed(&self, id: Uuid, completed: bool) -> Result<Event> {
        let mut event = self
            .get_event(id)?
            .ok_or_else(|| StorageError::NotFound(format!("Event {}", id)))?;
        event.completed = completed;
        self.events.put(&event)?;
        Ok(event)
    }

    pub fn delete_event(&self, id: Uuid) -> Result<bool> {
        self.events.delete(id)
    }

    // ===== Queries =====

    pub fn list_filtered(&self, filter: EventFilter) -> Result<Vec<Event>> {
        Ok(filter_events(self.list_events()?, filter, Self::today()))
    }

    pub fn stats(&self) -> Result<TimelineStats> {
        Ok(timeline_stats(&self.list_events()?, Self::today()))
    }
}
