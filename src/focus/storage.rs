//! Focus session storage implementation

use chrono::{DateTime, Local, Utc};
use thiserror::Error;
use uuid::Uuid;

use super::models::*;
use super::timer::FocusTimer;
use crate::storage::{FileStorage, RecordStore, StorageError};

#[derive(Error, Debug)]
pub enum FocusError {
    #[error("Session too short: {elapsed}s recorded, minimum is {minimum}s")]
    SessionTooShort { elapsed: u64, minimum: u64 },

    #[error("Duration must be positive")]
    InvalidDuration,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, FocusError>;

/// Storage for finished focus sessions
pub struct FocusStorage {
    sessions: RecordStore<FocusSession>,
    min_session_secs: u64,
}

impl FocusStorage {
    pub fn new(storage: &FileStorage) -> Self {
        Self {
            sessions: storage.store(),
            min_session_secs: DEFAULT_MIN_SESSION_SECS,
        }
    }

    pub fn with_min_session_secs(mut self, secs: u64) -> Self {
        self.min_session_secs = secs;
        self
    }

    /// All sessions, most recently ended first
    pub fn list_sessions(&self) -> Result<Vec<FocusSession>> {
        let mut sessions = self.sessions.get_all()?;
        sessions.sort_by(|a, b| b.ended_at.cmp(&a.ended_at));
        Ok(sessions)
    }

    pub fn recent_sessions(&self, limit: usize) -> Result<Vec<FocusSession>> {
        let mut sessions = self.list_sessions()?;
        sessions.truncate(limit);
        Ok(sessions)
    }

    /// Stop the timer and persist what it measured.
    ///
    /// Too-short sessions are rejected and leave the timer paused, so the
    /// user can resume. A saved session resets the timer.
    pub fn finish(
        &self,
        timer: &mut FocusTimer,
        subject_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<FocusSession> {
        timer.pause();
        let elapsed = timer.elapsed_secs();
        if elapsed < self.min_session_secs {
            return Err(FocusError::SessionTooShort {
                elapsed,
                minimum: self.min_session_secs,
            });
        }

        let session = FocusSession {
            id: Uuid::new_v4(),
            subject_id,
            date: now.with_timezone(&Local).date_naive(),
            duration: secs_to_minutes(elapsed),
            started_at: timer.started_at(),
            ended_at: now,
        };
        self.sessions.put(&session)?;
        timer.reset();

        log::info!(
            "Saved focus session of {} ({})",
            format_duration(session.duration),
            subject_id.map_or_else(|| "general".to_string(), |id| id.to_string())
        );
        Ok(session)
    }

    /// Record a session that was timed elsewhere, ending now
    pub fn log_session(&self, subject_id: Option<Uuid>, minutes: f64) -> Result<FocusSession> {
        if !minutes.is_finite() || minutes <= 0.0 {
            return Err(FocusError::InvalidDuration);
        }

        let now = Utc::now();
        let session = FocusSession {
            id: Uuid::new_v4(),
            subject_id,
            date: now.with_timezone(&Local).date_naive(),
            duration: (minutes * 10.0).round() / 10.0,
            started_at: None,
            ended_at: now,
        };
        self.sessions.put(&session)?;
        Ok(session)
    }

    pub fn delete_session(&self, id: Uuid) -> Result<bool> {
        Ok(self.sessions.delete(id)?)
    }

    pub fn ranking(&self) -> Result<Vec<RankingEntry>> {
        Ok(ranking(&self.sessions.get_all()?))
    }

    pub fn today_minutes(&self) -> Result<f64> {
        let today = Local::now().date_naive();
        Ok(total_minutes_on(&self.sessions.get_all()?, today))
    }

    pub fn total_minutes(&self) -> Result<f64> {
        Ok(self.sessions.get_all()?.iter().map(|s| s.duration).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_storage() -> (FocusStorage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path().to_path_buf());
        (FocusStorage::new(&storage), temp_dir)
    }

    fn run_for(timer: &mut FocusTimer, secs: u64) {
        timer.start(Utc::now());
        for _ in 0..secs {
            timer.tick();
        }
    }

    #[test]
    fn test_finish_rejects_short_session() {
        let (storage, _temp) = create_test_storage();
        let mut timer = FocusTimer::new();
        run_for(&mut timer, 9);

        let err = storage.finish(&mut timer, None, Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            FocusError::SessionTooShort {
                elapsed: 9,
                minimum: 10
            }
        ));
        assert!(!timer.is_running());
        assert_eq!(timer.elapsed_secs(), 9);
        assert!(storage.list_sessions().unwrap().is_empty());
    }

    #[test]
    fn test_finish_saves_and_resets() {
        let (storage, _temp) = create_test_storage();
        let subject = Uuid::new_v4();
        let mut timer = FocusTimer::new();
        run_for(&mut timer, 25 * 60 + 20);

        let session = storage.finish(&mut timer, Some(subject), Utc::now()).unwrap();
        assert_eq!(session.duration, 25.3);
        assert!(session.started_at.is_some());
        assert_eq!(timer, FocusTimer::new());

        assert_eq!(storage.list_sessions().unwrap(), vec![session]);
        assert_eq!(storage.today_minutes().unwrap(), 25.3);
    }

    #[test]
    fn test_custom_minimum() {
        let (storage, _temp) = create_test_storage();
        let storage = storage.with_min_session_secs(60);
        let mut timer = FocusTimer::new();
        run_for(&mut timer, 30);
        assert!(storage.finish(&mut timer, None, Utc::now()).is_err());
    }

    #[test]
    fn test_log_session_and_ranking() {
        let (storage, _temp) = create_test_storage();
        let subject = Uuid::new_v4();

        storage.log_session(Some(subject), 30.0).unwrap();
        storage.log_session(None, 45.0).unwrap();
        storage.log_session(Some(subject), 20.04).unwrap();
        assert!(matches!(
            storage.log_session(None, 0.0),
            Err(FocusError::InvalidDuration)
        ));

        let ranked = storage.ranking().unwrap();
        assert_eq!(ranked[0].subject_id, Some(subject));
        assert_eq!(ranked[0].minutes, 50.0);
        assert_eq!(ranked[1].subject_id, None);
        assert_eq!(storage.total_minutes().unwrap(), 95.0);
        assert_eq!(storage.recent_sessions(2).unwrap().len(), 2);
    }
}
