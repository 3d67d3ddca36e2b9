//! Recalculation debouncing
//!
//! Grade input arrives one keystroke at a time. Each subject gets at most one
//! pending recalculation; scheduling a new one cancels the pending one, so
//! only the last value typed within the quiet period is evaluated.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::config::AppConfig;

/// Quiet period before a recalculation runs
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(120);

/// Per-subject debouncer. Must be used from within a tokio runtime.
pub struct RecalcDebouncer {
    delay: Duration,
    pending: HashMap<Uuid, JoinHandle<()>>,
}

impl Default for RecalcDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl RecalcDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: HashMap::new(),
        }
    }

    /// Debouncer with the configured `recalcDebounceMs` quiet period
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.recalc_debounce())
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `task` for `subject_id` after the quiet period, replacing any
    /// recalculation still waiting for that subject
    pub fn schedule<F>(&mut self, subject_id: Uuid, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if let Some(previous) = self.pending.remove(&subject_id) {
            if !previous.is_finished() {
                log::debug!("Recalculation for {} superseded", subject_id);
            }
            previous.abort();
        }

        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        });
        self.pending.insert(subject_id, handle);
    }

    /// Drop the pending recalculation of a subject. Returns whether one was
    /// still waiting.
    pub fn cancel(&mut self, subject_id: Uuid) -> bool {
        match self.pending.remove(&subject_id) {
            Some(handle) => {
                let waiting = !handle.is_finished();
                handle.abort();
                waiting
            }
            None => false,
        }
    }

    /// Number of subjects with a recalculation not yet completed
    pub fn pending_count(&self) -> usize {
        self.pending.values().filter(|h| !h.is_finished()).count()
    }

    /// Wait for every scheduled recalculation to finish
    pub async fn flush(&mut self) {
        for (_, handle) in self.pending.drain() {
            // An aborted task reports a cancellation error; nothing to do
            let _ = handle.await;
        }
    }
}

impl Drop for RecalcDebouncer {
    fn drop(&mut self) {
        for handle in self.pending.values() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[tokio::test(start_paused = true)]
    async fn test_only_last_value_runs() {
        let runs = Arc::new(AtomicUsize::new(0));
        let last = Arc::new(Mutex::new(None));
        let mut debouncer = RecalcDebouncer::default();
        let subject = Uuid::new_v4();

        for value in 0..3u32 {
            let runs = runs.clone();
            let last = last.clone();
            debouncer.schedule(subject, async move {
                runs.fetch_add(1, Ordering::SeqCst);
                *last.lock().unwrap() = Some(value);
            });
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(*last.lock().unwrap(), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_subjects_are_independent() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut debouncer = RecalcDebouncer::default();

        for _ in 0..2 {
            let runs = runs.clone();
            debouncer.schedule(Uuid::new_v4(), async move {
                runs.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(debouncer.pending_count(), 2);

        debouncer.flush().await;
        assert_eq!(runs.load(Ordering::SeqCst), 2);
        assert_eq!(debouncer.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quiet_period_lets_each_run() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut debouncer = RecalcDebouncer::new(Duration::from_millis(120));
        let subject = Uuid::new_v4();

        for _ in 0..2 {
            let runs = runs.clone();
            debouncer.schedule(subject, async move {
                runs.fetch_add(1, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(300)).await;
        }

        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_configured_quiet_period() {
        let config = AppConfig {
            recalc_debounce_ms: 500,
            ..AppConfig::default()
        };
        let runs = Arc::new(AtomicUsize::new(0));
        let mut debouncer = RecalcDebouncer::from_config(&config);
        assert_eq!(debouncer.delay(), Duration::from_millis(500));

        let counter = runs.clone();
        debouncer.schedule(Uuid::new_v4(), async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut debouncer = RecalcDebouncer::default();
        let subject = Uuid::new_v4();

        let counter = runs.clone();
        debouncer.schedule(subject, async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(debouncer.cancel(subject));
        assert!(!debouncer.cancel(subject));

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }
}
