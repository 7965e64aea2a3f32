use std::sync::Arc;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use crate::cache::ContentCache;
use crate::config::settings::StudyConfig;
use crate::error::StudyError;
use crate::metrics::QuizMetrics;
use crate::quiz::session::QuizSession;

/// The quiz currently being taken, with what population produced for it
pub struct ActiveQuiz {
    pub session: QuizSession,
    pub content_id: String,
    pub summary: String,
    pub topics: Vec<String>,
    pub started_at: DateTime<Utc>,
}

impl ActiveQuiz {
    pub fn new(
        session: QuizSession,
        content_id: impl Into<String>,
        summary: String,
        topics: Vec<String>,
    ) -> Self {
        ActiveQuiz {
            session,
            content_id: content_id.into(),
            summary,
            topics,
            started_at: Utc::now(),
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        (Utc::now() - self.started_at).num_milliseconds().max(0) as f64 / 1000.0
    }
}

/// Application-wide state container.
/// Every request locks `quiz` once and does its whole read-modify-write
/// under that lock; nothing awaits while holding it.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<StudyConfig>,
    pub quiz: Arc<Mutex<Option<ActiveQuiz>>>,
    pub cache: ContentCache,
    pub metrics: QuizMetrics,
}

impl AppState {
    pub fn new(config: StudyConfig, cache: ContentCache) -> Self {
        let metrics = QuizMetrics::new();
        AppState {
            config: Arc::new(config),
            quiz: Arc::new(Mutex::new(None)),
            cache: cache.with_metrics(metrics.clone()),
            metrics,
        }
    }

    /// State whose content cache never touches disk
    pub fn in_memory(config: StudyConfig) -> Self {
        AppState::new(config, ContentCache::in_memory())
    }

    /// State backed by the configured cache file
    pub async fn open(config: StudyConfig) -> Self {
        let cache = ContentCache::open(config.storage.cache_path()).await;
        AppState::new(config, cache)
    }

    /// Replace whatever quiz was active
    pub fn set_quiz(&self, quiz: ActiveQuiz) {
        let previous = self.quiz.lock().replace(quiz);
        if let Some(previous) = previous {
            tracing::info!(content_id = %previous.content_id, "Replaced active quiz");
        }
    }

    /// Run `f` against the active quiz under the lock
    pub fn with_quiz<F, T>(&self, f: F) -> Result<T, StudyError>
    where
        F: FnOnce(&mut ActiveQuiz) -> Result<T, StudyError>,
    {
        let mut guard = self.quiz.lock();
        let quiz = guard
            .as_mut()
            .ok_or_else(|| StudyError::new("Platform not initialized", "state"))?;
        f(quiz)
    }
}
