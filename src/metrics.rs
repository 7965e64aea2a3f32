use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use serde::Serialize;

/// Quiz counters. Clones share the same underlying atomics.
#[derive(Clone, Default)]
pub struct QuizMetrics {
    pub questions_served: Arc<AtomicU64>,
    pub answers_correct: Arc<AtomicU64>,
    pub answers_incorrect: Arc<AtomicU64>,
    /// Selections that had to drop the difficulty filter
    pub widenings: Arc<AtomicU64>,
    /// Times the used-question set was cleared
    pub recycles: Arc<AtomicU64>,
    pub cache_hits: Arc<AtomicU64>,
    pub cache_misses: Arc<AtomicU64>,
    /// Topics that contributed no questions to the pool
    pub generation_failures: Arc<AtomicU64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub questions_served: u64,
    pub answers_correct: u64,
    pub answers_incorrect: u64,
    pub widenings: u64,
    pub recycles: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub generation_failures: u64,
}

impl QuizMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_served(&self, widened: bool, recycled: bool) {
        self.questions_served.fetch_add(1, Ordering::Relaxed);
        if widened {
            self.widenings.fetch_add(1, Ordering::Relaxed);
        }
        if recycled {
            self.recycles.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_answer(&self, correct: bool) {
        if correct {
            self.answers_correct.fetch_add(1, Ordering::Relaxed);
        } else {
            self.answers_incorrect.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_generation_failure(&self) {
        self.generation_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            questions_served: self.questions_served.load(Ordering::Relaxed),
            answers_correct: self.answers_correct.load(Ordering::Relaxed),
            answers_incorrect: self.answers_incorrect.load(Ordering::Relaxed),
            widenings: self.widenings.load(Ordering::Relaxed),
            recycles: self.recycles.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            generation_failures: self.generation_failures.load(Ordering::Relaxed),
        }
    }
}
