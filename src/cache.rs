use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use crate::error::StudyError;
use crate::metrics::QuizMetrics;

/// Characters of the document that take part in the fingerprint
const FINGERPRINT_PREFIX_CHARS: usize = 100;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CachedContent {
    pub data: serde_json::Value,
    pub timestamp: i64,
}

/// Cache key for one kind of derived content (`label`) of one document
pub fn fingerprint(label: &str, content_id: &str, document: &str) -> String {
    let prefix: String = document.chars().take(FINGERPRINT_PREFIX_CHARS).collect();
    let mut hasher = Sha256::new();
    hasher.update(format!("{}_{}_{}", label, content_id, prefix).as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Memoizes summaries, topics and question lists per document.
/// Optionally mirrored to a JSON file so results survive restarts.
#[derive(Clone)]
pub struct ContentCache {
    path: Option<PathBuf>,
    entries: Arc<RwLock<HashMap<String, CachedContent>>>,
    metrics: QuizMetrics,
}

impl ContentCache {
    pub fn in_memory() -> Self {
        ContentCache {
            path: None,
            entries: Arc::new(RwLock::new(HashMap::new())),
            metrics: QuizMetrics::new(),
        }
    }

    /// Load the cache file at `path`. A missing file starts empty; so does an
    /// unreadable or corrupt one, with a warning.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(content) => match serde_json::from_str::<HashMap<String, CachedContent>>(&content) {
                Ok(entries) => {
                    tracing::info!(path = ?path, entries = entries.len(), "Content cache loaded");
                    entries
                }
                Err(e) => {
                    tracing::warn!(
                        path = ?path,
                        error = %e,
                        "Content cache file is corrupt, starting empty"
                    );
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                tracing::warn!(
                    path = ?path,
                    error = %e,
                    "Failed to read content cache, starting empty"
                );
                HashMap::new()
            }
        };

        ContentCache {
            path: Some(path),
            entries: Arc::new(RwLock::new(entries)),
            metrics: QuizMetrics::new(),
        }
    }

    /// Count hits and misses into shared metrics
    pub fn with_metrics(mut self, metrics: QuizMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Cached value for `key`, or `None` on a miss or a shape mismatch
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entries = self.entries.read();
        let cached = entries.get(key)?;
        match serde_json::from_value::<T>(cached.data.clone()) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to decode cached content");
                None
            }
        }
    }

    pub async fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StudyError> {
        let data = serde_json::to_value(value)
            .map_err(|e| StudyError::from(e).with_context("cache entry serialization"))?;
        self.entries.write().insert(
            key.to_string(),
            CachedContent {
                data,
                timestamp: chrono::Utc::now().timestamp(),
            },
        );
        self.persist().await
    }

    /// Return the cached value for `key`, or run `compute`, store and return it.
    /// Errors from `compute` are passed through and nothing is stored.
    pub async fn get_or_compute<T, F, Fut>(&self, key: &str, compute: F) -> Result<T, StudyError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, StudyError>>,
    {
        if let Some(value) = self.get::<T>(key) {
            self.metrics.record_cache_hit();
            tracing::debug!(key = %key, "Content cache hit");
            return Ok(value);
        }

        self.metrics.record_cache_miss();
        tracing::debug!(key = %key, "Content cache miss");
        let value = compute().await?;
        self.put(key, &value).await?;
        Ok(value)
    }

    async fn persist(&self) -> Result<(), StudyError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let json = {
            let entries = self.entries.read();
            serde_json::to_string_pretty(&*entries)?
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StudyError::from(e).with_context(format!("path: {:?}", parent)))?;
        }
        tokio::fs::write(path, json)
            .await
            .map_err(|e| StudyError::from(e).with_context(format!("path: {:?}", path)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_depends_on_label_and_prefix_only() {
        let long_a = format!("{}{}", "x".repeat(100), "tail one");
        let long_b = format!("{}{}", "x".repeat(100), "tail two");
        assert_eq!(fingerprint("topics", "doc", &long_a), fingerprint("topics", "doc", &long_b));
        assert_ne!(fingerprint("topics", "doc", &long_a), fingerprint("summary", "doc", &long_a));
        assert_ne!(fingerprint("topics", "doc1", &long_a), fingerprint("topics", "doc2", &long_a));
    }

    #[tokio::test]
    async fn computes_once() {
        let metrics = QuizMetrics::new();
        let cache = ContentCache::in_memory().with_metrics(metrics.clone());

        let first: Vec<String> = cache
            .get_or_compute("k", || async { Ok(vec!["a".to_string()]) })
            .await
            .unwrap();
        let second: Vec<String> = cache
            .get_or_compute("k", || async { Err(StudyError::new("should not run", "test")) })
            .await
            .unwrap();
        assert_eq!(first, second);

        let snap = metrics.snapshot();
        assert_eq!(snap.cache_misses, 1);
        assert_eq!(snap.cache_hits, 1);
    }

    #[tokio::test]
    async fn failed_compute_stores_nothing() {
        let cache = ContentCache::in_memory();
        let result: Result<String, StudyError> = cache
            .get_or_compute("k", || async { Err(StudyError::generation("boom")) })
            .await;
        assert!(result.is_err());
        assert!(cache.is_empty());
    }
}
