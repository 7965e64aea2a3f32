use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use lazy_static::lazy_static;
use crate::config::app_data_dir;
use crate::error::StudyError;
use crate::quiz::difficulty::{Difficulty, DifficultyModel};

pub const CONFIG_ENV: &str = "STUDYAID_CONFIG";
const CONFIG_FILE: &str = "studyaid.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyConfig {
    pub quiz: QuizSettings,
    pub generator: GeneratorSettings,
    pub storage: StorageSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizSettings {
    pub difficulty_model: DifficultyModel,
    /// Overrides the model's default start (medium / 5)
    pub start_difficulty: Option<Difficulty>,
    /// Allowed level distance in the numeric model
    pub tolerance: u8,
    pub questions_per_topic: usize,
    pub excerpt_chars: usize,
    pub max_topics: usize,
}

impl Default for QuizSettings {
    fn default() -> Self {
        QuizSettings {
            difficulty_model: DifficultyModel::Tiered,
            start_difficulty: None,
            tolerance: 2,
            questions_per_topic: 2,
            excerpt_chars: 3000,
            max_topics: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub min_call_interval_ms: u64,
    pub breaker_threshold: u32,
    pub breaker_timeout_secs: u64,
    pub response_cache_size: usize,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        GeneratorSettings {
            base_url: "http://localhost:11434".to_string(),
            model: "qwen2.5:7b-instruct".to_string(),
            timeout_secs: 60,
            max_attempts: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 8000,
            min_call_interval_ms: 1000,
            breaker_threshold: 5,
            breaker_timeout_secs: 60,
            response_cache_size: 200,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub cache_path: Option<PathBuf>,
    pub results_dir: Option<PathBuf>,
}

impl StorageSettings {
    pub fn cache_path(&self) -> PathBuf {
        self.cache_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("data/content_cache.json"))
    }

    pub fn results_dir(&self) -> PathBuf {
        if let Some(dir) = &self.results_dir {
            return dir.clone();
        }
        match app_data_dir() {
            Some(base) => base.join("data").join("results"),
            None => PathBuf::from("data/results"),
        }
    }
}

impl StudyConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, StudyError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load_from(path: &Path) -> Result<Self, StudyError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| StudyError::from(e).with_context(format!("path: {:?}", path)))?;
        StudyConfig::from_toml_str(&content)
            .map_err(|e| e.with_context(format!("path: {:?}", path)))
    }
}

fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    match app_data_dir() {
        Some(dir) => dir.join(CONFIG_FILE),
        None => PathBuf::from(CONFIG_FILE),
    }
}

fn load_config_internal() -> StudyConfig {
    let path = config_path();
    if !path.exists() {
        tracing::info!(path = ?path, "No config file found, using defaults");
        return StudyConfig::default();
    }

    match StudyConfig::load_from(&path) {
        Ok(config) => {
            tracing::info!(path = ?path, "Loaded configuration");
            config
        }
        Err(e) => {
            tracing::warn!(path = ?path, error = %e, "Failed to load config, using defaults");
            StudyConfig::default()
        }
    }
}

lazy_static! {
    static ref STUDY_CONFIG: StudyConfig = load_config_internal();
}

/// Process-wide configuration, read on first access
pub fn get_config() -> &'static StudyConfig {
    &STUDY_CONFIG
}
