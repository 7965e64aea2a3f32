use serde::{Serialize, Deserialize};
use std::fmt;

/// Failures of the quiz engine itself.
/// Both are caller-correctable; every other path through the engine recovers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum QuizError {
    #[error("question pool is empty")]
    EmptyPool,
    #[error("no question is awaiting an answer")]
    NoPendingQuestion,
}

/// Unified error type for everything around the engine: generation, cache,
/// config, persistence and the request adapters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyError {
    pub message: String,
    pub stage: String,
    pub model: Option<String>,
    pub retry_succeeded: bool,
    pub context: Option<String>,
    pub source: Option<String>,
}

impl StudyError {
    /// Create a new error with stage and message
    pub fn new<S: Into<String>>(message: S, stage: &'static str) -> Self {
        StudyError {
            message: message.into(),
            stage: stage.to_string(),
            model: None,
            retry_succeeded: false,
            context: None,
            source: None,
        }
    }

    /// A question generator call that produced nothing usable
    pub fn generation<S: Into<String>>(message: S) -> Self {
        StudyError::new(message, "generation")
    }

    pub fn with_model<S: Into<String>>(mut self, model: S) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Mark whether a retry succeeded
    pub fn with_retry(mut self, succeeded: bool) -> Self {
        self.retry_succeeded = succeeded;
        self
    }

    pub fn with_context<S: Into<String>>(mut self, context: S) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_source<S: Into<String>>(mut self, source: S) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn is_generation_failure(&self) -> bool {
        self.stage == "generation"
    }
}

impl fmt::Display for StudyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.stage, self.message)?;
        if let Some(ref model) = self.model {
            write!(f, " (model: {})", model)?;
        }
        if let Some(ref context) = self.context {
            write!(f, " (context: {})", context)?;
        }
        if let Some(ref source) = self.source {
            write!(f, " (source: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for StudyError {}

impl From<QuizError> for StudyError {
    fn from(err: QuizError) -> Self {
        StudyError::new(err.to_string(), "quiz")
    }
}

impl From<anyhow::Error> for StudyError {
    fn from(err: anyhow::Error) -> Self {
        StudyError::new(format!("{:#}", err), "unknown").with_source("anyhow")
    }
}

impl From<std::io::Error> for StudyError {
    fn from(err: std::io::Error) -> Self {
        StudyError::new(format!("I/O error: {}", err), "io").with_source("std::io")
    }
}

impl From<serde_json::Error> for StudyError {
    fn from(err: serde_json::Error) -> Self {
        StudyError::new(format!("JSON error: {}", err), "json_parse").with_source("serde_json")
    }
}

impl From<toml::de::Error> for StudyError {
    fn from(err: toml::de::Error) -> Self {
        StudyError::new(format!("Config error: {}", err), "config").with_source("toml")
    }
}

impl From<reqwest::Error> for StudyError {
    fn from(err: reqwest::Error) -> Self {
        StudyError::new(format!("HTTP error: {}", err), "http").with_source("reqwest")
    }
}

impl From<tokio::time::error::Elapsed> for StudyError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        StudyError::new("Operation timed out", "timeout").with_source("tokio::time")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = StudyError::new("Test error", "test_stage");
        assert_eq!(error.message, "Test error");
        assert_eq!(error.stage, "test_stage");
        assert!(!error.retry_succeeded);
    }

    #[test]
    fn test_error_with_context_and_model() {
        let error = StudyError::new("Test error", "test_stage")
            .with_context("Additional context")
            .with_model("test-model");
        assert_eq!(error.context.as_deref(), Some("Additional context"));
        assert_eq!(error.model.as_deref(), Some("test-model"));
    }

    #[test]
    fn test_error_display() {
        let error = StudyError::new("Test error", "test_stage")
            .with_context("context")
            .with_model("model");
        let display = format!("{}", error);
        assert!(display.starts_with("[test_stage] Test error"));
        assert!(display.contains("(model: model)"));
        assert!(display.contains("(context: context)"));
    }

    #[test]
    fn test_quiz_error_converts_with_quiz_stage() {
        let error: StudyError = QuizError::NoPendingQuestion.into();
        assert_eq!(error.stage, "quiz");
        assert_eq!(error.message, "no question is awaiting an answer");
    }

    #[test]
    fn test_generation_failure_flag() {
        assert!(StudyError::generation("bad output").is_generation_failure());
        assert!(!StudyError::new("x", "io").is_generation_failure());
    }
}
