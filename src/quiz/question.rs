use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use crate::quiz::difficulty::Difficulty;

/// Stable identifier derived from the normalized question text.
/// Questions whose wording differs only in case or spacing share an id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(String);

impl QuestionId {
    pub fn from_text(text: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(normalize_text(text).as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        QuestionId(digest[..16].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lowercase and collapse whitespace
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionKind {
    #[serde(rename = "mcq", alias = "multiple_choice")]
    MultipleChoice,
    #[serde(rename = "fill_blank", alias = "fill_in_blank")]
    FillBlank,
    #[serde(rename = "short_answer")]
    ShortAnswer,
}

impl QuestionKind {
    /// Accepts the labels generators tend to emit ("MCQ", "Fill in the Blank", ...)
    pub fn parse_label(label: &str) -> Option<QuestionKind> {
        let key: String = label
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match key.as_str() {
            "mcq" | "multiplechoice" | "multiplechoicequestion" => {
                Some(QuestionKind::MultipleChoice)
            }
            "fillblank" | "fillinblank" | "fillintheblank" | "fillintheblanks" => {
                Some(QuestionKind::FillBlank)
            }
            "shortanswer" | "shortanswerquestion" => Some(QuestionKind::ShortAnswer),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionSource {
    #[default]
    Document,
    GeneralKnowledge,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    #[serde(rename = "question")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    pub correct_answer: String,
    pub difficulty: Difficulty,
    pub topic: String,
    #[serde(default)]
    pub source: QuestionSource,
}

impl Question {
    pub fn new(
        kind: QuestionKind,
        text: impl Into<String>,
        correct_answer: impl Into<String>,
        difficulty: Difficulty,
        topic: impl Into<String>,
    ) -> Self {
        let text = text.into();
        Question {
            id: QuestionId::from_text(&text),
            kind,
            text,
            options: Vec::new(),
            correct_answer: correct_answer.into(),
            difficulty,
            topic: topic.into(),
            source: QuestionSource::Document,
        }
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_source(mut self, source: QuestionSource) -> Self {
        self.source = source;
        self
    }

    /// Case-insensitive exact match after trimming both sides
    pub fn is_correct(&self, answer: &str) -> bool {
        answer.trim().to_lowercase() == self.correct_answer.trim().to_lowercase()
    }
}
