use std::future::Future;
use serde::Deserialize;
use serde_json::Value;
use crate::error::StudyError;
use crate::quiz::difficulty::{Difficulty, DifficultyModel};
use crate::quiz::question::{Question, QuestionKind, QuestionSource};

/// The language-model side of the system: everything that turns document
/// text into summaries, topics, questions and study advice.
///
/// `generate` may fail or return garbage; callers treat that as zero
/// questions for the topic.
pub trait QuestionGenerator: Send + Sync {
    fn summarize(&self, document: &str) -> impl Future<Output = Result<String, StudyError>> + Send;

    fn extract_topics(
        &self,
        document: &str,
    ) -> impl Future<Output = Result<Vec<String>, StudyError>> + Send;

    fn generate(
        &self,
        topic: &str,
        excerpt: &str,
        count: usize,
        model: DifficultyModel,
    ) -> impl Future<Output = Result<Vec<Question>, StudyError>> + Send;

    /// Phrase study suggestions for topics ranked weakest first
    fn suggest(
        &self,
        weak_topics: &[String],
    ) -> impl Future<Output = Result<String, StudyError>> + Send;
}

/// First `max_chars` characters of `text`, cut on a char boundary
pub fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Split a topic listing into clean labels.
/// Accepts comma or newline separated text, with or without bullets/numbering.
pub fn parse_topics(raw: &str, max_topics: usize) -> Vec<String> {
    let mut topics: Vec<String> = Vec::new();
    for piece in raw.split(|c| c == ',' || c == '\n' || c == ';') {
        let cleaned = strip_list_marker(piece.trim())
            .trim_matches(|c| c == '"' || c == '\'')
            .trim();
        if cleaned.is_empty() || cleaned.ends_with(':') {
            continue;
        }
        if topics.iter().any(|t| t.eq_ignore_ascii_case(cleaned)) {
            continue;
        }
        topics.push(cleaned.to_string());
        if topics.len() >= max_topics {
            break;
        }
    }
    topics
}

// "- x", "* x", "1. x", "2) x" -> "x"; a leading number without a marker is kept
fn strip_list_marker(item: &str) -> &str {
    let item = item.trim_start_matches(|c| matches!(c, '-' | '*' | '•')).trim_start();
    let rest = item.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() < item.len() {
        if let Some(after) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            return after.trim_start();
        }
    }
    item
}

#[derive(Deserialize)]
struct RawQuestion {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(alias = "text", default)]
    question: Option<String>,
    #[serde(default)]
    options: Vec<Value>,
    #[serde(alias = "answer", default)]
    correct_answer: Option<Value>,
    #[serde(default)]
    difficulty: Option<Difficulty>,
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    source: Option<String>,
}

fn value_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

fn build_question(raw: RawQuestion, topic: &str, model: DifficultyModel) -> Option<Question> {
    let text = raw.question.as_deref().map(str::trim).filter(|t| !t.is_empty())?;
    let answer = raw.correct_answer.as_ref().and_then(value_text)?;
    let difficulty = raw.difficulty.filter(|d| model.accepts(*d))?;
    let options: Vec<String> = raw.options.iter().filter_map(value_text).collect();

    let kind = match raw.kind.as_deref().and_then(QuestionKind::parse_label) {
        Some(kind) => kind,
        None if !options.is_empty() => QuestionKind::MultipleChoice,
        None => QuestionKind::ShortAnswer,
    };
    if kind == QuestionKind::MultipleChoice && options.is_empty() {
        return None;
    }

    let source = match raw.source.as_deref().map(|s| s.trim().to_lowercase()) {
        Some(s) if s.starts_with("general") => QuestionSource::GeneralKnowledge,
        _ => QuestionSource::Document,
    };
    let topic = raw
        .topic
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(topic);

    let question = Question::new(kind, text, answer, difficulty, topic).with_source(source);
    Some(if kind == QuestionKind::MultipleChoice {
        question.with_options(options)
    } else {
        question
    })
}

/// Turn generator JSON into questions for `topic`.
///
/// Accepts an array of records, an object with a `questions` array, or a
/// single record. Records that are incomplete or use the other difficulty
/// scale are dropped.
pub fn parse_questions(raw: &Value, topic: &str, model: DifficultyModel) -> Vec<Question> {
    let items: Vec<Value> = match raw {
        Value::Array(items) => items.clone(),
        Value::Object(map) => match map.get("questions") {
            Some(Value::Array(items)) => items.clone(),
            _ => vec![raw.clone()],
        },
        _ => Vec::new(),
    };

    let total = items.len();
    let questions: Vec<Question> = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<RawQuestion>(item) {
            Ok(raw) => build_question(raw, topic, model),
            Err(e) => {
                tracing::debug!(topic = %topic, error = %e, "Skipping malformed question record");
                None
            }
        })
        .collect();

    if questions.len() < total {
        tracing::debug!(
            topic = %topic,
            kept = questions.len(),
            dropped = total - questions.len(),
            "Dropped unusable question records"
        );
    }
    questions
}
