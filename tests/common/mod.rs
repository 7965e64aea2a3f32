#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use studyaid_lib::pipelines::generator::QuestionGenerator;
use studyaid_lib::quiz::{Difficulty, DifficultyModel, Question, QuestionKind, Tier};
use studyaid_lib::StudyError;

/// In-memory generator: each topic yields `count` short-answer questions
/// whose answer is "answer".
#[derive(Default)]
pub struct FakeGenerator {
    pub topics: Vec<String>,
    pub failing_topics: HashSet<String>,
    pub fail_summary: bool,
    pub fail_suggest: bool,
    pub summarize_calls: AtomicUsize,
    pub topic_calls: AtomicUsize,
    pub generate_calls: AtomicUsize,
    pub suggest_calls: AtomicUsize,
}

impl FakeGenerator {
    pub fn with_topics(topics: &[&str]) -> Self {
        FakeGenerator {
            topics: topics.iter().map(|t| t.to_string()).collect(),
            ..FakeGenerator::default()
        }
    }

    pub fn failing(mut self, topic: &str) -> Self {
        self.failing_topics.insert(topic.to_string());
        self
    }

    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

fn difficulty_for(model: DifficultyModel, i: usize) -> Difficulty {
    match model {
        DifficultyModel::Tiered => Difficulty::Tier([Tier::Easy, Tier::Medium, Tier::Hard][i % 3]),
        DifficultyModel::Numeric => Difficulty::Level(3 + (i % 5) as u8),
    }
}

impl QuestionGenerator for FakeGenerator {
    async fn summarize(&self, _document: &str) -> Result<String, StudyError> {
        self.summarize_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_summary {
            return Err(StudyError::new("summary unavailable", "model_call"));
        }
        Ok("A short summary.".to_string())
    }

    async fn extract_topics(&self, _document: &str) -> Result<Vec<String>, StudyError> {
        self.topic_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.topics.clone())
    }

    async fn generate(
        &self,
        topic: &str,
        _excerpt: &str,
        count: usize,
        model: DifficultyModel,
    ) -> Result<Vec<Question>, StudyError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_topics.contains(topic) {
            return Err(StudyError::generation("malformed output"));
        }
        Ok((0..count)
            .map(|i| {
                Question::new(
                    QuestionKind::ShortAnswer,
                    format!("{} question {}?", topic, i),
                    "answer",
                    difficulty_for(model, i),
                    topic,
                )
            })
            .collect())
    }

    async fn suggest(&self, weak_topics: &[String]) -> Result<String, StudyError> {
        self.suggest_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_suggest {
            return Err(StudyError::new("model offline", "model_call"));
        }
        Ok(format!("Study {}", weak_topics.join(" then ")))
    }
}
