use std::collections::HashMap;
use crate::quiz::question::{Question, QuestionId};

/// The generated questions for one document. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct QuestionPool {
    questions: Vec<Question>,
    index: HashMap<QuestionId, usize>,
}

impl QuestionPool {
    /// Build a pool, keeping the first of any questions that share an id
    pub fn new<I: IntoIterator<Item = Question>>(questions: I) -> Self {
        let mut pool = QuestionPool::default();
        for question in questions {
            if pool.index.contains_key(&question.id) {
                tracing::warn!(
                    id = %question.id,
                    topic = %question.topic,
                    "Duplicate question text, keeping the first copy"
                );
                continue;
            }
            pool.index.insert(question.id.clone(), pool.questions.len());
            pool.questions.push(question);
        }
        pool
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, id: &QuestionId) -> Option<&Question> {
        self.index.get(id).map(|&i| &self.questions[i])
    }

    pub fn contains(&self, id: &QuestionId) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }

    /// Distinct topics in first-seen order
    pub fn topics(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for q in &self.questions {
            if !seen.contains(&q.topic.as_str()) {
                seen.push(q.topic.as_str());
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::difficulty::{Difficulty, Tier};
    use crate::quiz::question::QuestionKind;

    fn q(text: &str, topic: &str) -> Question {
        Question::new(QuestionKind::ShortAnswer, text, "x", Difficulty::Tier(Tier::Easy), topic)
    }

    #[test]
    fn duplicates_collapse_to_first() {
        let pool = QuestionPool::new(vec![
            q("What is Rust?", "A"),
            q("what is  rust?", "B"),
            q("What is Cargo?", "A"),
        ]);
        assert_eq!(pool.len(), 2);
        let first = pool.get(&QuestionId::from_text("What is Rust?")).unwrap();
        assert_eq!(first.topic, "A");
        assert_eq!(pool.topics(), vec!["A"]);
    }

    #[test]
    fn lookup_by_id() {
        let pool = QuestionPool::new(vec![q("One?", "T1"), q("Two?", "T2")]);
        let id = QuestionId::from_text("Two?");
        assert!(pool.contains(&id));
        assert_eq!(pool.get(&id).map(|q| q.topic.as_str()), Some("T2"));
        assert!(pool.get(&QuestionId::from_text("Three?")).is_none());
        assert_eq!(pool.topics(), vec!["T1", "T2"]);
    }
}
