use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::quiz::difficulty::Difficulty;
use crate::quiz::question::QuestionId;
use crate::quiz::store::QuestionPool;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub question_id: QuestionId,
    pub topic: String,
    pub difficulty: Difficulty,
    pub correct: bool,
    pub answered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeakTopic {
    pub topic: String,
    pub misses: usize,
}

/// Append-only log of graded answers for one session
#[derive(Debug, Clone, Default, Serialize)]
pub struct QuestionHistory {
    records: Vec<HistoryRecord>,
}

impl QuestionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, record: HistoryRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn correct_count(&self) -> usize {
        self.records.iter().filter(|r| r.correct).count()
    }

    pub fn incorrect_count(&self) -> usize {
        self.records.len() - self.correct_count()
    }

    /// Topics of incorrect answers, most missed first, at most `limit`.
    ///
    /// The topic comes from the pool entry for the answered question; the
    /// topic stored on the record is used only when the pool lacks the id.
    /// Equal counts keep the order in which the topics were first missed.
    pub fn weak_topics(&self, pool: &QuestionPool, limit: usize) -> Vec<WeakTopic> {
        let mut ranked: Vec<WeakTopic> = Vec::new();
        for record in self.records.iter().filter(|r| !r.correct) {
            let topic = pool
                .get(&record.question_id)
                .map(|q| q.topic.as_str())
                .unwrap_or(record.topic.as_str())
                .trim();
            if topic.is_empty() {
                continue;
            }
            match ranked.iter_mut().find(|w| w.topic == topic) {
                Some(weak) => weak.misses += 1,
                None => ranked.push(WeakTopic {
                    topic: topic.to_string(),
                    misses: 1,
                }),
            }
        }

        // sort_by is stable, so ties stay in first-missed order
        ranked.sort_by(|a, b| b.misses.cmp(&a.misses));
        ranked.truncate(limit);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::difficulty::Tier;
    use crate::quiz::question::{Question, QuestionKind};

    fn q(text: &str, topic: &str) -> Question {
        Question::new(QuestionKind::ShortAnswer, text, "x", Difficulty::Tier(Tier::Medium), topic)
    }

    fn answer(history: &mut QuestionHistory, question: &Question, correct: bool) {
        history.record(HistoryRecord {
            question_id: question.id.clone(),
            topic: question.topic.clone(),
            difficulty: question.difficulty,
            correct,
            answered_at: Utc::now(),
        });
    }

    #[test]
    fn ranks_by_miss_count() {
        let a1 = q("a1", "Topic A");
        let a2 = q("a2", "Topic A");
        let b1 = q("b1", "Topic B");
        let c1 = q("c1", "Topic C");
        let pool = QuestionPool::new(vec![a1.clone(), a2.clone(), b1.clone(), c1.clone()]);

        let mut history = QuestionHistory::new();
        answer(&mut history, &b1, false);
        answer(&mut history, &c1, true);
        answer(&mut history, &a1, false);
        answer(&mut history, &a2, false);

        let weak = history.weak_topics(&pool, 3);
        let topics: Vec<&str> = weak.iter().map(|w| w.topic.as_str()).collect();
        assert_eq!(topics, vec!["Topic A", "Topic B"]);
        assert_eq!(weak[0].misses, 2);
        assert_eq!(history.correct_count(), 1);
        assert_eq!(history.incorrect_count(), 3);
    }

    #[test]
    fn ties_keep_first_missed_order_and_limit_applies() {
        let qs: Vec<Question> = ["D", "B", "C", "A"]
            .iter()
            .map(|t| q(&format!("q-{}", t), t))
            .collect();
        let pool = QuestionPool::new(qs.clone());
        let mut history = QuestionHistory::new();
        for question in &qs {
            answer(&mut history, question, false);
        }

        let weak = history.weak_topics(&pool, 3);
        let topics: Vec<&str> = weak.iter().map(|w| w.topic.as_str()).collect();
        assert_eq!(topics, vec!["D", "B", "C"]);
    }

    #[test]
    fn falls_back_to_recorded_topic() {
        let orphan = q("orphan", "Recorded");
        let mut history = QuestionHistory::new();
        answer(&mut history, &orphan, false);
        let weak = history.weak_topics(&QuestionPool::default(), 3);
        assert_eq!(weak, vec![WeakTopic { topic: "Recorded".into(), misses: 1 }]);
    }
}
