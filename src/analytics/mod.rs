use serde::{Deserialize, Serialize};
use crate::sessions::QuizResultRecord;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DocumentScore {
    pub document: String,
    pub score: u32,
}

/// Aggregates over stored quiz results
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct QuizStats {
    pub avg_score: f64,
    pub avg_questions_attempted: f64,
    pub avg_time_per_question: f64,
    pub total_quizzes: usize,
    pub topic_distribution: Vec<DocumentScore>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// All-zero stats for an empty slice
pub fn compute_stats(records: &[QuizResultRecord]) -> QuizStats {
    if records.is_empty() {
        return QuizStats::default();
    }

    let n = records.len() as f64;
    let mean = |f: fn(&QuizResultRecord) -> f64| records.iter().map(f).sum::<f64>() / n;

    QuizStats {
        avg_score: round2(mean(|r| f64::from(r.score))),
        avg_questions_attempted: round2(mean(|r| r.questions_attempted as f64)),
        avg_time_per_question: round2(mean(|r| r.avg_time_per_question_secs)),
        total_quizzes: records.len(),
        topic_distribution: records
            .iter()
            .map(|r| DocumentScore {
                document: r.document.clone(),
                score: r.score,
            })
            .collect(),
    }
}
