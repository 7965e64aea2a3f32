use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;
use crate::error::StudyError;

/// Outcome of one finished quiz, persisted one file per record
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct QuizResultRecord {
    pub id: Uuid,
    pub user_id: String,
    /// Content id of the quizzed document
    pub document: String,
    pub questions_attempted: usize,
    pub correct_answers: usize,
    pub score: u32,
    pub total_time_secs: f64,
    pub avg_time_per_question_secs: f64,
    #[serde(default)]
    pub weak_topics: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl QuizResultRecord {
    pub fn new(
        user_id: impl Into<String>,
        document: impl Into<String>,
        questions_attempted: usize,
        correct_answers: usize,
        score: u32,
        total_time_secs: f64,
        weak_topics: Vec<String>,
    ) -> Self {
        let avg_time_per_question_secs = if questions_attempted == 0 {
            0.0
        } else {
            total_time_secs / questions_attempted as f64
        };
        QuizResultRecord {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            document: document.into(),
            questions_attempted,
            correct_answers,
            score,
            total_time_secs,
            avg_time_per_question_secs,
            weak_topics,
            timestamp: Utc::now(),
        }
    }
}

pub async fn save_result(dir: &Path, record: &QuizResultRecord) -> Result<(), StudyError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| StudyError::new(
            format!("Failed to create results directory: {}", e),
            "io"
        ).with_context(format!("path: {:?}", dir)))?;

    let fname = dir.join(format!("{}.json", record.id));
    let json = serde_json::to_string_pretty(record)
        .map_err(|e| StudyError::new(
            format!("Failed to serialize quiz result: {}", e),
            "json_serialize"
        ))?;

    tokio::fs::write(&fname, json)
        .await
        .map_err(|e| StudyError::new(
            format!("Failed to write quiz result: {}", e),
            "io"
        ).with_context(format!("path: {:?}", fname)))?;

    tracing::info!(
        id = %record.id,
        user_id = %record.user_id,
        score = record.score,
        "Quiz result saved"
    );
    Ok(())
}

/// Every stored result, newest first. Unreadable files are skipped.
pub async fn load_all_results(dir: &Path) -> Result<Vec<QuizResultRecord>, StudyError> {
    let mut records = Vec::new();

    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(records),
        Err(e) => {
            return Err(StudyError::new(
                format!("Failed to read results directory: {}", e),
                "io"
            ).with_context(format!("path: {:?}", dir)));
        }
    };

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }

        match tokio::fs::read_to_string(&path).await {
            Ok(text) => match serde_json::from_str::<QuizResultRecord>(&text) {
                Ok(rec) => records.push(rec),
                Err(e) => {
                    tracing::warn!(path = ?path, error = %e, "Failed to parse quiz result file");
                }
            },
            Err(e) => {
                tracing::warn!(path = ?path, error = %e, "Failed to read quiz result file");
            }
        }
    }

    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Ok(records)
}
