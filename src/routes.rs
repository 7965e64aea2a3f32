use std::path::Path;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::analytics::{compute_stats, QuizStats};
use crate::error::StudyError;
use crate::metrics::MetricsSnapshot;
use crate::pipelines::generator::QuestionGenerator;
use crate::pipelines::populate::populate;
use crate::quiz::difficulty::Difficulty;
use crate::quiz::feedback::{resolve_feedback, FeedbackPayload, MAX_WEAK_TOPICS};
use crate::quiz::question::{Question, QuestionId, QuestionKind, QuestionSource};
use crate::quiz::session::{QuizSession, SessionSnapshot};
use crate::sessions::{load_all_results, save_result, QuizResultRecord};
use crate::state::app::{ActiveQuiz, AppState};

/// Most results returned by `quiz_results`
pub const MAX_RESULTS: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitializeResponse {
    pub message: String,
    pub content_id: String,
    pub question_count: usize,
    pub topics: Vec<String>,
    pub summary: String,
    pub failed_topics: Vec<String>,
}

/// A question as shown to the learner, without its answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionView {
    pub id: QuestionId,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub question: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    pub topic: String,
    pub difficulty: Difficulty,
    pub source: QuestionSource,
}

impl From<&Question> for QuestionView {
    fn from(q: &Question) -> Self {
        QuestionView {
            id: q.id.clone(),
            kind: q.kind,
            question: q.text.clone(),
            options: q.options.clone(),
            topic: q.topic.clone(),
            difficulty: q.difficulty,
            source: q.source,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub correct: bool,
    pub correct_answer: String,
    pub score: u32,
    /// Learner difficulty after this answer
    pub difficulty: Difficulty,
}

/// What the active quiz was built from, plus its progress
#[derive(Debug, Clone, Serialize)]
pub struct QuizOverview {
    pub content_id: String,
    pub summary: String,
    pub topics: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub elapsed_secs: f64,
    pub progress: SessionSnapshot,
}

/// Load a plain-text document from disk and start a quiz on it.
/// The file name serves as the content id.
pub async fn initialize<G: QuestionGenerator>(
    state: &AppState,
    generator: &G,
    path: &Path,
) -> Result<InitializeResponse, StudyError> {
    let document = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| StudyError::from(e).with_context(format!("path: {:?}", path)))?;
    let content_id = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document")
        .to_string();
    initialize_from_text(state, generator, &content_id, &document).await
}

/// Populate a question pool for `document` and make it the active quiz.
/// The previous quiz stays active if population fails or yields nothing.
pub async fn initialize_from_text<G: QuestionGenerator>(
    state: &AppState,
    generator: &G,
    content_id: &str,
    document: &str,
) -> Result<InitializeResponse, StudyError> {
    if document.trim().is_empty() {
        return Err(StudyError::new("Document is empty", "validation")
            .with_context(format!("content_id: {}", content_id)));
    }

    let settings = &state.config.quiz;
    let outcome = populate(
        generator,
        &state.cache,
        &state.metrics,
        content_id,
        document,
        settings,
    )
    .await?;
    if outcome.pool.is_empty() {
        return Err(StudyError::generation("No questions could be generated for this document")
            .with_context(format!("failed topics: {}", outcome.failed_topics.join(", "))));
    }

    let response = InitializeResponse {
        message: "Platform initialized successfully".to_string(),
        content_id: content_id.to_string(),
        question_count: outcome.pool.len(),
        topics: outcome.topics.clone(),
        summary: outcome.summary.clone(),
        failed_topics: outcome.failed_topics,
    };

    let session = QuizSession::new(outcome.pool, settings);
    state.set_quiz(ActiveQuiz::new(session, content_id, outcome.summary, outcome.topics));
    tracing::info!(
        content_id = %content_id,
        questions = response.question_count,
        "Quiz initialized"
    );
    Ok(response)
}

pub fn get_question(state: &AppState) -> Result<QuestionView, StudyError> {
    state.with_quiz(|quiz| {
        let selection = quiz.session.select()?;
        state.metrics.record_served(selection.widened, selection.recycled);
        let question = quiz
            .session
            .current_question()
            .ok_or_else(|| StudyError::new("Selected question missing from pool", "state"))?;
        Ok(QuestionView::from(question))
    })
}

pub fn submit_answer(state: &AppState, answer: &str) -> Result<AnswerResponse, StudyError> {
    if answer.trim().is_empty() {
        return Err(StudyError::new("No answer provided", "validation"));
    }

    state.with_quiz(|quiz| {
        let correct = quiz.session.submit(answer)?;
        state.metrics.record_answer(correct);
        let correct_answer = quiz
            .session
            .current_question()
            .map(|q| q.correct_answer.clone())
            .unwrap_or_default();
        Ok(AnswerResponse {
            correct,
            correct_answer,
            score: quiz.session.score(),
            difficulty: quiz.session.difficulty(),
        })
    })
}

/// Weak-topic feedback. The session lock is released before the generator is awaited.
pub async fn get_suggestions<G: QuestionGenerator>(
    state: &AppState,
    generator: &G,
) -> Result<FeedbackPayload, StudyError> {
    let plan = state.with_quiz(|quiz| Ok(quiz.session.feedback_plan()))?;
    Ok(resolve_feedback(plan, generator).await)
}

pub fn session_snapshot(state: &AppState) -> Result<SessionSnapshot, StudyError> {
    state.with_quiz(|quiz| Ok(quiz.session.snapshot()))
}

pub fn quiz_overview(state: &AppState) -> Result<QuizOverview, StudyError> {
    state.with_quiz(|quiz| {
        Ok(QuizOverview {
            content_id: quiz.content_id.clone(),
            summary: quiz.summary.clone(),
            topics: quiz.topics.clone(),
            started_at: quiz.started_at,
            elapsed_secs: quiz.elapsed_secs(),
            progress: quiz.session.snapshot(),
        })
    })
}

/// Persist a result record for the active quiz. The quiz itself stays active.
pub async fn finish_quiz(state: &AppState, user_id: &str) -> Result<QuizResultRecord, StudyError> {
    let user_id = if user_id.trim().is_empty() { "anonymous" } else { user_id.trim() };
    let record = state.with_quiz(|quiz| {
        let history = quiz.session.history();
        let weak_topics = history
            .weak_topics(quiz.session.pool(), MAX_WEAK_TOPICS)
            .into_iter()
            .map(|w| w.topic)
            .collect();
        Ok(QuizResultRecord::new(
            user_id,
            quiz.content_id.clone(),
            history.len(),
            history.correct_count(),
            quiz.session.score(),
            quiz.elapsed_secs(),
            weak_topics,
        ))
    })?;

    save_result(&state.config.storage.results_dir(), &record).await?;
    Ok(record)
}

/// Stored results, newest first
pub async fn quiz_results(state: &AppState) -> Result<Vec<QuizResultRecord>, StudyError> {
    let mut records = load_all_results(&state.config.storage.results_dir()).await?;
    records.truncate(MAX_RESULTS);
    Ok(records)
}

pub async fn quiz_stats(state: &AppState) -> Result<QuizStats, StudyError> {
    let records = load_all_results(&state.config.storage.results_dir()).await?;
    Ok(compute_stats(&records))
}

pub fn metrics(state: &AppState) -> MetricsSnapshot {
    state.metrics.snapshot()
}
