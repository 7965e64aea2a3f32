use std::collections::HashSet;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use crate::config::settings::QuizSettings;
use crate::error::QuizError;
use crate::pipelines::generator::QuestionGenerator;
use crate::quiz::difficulty::{Difficulty, DifficultyController, DifficultyModel};
use crate::quiz::feedback::{plan_feedback, resolve_feedback, FeedbackPayload, FeedbackPlan};
use crate::quiz::history::{HistoryRecord, QuestionHistory};
use crate::quiz::question::{Question, QuestionId};
use crate::quiz::scoring::Scorer;
use crate::quiz::selector::{pick_question, Selection};
use crate::quiz::store::QuestionPool;

/// Serializable view of a session's progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub score: u32,
    pub difficulty: Difficulty,
    pub consecutive_correct: u32,
    pub consecutive_incorrect: u32,
    pub answered: usize,
    pub correct: usize,
    pub pool_size: usize,
    pub used: usize,
    pub current_question: Option<QuestionId>,
}

/// One learner working through one document's question pool.
///
/// Owns every piece of mutable quiz state. The RNG is a type parameter so
/// tests can drive selection with a seeded generator.
pub struct QuizSession<R = StdRng> {
    pool: QuestionPool,
    model: DifficultyModel,
    controller: DifficultyController,
    scorer: Scorer,
    tolerance: u8,
    used: HashSet<QuestionId>,
    history: QuestionHistory,
    current: Option<QuestionId>,
    rng: R,
}

impl QuizSession<StdRng> {
    pub fn new(pool: QuestionPool, settings: &QuizSettings) -> Self {
        QuizSession::with_rng(pool, settings, StdRng::from_entropy())
    }
}

impl<R: Rng> QuizSession<R> {
    pub fn with_rng(pool: QuestionPool, settings: &QuizSettings, rng: R) -> Self {
        let model = settings.difficulty_model;
        let start = model.start(settings.start_difficulty);
        tracing::info!(
            pool_size = pool.len(),
            model = ?model,
            start = %start,
            tolerance = settings.tolerance,
            "Quiz session created"
        );
        QuizSession {
            pool,
            model,
            controller: DifficultyController::new(start),
            scorer: Scorer::new(),
            tolerance: settings.tolerance,
            used: HashSet::new(),
            history: QuestionHistory::new(),
            current: None,
            rng,
        }
    }

    /// Pick the next question, make it current and report how it was chosen
    pub fn select(&mut self) -> Result<Selection, QuizError> {
        let selection = pick_question(
            &self.pool,
            self.controller.current(),
            self.tolerance,
            &mut self.used,
            &mut self.rng,
        )?;
        self.current = Some(selection.id.clone());
        Ok(selection)
    }

    pub fn next(&mut self) -> Result<&Question, QuizError> {
        let selection = self.select()?;
        self.pool.get(&selection.id).ok_or(QuizError::EmptyPool)
    }

    /// Grade an answer to the current question.
    ///
    /// The current question stays current afterwards, so submitting again
    /// grades it again and counts as another answer.
    pub fn submit(&mut self, answer: &str) -> Result<bool, QuizError> {
        let question = self
            .current
            .as_ref()
            .and_then(|id| self.pool.get(id))
            .ok_or(QuizError::NoPendingQuestion)?;

        let correct = question.is_correct(answer);
        let difficulty = question.difficulty;
        self.history.record(HistoryRecord {
            question_id: question.id.clone(),
            topic: question.topic.clone(),
            difficulty,
            correct,
            answered_at: Utc::now(),
        });

        self.controller.adjust(correct);
        let score = self.scorer.update(correct, difficulty);
        tracing::debug!(
            id = %question.id,
            correct,
            score,
            difficulty = %self.controller.current(),
            "Answer graded"
        );
        Ok(correct)
    }

    pub fn feedback_plan(&self) -> FeedbackPlan {
        plan_feedback(&self.history, &self.pool, self.scorer.score())
    }

    /// Weak-topic feedback, phrased by the generator when there is something to say
    pub async fn suggestions<G: QuestionGenerator>(&self, generator: &G) -> FeedbackPayload {
        resolve_feedback(self.feedback_plan(), generator).await
    }

    pub fn score(&self) -> u32 {
        self.scorer.score()
    }

    pub fn difficulty(&self) -> Difficulty {
        self.controller.current()
    }

    pub fn model(&self) -> DifficultyModel {
        self.model
    }

    pub fn consecutive_correct(&self) -> u32 {
        self.controller.consecutive_correct()
    }

    pub fn consecutive_incorrect(&self) -> u32 {
        self.controller.consecutive_incorrect()
    }

    pub fn history(&self) -> &QuestionHistory {
        &self.history
    }

    pub fn pool(&self) -> &QuestionPool {
        &self.pool
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current.as_ref().and_then(|id| self.pool.get(id))
    }

    pub fn used_count(&self) -> usize {
        self.used.len()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            score: self.score(),
            difficulty: self.difficulty(),
            consecutive_correct: self.consecutive_correct(),
            consecutive_incorrect: self.consecutive_incorrect(),
            answered: self.history.len(),
            correct: self.history.correct_count(),
            pool_size: self.pool.len(),
            used: self.used.len(),
            current_question: self.current.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::difficulty::Tier;
    use crate::quiz::question::QuestionKind;
    use proptest::prelude::*;
    use rand_chacha::ChaCha8Rng;

    fn q(text: &str, answer: &str, difficulty: Difficulty, topic: &str) -> Question {
        Question::new(QuestionKind::ShortAnswer, text, answer, difficulty, topic)
    }

    fn tiered_settings() -> QuizSettings {
        QuizSettings::default()
    }

    fn numeric_settings() -> QuizSettings {
        QuizSettings {
            difficulty_model: DifficultyModel::Numeric,
            ..QuizSettings::default()
        }
    }

    fn scenario_pool() -> QuestionPool {
        QuestionPool::new(vec![
            q("Q1", "a1", Difficulty::Tier(Tier::Easy), "Easy stuff"),
            q("Q2", "a2", Difficulty::Tier(Tier::Easy), "Easy stuff"),
            q("Q3", "a3", Difficulty::Tier(Tier::Hard), "Hard stuff"),
        ])
    }

    fn answer_of(session: &QuizSession<ChaCha8Rng>) -> String {
        session.current_question().unwrap().correct_answer.clone()
    }

    #[test]
    fn submit_without_question_changes_nothing() {
        let mut session = QuizSession::with_rng(
            scenario_pool(),
            &tiered_settings(),
            ChaCha8Rng::seed_from_u64(1),
        );
        let before = session.snapshot();
        assert_eq!(session.submit("anything"), Err(QuizError::NoPendingQuestion));
        assert_eq!(session.snapshot(), before);
        assert!(session.history().is_empty());
    }

    #[test]
    fn empty_pool_cannot_serve() {
        let mut session = QuizSession::with_rng(
            QuestionPool::default(),
            &tiered_settings(),
            ChaCha8Rng::seed_from_u64(1),
        );
        assert_eq!(session.next().err(), Some(QuizError::EmptyPool));
    }

    #[test]
    fn medium_start_widens_then_steps_up_once() {
        let mut session = QuizSession::with_rng(
            scenario_pool(),
            &tiered_settings(),
            ChaCha8Rng::seed_from_u64(9),
        );
        assert_eq!(session.difficulty(), Difficulty::Tier(Tier::Medium));

        let selection = session.select().unwrap();
        assert!(selection.widened);
        assert!(session.pool().contains(&selection.id));

        for _ in 0..3 {
            let answer = answer_of(&session);
            assert_eq!(session.submit(&answer), Ok(true));
        }
        assert_eq!(session.difficulty(), Difficulty::Tier(Tier::Hard));
        assert_eq!(session.consecutive_correct(), 0);
    }

    #[test]
    fn repeat_submission_grades_same_question_again() {
        let mut session = QuizSession::with_rng(
            scenario_pool(),
            &tiered_settings(),
            ChaCha8Rng::seed_from_u64(4),
        );
        let id = session.next().unwrap().id.clone();
        let answer = answer_of(&session);

        session.submit(&answer).unwrap();
        session.submit(&answer.to_uppercase()).unwrap();
        assert_eq!(session.history().len(), 2);
        assert!(session.history().records().iter().all(|r| r.question_id == id));
        assert_eq!(session.current_question().map(|q| q.id.clone()), Some(id));
    }

    #[test]
    fn wrong_answers_lower_score_to_floor_and_difficulty() {
        let mut session = QuizSession::with_rng(
            scenario_pool(),
            &tiered_settings(),
            ChaCha8Rng::seed_from_u64(2),
        );
        session.next().unwrap();
        assert_eq!(session.submit("nope"), Ok(false));
        assert_eq!(session.score(), 0);
        assert_eq!(session.submit("still nope"), Ok(false));
        assert_eq!(session.difficulty(), Difficulty::Tier(Tier::Easy));
        assert_eq!(session.consecutive_incorrect(), 0);
    }

    #[test]
    fn numeric_session_rewards_level() {
        let pool = QuestionPool::new(vec![q("Seven?", "7", Difficulty::Level(7), "Numbers")]);
        let mut session = QuizSession::with_rng(
            pool,
            &numeric_settings(),
            ChaCha8Rng::seed_from_u64(5),
        );
        assert_eq!(session.difficulty(), Difficulty::Level(5));
        session.next().unwrap();
        session.submit(" 7 ").unwrap();
        assert_eq!(session.score(), 7);
    }

    #[test]
    fn covers_pool_then_recycles() {
        let pool = QuestionPool::new((1..=6).map(|i| {
            q(&format!("Level {} question", i), "x", Difficulty::Level(i), "Levels")
        }));
        let mut session = QuizSession::with_rng(
            pool,
            &numeric_settings(),
            ChaCha8Rng::seed_from_u64(77),
        );
        let mut seen = HashSet::new();
        for _ in 0..6 {
            let selection = session.select().unwrap();
            assert!(!selection.recycled);
            seen.insert(selection.id);
        }
        assert_eq!(seen.len(), 6);
        assert!(session.select().unwrap().recycled);
        assert_eq!(session.used_count(), 1);
    }

    #[test]
    fn feedback_plan_tracks_history() {
        let mut session = QuizSession::with_rng(
            scenario_pool(),
            &tiered_settings(),
            ChaCha8Rng::seed_from_u64(3),
        );
        assert!(matches!(session.feedback_plan(), FeedbackPlan::Ready(_)));

        session.next().unwrap();
        let answer = answer_of(&session);
        session.submit(&answer).unwrap();
        match session.feedback_plan() {
            FeedbackPlan::Ready(payload) => {
                assert_eq!(payload.suggestions, crate::quiz::feedback::NO_WEAK_TOPICS);
                assert_eq!(payload.score, session.score());
            }
            other => panic!("unexpected plan {:?}", other),
        }

        session.submit("wrong").unwrap();
        let topic = session.current_question().unwrap().topic.clone();
        assert_eq!(
            session.feedback_plan(),
            FeedbackPlan::NeedsSuggestions { weak_topics: vec![topic], score: session.score() }
        );
    }

    proptest! {
        #[test]
        fn invariants_hold_for_any_answer_sequence(
            seed in any::<u64>(),
            numeric in any::<bool>(),
            steps in proptest::collection::vec((any::<bool>(), any::<bool>()), 0..120),
        ) {
            let (pool, settings) = if numeric {
                let pool = QuestionPool::new((1..=10).map(|i| {
                    q(&format!("n{}", i), "ok", Difficulty::Level(i), "N")
                }));
                (pool, numeric_settings())
            } else {
                (scenario_pool(), tiered_settings())
            };
            let model = settings.difficulty_model;
            let mut session = QuizSession::with_rng(
                pool,
                &settings,
                ChaCha8Rng::seed_from_u64(seed),
            );

            for (advance, correct) in steps {
                if advance || session.current_question().is_none() {
                    session.next().unwrap();
                }
                let answer = if correct {
                    answer_of(&session)
                } else {
                    "definitely wrong".to_string()
                };
                let before = session.score();
                session.submit(&answer).unwrap();
                if !correct {
                    prop_assert_eq!(session.score(), before.saturating_sub(1));
                }
                prop_assert!(
                    session.consecutive_correct() == 0 || session.consecutive_incorrect() == 0
                );
                prop_assert!(model.accepts(session.difficulty()));
            }
        }
    }
}
