use std::collections::HashSet;
use rand::seq::SliceRandom;
use rand::Rng;
use crate::error::QuizError;
use crate::quiz::difficulty::Difficulty;
use crate::quiz::question::{Question, QuestionId};
use crate::quiz::store::QuestionPool;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub id: QuestionId,
    /// No unused question was close to the current difficulty
    pub widened: bool,
    /// The used set was cleared before this pick
    pub recycled: bool,
}

/// Pick the next question and mark it used.
///
/// Prefers unused questions close to `current`, then any unused question.
/// When every question has been served the used set is cleared once and the
/// search restarts, so a non-empty pool always yields a question.
pub fn pick_question<R: Rng + ?Sized>(
    pool: &QuestionPool,
    current: Difficulty,
    tolerance: u8,
    used: &mut HashSet<QuestionId>,
    rng: &mut R,
) -> Result<Selection, QuizError> {
    if pool.is_empty() {
        return Err(QuizError::EmptyPool);
    }

    let mut recycled = false;
    loop {
        let unused: Vec<&Question> = pool.iter().filter(|q| !used.contains(&q.id)).collect();
        let close: Vec<&Question> = unused
            .iter()
            .copied()
            .filter(|q| q.difficulty.is_close(current, tolerance))
            .collect();

        let (candidates, widened) = if close.is_empty() {
            (unused, true)
        } else {
            (close, false)
        };

        if let Some(question) = candidates.choose(rng) {
            used.insert(question.id.clone());
            if widened {
                tracing::debug!(
                    difficulty = %current,
                    id = %question.id,
                    "No question near current difficulty, widened to any unused"
                );
            }
            return Ok(Selection {
                id: question.id.clone(),
                widened,
                recycled,
            });
        }

        if recycled {
            return Err(QuizError::EmptyPool);
        }
        tracing::info!(pool_size = pool.len(), "All questions served, recycling used set");
        used.clear();
        recycled = true;
    }
}
