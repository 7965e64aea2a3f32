use serde::Serialize;
use crate::quiz::difficulty::Difficulty;

/// Score after one verdict: reward on correct, minus one on incorrect, never below zero.
pub fn next_score(score: u32, correct: bool, difficulty: Difficulty) -> u32 {
    if correct {
        score.saturating_add(difficulty.reward())
    } else {
        score.saturating_sub(1)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Scorer {
    score: u32,
}

impl Scorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn update(&mut self, correct: bool, difficulty: Difficulty) -> u32 {
        self.score = next_score(self.score, correct, difficulty);
        self.score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::difficulty::Tier;
    use proptest::prelude::*;

    #[test]
    fn tier_rewards() {
        assert_eq!(next_score(0, true, Difficulty::Tier(Tier::Easy)), 1);
        assert_eq!(next_score(0, true, Difficulty::Tier(Tier::Medium)), 2);
        assert_eq!(next_score(0, true, Difficulty::Tier(Tier::Hard)), 3);
    }

    #[test]
    fn level_reward_is_the_level() {
        assert_eq!(next_score(4, true, Difficulty::Level(7)), 11);
    }

    #[test]
    fn penalty_floors_at_zero() {
        let mut scorer = Scorer::new();
        assert_eq!(scorer.update(false, Difficulty::Tier(Tier::Hard)), 0);
        scorer.update(true, Difficulty::Tier(Tier::Easy));
        assert_eq!(scorer.update(false, Difficulty::Tier(Tier::Easy)), 0);
        assert_eq!(scorer.update(false, Difficulty::Level(9)), 0);
    }

    proptest! {
        #[test]
        fn never_goes_negative_or_jumps(
            answers in proptest::collection::vec((any::<bool>(), 1u8..=10), 0..300),
        ) {
            let mut scorer = Scorer::new();
            for (correct, level) in answers {
                let before = scorer.score();
                let after = scorer.update(correct, Difficulty::Level(level));
                if correct {
                    prop_assert_eq!(after, before + u32::from(level));
                } else {
                    prop_assert_eq!(after, before.saturating_sub(1));
                }
            }
        }
    }
}
