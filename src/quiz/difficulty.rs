use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 10;
/// Consecutive correct answers that move the learner one step harder
pub const STEP_UP_STREAK: u32 = 3;
/// Consecutive incorrect answers that move the learner one step easier
pub const STEP_DOWN_STREAK: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Easy,
    Medium,
    Hard,
}

impl Tier {
    pub fn harder(self) -> Tier {
        match self {
            Tier::Easy => Tier::Medium,
            Tier::Medium | Tier::Hard => Tier::Hard,
        }
    }

    pub fn easier(self) -> Tier {
        match self {
            Tier::Hard => Tier::Medium,
            Tier::Medium | Tier::Easy => Tier::Easy,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Easy => "easy",
            Tier::Medium => "medium",
            Tier::Hard => "hard",
        }
    }

    pub fn parse(label: &str) -> Option<Tier> {
        match label.trim().to_lowercase().as_str() {
            "easy" => Some(Tier::Easy),
            "medium" => Some(Tier::Medium),
            "hard" => Some(Tier::Hard),
            _ => None,
        }
    }
}

/// A question's or learner's difficulty in one of the two scales.
/// Serialized as `"easy" | "medium" | "hard"` or as a bare integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Tier(Tier),
    Level(u8),
}

impl Difficulty {
    /// One step harder, clamped at the top of the scale
    pub fn harder(self) -> Difficulty {
        match self {
            Difficulty::Tier(t) => Difficulty::Tier(t.harder()),
            Difficulty::Level(n) => {
                Difficulty::Level(n.saturating_add(1).clamp(MIN_LEVEL, MAX_LEVEL))
            }
        }
    }

    /// One step easier, clamped at the bottom of the scale
    pub fn easier(self) -> Difficulty {
        match self {
            Difficulty::Tier(t) => Difficulty::Tier(t.easier()),
            Difficulty::Level(n) => {
                Difficulty::Level(n.saturating_sub(1).clamp(MIN_LEVEL, MAX_LEVEL))
            }
        }
    }

    /// Whether a question at `self` is suitable for a learner at `current`.
    /// Tiers must match exactly; levels may differ by at most `tolerance`.
    pub fn is_close(self, current: Difficulty, tolerance: u8) -> bool {
        match (self, current) {
            (Difficulty::Tier(a), Difficulty::Tier(b)) => a == b,
            (Difficulty::Level(a), Difficulty::Level(b)) => a.abs_diff(b) <= tolerance,
            _ => false,
        }
    }

    /// Points awarded for a correct answer at this difficulty
    pub fn reward(self) -> u32 {
        match self {
            Difficulty::Tier(Tier::Easy) => 1,
            Difficulty::Tier(Tier::Medium) => 2,
            Difficulty::Tier(Tier::Hard) => 3,
            Difficulty::Level(n) => u32::from(n),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Tier(t) => f.write_str(t.as_str()),
            Difficulty::Level(n) => write!(f, "{}", n),
        }
    }
}

impl Serialize for Difficulty {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Difficulty::Tier(t) => serializer.serialize_str(t.as_str()),
            Difficulty::Level(n) => serializer.serialize_u8(*n),
        }
    }
}

// Model output is loose: tiers arrive in any case, levels as numbers or numeric strings.
impl<'de> Deserialize<'de> for Difficulty {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::{self, Visitor};

        struct DifficultyVisitor;

        impl<'de> Visitor<'de> for DifficultyVisitor {
            type Value = Difficulty;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("\"easy\", \"medium\", \"hard\" or an integer level")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                if let Some(tier) = Tier::parse(value) {
                    return Ok(Difficulty::Tier(tier));
                }
                value
                    .trim()
                    .parse::<u8>()
                    .map(Difficulty::Level)
                    .map_err(|_| E::invalid_value(de::Unexpected::Str(value), &self))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
                u8::try_from(value)
                    .map(Difficulty::Level)
                    .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(value), &self))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
                u8::try_from(value)
                    .map(Difficulty::Level)
                    .map_err(|_| E::invalid_value(de::Unexpected::Signed(value), &self))
            }

            fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
                let rounded = value.round();
                if (0.0..=f64::from(u8::MAX)).contains(&rounded) {
                    Ok(Difficulty::Level(rounded as u8))
                } else {
                    Err(E::invalid_value(de::Unexpected::Float(value), &self))
                }
            }
        }

        deserializer.deserialize_any(DifficultyVisitor)
    }
}

/// Which difficulty scale a deployment runs on. The two are never mixed:
/// questions in the other scale are rejected, not converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyModel {
    #[default]
    Tiered,
    Numeric,
}

impl DifficultyModel {
    pub fn as_str(self) -> &'static str {
        match self {
            DifficultyModel::Tiered => "tiered",
            DifficultyModel::Numeric => "numeric",
        }
    }

    pub fn accepts(self, difficulty: Difficulty) -> bool {
        match (self, difficulty) {
            (DifficultyModel::Tiered, Difficulty::Tier(_)) => true,
            (DifficultyModel::Numeric, Difficulty::Level(n)) => {
                (MIN_LEVEL..=MAX_LEVEL).contains(&n)
            }
            _ => false,
        }
    }

    pub fn default_start(self) -> Difficulty {
        match self {
            DifficultyModel::Tiered => Difficulty::Tier(Tier::Medium),
            DifficultyModel::Numeric => Difficulty::Level(5),
        }
    }

    /// Resolve a configured starting difficulty. Out-of-range levels are
    /// clamped; a value from the other scale falls back to the default.
    pub fn start(self, requested: Option<Difficulty>) -> Difficulty {
        match (self, requested) {
            (_, None) => self.default_start(),
            (DifficultyModel::Tiered, Some(d @ Difficulty::Tier(_))) => d,
            (DifficultyModel::Numeric, Some(Difficulty::Level(n))) => {
                Difficulty::Level(n.clamp(MIN_LEVEL, MAX_LEVEL))
            }
            (_, Some(other)) => {
                tracing::warn!(
                    model = ?self,
                    requested = %other,
                    "Start difficulty does not belong to the configured model, using default"
                );
                self.default_start()
            }
        }
    }
}

/// Tracks the learner's current difficulty and answer streaks.
/// At most one of the two streak counters is non-zero at any time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DifficultyController {
    current: Difficulty,
    consecutive_correct: u32,
    consecutive_incorrect: u32,
}

impl DifficultyController {
    pub fn new(start: Difficulty) -> Self {
        DifficultyController {
            current: start,
            consecutive_correct: 0,
            consecutive_incorrect: 0,
        }
    }

    pub fn current(&self) -> Difficulty {
        self.current
    }

    pub fn consecutive_correct(&self) -> u32 {
        self.consecutive_correct
    }

    pub fn consecutive_incorrect(&self) -> u32 {
        self.consecutive_incorrect
    }

    /// Feed one verdict. Returns true when the difficulty moved.
    pub fn adjust(&mut self, correct: bool) -> bool {
        let before = self.current;
        if correct {
            self.consecutive_correct += 1;
            self.consecutive_incorrect = 0;
            if self.consecutive_correct >= STEP_UP_STREAK {
                self.current = self.current.harder();
                self.consecutive_correct = 0;
            }
        } else {
            self.consecutive_incorrect += 1;
            self.consecutive_correct = 0;
            if self.consecutive_incorrect >= STEP_DOWN_STREAK {
                self.current = self.current.easier();
                self.consecutive_incorrect = 0;
            }
        }

        let moved = before != self.current;
        if moved {
            tracing::debug!(from = %before, to = %self.current, "Difficulty adjusted");
        }
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn three_correct_steps_up_one_tier() {
        let mut ctl = DifficultyController::new(Difficulty::Tier(Tier::Easy));
        assert!(!ctl.adjust(true));
        assert!(!ctl.adjust(true));
        assert!(ctl.adjust(true));
        assert_eq!(ctl.current(), Difficulty::Tier(Tier::Medium));
        assert_eq!(ctl.consecutive_correct(), 0);

        // Needs a fresh streak of three, never skips a tier
        ctl.adjust(true);
        ctl.adjust(true);
        assert_eq!(ctl.current(), Difficulty::Tier(Tier::Medium));
        ctl.adjust(true);
        assert_eq!(ctl.current(), Difficulty::Tier(Tier::Hard));
    }

    #[test]
    fn two_incorrect_steps_down() {
        let mut ctl = DifficultyController::new(Difficulty::Level(5));
        ctl.adjust(false);
        assert_eq!(ctl.current(), Difficulty::Level(5));
        ctl.adjust(false);
        assert_eq!(ctl.current(), Difficulty::Level(4));
        assert_eq!(ctl.consecutive_incorrect(), 0);
    }

    #[test]
    fn opposite_verdict_resets_streak() {
        let mut ctl = DifficultyController::new(Difficulty::Tier(Tier::Medium));
        ctl.adjust(true);
        ctl.adjust(true);
        ctl.adjust(false);
        assert_eq!(ctl.consecutive_correct(), 0);
        assert_eq!(ctl.consecutive_incorrect(), 1);
        ctl.adjust(true);
        assert_eq!(ctl.consecutive_incorrect(), 0);
        assert_eq!(ctl.current(), Difficulty::Tier(Tier::Medium));
    }

    #[test]
    fn clamped_at_bounds_and_streak_still_resets() {
        let mut ctl = DifficultyController::new(Difficulty::Level(MAX_LEVEL));
        for _ in 0..3 {
            ctl.adjust(true);
        }
        assert_eq!(ctl.current(), Difficulty::Level(MAX_LEVEL));
        assert_eq!(ctl.consecutive_correct(), 0);

        let mut ctl = DifficultyController::new(Difficulty::Tier(Tier::Easy));
        ctl.adjust(false);
        ctl.adjust(false);
        assert_eq!(ctl.current(), Difficulty::Tier(Tier::Easy));
        assert_eq!(ctl.consecutive_incorrect(), 0);
    }

    #[test]
    fn closeness_per_model() {
        let medium = Difficulty::Tier(Tier::Medium);
        assert!(medium.is_close(medium, 2));
        assert!(!Difficulty::Tier(Tier::Easy).is_close(medium, 2));
        assert!(Difficulty::Level(3).is_close(Difficulty::Level(5), 2));
        assert!(!Difficulty::Level(2).is_close(Difficulty::Level(5), 2));
        assert!(!Difficulty::Level(2).is_close(medium, 10));
    }

    #[test]
    fn deserializes_loose_model_output() {
        let parsed: Vec<Difficulty> = serde_json::from_str(r#"["Hard", "7", 3, 4.0]"#).unwrap();
        assert_eq!(
            parsed,
            vec![
                Difficulty::Tier(Tier::Hard),
                Difficulty::Level(7),
                Difficulty::Level(3),
                Difficulty::Level(4),
            ]
        );
        assert!(serde_json::from_str::<Difficulty>(r#""impossible""#).is_err());
        assert!(serde_json::from_str::<Difficulty>("-1").is_err());
    }

    #[test]
    fn start_difficulty_respects_model() {
        assert_eq!(DifficultyModel::Tiered.start(None), Difficulty::Tier(Tier::Medium));
        assert_eq!(DifficultyModel::Numeric.start(None), Difficulty::Level(5));
        assert_eq!(
            DifficultyModel::Numeric.start(Some(Difficulty::Level(42))),
            Difficulty::Level(10)
        );
        assert_eq!(
            DifficultyModel::Numeric.start(Some(Difficulty::Tier(Tier::Hard))),
            Difficulty::Level(5)
        );
        assert!(!DifficultyModel::Numeric.accepts(Difficulty::Level(0)));
        assert!(!DifficultyModel::Tiered.accepts(Difficulty::Level(3)));
    }

    fn start_strategy() -> impl Strategy<Value = Difficulty> {
        prop_oneof![
            prop_oneof![Just(Tier::Easy), Just(Tier::Medium), Just(Tier::Hard)]
                .prop_map(Difficulty::Tier),
            (MIN_LEVEL..=MAX_LEVEL).prop_map(Difficulty::Level),
        ]
    }

    proptest! {
        #[test]
        fn streaks_exclusive_and_difficulty_bounded(
            start in start_strategy(),
            verdicts in proptest::collection::vec(any::<bool>(), 0..200),
        ) {
            let model = match start {
                Difficulty::Tier(_) => DifficultyModel::Tiered,
                Difficulty::Level(_) => DifficultyModel::Numeric,
            };
            let mut ctl = DifficultyController::new(start);
            for correct in verdicts {
                ctl.adjust(correct);
                prop_assert!(ctl.consecutive_correct() == 0 || ctl.consecutive_incorrect() == 0);
                prop_assert!(model.accepts(ctl.current()));
            }
        }
    }
}
