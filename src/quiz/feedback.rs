use serde::{Deserialize, Serialize};
use crate::pipelines::generator::QuestionGenerator;
use crate::quiz::history::QuestionHistory;
use crate::quiz::store::QuestionPool;

pub const NOT_ENOUGH_DATA: &str =
    "Not enough data to generate suggestions. Please answer more questions.";
pub const NO_WEAK_TOPICS: &str = "Great job! You haven't struggled with any topics yet.";
pub const MAX_WEAK_TOPICS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackPayload {
    pub suggestions: String,
    pub score: u32,
    #[serde(default)]
    pub weak_topics: Vec<String>,
}

/// What the analyzer decided before any generator call.
/// Split out so callers can release session locks before awaiting the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackPlan {
    Ready(FeedbackPayload),
    NeedsSuggestions { weak_topics: Vec<String>, score: u32 },
}

pub fn plan_feedback(history: &QuestionHistory, pool: &QuestionPool, score: u32) -> FeedbackPlan {
    if history.is_empty() {
        return FeedbackPlan::Ready(FeedbackPayload {
            suggestions: NOT_ENOUGH_DATA.to_string(),
            score,
            weak_topics: Vec::new(),
        });
    }

    let weak_topics: Vec<String> = history
        .weak_topics(pool, MAX_WEAK_TOPICS)
        .into_iter()
        .map(|w| w.topic)
        .collect();

    if weak_topics.is_empty() {
        return FeedbackPlan::Ready(FeedbackPayload {
            suggestions: NO_WEAK_TOPICS.to_string(),
            score,
            weak_topics,
        });
    }

    FeedbackPlan::NeedsSuggestions { weak_topics, score }
}

/// Used when the generator cannot phrase suggestions
pub fn fallback_suggestions(weak_topics: &[String]) -> String {
    let mut text = String::from("Focus your next study session on these topics:");
    for (i, topic) in weak_topics.iter().enumerate() {
        text.push_str(&format!("\n{}. Review {} and retry its questions.", i + 1, topic));
    }
    text
}

/// Resolve a plan into a payload, asking the generator when needed.
/// Never fails: a generator error degrades to the fallback text.
pub async fn resolve_feedback<G: QuestionGenerator>(
    plan: FeedbackPlan,
    generator: &G,
) -> FeedbackPayload {
    let (weak_topics, score) = match plan {
        FeedbackPlan::Ready(payload) => return payload,
        FeedbackPlan::NeedsSuggestions { weak_topics, score } => (weak_topics, score),
    };

    let suggestions = match generator.suggest(&weak_topics).await {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => {
            tracing::warn!(topics = ?weak_topics, "Generator returned empty suggestions");
            fallback_suggestions(&weak_topics)
        }
        Err(e) => {
            tracing::warn!(error = %e, topics = ?weak_topics, "Suggestion generation failed");
            fallback_suggestions(&weak_topics)
        }
    };

    FeedbackPayload {
        suggestions,
        score,
        weak_topics,
    }
}
