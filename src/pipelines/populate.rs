use crate::cache::{fingerprint, ContentCache};
use crate::config::settings::QuizSettings;
use crate::error::StudyError;
use crate::metrics::QuizMetrics;
use crate::pipelines::generator::{excerpt, parse_topics, QuestionGenerator};
use crate::pipelines::perf::PerfTimer;
use crate::quiz::question::Question;
use crate::quiz::store::QuestionPool;

pub const SUMMARY_LABEL: &str = "summary";
pub const TOPICS_LABEL: &str = "topics";
pub const QUESTIONS_LABEL: &str = "quiz_questions";

#[derive(Debug, Clone)]
pub struct PopulateOutcome {
    pub pool: QuestionPool,
    pub summary: String,
    pub topics: Vec<String>,
    /// Topics that contributed no questions
    pub failed_topics: Vec<String>,
}

/// Question lists are keyed per difficulty model, so switching models
/// never reuses a list generated for the other scale.
fn questions_label(settings: &QuizSettings) -> String {
    format!("{}_{}", QUESTIONS_LABEL, settings.difficulty_model.as_str())
}

fn accepted_by(settings: &QuizSettings, questions: Vec<Question>) -> Vec<Question> {
    questions
        .into_iter()
        .filter(|q| settings.difficulty_model.accepts(q.difficulty))
        .collect()
}

/// Build the question pool for a document.
///
/// Summary, topics and the question list are memoized in `cache` under
/// fingerprints of `content_id` and the document. A failed summary leaves it
/// empty and a failed topic is skipped; only topic extraction is fatal.
/// A cached list with nothing usable under the current model is regenerated.
pub async fn populate<G: QuestionGenerator>(
    generator: &G,
    cache: &ContentCache,
    metrics: &QuizMetrics,
    content_id: &str,
    document: &str,
    settings: &QuizSettings,
) -> Result<PopulateOutcome, StudyError> {
    let _perf = PerfTimer::with_context("populate", content_id);

    let summary_key = fingerprint(SUMMARY_LABEL, content_id, document);
    let summary = match cache
        .get_or_compute(&summary_key, || generator.summarize(document))
        .await
    {
        Ok(summary) => summary,
        Err(e) => {
            tracing::warn!(
                content_id = %content_id,
                error = %e,
                "Summary generation failed, continuing without"
            );
            String::new()
        }
    };

    let topics_key = fingerprint(TOPICS_LABEL, content_id, document);
    let raw_topics: Vec<String> = cache
        .get_or_compute(&topics_key, || generator.extract_topics(document))
        .await
        .map_err(|e| e.with_context(format!("content_id: {}", content_id)))?;
    // Model output may still carry bullets or duplicates
    let topics = parse_topics(&raw_topics.join("\n"), settings.max_topics);
    tracing::info!(content_id = %content_id, topics = topics.len(), "Topics ready");

    let questions_key = fingerprint(&questions_label(settings), content_id, document);
    let mut failed_topics = Vec::new();
    let cached = cache
        .get::<Vec<Question>>(&questions_key)
        .map(|cached| accepted_by(settings, cached))
        .filter(|questions| !questions.is_empty());
    let questions: Vec<Question> = match cached {
        Some(questions) => {
            metrics.record_cache_hit();
            tracing::info!(
                content_id = %content_id,
                count = questions.len(),
                "Questions loaded from cache"
            );
            questions
        }
        None => {
            metrics.record_cache_miss();
            let doc_excerpt = excerpt(document, settings.excerpt_chars);
            let mut questions = Vec::new();
            for topic in &topics {
                let generated = generator
                    .generate(
                        topic,
                        doc_excerpt,
                        settings.questions_per_topic,
                        settings.difficulty_model,
                    )
                    .await;
                match generated {
                    Ok(generated) => {
                        let accepted = accepted_by(settings, generated);
                        if accepted.is_empty() {
                            tracing::warn!(
                                topic = %topic,
                                "Generator returned no usable questions"
                            );
                            metrics.record_generation_failure();
                            failed_topics.push(topic.clone());
                        } else {
                            tracing::debug!(
                                topic = %topic,
                                count = accepted.len(),
                                "Generated questions"
                            );
                            questions.extend(accepted);
                        }
                    }
                    Err(e) => {
                        tracing::warn!(
                            topic = %topic,
                            error = %e,
                            "Question generation failed, skipping topic"
                        );
                        metrics.record_generation_failure();
                        failed_topics.push(topic.clone());
                    }
                }
            }
            if !questions.is_empty() {
                cache.put(&questions_key, &questions).await?;
            }
            questions
        }
    };

    let pool = QuestionPool::new(questions);
    tracing::info!(
        content_id = %content_id,
        pool_size = pool.len(),
        failed_topics = failed_topics.len(),
        "Question pool populated"
    );

    Ok(PopulateOutcome {
        pool,
        summary,
        topics,
        failed_topics,
    })
}
