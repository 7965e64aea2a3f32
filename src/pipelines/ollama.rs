use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use anyhow::{Context, Result};
use lru::LruCache;
use parking_lot::Mutex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::{sleep, timeout, Duration, Instant};
use crate::circuit_breaker::{CircuitBreaker, ExponentialBackoff};
use crate::config::settings::GeneratorSettings;
use crate::error::StudyError;
use crate::logging::{log_model_call, log_timeout};
use crate::pipelines::generator::{parse_questions, parse_topics, QuestionGenerator};
use crate::pipelines::json_extract::extract_json;
use crate::pipelines::perf::{self, PerfTimer};
use crate::pipelines::prompts;
use crate::quiz::difficulty::DifficultyModel;
use crate::quiz::question::Question;

/// Summaries and topic extraction only look at the start of the document
const DOCUMENT_PROMPT_CHARS: usize = 6000;

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
}

/// Spaces out calls so consecutive requests are at least `interval` apart
struct RateLimiter {
    interval: Duration,
    last_call: tokio::sync::Mutex<Option<Instant>>,
}

impl RateLimiter {
    fn new(interval: Duration) -> Self {
        RateLimiter {
            interval,
            last_call: tokio::sync::Mutex::new(None),
        }
    }

    async fn wait(&self) {
        let mut last_call = self.last_call.lock().await;
        if let Some(at) = *last_call {
            let elapsed = at.elapsed();
            if elapsed < self.interval {
                sleep(self.interval - elapsed).await;
            }
        }
        *last_call = Some(Instant::now());
    }
}

fn response_key(model: &str, prompt: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    model.hash(&mut hasher);
    prompt.hash(&mut hasher);
    hasher.finish()
}

/// `QuestionGenerator` backed by a local Ollama server
pub struct OllamaGenerator {
    client: Client,
    settings: GeneratorSettings,
    breaker: CircuitBreaker,
    backoff: ExponentialBackoff,
    limiter: RateLimiter,
    responses: Mutex<LruCache<u64, String>>,
}

impl OllamaGenerator {
    pub fn new(settings: GeneratorSettings) -> Result<Self, StudyError> {
        let client = Client::builder()
            .tcp_keepalive(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| StudyError::from(e).with_context("building HTTP client"))?;
        let capacity =
            NonZeroUsize::new(settings.response_cache_size.max(1)).unwrap_or(NonZeroUsize::MIN);

        Ok(OllamaGenerator {
            client,
            breaker: CircuitBreaker::new(
                Duration::from_secs(settings.breaker_timeout_secs),
                settings.breaker_threshold,
            ),
            backoff: ExponentialBackoff::new(settings.initial_backoff_ms, settings.max_backoff_ms),
            limiter: RateLimiter::new(Duration::from_millis(settings.min_call_interval_ms)),
            responses: Mutex::new(LruCache::new(capacity)),
            settings,
        })
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    async fn post_generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.settings.base_url.trim_end_matches('/'));
        let model = self.settings.model.as_str();

        let response = self
            .client
            .post(&url)
            .json(&OllamaRequest {
                model,
                prompt,
                stream: false,
            })
            .send()
            .await
            .with_context(|| format!("Failed to connect to Ollama API at {}", url))?
            .error_for_status()
            .with_context(|| format!("Ollama rejected request for model '{}'", model))?;

        let body: OllamaResponse = response
            .json()
            .await
            .with_context(|| format!("Failed to read response from model '{}'", model))?;

        if body.response.trim().is_empty() {
            anyhow::bail!("Model '{}' returned empty response", model);
        }
        Ok(body.response)
    }

    /// Raw completion for `prompt`, with caching, rate limiting, timeout,
    /// bounded retries and the circuit breaker.
    pub async fn complete(&self, prompt: &str) -> Result<String, StudyError> {
        let model = self.settings.model.as_str();
        let key = response_key(model, prompt);
        if let Some(hit) = self.responses.lock().get(&key).cloned() {
            tracing::debug!(model = model, "Response cache hit");
            return Ok(hit);
        }

        let _perf = PerfTimer::with_context("ollama_complete", model);
        let attempts = self.settings.max_attempts.max(1);
        let call_timeout = Duration::from_secs(self.settings.timeout_secs);
        let mut last_error = String::new();

        for attempt in 0..attempts {
            if self.breaker.is_open() {
                let failures = self.breaker.consecutive_failures();
                return Err(StudyError::new("Generator circuit is open", "model_call")
                    .with_model(model)
                    .with_context(format!("{} consecutive failures", failures)));
            }

            self.limiter.wait().await;
            let started = std::time::Instant::now();
            let outcome = timeout(call_timeout, self.post_generate(prompt)).await;
            let latency_ms = started.elapsed().as_millis() as u64;

            match outcome {
                Ok(Ok(text)) => {
                    self.breaker.record_success();
                    log_model_call(model, "generate", true, latency_ms);
                    if attempt > 0 {
                        tracing::info!(model = model, attempt, "Model call succeeded after retry");
                    }
                    self.responses.lock().put(key, text.clone());
                    return Ok(text);
                }
                Ok(Err(e)) => {
                    log_model_call(model, "generate", false, latency_ms);
                    last_error = format!("{:#}", e);
                }
                Err(_) => {
                    log_timeout(model, call_timeout.as_secs());
                    last_error = format!("timed out after {}s", call_timeout.as_secs());
                }
            }

            self.breaker.record_failure();
            if attempt + 1 < attempts {
                let delay = self.backoff.delay_for_attempt(attempt);
                tracing::warn!(
                    model = model,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %last_error,
                    "Model call failed, retrying"
                );
                sleep(delay).await;
            }
        }

        Err(StudyError::new(
            format!("Model call failed after {} attempts", attempts),
            "model_call",
        )
        .with_model(model)
        .with_retry(false)
        .with_context(last_error))
    }

    /// Completion parsed as JSON. Unusable output is a generation failure.
    pub async fn complete_json(&self, prompt: &str) -> Result<Value, StudyError> {
        let raw = self.complete(prompt).await?;
        let started = std::time::Instant::now();
        let json = extract_json(&raw).map_err(|e| {
            StudyError::generation(format!("{:#}", e)).with_model(self.model())
        })?;
        let value = serde_json::from_str(&json)
            .map_err(|e| StudyError::generation(e.to_string()).with_model(self.model()))?;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        perf::log_perf_with_context("json_extract", elapsed_ms, self.model());
        Ok(value)
    }
}

impl QuestionGenerator for OllamaGenerator {
    async fn summarize(&self, document: &str) -> Result<String, StudyError> {
        let excerpt = crate::pipelines::generator::excerpt(document, DOCUMENT_PROMPT_CHARS);
        let summary = self.complete(&prompts::summary_prompt(excerpt)).await?;
        Ok(summary.trim().to_string())
    }

    async fn extract_topics(&self, document: &str) -> Result<Vec<String>, StudyError> {
        // Topic count is capped again during population
        let excerpt = crate::pipelines::generator::excerpt(document, DOCUMENT_PROMPT_CHARS);
        let raw = self.complete(&prompts::topics_prompt(excerpt, 10)).await?;
        Ok(parse_topics(&raw, usize::MAX))
    }

    async fn generate(
        &self,
        topic: &str,
        excerpt: &str,
        count: usize,
        model: DifficultyModel,
    ) -> Result<Vec<Question>, StudyError> {
        let value = self
            .complete_json(&prompts::questions_prompt(topic, excerpt, count, model))
            .await
            .map_err(|e| e.with_context(format!("topic: {}", topic)))?;
        let questions = parse_questions(&value, topic, model);
        if questions.is_empty() {
            return Err(StudyError::generation("No usable questions in model output")
                .with_model(self.model())
                .with_context(format!("topic: {}", topic)));
        }
        Ok(questions)
    }

    async fn suggest(&self, weak_topics: &[String]) -> Result<String, StudyError> {
        let text = self.complete(&prompts::suggestions_prompt(weak_topics)).await?;
        Ok(text.trim().to_string())
    }
}
