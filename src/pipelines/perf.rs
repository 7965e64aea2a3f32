use std::time::Instant;

/// Logs the elapsed time of a scope at debug level when dropped
pub struct PerfTimer {
    label: &'static str,
    context: Option<String>,
    start: Instant,
}

impl PerfTimer {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            context: None,
            start: Instant::now(),
        }
    }

    pub fn with_context(label: &'static str, context: impl Into<String>) -> Self {
        Self {
            label,
            context: Some(context.into()),
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Drop for PerfTimer {
    fn drop(&mut self) {
        let duration_ms = self.elapsed_ms();
        match &self.context {
            Some(context) => {
                tracing::debug!(label = self.label, duration_ms, context = %context, "Perf")
            }
            None => tracing::debug!(label = self.label, duration_ms, "Perf"),
        }
    }
}

pub fn log_perf_with_context(label: &str, duration_ms: u64, context: &str) {
    tracing::debug!(label = label, duration_ms, context = context, "Perf");
}
