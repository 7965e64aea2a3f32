/// Initialize structured logging with tracing.
/// Call once at startup; later calls leave the first subscriber in place.
pub fn init_logging() {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_writer(std::io::stderr)
                .json()
        );

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        tracing::warn!(error = %e, "Tracing subscriber already installed");
        return;
    }

    tracing::info!("Structured logging initialized");
}

/// One generator round trip
pub fn log_model_call(model: &str, stage: &str, success: bool, latency_ms: u64) {
    tracing::info!(
        model = model,
        stage = stage,
        success = success,
        latency_ms = latency_ms,
        "Model call"
    );
}

pub fn log_timeout(model: &str, duration_secs: u64) {
    tracing::error!(model = model, duration_secs = duration_secs, "Timeout exceeded");
}
