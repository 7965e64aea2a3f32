pub mod analytics;
pub mod cache;
pub mod circuit_breaker;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipelines;
pub mod quiz;
pub mod routes;
pub mod sessions;
pub mod state;

pub use error::{QuizError, StudyError};

/// Entry point for the `studyaid` binary
pub fn run() -> Result<(), StudyError> {
    logging::init_logging();
    tracing::info!("studyaid starting");

    let args = cli::parse_args(std::env::args().skip(1))?;
    let config = config::get_config().clone();

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| StudyError::new(format!("Failed to create async runtime: {}", e), "startup"))?;

    rt.block_on(async {
        let generator = pipelines::ollama::OllamaGenerator::new(config.generator.clone())?;
        let state = state::app::AppState::open(config).await;
        cli::run_quiz(&state, &generator, &args).await
    })
}
