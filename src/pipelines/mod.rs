pub mod generator;
pub mod json_extract;
pub mod ollama;
pub mod perf;
pub mod populate;
pub mod prompts;
