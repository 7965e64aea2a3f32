pub mod app;

pub use app::{ActiveQuiz, AppState};
