pub mod difficulty;
pub mod feedback;
pub mod history;
pub mod question;
pub mod scoring;
pub mod selector;
pub mod session;
pub mod store;

pub use difficulty::{Difficulty, DifficultyController, DifficultyModel, Tier};
pub use feedback::FeedbackPayload;
pub use question::{Question, QuestionId, QuestionKind, QuestionSource};
pub use session::QuizSession;
pub use store::QuestionPool;
