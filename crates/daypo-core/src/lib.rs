//! daypo-core — Quiz model, Daypo XML parser, scoring and progress.
//!
//! This crate holds everything the `daypo` binary needs that is not terminal
//! I/O: loading a quiz, tracking answers, computing results, and persisting
//! progress to a JSON sidecar next to the quiz.

pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod progress;
pub mod session;

pub use config::{load_config, load_config_from, DaypoConfig, ResumePolicy};
pub use error::{AnswerError, LoadError};
pub use model::{Exhibit, Question, QuestionKind, Response, Test};
pub use session::{Answer, QuizSession, Summary};
