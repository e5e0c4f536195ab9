//! Error types for quiz loading and answering.
//!
//! Defined with `thiserror` so the CLI can tell a broken quiz file apart from
//! a rejected answer without string matching.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading a quiz file.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("failed to read quiz file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not well-formed XML.
    #[error("failed to parse quiz XML {path}: {source}")]
    Xml {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    /// The root element has no `<c>` question container.
    #[error("invalid test format: no main question container (<c>) found in {0}")]
    MissingContainer(PathBuf),

    /// Every question node was skipped.
    #[error("{0} does not contain any valid questions")]
    NoQuestions(PathBuf),
}

/// Errors that reject a submitted answer. The question is left untouched.
///
/// Option indices are 0-based; messages show them as the 1-based numbers
/// the user sees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnswerError {
    #[error("no question is selected")]
    NoQuestion,

    #[error("question {0} has already been answered")]
    AlreadyAnswered(usize),

    #[error("{kind} questions cannot take this kind of answer")]
    WrongShape { kind: crate::model::QuestionKind },

    #[error("option {} does not exist (the question has {count} options)", .index + 1)]
    OptionOutOfRange { index: usize, count: usize },

    #[error("select exactly one option")]
    NotSingle,

    #[error("option {} was selected more than once", .0 + 1)]
    DuplicateChoice(usize),

    #[error("each item must have a unique order number between 1 and {0}")]
    InvalidOrder(usize),
}

impl AnswerError {
    /// Returns `true` if the user can fix the answer and submit again.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, AnswerError::NoQuestion | AnswerError::AlreadyAnswered(_))
    }
}
