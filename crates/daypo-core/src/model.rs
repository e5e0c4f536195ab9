//! Core data model types for daypo.
//!
//! A [`Test`] is an ordered list of [`Question`]s plus the index of the
//! question being shown. Questions carry both their definition (prompt,
//! options, correct answer) and the user's response state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Title used when the quiz file does not name itself.
pub const DEFAULT_TITLE: &str = "Practice Test";

/// How a question is answered and scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    /// Exactly one correct option.
    Single,
    /// Any number of correct options; all of them must be selected.
    Multiple,
    /// Every option must be put in the correct sequence.
    Ordering,
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::Single => write!(f, "single"),
            QuestionKind::Multiple => write!(f, "multiple"),
            QuestionKind::Ordering => write!(f, "ordering"),
        }
    }
}

impl FromStr for QuestionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" => Ok(QuestionKind::Single),
            "multiple" => Ok(QuestionKind::Multiple),
            "ordering" | "order" => Ok(QuestionKind::Ordering),
            other => Err(format!("unknown question kind: {other}")),
        }
    }
}

/// An image embedded in the quiz file and attached to a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exhibit {
    /// Key the question uses to reference the image.
    pub key: String,
    /// MIME type from the data URL header.
    pub mime: String,
    /// Decoded image bytes.
    pub data: Vec<u8>,
}

impl Exhibit {
    /// File extension matching the MIME type, without the dot.
    pub fn extension(&self) -> &str {
        match self.mime.as_str() {
            "image/png" => "png",
            "image/jpeg" | "image/jpg" => "jpg",
            "image/gif" => "gif",
            "image/bmp" => "bmp",
            "image/webp" => "webp",
            "image/svg+xml" => "svg",
            _ => "bin",
        }
    }
}

/// What the user submitted for a question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Selected option indices. For ordering questions, the option indices
    /// in the order the user placed them.
    pub answer_indices: Vec<usize>,
    /// What the user typed. For ordering questions, the 1-based position
    /// given to each option, in option order. Otherwise the selection.
    pub raw_input: Vec<usize>,
}

/// A single question with its definition and response state.
#[derive(Debug, Clone)]
pub struct Question {
    /// 1-based position among the questions accepted from the source file.
    pub id: usize,
    /// Prompt text.
    pub text: String,
    pub kind: QuestionKind,
    pub options: Vec<String>,
    /// Correct option indices: ascending for choice questions, in correct
    /// sequence for ordering questions.
    pub correct_indices: Vec<usize>,
    pub exhibit: Option<Exhibit>,
    pub response: Response,
    pub is_answered: bool,
    /// `None` until the question is answered.
    pub is_correct: Option<bool>,
}

impl Question {
    /// Create an unanswered question.
    pub fn new(
        id: usize,
        text: impl Into<String>,
        kind: QuestionKind,
        options: Vec<String>,
        correct_indices: Vec<usize>,
    ) -> Self {
        Self {
            id,
            text: text.into(),
            kind,
            options,
            correct_indices,
            exhibit: None,
            response: Response::default(),
            is_answered: false,
            is_correct: None,
        }
    }

    /// Forget the user's response.
    pub fn reset(&mut self) {
        self.response = Response::default();
        self.is_answered = false;
        self.is_correct = None;
    }

    /// Option texts of the correct answer, in `correct_indices` order.
    pub fn correct_options(&self) -> Vec<&str> {
        self.correct_indices
            .iter()
            .filter_map(|&i| self.options.get(i).map(String::as_str))
            .collect()
    }

    /// Whether the user selected option `index`.
    pub fn is_selected(&self, index: usize) -> bool {
        self.response.answer_indices.contains(&index)
    }

    /// Whether option `index` is part of the correct answer.
    pub fn is_correct_option(&self, index: usize) -> bool {
        self.correct_indices.contains(&index)
    }
}

/// A loaded quiz and its session state.
#[derive(Debug, Clone)]
pub struct Test {
    pub title: String,
    pub questions: Vec<Question>,
    /// Index into `questions` of the question being shown.
    pub current_index: usize,
}

impl Default for Test {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            questions: Vec::new(),
            current_index: 0,
        }
    }
}

impl Test {
    pub fn new(title: impl Into<String>, questions: Vec<Question>) -> Self {
        Self {
            title: title.into(),
            questions,
            current_index: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn num_correct(&self) -> usize {
        self.questions
            .iter()
            .filter(|q| q.is_correct == Some(true))
            .count()
    }

    pub fn num_incorrect(&self) -> usize {
        self.questions
            .iter()
            .filter(|q| q.is_correct == Some(false))
            .count()
    }

    pub fn num_answered(&self) -> usize {
        self.questions.iter().filter(|q| q.is_answered).count()
    }

    /// Number of questions of each kind, in single/multiple/ordering order.
    pub fn kind_counts(&self) -> [(QuestionKind, usize); 3] {
        let count = |kind| self.questions.iter().filter(|q| q.kind == kind).count();
        [
            (QuestionKind::Single, count(QuestionKind::Single)),
            (QuestionKind::Multiple, count(QuestionKind::Multiple)),
            (QuestionKind::Ordering, count(QuestionKind::Ordering)),
        ]
    }

    /// The question at `current_index`, if any.
    pub fn current(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    pub fn current_mut(&mut self) -> Option<&mut Question> {
        self.questions.get_mut(self.current_index)
    }
}
