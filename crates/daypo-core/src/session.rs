//! Quiz session controller.
//!
//! Owns a loaded [`Test`], moves between questions, evaluates answers and
//! keeps the progress sidecar in sync.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::config::DaypoConfig;
use crate::error::{AnswerError, LoadError};
use crate::model::{Question, QuestionKind, Test};
use crate::parser::{self, LoadWarning};
use crate::progress::{self, Progress, RestoreStats};

/// A submitted answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// Selected option indices (0-based) for single and multiple choice.
    Choice(Vec<usize>),
    /// 1-based position given to each option, in option order.
    Order(Vec<usize>),
}

/// Final results of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub title: String,
    pub total: usize,
    pub answered: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub unanswered: usize,
    /// Fraction of all questions answered correctly.
    pub score: f64,
    pub passed: bool,
}

impl Summary {
    pub fn from_test(test: &Test, pass_threshold: f64) -> Self {
        let total = test.len();
        let correct = test.num_correct();
        let answered = test.num_answered();
        let score = if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64
        };
        Self {
            title: test.title.clone(),
            total,
            answered,
            correct,
            incorrect: test.num_incorrect(),
            unanswered: total - answered,
            score,
            passed: total > 0 && score >= pass_threshold,
        }
    }

    /// Whether every question was answered correctly.
    pub fn is_perfect(&self) -> bool {
        self.total > 0 && self.correct == self.total
    }
}

/// A quiz being taken, tied to its source file and progress sidecar.
#[derive(Debug)]
pub struct QuizSession {
    test: Test,
    source: PathBuf,
    progress_path: PathBuf,
    pass_threshold: f64,
}

impl QuizSession {
    /// Load the quiz at `path`. Saved progress is not applied; see
    /// [`QuizSession::resume`].
    pub fn open(path: &Path, config: &DaypoConfig) -> Result<(Self, Vec<LoadWarning>), LoadError> {
        let parsed = parser::parse_quiz(path)?;
        tracing::info!(
            "loaded \"{}\" with {} questions from {}",
            parsed.test.title,
            parsed.test.len(),
            path.display()
        );
        let session = Self::new(parsed.test, path, config);
        Ok((session, parsed.warnings))
    }

    /// Wrap an already loaded test.
    pub fn new(test: Test, source: &Path, config: &DaypoConfig) -> Self {
        Self {
            test,
            source: source.to_path_buf(),
            progress_path: progress::progress_path(source, config.progress_dir.as_deref()),
            pass_threshold: config.pass_threshold,
        }
    }

    pub fn test(&self) -> &Test {
        &self.test
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn progress_path(&self) -> &Path {
        &self.progress_path
    }

    pub fn current(&self) -> Option<&Question> {
        self.test.current()
    }

    /// 1-based number of the current question and the question count.
    pub fn position(&self) -> (usize, usize) {
        (self.test.current_index + 1, self.test.len())
    }

    pub fn is_first(&self) -> bool {
        self.test.current_index == 0
    }

    pub fn is_last(&self) -> bool {
        self.test.current_index + 1 >= self.test.len()
    }

    /// Move to the next question. Returns `false` on the last question.
    pub fn next(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.test.current_index += 1;
        true
    }

    /// Move to the previous question. Returns `false` on the first question.
    pub fn previous(&mut self) -> bool {
        if self.is_first() {
            return false;
        }
        self.test.current_index -= 1;
        true
    }

    /// Jump to the question with 1-based `number`.
    pub fn go_to(&mut self, number: usize) -> bool {
        if number == 0 || number > self.test.len() {
            return false;
        }
        self.test.current_index = number - 1;
        true
    }

    /// Evaluate `answer` against the current question and record it.
    ///
    /// Returns whether the answer was correct. A rejected answer leaves the
    /// question unchanged.
    pub fn submit(&mut self, answer: Answer) -> Result<bool, AnswerError> {
        let question = self.test.current_mut().ok_or(AnswerError::NoQuestion)?;
        if question.is_answered {
            return Err(AnswerError::AlreadyAnswered(question.id));
        }
        let count = question.options.len();

        let (answer_indices, raw_input) = match (question.kind, answer) {
            (QuestionKind::Ordering, Answer::Order(positions)) => {
                (order_from_positions(&positions, count)?, positions)
            }
            (QuestionKind::Single | QuestionKind::Multiple, Answer::Choice(selection)) => {
                check_selection(&selection, count)?;
                if question.kind == QuestionKind::Single && selection.len() != 1 {
                    return Err(AnswerError::NotSingle);
                }
                (selection.clone(), selection)
            }
            (kind, _) => return Err(AnswerError::WrongShape { kind }),
        };

        let correct = match question.kind {
            QuestionKind::Ordering => answer_indices == question.correct_indices,
            _ => {
                let mut chosen = answer_indices.clone();
                chosen.sort_unstable();
                let mut expected = question.correct_indices.clone();
                expected.sort_unstable();
                chosen == expected
            }
        };

        question.response.answer_indices = answer_indices;
        question.response.raw_input = raw_input;
        question.is_answered = true;
        question.is_correct = Some(correct);

        tracing::debug!(
            "question {} answered {}",
            question.id,
            if correct { "correctly" } else { "incorrectly" }
        );
        Ok(correct)
    }

    pub fn summary(&self) -> Summary {
        Summary::from_test(&self.test, self.pass_threshold)
    }

    /// Number of questions not answered correctly, unanswered included.
    pub fn failed_questions(&self) -> usize {
        self.test
            .questions
            .iter()
            .filter(|q| q.is_correct != Some(true))
            .count()
    }

    /// Keep only the questions not answered correctly, reset them, and start
    /// over from the first one. Returns the number of questions kept.
    pub fn retry_failed(&mut self) -> usize {
        self.test.questions.retain(|q| q.is_correct != Some(true));
        for q in &mut self.test.questions {
            q.reset();
        }
        self.test.current_index = 0;
        tracing::info!("retrying {} questions", self.test.len());
        self.test.len()
    }

    pub fn has_saved_progress(&self) -> bool {
        self.progress_path.exists()
    }

    /// Write the current state to the progress sidecar.
    pub fn save_progress(&self) -> Result<()> {
        Progress::capture(&self.test).save_json(&self.progress_path)?;
        tracing::debug!("progress saved to {}", self.progress_path.display());
        Ok(())
    }

    /// Apply the progress sidecar to the loaded test.
    pub fn resume(&mut self) -> Result<RestoreStats> {
        let progress = Progress::load_json(&self.progress_path)?;
        let stats = progress.restore_into(&mut self.test);
        tracing::info!(
            "resumed {} answers from {} ({} unmatched, {} rejected)",
            stats.restored,
            self.progress_path.display(),
            stats.unmatched,
            stats.rejected
        );
        Ok(stats)
    }

    /// Delete the progress sidecar. Returns `false` if there was none.
    pub fn discard_progress(&self) -> Result<bool> {
        discard_progress_file(&self.progress_path)
    }
}

/// Delete a progress sidecar. Returns `false` if there was none.
pub fn discard_progress_file(path: &Path) -> Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(anyhow::Error::new(e)
            .context(format!("failed to delete progress file {}", path.display()))),
    }
}

fn check_selection(selection: &[usize], count: usize) -> Result<(), AnswerError> {
    let mut seen = HashSet::new();
    for &index in selection {
        if index >= count {
            return Err(AnswerError::OptionOutOfRange { index, count });
        }
        if !seen.insert(index) {
            return Err(AnswerError::DuplicateChoice(index));
        }
    }
    Ok(())
}

/// Turn per-option positions into option indices in position order.
fn order_from_positions(positions: &[usize], count: usize) -> Result<Vec<usize>, AnswerError> {
    let unique: HashSet<usize> = positions.iter().copied().collect();
    let valid = positions.len() == count
        && unique.len() == count
        && positions.iter().all(|&p| (1..=count).contains(&p));
    if !valid {
        return Err(AnswerError::InvalidOrder(count));
    }

    let mut placed: Vec<(usize, usize)> = positions
        .iter()
        .enumerate()
        .map(|(index, &position)| (position, index))
        .collect();
    placed.sort_unstable();
    Ok(placed.into_iter().map(|(_, index)| index).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> QuizSession {
        let single = Question::new(
            1,
            "2 + 2?",
            QuestionKind::Single,
            vec!["3".into(), "4".into(), "5".into()],
            vec![1],
        );
        let multiple = Question::new(
            2,
            "Even numbers?",
            QuestionKind::Multiple,
            vec!["1".into(), "2".into(), "3".into(), "4".into()],
            vec![1, 3],
        );
        let ordering = Question::new(
            3,
            "Smallest first",
            QuestionKind::Ordering,
            vec!["ten".into(), "one".into(), "five".into()],
            vec![1, 2, 0],
        );
        let test = Test::new("Arithmetic", vec![single, multiple, ordering]);
        QuizSession::new(test, Path::new("arith.xml"), &DaypoConfig::default())
    }

    #[test]
    fn navigation_stops_at_the_ends() {
        let mut s = session();
        assert!(s.is_first());
        assert!(!s.previous());
        assert!(s.next());
        assert!(s.next());
        assert!(s.is_last());
        assert!(!s.next());
        assert_eq!(s.position(), (3, 3));
        assert!(s.go_to(1));
        assert!(!s.go_to(4));
        assert!(!s.go_to(0));
        assert_eq!(s.position(), (1, 3));
    }

    #[test]
    fn single_choice() {
        let mut s = session();
        assert_eq!(s.submit(Answer::Choice(vec![])), Err(AnswerError::NotSingle));
        assert_eq!(s.submit(Answer::Choice(vec![1])), Ok(true));
        let q = s.current().unwrap();
        assert!(q.is_answered);
        assert_eq!(q.response.raw_input, vec![1]);
    }

    #[test]
    fn answered_question_is_locked() {
        let mut s = session();
        s.submit(Answer::Choice(vec![0])).unwrap();
        assert_eq!(
            s.submit(Answer::Choice(vec![1])),
            Err(AnswerError::AlreadyAnswered(1))
        );
        assert_eq!(s.current().unwrap().is_correct, Some(false));
    }

    #[test]
    fn multiple_choice_ignores_selection_order() {
        let mut s = session();
        s.next();
        assert_eq!(s.submit(Answer::Choice(vec![3, 1])), Ok(true));
    }

    #[test]
    fn multiple_choice_needs_every_correct_option() {
        let mut s = session();
        s.next();
        assert_eq!(s.submit(Answer::Choice(vec![1])), Ok(false));
    }

    #[test]
    fn choice_validation() {
        let mut s = session();
        s.next();
        assert_eq!(
            s.submit(Answer::Choice(vec![9])),
            Err(AnswerError::OptionOutOfRange { index: 9, count: 4 })
        );
        assert_eq!(
            s.submit(Answer::Choice(vec![1, 1])),
            Err(AnswerError::DuplicateChoice(1))
        );
        assert_eq!(
            s.submit(Answer::Order(vec![1, 2, 3, 4])),
            Err(AnswerError::WrongShape {
                kind: QuestionKind::Multiple
            })
        );
        assert!(!s.current().unwrap().is_answered);
    }

    #[test]
    fn ordering_positions() {
        let mut s = session();
        s.go_to(3);
        // ten -> 3, one -> 1, five -> 2
        assert_eq!(s.submit(Answer::Order(vec![3, 1, 2])), Ok(true));
        let q = s.current().unwrap();
        assert_eq!(q.response.answer_indices, vec![1, 2, 0]);
        assert_eq!(q.response.raw_input, vec![3, 1, 2]);
    }

    #[test]
    fn ordering_wrong_sequence() {
        let mut s = session();
        s.go_to(3);
        assert_eq!(s.submit(Answer::Order(vec![1, 2, 3])), Ok(false));
    }

    #[test]
    fn ordering_needs_unique_positions() {
        let mut s = session();
        s.go_to(3);
        assert_eq!(
            s.submit(Answer::Order(vec![1, 1, 2])),
            Err(AnswerError::InvalidOrder(3))
        );
        assert_eq!(
            s.submit(Answer::Order(vec![1, 2])),
            Err(AnswerError::InvalidOrder(3))
        );
        assert_eq!(
            s.submit(Answer::Order(vec![0, 1, 2])),
            Err(AnswerError::InvalidOrder(3))
        );
    }

    #[test]
    fn summary_and_pass_threshold() {
        let mut s = session();
        s.submit(Answer::Choice(vec![1])).unwrap();
        s.next();
        s.submit(Answer::Choice(vec![0])).unwrap();

        let summary = s.summary();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.answered, 2);
        assert_eq!(summary.correct, 1);
        assert_eq!(summary.incorrect, 1);
        assert_eq!(summary.unanswered, 1);
        assert!((summary.score - 1.0 / 3.0).abs() < 1e-9);
        assert!(!summary.passed);
        assert!(!summary.is_perfect());
        assert_eq!(s.failed_questions(), 2);
    }

    #[test]
    fn retry_keeps_incorrect_and_unanswered() {
        let mut s = session();
        s.submit(Answer::Choice(vec![1])).unwrap();
        s.next();
        s.submit(Answer::Choice(vec![0])).unwrap();

        assert_eq!(s.retry_failed(), 2);
        assert_eq!(s.position(), (1, 2));
        let texts: Vec<&str> = s.test().questions.iter().map(|q| q.text.as_str()).collect();
        assert_eq!(texts, vec!["Even numbers?", "Smallest first"]);
        assert!(s.test().questions.iter().all(|q| !q.is_answered));
    }

    #[test]
    fn save_resume_and_discard() {
        let dir = tempfile::tempdir().unwrap();
        let config = DaypoConfig {
            progress_dir: Some(dir.path().to_path_buf()),
            ..DaypoConfig::default()
        };
        let mut s = QuizSession::new(session().test, Path::new("arith.xml"), &config);
        assert_eq!(s.progress_path(), dir.path().join("arith.progress.json"));
        assert!(!s.has_saved_progress());

        s.submit(Answer::Choice(vec![1])).unwrap();
        s.next();
        s.save_progress().unwrap();
        assert!(s.has_saved_progress());

        let mut resumed = QuizSession::new(session().test, Path::new("arith.xml"), &config);
        let stats = resumed.resume().unwrap();
        assert_eq!(stats.restored, 3);
        assert_eq!(resumed.position(), (2, 3));
        assert_eq!(resumed.test().num_correct(), 1);

        assert!(resumed.discard_progress().unwrap());
        assert!(!resumed.discard_progress().unwrap());
    }

    #[test]
    fn open_reads_quiz_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quiz.xml");
        std::fs::write(
            &path,
            "<test><p><t>Tiny</t></p><c><c><t>1</t><p>Yes?</p><r><o>yes</o><o>no</o></r><c>21</c></c></c></test>",
        )
        .unwrap();

        let (s, warnings) = QuizSession::open(&path, &DaypoConfig::default()).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(s.test().title, "Tiny");
        assert_eq!(s.progress_path(), dir.path().join("quiz.progress.json"));
    }
}
