//! Progress sidecar persistence.
//!
//! Session state is written as pretty JSON to `<quiz stem>.progress.json`.
//! Saved questions are matched back to a freshly loaded quiz by prompt text,
//! so the sidecar survives questions being added or reordered.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Question, Response, Test};

/// Suffix appended to the quiz file stem.
pub const PROGRESS_SUFFIX: &str = ".progress.json";

/// Saved session state for one quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub current_question_index: usize,
    #[serde(default)]
    pub questions: Vec<SavedQuestion>,
}

/// Saved response state for one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedQuestion {
    pub text: String,
    #[serde(default)]
    pub user_answer_indices: Vec<usize>,
    #[serde(default)]
    pub user_input: Vec<usize>,
    #[serde(default)]
    pub is_answered: bool,
    #[serde(default)]
    pub is_correct: Option<bool>,
}

impl From<&Question> for SavedQuestion {
    fn from(q: &Question) -> Self {
        Self {
            text: q.text.clone(),
            user_answer_indices: q.response.answer_indices.clone(),
            user_input: q.response.raw_input.clone(),
            is_answered: q.is_answered,
            is_correct: q.is_correct,
        }
    }
}

impl SavedQuestion {
    /// Whether the saved indices fit `question`.
    fn fits(&self, question: &Question) -> bool {
        let count = question.options.len();
        let positions_ok = match question.kind {
            crate::model::QuestionKind::Ordering => {
                self.user_input.iter().all(|&p| (1..=count).contains(&p))
            }
            _ => self.user_input.iter().all(|&i| i < count),
        };
        positions_ok && self.user_answer_indices.iter().all(|&i| i < count)
    }

    fn apply(&self, question: &mut Question) {
        question.response = Response {
            answer_indices: self.user_answer_indices.clone(),
            raw_input: self.user_input.clone(),
        };
        question.is_answered = self.is_answered;
        question.is_correct = self.is_correct;
    }
}

/// Outcome of restoring saved progress into a test.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreStats {
    /// Questions that took saved state.
    pub restored: usize,
    /// Saved entries with no matching question.
    pub unmatched: usize,
    /// Saved entries that matched but did not fit the question's options.
    pub rejected: usize,
}

impl Progress {
    /// Snapshot the session state of `test`.
    pub fn capture(test: &Test) -> Self {
        Self {
            title: Some(test.title.clone()),
            saved_at: Some(Utc::now()),
            current_question_index: test.current_index,
            questions: test.questions.iter().map(SavedQuestion::from).collect(),
        }
    }

    /// Number of saved questions marked answered.
    pub fn answered(&self) -> usize {
        self.questions.iter().filter(|q| q.is_answered).count()
    }

    pub fn correct(&self) -> usize {
        self.questions
            .iter()
            .filter(|q| q.is_correct == Some(true))
            .count()
    }

    pub fn incorrect(&self) -> usize {
        self.questions
            .iter()
            .filter(|q| q.is_correct == Some(false))
            .count()
    }

    /// Apply saved state to `test`, matching questions by prompt text.
    ///
    /// The current index is clamped to the questions of `test`.
    pub fn restore_into(&self, test: &mut Test) -> RestoreStats {
        let saved: HashMap<&str, &SavedQuestion> = self
            .questions
            .iter()
            .map(|q| (q.text.as_str(), q))
            .collect();

        let mut stats = RestoreStats::default();
        let mut matched = 0;
        for question in &mut test.questions {
            let Some(entry) = saved.get(question.text.as_str()) else {
                continue;
            };
            matched += 1;
            if entry.fits(question) {
                entry.apply(question);
                stats.restored += 1;
            } else {
                tracing::warn!(
                    "ignoring saved answer for question {}: it names options that do not exist",
                    question.id
                );
                stats.rejected += 1;
            }
        }
        stats.unmatched = saved.len().saturating_sub(matched);

        test.current_index = self
            .current_question_index
            .min(test.questions.len().saturating_sub(1));

        stats
    }

    /// Save as pretty JSON, replacing `path` atomically.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize progress")?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)
            .with_context(|| format!("failed to create temporary file in {}", dir.display()))?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(path)
            .with_context(|| format!("failed to write progress to {}", path.display()))?;
        Ok(())
    }

    /// Load progress from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read progress from {}", path.display()))?;
        let progress: Progress = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse progress JSON {}", path.display()))?;
        Ok(progress)
    }
}

/// Sidecar path for `quiz_path`: `<stem>.progress.json` in `progress_dir`,
/// or next to the quiz when no directory is configured.
pub fn progress_path(quiz_path: &Path, progress_dir: Option<&Path>) -> PathBuf {
    let stem = quiz_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "quiz".to_string());
    let file_name = format!("{stem}{PROGRESS_SUFFIX}");

    match progress_dir {
        Some(dir) => dir.join(file_name),
        None => quiz_path
            .parent()
            .map(|p| p.join(&file_name))
            .unwrap_or_else(|| PathBuf::from(&file_name)),
    }
}
