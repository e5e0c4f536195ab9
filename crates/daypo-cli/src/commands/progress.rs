//! The `daypo progress` command.

use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Utc};
use comfy_table::{Cell, Table};
use serde::Serialize;

use daypo_core::config::load_config_from;
use daypo_core::progress::{progress_path, Progress};

/// What `daypo progress --format json` prints.
#[derive(Debug, Serialize)]
struct ProgressStatus {
    progress_file: PathBuf,
    title: Option<String>,
    saved_at: Option<DateTime<Utc>>,
    current_question: usize,
    total: usize,
    answered: usize,
    correct: usize,
    incorrect: usize,
}

impl ProgressStatus {
    fn new(path: PathBuf, progress: &Progress) -> Self {
        Self {
            progress_file: path,
            title: progress.title.clone(),
            saved_at: progress.saved_at,
            current_question: progress.current_question_index + 1,
            total: progress.questions.len(),
            answered: progress.answered(),
            correct: progress.correct(),
            incorrect: progress.incorrect(),
        }
    }
}

pub fn execute(quiz: PathBuf, format: String, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let path = progress_path(&quiz, config.progress_dir.as_deref());

    if !path.exists() {
        println!("No saved progress for {}", quiz.display());
        return Ok(());
    }

    let progress = Progress::load_json(&path)?;
    let status = ProgressStatus::new(path, &progress);

    match format.as_str() {
        "text" => print_table(&status),
        "json" => println!("{}", serde_json::to_string_pretty(&status)?),
        other => anyhow::bail!("unknown format: {other} (expected text or json)"),
    }

    Ok(())
}

fn print_table(status: &ProgressStatus) {
    let mut table = Table::new();
    table.set_header(vec!["Progress", "Value"]);
    table.add_row(vec![
        Cell::new("Title"),
        Cell::new(status.title.as_deref().unwrap_or("-")),
    ]);
    table.add_row(vec![
        Cell::new("Saved"),
        Cell::new(
            status
                .saved_at
                .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_else(|| "-".to_string()),
        ),
    ]);
    table.add_row(vec![
        Cell::new("Current question"),
        Cell::new(format!("{} of {}", status.current_question, status.total)),
    ]);
    table.add_row(vec![Cell::new("Answered"), Cell::new(status.answered)]);
    table.add_row(vec![Cell::new("Correct"), Cell::new(status.correct)]);
    table.add_row(vec![Cell::new("Incorrect"), Cell::new(status.incorrect)]);

    println!("{}", status.progress_file.display());
    println!("{table}");
}
