//! The `daypo validate` command.

use std::path::PathBuf;

use anyhow::Result;

use daypo_core::parser::{self, ParsedQuiz};

pub fn execute(path: PathBuf) -> Result<()> {
    let quizzes = if path.is_dir() {
        parser::load_quiz_directory(&path)?
    } else {
        vec![(path.clone(), parser::parse_quiz(&path)?)]
    };

    if quizzes.is_empty() {
        println!("No quizzes found in {}", path.display());
        return Ok(());
    }

    let mut total_warnings = 0;

    for (file, quiz) in &quizzes {
        total_warnings += report(file, quiz);
    }

    if total_warnings == 0 {
        println!("All quizzes valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}

/// Print one quiz's overview and warnings. Returns the warning count.
fn report(file: &std::path::Path, quiz: &ParsedQuiz) -> usize {
    let test = &quiz.test;
    let kinds = test
        .kind_counts()
        .iter()
        .filter(|(_, n)| *n > 0)
        .map(|(kind, n)| format!("{n} {kind}"))
        .collect::<Vec<_>>()
        .join(", ");
    let exhibits = test.questions.iter().filter(|q| q.exhibit.is_some()).count();

    println!(
        "Quiz: {} ({} questions: {kinds}; {exhibits} with exhibits) [{}]",
        test.title,
        test.len(),
        file.display()
    );

    for w in &quiz.warnings {
        let prefix = w
            .question
            .map(|n| format!("  [node {n}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    let warnings = parser::validate_quiz(test);
    for w in &warnings {
        let prefix = w
            .question_id
            .map(|id| format!("  [question {id}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    quiz.warnings.len() + warnings.len()
}
