//! The `daypo exhibits` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use daypo_core::parser;

pub fn execute(quiz: PathBuf, output: PathBuf) -> Result<()> {
    let parsed = parser::parse_quiz(&quiz)?;
    let with_exhibits: Vec<_> = parsed
        .test
        .questions
        .iter()
        .filter_map(|q| q.exhibit.as_ref().map(|e| (q.id, e)))
        .collect();

    if with_exhibits.is_empty() {
        println!("No exhibits in {}", quiz.display());
        return Ok(());
    }

    std::fs::create_dir_all(&output)
        .with_context(|| format!("failed to create {}", output.display()))?;

    for (id, exhibit) in &with_exhibits {
        let path = output.join(format!("question-{id}.{}", exhibit.extension()));
        std::fs::write(&path, &exhibit.data)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::debug!("wrote exhibit {} to {}", exhibit.key, path.display());
    }

    println!(
        "Wrote {} exhibit(s) to {}",
        with_exhibits.len(),
        output.display()
    );
    Ok(())
}
