//! The `daypo reset` command.

use std::path::PathBuf;

use anyhow::Result;

use daypo_core::config::load_config_from;
use daypo_core::progress::progress_path;
use daypo_core::session::discard_progress_file;

pub fn execute(quiz: PathBuf, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let path = progress_path(&quiz, config.progress_dir.as_deref());

    if discard_progress_file(&path)? {
        println!("Deleted {}", path.display());
    } else {
        println!("No saved progress for {}", quiz.display());
    }

    Ok(())
}
