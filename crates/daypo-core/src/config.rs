//! daypo configuration.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// What to do when a quiz is opened and saved progress exists for it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResumePolicy {
    /// Ask the user.
    #[default]
    Ask,
    /// Resume without asking.
    Always,
    /// Start fresh without asking.
    Never,
}

impl fmt::Display for ResumePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResumePolicy::Ask => write!(f, "ask"),
            ResumePolicy::Always => write!(f, "always"),
            ResumePolicy::Never => write!(f, "never"),
        }
    }
}

impl FromStr for ResumePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ask" => Ok(ResumePolicy::Ask),
            "always" | "yes" => Ok(ResumePolicy::Always),
            "never" | "no" => Ok(ResumePolicy::Never),
            other => Err(format!("unknown resume policy: {other}")),
        }
    }
}

/// Top-level daypo configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaypoConfig {
    /// Directory for progress sidecars. Defaults to the quiz file's directory.
    #[serde(default)]
    pub progress_dir: Option<PathBuf>,
    /// Behaviour when saved progress exists.
    #[serde(default)]
    pub resume: ResumePolicy,
    /// Save progress after every answer, not only on exit.
    #[serde(default = "default_true")]
    pub autosave: bool,
    /// Fraction of correct answers needed to pass.
    #[serde(default = "default_pass_threshold")]
    pub pass_threshold: f64,
}

fn default_true() -> bool {
    true
}
fn default_pass_threshold() -> f64 {
    0.5
}

impl Default for DaypoConfig {
    fn default() -> Self {
        Self {
            progress_dir: None,
            resume: ResumePolicy::default(),
            autosave: true,
            pass_threshold: default_pass_threshold(),
        }
    }
}

impl DaypoConfig {
    fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.pass_threshold),
            "pass_threshold must be between 0.0 and 1.0, got {}",
            self.pass_threshold
        );
        Ok(())
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `daypo.toml` in the current directory
/// 2. `~/.config/daypo/config.toml`
///
/// Environment variable overrides: `DAYPO_PROGRESS_DIR`, `DAYPO_RESUME`.
/// A leading `~` in `progress_dir` expands to `$HOME`.
pub fn load_config() -> Result<DaypoConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<DaypoConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("daypo.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            parse_config(
                &std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read config: {}", path.display()))?,
            )
            .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => DaypoConfig::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    let home = std::env::var("HOME").ok().map(PathBuf::from);
    config.progress_dir = config
        .progress_dir
        .map(|dir| expand_home(dir, home.as_deref()));
    config.validate()?;

    Ok(config)
}

/// Parse a TOML config string.
pub fn parse_config(content: &str) -> Result<DaypoConfig> {
    let config: DaypoConfig = toml::from_str(content)?;
    Ok(config)
}

fn apply_env_overrides(
    config: &mut DaypoConfig,
    var: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(dir) = var("DAYPO_PROGRESS_DIR").filter(|d| !d.is_empty()) {
        config.progress_dir = Some(PathBuf::from(dir));
    }

    if let Some(policy) = var("DAYPO_RESUME").filter(|p| !p.is_empty()) {
        config.resume = policy
            .parse()
            .map_err(|e: String| anyhow::anyhow!("DAYPO_RESUME: {e}"))?;
    }

    Ok(())
}

/// Replace a leading `~` component with the home directory.
fn expand_home(path: PathBuf, home: Option<&Path>) -> PathBuf {
    if let (Ok(rest), Some(home)) = (path.strip_prefix("~"), home) {
        return home.join(rest);
    }
    path
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("daypo"))
}
