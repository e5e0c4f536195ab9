//! The `daypo take` command.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;

use daypo_core::config::{load_config_from, ResumePolicy};
use daypo_core::{Answer, QuestionKind, QuizSession, Summary};

use crate::render;

pub fn execute(
    quiz: PathBuf,
    resume: bool,
    fresh: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let (session, warnings) = QuizSession::open(&quiz, &config)?;
    if !warnings.is_empty() {
        eprintln!(
            "Loaded with {} warning(s); run `daypo validate {}` for details.",
            warnings.len(),
            quiz.display()
        );
    }

    let policy = if resume {
        ResumePolicy::Always
    } else if fresh {
        ResumePolicy::Never
    } else {
        config.resume
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut runner = Runner::new(session, config.autosave, stdin.lock(), stdout.lock());
    runner.run(policy)?;
    Ok(())
}

/// What the loop should do after a command.
enum Flow {
    Continue,
    Stop,
}

/// Drives a quiz session from line-based input.
pub struct Runner<R, W> {
    session: QuizSession,
    autosave: bool,
    input: R,
    out: W,
}

impl<R: BufRead, W: Write> Runner<R, W> {
    pub fn new(session: QuizSession, autosave: bool, input: R, out: W) -> Self {
        Self {
            session,
            autosave,
            input,
            out,
        }
    }

    /// Run until the user quits, finishes, or input ends. Progress is saved
    /// on the way out.
    pub fn run(&mut self, policy: ResumePolicy) -> Result<Summary> {
        self.offer_resume(policy)?;
        self.show_question()?;

        loop {
            write!(self.out, "> ")?;
            self.out.flush()?;
            let Some(line) = self.read_line()? else {
                writeln!(self.out)?;
                self.save()?;
                break;
            };

            if let Flow::Stop = self.handle(line.trim())? {
                break;
            }
        }

        Ok(self.session.summary())
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        write!(self.out, "{question} [y/N] ")?;
        self.out.flush()?;
        let answer = self.read_line()?.unwrap_or_default();
        let answer = answer.trim().to_lowercase();
        writeln!(self.out)?;
        Ok(answer == "y" || answer == "yes")
    }

    fn offer_resume(&mut self, policy: ResumePolicy) -> Result<()> {
        if !self.session.has_saved_progress() {
            return Ok(());
        }
        let resume = match policy {
            ResumePolicy::Always => true,
            ResumePolicy::Never => false,
            ResumePolicy::Ask => self.confirm(
                "A previous session for this test was found. Do you want to continue?",
            )?,
        };
        if !resume {
            return Ok(());
        }

        match self.session.resume() {
            Ok(stats) => writeln!(
                self.out,
                "Resumed previous session ({} answer(s) restored).",
                stats.restored
            )?,
            Err(e) => writeln!(self.out, "Could not load progress file: {e:#}")?,
        }
        Ok(())
    }

    fn handle(&mut self, line: &str) -> Result<Flow> {
        let (command, arg) = match line.split_once(char::is_whitespace) {
            Some((c, a)) => (c, a.trim()),
            None => (line, ""),
        };

        match command.to_lowercase().as_str() {
            "" => {}
            "q" | "quit" => {
                self.save()?;
                return Ok(Flow::Stop);
            }
            "n" | "next" => {
                if self.session.next() {
                    self.show_question()?;
                } else {
                    return self.finish();
                }
            }
            "p" | "prev" | "previous" => {
                if self.session.previous() {
                    self.show_question()?;
                } else {
                    writeln!(self.out, "Already at the first question.")?;
                }
            }
            "g" | "go" => {
                if arg.parse::<usize>().is_ok_and(|n| self.session.go_to(n)) {
                    self.show_question()?;
                } else {
                    writeln!(
                        self.out,
                        "Enter a question number between 1 and {}.",
                        self.session.test().len()
                    )?;
                }
            }
            "s" | "save" => {
                self.save()?;
                writeln!(
                    self.out,
                    "Progress saved to {}",
                    self.session.progress_path().display()
                )?;
            }
            "x" | "exhibit" => self.save_exhibit(arg)?,
            "-" | "none" => self.answer(Vec::new())?,
            "h" | "help" | "?" => write!(self.out, "{}", render::HELP)?,
            _ => match parse_numbers(line) {
                Some(numbers) => self.answer(numbers)?,
                None => writeln!(self.out, "Unknown command. Type 'h' for help.")?,
            },
        }

        Ok(Flow::Continue)
    }

    /// Submit 1-based option numbers, or positions for ordering questions.
    /// An empty list submits a multiple choice question with nothing checked.
    fn answer(&mut self, numbers: Vec<usize>) -> Result<()> {
        let Some(question) = self.session.current() else {
            return Ok(());
        };
        if question.is_answered {
            writeln!(self.out, "This question has already been answered.")?;
            return Ok(());
        }

        let answer = match question.kind {
            QuestionKind::Ordering => Answer::Order(numbers),
            QuestionKind::Single | QuestionKind::Multiple => {
                if numbers.contains(&0) {
                    writeln!(self.out, "Invalid answer: options are numbered from 1.")?;
                    return Ok(());
                }
                Answer::Choice(numbers.into_iter().map(|n| n - 1).collect())
            }
        };

        match self.session.submit(answer) {
            Ok(_) => {
                if let Some(q) = self.session.current() {
                    write!(self.out, "\n{}", render::feedback(q))?;
                }
                writeln!(self.out, "{}", render::status(self.session.test()))?;
                if self.autosave {
                    self.save()?;
                }
            }
            Err(e) => writeln!(self.out, "Invalid answer: {e}")?,
        }
        Ok(())
    }

    /// Show results after the last question and offer to retry failures.
    fn finish(&mut self) -> Result<Flow> {
        let summary = self.session.summary();
        write!(self.out, "{}", render::summary(&summary))?;

        if summary.is_perfect() {
            writeln!(
                self.out,
                "\nExcellent work! You answered all questions correctly."
            )?;
        } else if self.confirm("\nDo you want to retry the questions you got wrong?")? {
            self.session.retry_failed();
            self.show_question()?;
            return Ok(Flow::Continue);
        }

        self.save()?;
        Ok(Flow::Stop)
    }

    fn show_question(&mut self) -> Result<()> {
        let test = self.session.test();
        match test.current() {
            Some(q) => {
                write!(self.out, "{}", render::question(test, q))?;
                writeln!(self.out, "{}", render::status(test))?;
            }
            None => writeln!(self.out, "This quiz has no questions.")?,
        }
        Ok(())
    }

    fn save_exhibit(&mut self, target: &str) -> Result<()> {
        let Some(q) = self.session.current() else {
            return Ok(());
        };
        let Some(exhibit) = &q.exhibit else {
            writeln!(self.out, "This question has no exhibit.")?;
            return Ok(());
        };

        let path = if target.is_empty() {
            PathBuf::from(format!("question-{}.{}", q.id, exhibit.extension()))
        } else {
            PathBuf::from(target)
        };
        match std::fs::write(&path, &exhibit.data) {
            Ok(()) => writeln!(self.out, "Exhibit saved to {}", path.display())?,
            Err(e) => writeln!(self.out, "Could not save exhibit: {e}")?,
        }
        Ok(())
    }

    fn save(&mut self) -> Result<()> {
        if let Err(e) = self.session.save_progress() {
            tracing::error!("could not save progress: {e:#}");
            writeln!(self.out, "Could not save progress: {e:#}")?;
        }
        Ok(())
    }
}

/// Parse `1`, `1,3`, `1 3` or `3, 1, 2` into numbers.
fn parse_numbers(line: &str) -> Option<Vec<usize>> {
    let numbers = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<usize>().ok())
        .collect::<Option<Vec<_>>>()?;
    (!numbers.is_empty()).then_some(numbers)
}
