//! daypo CLI — take Daypo XML quizzes in the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod render;

#[derive(Parser)]
#[command(name = "daypo", version, about = "Take Daypo XML practice tests in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take a quiz interactively
    Take {
        /// Path to the Daypo .xml quiz
        quiz: PathBuf,

        /// Resume saved progress without asking
        #[arg(long, conflicts_with = "fresh")]
        resume: bool,

        /// Ignore saved progress and start over
        #[arg(long)]
        fresh: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate quiz files
    Validate {
        /// Path to a quiz file or a directory of quizzes
        path: PathBuf,
    },

    /// Show saved progress for a quiz
    Progress {
        /// Path to the Daypo .xml quiz
        quiz: PathBuf,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Delete saved progress for a quiz
    Reset {
        /// Path to the Daypo .xml quiz
        quiz: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Write the images embedded in a quiz to a directory
    Exhibits {
        /// Path to the Daypo .xml quiz
        quiz: PathBuf,

        /// Output directory
        #[arg(long, default_value = "./exhibits")]
        output: PathBuf,
    },

    /// Create a starter config and sample quiz
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("daypo=info".parse().expect("static directive parses")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Take {
            quiz,
            resume,
            fresh,
            config,
        } => commands::take::execute(quiz, resume, fresh, config),
        Commands::Validate { path } => commands::validate::execute(path),
        Commands::Progress {
            quiz,
            format,
            config,
        } => commands::progress::execute(quiz, format, config),
        Commands::Reset { quiz, config } => commands::reset::execute(quiz, config),
        Commands::Exhibits { quiz, output } => commands::exhibits::execute(quiz, output),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
