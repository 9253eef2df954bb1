//! antigaspi CLI: play the food-waste quiz and render recaps.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "antigaspi", version, about = "Anti food-waste quiz and recap")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play the quiz interactively in the terminal
    Play {
        /// Path to a .json or .toml question bank
        #[arg(long)]
        bank: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Save the recap as JSON in the configured output directory
        #[arg(long)]
        save: bool,
    },

    /// Score an answer sheet and print the recap
    Score {
        /// Path to a .json or .toml question bank
        #[arg(long)]
        bank: Option<PathBuf>,

        /// Answer sheet (question id -> raw answer)
        #[arg(long)]
        answers: PathBuf,

        /// Output format: text, json, markdown, html
        #[arg(long)]
        format: Option<String>,

        /// Directory where the recap is saved
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate question bank files
    Validate {
        /// Path to a question bank file or directory
        #[arg(long)]
        bank: PathBuf,
    },

    /// Create starter config and example question bank
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("antigaspi=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Play { bank, config, save } => commands::play::execute(bank, config, save),
        Commands::Score {
            bank,
            answers,
            format,
            output,
            config,
        } => commands::score::execute(bank, answers, format, output, config),
        Commands::Validate { bank } => commands::validate::execute(bank),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
