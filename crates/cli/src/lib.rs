pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use casefit_core::config::{AppConfig, LoadOptions, LogFormat};

#[derive(Debug, Parser)]
#[command(
    name = "casefit",
    about = "CaseFit operator CLI",
    long_about = "Match protective cases to gear: catalog search, pair scoring, alternative recommendations, and feedback ingestion.",
    after_help = "Examples:\n  casefit migrate\n  casefit seed\n  casefit match gear-sp404 --max-price 80\n  casefit score gear-sp404 case-utility-8\n  casefit feedback gear-sp404 case-utility-8 --rating 5 --purchased"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations")]
    Migrate,
    #[command(about = "Load the deterministic demo catalog")]
    Seed,
    #[command(about = "Find, rank, and persist compatible cases for one gear item")]
    Match(commands::match_cases::MatchArgs),
    #[command(about = "Score a single (gear, case) pair without persisting")]
    Score(commands::score::ScoreArgs),
    #[command(about = "Derive budget/premium/alternative-size recommendations around a match")]
    Alternatives(commands::alternatives::AlternativesArgs),
    #[command(about = "Submit user feedback for a match and fold it into the stored score")]
    Feedback(commands::feedback::FeedbackArgs),
    #[command(about = "Match every gear item against the case catalog")]
    Batch(commands::batch::BatchArgs),
    #[command(about = "Validate configuration and database connectivity")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

fn init_logging() {
    use tracing::Level;

    // Logging preferences come from the same config the commands use; fall
    // back to quiet defaults when the config itself does not load.
    let (level, format) = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => (
            config.logging.level.parse::<Level>().unwrap_or(Level::INFO),
            config.logging.format,
        ),
        Err(_) => (Level::WARN, LogFormat::Compact),
    };

    let builder = tracing_subscriber::fmt().with_target(false).with_max_level(level);
    let result = match format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    // A second init in the same process (tests) is fine to ignore.
    let _ = result;
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Match(args) => commands::match_cases::run(&args),
        Command::Score(args) => commands::score::run(&args),
        Command::Alternatives(args) => commands::alternatives::run(&args),
        Command::Feedback(args) => commands::feedback::run(&args),
        Command::Batch(args) => commands::batch::run(&args),
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
