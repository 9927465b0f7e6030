//! DisMAL CLI - command-line interface for dissonance analysis.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dismal")]
#[command(author, version, about = "DisMAL psychoacoustic dissonance analysis", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the dissonance of the configured voices
    Eval(commands::eval::EvalArgs),

    /// Sweep voice frequencies and export the dissonance curve or surface
    Map(commands::map::MapArgs),

    /// Locate consonant or dissonant frequencies of the swept voice
    Extrema(commands::extrema::ExtremaArgs),

    /// Evaluate a batch of chords
    Chords(commands::chords::ChordsArgs),

    /// List available dissonance models
    Models,

    /// List, show, and save overtone distributions
    Distributions(commands::distributions::DistributionsArgs),

    /// Create and inspect tuning systems
    Tuning(commands::tuning::TuningArgs),

    /// Show what a data file contains
    Info(commands::info::InfoArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Eval(args) => commands::eval::run(args),
        Commands::Map(args) => commands::map::run(args),
        Commands::Extrema(args) => commands::extrema::run(args),
        Commands::Chords(args) => commands::chords::run(args),
        Commands::Models => commands::models::run(),
        Commands::Distributions(args) => commands::distributions::run(args),
        Commands::Tuning(args) => commands::tuning::run(args),
        Commands::Info(args) => commands::info::run(args),
    }
}
