//! Tuning system commands.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use dismal_config::{TuningSystem, load_tuning, save_tuning};

#[derive(Args)]
pub struct TuningArgs {
    #[command(subcommand)]
    command: TuningCommand,
}

#[derive(Subcommand)]
enum TuningCommand {
    /// Create an equal temperament tuning file
    Equal {
        /// Tuning system name
        name: String,

        /// Steps per repeat
        #[arg(short, long, default_value_t = 12)]
        divisions: u32,

        /// Repeat ratio (pseudo-octave)
        #[arg(short, long, default_value_t = 2.0)]
        repeat: f64,

        /// Tonic frequency in Hz
        #[arg(long, default_value_t = 261.63)]
        reference: f64,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Create a tuning file from explicit interval ratios
    Create {
        /// Tuning system name
        name: String,

        /// Interval ratios above the tonic
        #[arg(required = true)]
        intervals: Vec<f64>,

        /// Repeat ratio (pseudo-octave)
        #[arg(short, long, default_value_t = 2.0)]
        repeat: f64,

        /// Tonic frequency in Hz
        #[arg(long, default_value_t = 261.63)]
        reference: f64,

        /// Minimum ratio between notes
        #[arg(long, default_value_t = 1.0)]
        min_interval: f64,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// List the note frequencies of a tuning file between two frequencies
    Notes {
        /// Tuning file
        file: PathBuf,

        /// Lowest frequency in Hz
        #[arg(long, default_value_t = 20.0)]
        low: f64,

        /// Highest frequency in Hz
        #[arg(long, default_value_t = 20000.0)]
        high: f64,
    },
}

pub fn run(args: TuningArgs) -> anyhow::Result<()> {
    match args.command {
        TuningCommand::Equal {
            name,
            divisions,
            repeat,
            reference,
            output,
            force,
        } => {
            let mut tuning = TuningSystem::equal_temperament(name, divisions, repeat)?;
            tuning.set_reference_frequency(reference)?;
            save(&tuning, &output, force)
        }
        TuningCommand::Create {
            name,
            intervals,
            repeat,
            reference,
            min_interval,
            output,
            force,
        } => {
            let mut tuning = TuningSystem::new(name);
            tuning.set_min_interval(min_interval)?;
            for ratio in intervals {
                tuning.add_interval(ratio)?;
            }
            tuning.set_repeat_ratio(repeat)?;
            tuning.set_reference_frequency(reference)?;
            save(&tuning, &output, force)
        }
        TuningCommand::Notes { file, low, high } => notes(&file, low, high),
    }
}

fn save(tuning: &TuningSystem, output: &Path, force: bool) -> anyhow::Result<()> {
    save_tuning(tuning, output, force)?;
    println!(
        "Saved '{}' ({} notes per repeat) to {}",
        tuning.name(),
        tuning.num_notes(),
        output.display()
    );
    Ok(())
}

fn notes(file: &Path, low: f64, high: f64) -> anyhow::Result<()> {
    let tuning = load_tuning(file)?;
    let Some(freqs) = tuning.frequencies_between(low, high) else {
        anyhow::bail!(
            "Tuning system '{}' needs a reference frequency and repeat ratio",
            tuning.name()
        );
    };

    println!("Tuning: {} ({} notes per repeat)", tuning.name(), tuning.num_notes());
    for freq in freqs {
        println!("  {freq:.6}");
    }
    Ok(())
}
