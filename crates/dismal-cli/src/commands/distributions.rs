//! Overtone distribution library commands.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use dismal_config::{
    FACTORY_DISTRIBUTION_NAMES, distribution_name_from_path, ensure_user_distributions_dir,
    factory_distribution, list_all_distributions, load_distribution, paths, resolve_distribution,
    save_distribution, system_distributions_dir, user_distributions_dir,
};
use dismal_core::OvertoneDistribution;

#[derive(Args)]
pub struct DistributionsArgs {
    #[command(subcommand)]
    command: DistributionsCommand,
}

#[derive(Subcommand)]
enum DistributionsCommand {
    /// List factory and library distributions
    List {
        /// Show only factory distributions
        #[arg(long)]
        factory: bool,

        /// Show only library distributions
        #[arg(long)]
        library: bool,
    },

    /// Show the partials of a distribution
    Show {
        /// Factory name, library name, or path
        name: String,
    },

    /// Save a distribution into the library or to a file
    Save {
        /// Source: factory name, library name, or path
        source: String,

        /// Name for the saved copy (defaults to the source's name)
        #[arg(short, long)]
        name: Option<String>,

        /// Write to this path instead of the user library
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Create a distribution from FREQ_RATIO[:AMP_RATIO] partials
    Create {
        /// Distribution name
        name: String,

        /// Partials as FREQ_RATIO[:AMP_RATIO]
        #[arg(required = true, value_parser = super::common::parse_tone)]
        partials: Vec<(f64, f64)>,

        /// Minimum ratio between partials
        #[arg(long, default_value_t = 1.0)]
        min_interval: f64,

        /// Write to this path instead of the user library
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show library directories
    Paths,
}

pub fn run(args: DistributionsArgs) -> anyhow::Result<()> {
    match args.command {
        DistributionsCommand::List { factory, library } => list(factory, library),
        DistributionsCommand::Show { name } => show(&name),
        DistributionsCommand::Save {
            source,
            name,
            output,
            force,
        } => {
            let mut dist = resolve_distribution(&source, None)?;
            if let Some(name) = name {
                dist.set_name(name);
            }
            save(&dist, output, force)
        }
        DistributionsCommand::Create {
            name,
            partials,
            min_interval,
            output,
            force,
        } => {
            let dist = OvertoneDistribution::from_ratios(name, min_interval, partials)?;
            save(&dist, output, force)
        }
        DistributionsCommand::Paths => {
            println!("User library:   {}", user_distributions_dir().display());
            println!("System library: {}", system_distributions_dir().display());
            println!("Config:         {}", paths::user_config_dir().display());
            Ok(())
        }
    }
}

fn list(factory_only: bool, library_only: bool) -> anyhow::Result<()> {
    if !library_only {
        println!("Factory Distributions:");
        println!("======================");
        for name in FACTORY_DISTRIBUTION_NAMES {
            let partials = factory_distribution(name).map_or(0, |d| d.num_partials());
            println!("  {name:20} - {partials} partials");
        }
        println!();
    }

    if !factory_only {
        println!("Library Distributions:");
        println!("======================");
        let found = list_all_distributions();
        if found.is_empty() {
            println!("  (none)");
            println!();
            println!("  Add one with: dismal distributions save harmonic --name my_harmonic\n");
        }
        for path in found {
            let name = distribution_name_from_path(&path).unwrap_or_default();
            match load_distribution(&path) {
                Ok(dist) => println!("  {name:20} - {} partials", dist.num_partials()),
                Err(_) => println!("  {name:20} - (error loading)"),
            }
        }
        println!();
    }

    Ok(())
}

fn show(name: &str) -> anyhow::Result<()> {
    let dist = resolve_distribution(name, None)?;

    println!("Distribution: {}", dist.name());
    println!("{}", "=".repeat(14 + dist.name().len()));
    println!("Min interval: {}", dist.min_interval());
    println!("Partials:     {}", dist.num_partials());
    println!();
    println!("  {:>4}  {:>12}  {:>12}", "#", "freq_ratio", "amp_ratio");
    for (i, partial) in dist.partials().iter().enumerate() {
        println!("  {i:>4}  {:>12.6}  {:>12.6}", partial.freq(), partial.amp());
    }

    Ok(())
}

fn save(dist: &OvertoneDistribution, output: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let path = match output {
        Some(path) => path,
        None => ensure_user_distributions_dir()?.join(paths::distribution_file_name(dist.name())),
    };
    save_distribution(dist, &path, force)?;
    println!("Saved '{}' to {}", dist.name(), path.display());
    Ok(())
}
