//! Display the contents of a data file.

use clap::Args;
use dismal_config::DismalFile;

/// Display data file information.
#[derive(Args)]
pub struct InfoArgs {
    /// Path to a .dismal.toml file
    pub file: std::path::PathBuf,
}

/// Run the info command.
pub fn run(args: InfoArgs) -> anyhow::Result<()> {
    let file = DismalFile::load(&args.file)?;

    println!("File:         {}", args.file.display());
    println!("Kind:         {}", file.kind());

    match &file {
        DismalFile::Overtones(record) => {
            let dist = record.build()?;
            println!("Name:         {}", dist.name());
            println!("Partials:     {}", dist.num_partials());
            println!("Min interval: {}", dist.min_interval());
        }
        DismalFile::Tuning(record) => {
            let tuning = record.build()?;
            println!("Name:         {}", tuning.name());
            println!("Notes:        {}", tuning.num_notes());
            println!("Min interval: {}", tuning.min_interval());
            println!("Reference:    {}", format_optional(tuning.reference_frequency(), "Hz"));
            println!("Repeat ratio: {}", format_optional(tuning.repeat_ratio(), ""));
        }
    }

    Ok(())
}

fn format_optional(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) if unit.is_empty() => format!("{v}"),
        Some(v) => format!("{v} {unit}"),
        None => "(unset)".to_string(),
    }
}
