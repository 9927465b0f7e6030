//! Dissonance curve and surface sweeps.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use dismal_core::DissonanceMap;
use dismal_core::export::{export_map_csv, write_map_csv};

use super::common::{AnalysisArgs, Progress, SweepArgs, build_calc, describe_cancel};

/// Sweep and export a dissonance map as CSV.
#[derive(Args)]
pub struct MapArgs {
    #[command(flatten)]
    pub analysis: AnalysisArgs,

    #[command(flatten)]
    pub sweep: SweepArgs,

    /// Output CSV file (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Run the map command.
pub fn run(args: MapArgs) -> anyhow::Result<()> {
    let mut config = args.analysis.to_config()?;
    args.sweep.apply(&mut config)?;
    let mut calc = build_calc(&config)?;

    let grid = calc.readiness()?;
    let axes = calc.axes();
    tracing::info!(
        dimensions = axes.dimensions(),
        steps = grid.num_steps(),
        start = grid.range().start(),
        end = grid.range().end(),
        "sweeping"
    );

    let progress = Progress::new("Sweeping")?;
    let result = calc.calculate_dissonance_map_with(|done, total| progress.tick(done, total));
    progress.finish();
    let map = result.map_err(describe_cancel)?;

    match &args.output {
        Some(path) => {
            export_map_csv(&grid, map, path)?;
            print_summary(&mut std::io::stdout(), map)?;
            println!("Wrote {}", path.display());
        }
        None => {
            write_map_csv(std::io::stdout().lock(), &grid, map)?;
            print_summary(&mut std::io::stderr(), map)?;
        }
    }

    Ok(())
}

fn print_summary(out: &mut impl Write, map: &DissonanceMap) -> std::io::Result<()> {
    writeln!(
        out,
        "{}D map, {} steps per axis",
        map.dimensions(),
        map.num_steps()
    )?;
    if let Some((low, high)) = map.bounds() {
        writeln!(out, "Dissonance range: {low:.9} .. {high:.9}")?;
    }
    Ok(())
}
