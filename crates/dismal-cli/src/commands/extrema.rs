//! Extremum search over the swept voice's fundamental.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use dismal_core::export::export_extrema_csv;
use dismal_core::{Direction, FrequencyRange, SweepAxes};
use serde::Serialize;

use super::common::{AnalysisArgs, Progress, SweepArgs, build_calc, describe_cancel};

/// Which extrema to locate.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Kind {
    /// Consonant points (local minima)
    Minima,
    /// Dissonant points (local maxima)
    Maxima,
}

impl From<Kind> for Direction {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Minima => Direction::Minimize,
            Kind::Maxima => Direction::Maximize,
        }
    }
}

/// Locate dissonance extrema of a 2D sweep.
#[derive(Args)]
pub struct ExtremaArgs {
    #[command(flatten)]
    pub analysis: AnalysisArgs,

    #[command(flatten)]
    pub sweep: SweepArgs,

    /// Minima or maxima
    #[arg(short, long, value_enum, default_value = "minima")]
    pub kind: Kind,

    /// Restrict the search to FROM..TO Hz instead of the sweep range
    #[arg(long, value_name = "FROM,TO", value_parser = parse_bounds)]
    pub within: Option<(f64, f64)>,

    /// Write the extrema as CSV
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct ExtremumReport {
    frequency: f64,
    ratio: Option<f64>,
    dissonance: f64,
}

/// Run the extrema command.
pub fn run(args: ExtremaArgs) -> anyhow::Result<()> {
    let mut config = args.analysis.to_config()?;
    args.sweep.apply(&mut config)?;
    let mut calc = build_calc(&config)?;

    let bounds = args
        .within
        .map(|(from, to)| FrequencyRange::new(from, to))
        .transpose()?;
    let reference = reference_frequency(&calc);

    let progress = Progress::new("Searching")?;
    let result = calc.optimize_2d_with(args.kind.into(), bounds, |done, total| {
        progress.tick(done, total)
    });
    progress.finish();
    let found = result.map_err(describe_cancel)?;

    tracing::info!(found = found.len(), "search finished");

    if let Some(path) = &args.output {
        export_extrema_csv(found, path)?;
    }

    let reports: Vec<ExtremumReport> = found
        .iter()
        .map(|e| ExtremumReport {
            frequency: e.frequency,
            ratio: reference.map(|r| e.frequency / r),
            dissonance: e.dissonance,
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    let label = match args.kind {
        Kind::Minima => "Minima",
        Kind::Maxima => "Maxima",
    };
    println!("{label} ({}):", reports.len());
    println!("  {:>14}  {:>10}  {:>14}", "frequency_hz", "ratio", "dissonance");
    for report in &reports {
        let ratio = report
            .ratio
            .map_or_else(|| "-".to_string(), |r| format!("{r:.6}"));
        println!(
            "  {:>14.6}  {:>10}  {:>14.9}",
            report.frequency, ratio, report.dissonance
        );
    }
    if let Some(path) = &args.output {
        println!("Wrote {}", path.display());
    }

    Ok(())
}

/// Fundamental of the first voice that stays fixed during the search.
fn reference_frequency(calc: &dismal_core::DissonanceCalc) -> Option<f64> {
    let SweepAxes::TwoD { variable } = calc.axes() else {
        return None;
    };
    calc.distributions()
        .iter()
        .enumerate()
        .find(|(i, _)| *i != variable)
        .map(|(_, d)| d.fundamental_freq())
}

fn parse_bounds(s: &str) -> Result<(f64, f64), String> {
    let (from, to) = s
        .split_once(',')
        .ok_or_else(|| format!("Invalid bounds: '{s}' (expected FROM,TO)"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .map_err(|_| format!("Invalid frequency: '{v}'"))
    };
    Ok((parse(from)?, parse(to)?))
}
