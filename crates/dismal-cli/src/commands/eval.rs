//! Single dissonance evaluation.

use clap::Args;
use serde::Serialize;

use super::common::{AnalysisArgs, build_calc};

/// Evaluate the voices as configured.
#[derive(Args)]
pub struct EvalArgs {
    #[command(flatten)]
    pub analysis: AnalysisArgs,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct EvalReport {
    model: String,
    dissonance: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    voices: Vec<VoiceReport>,
}

#[derive(Serialize)]
struct VoiceReport {
    name: String,
    frequency: f64,
    muted: bool,
    fundamental: f64,
    partials: Vec<f64>,
    total: f64,
}

/// Run the eval command.
pub fn run(args: EvalArgs) -> anyhow::Result<()> {
    let config = args.analysis.to_config()?;
    let mut calc = build_calc(&config)?;
    let dissonance = calc.calculate_dissonance();

    let voices = if calc.accumulate() {
        calc.distributions()
            .iter()
            .map(|d| VoiceReport {
                name: d.name().to_string(),
                frequency: d.fundamental_freq(),
                muted: d.is_muted(),
                fundamental: d.fundamental_dissonance(),
                partials: d.partials().iter().map(|p| p.dissonance()).collect(),
                total: d.total_dissonance(),
            })
            .collect()
    } else {
        Vec::new()
    };

    let report = EvalReport {
        model: calc.model().name().to_string(),
        dissonance,
        voices,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Model:      {}", report.model);
    println!("Voices:     {}", calc.num_distributions());
    println!("Dissonance: {:.9}", report.dissonance);

    if !report.voices.is_empty() {
        println!("\nAttribution:");
        for (i, voice) in report.voices.iter().enumerate() {
            let muted = if voice.muted { " (muted)" } else { "" };
            println!(
                "  [{i}] {:16} {:>10.3} Hz{muted}  total {:.9}",
                voice.name, voice.frequency, voice.total
            );
            println!("      fundamental  {:.9}", voice.fundamental);
            for (k, value) in voice.partials.iter().enumerate() {
                println!("      partial {k:<4} {value:.9}");
            }
        }
    }

    Ok(())
}
