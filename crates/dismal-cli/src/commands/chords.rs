//! Batch chord evaluation.

use clap::Args;
use dismal_config::ChordConfig;
use serde::Serialize;

use super::common::{AnalysisArgs, build_calc, parse_tone};

/// Evaluate a chord table.
#[derive(Args)]
pub struct ChordsArgs {
    #[command(flatten)]
    pub analysis: AnalysisArgs,

    /// Chord as comma-separated FREQ[:AMP] tones, one per voice (repeatable)
    #[arg(long = "chord", value_parser = parse_chord)]
    pub chords: Vec<ChordConfig>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct ChordReport {
    tones: Vec<[f64; 2]>,
    dissonance: f64,
}

/// Run the chords command.
pub fn run(args: ChordsArgs) -> anyhow::Result<()> {
    let mut config = args.analysis.to_config()?;
    config.chords.extend(args.chords);
    if config.chords.is_empty() {
        anyhow::bail!("No chords. Pass --chord or add [[chords]] to a config.");
    }
    let mut calc = build_calc(&config)?;

    let results = calc.calculate_dissonances()?;
    let reports: Vec<ChordReport> = config
        .chords
        .iter()
        .zip(results)
        .map(|(chord, &dissonance)| ChordReport {
            tones: chord.tones.clone(),
            dissonance,
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    println!("Chords ({}):", reports.len());
    for (i, report) in reports.iter().enumerate() {
        let tones: Vec<String> = report
            .tones
            .iter()
            .map(|[freq, amp]| format!("{freq}:{amp}"))
            .collect();
        println!("  [{i}] {:40} {:.9}", tones.join(", "), report.dissonance);
    }

    Ok(())
}

fn parse_chord(s: &str) -> Result<ChordConfig, String> {
    let tones = s
        .split(',')
        .map(|tone| parse_tone(tone).map(|(freq, amp)| [freq, amp]))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ChordConfig { tones })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_chord_tones() {
        let chord = parse_chord("261.63, 392:0.5").unwrap();
        assert_eq!(chord.tones, vec![[261.63, 1.0], [392.0, 0.5]]);
        assert!(parse_chord("261.63,x").is_err());
    }
}
