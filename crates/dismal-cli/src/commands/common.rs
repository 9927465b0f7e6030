//! Shared CLI helpers used across multiple commands.

use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Args;
use dismal_config::{AnalysisConfig, SweepConfig, VoiceConfig};
use dismal_core::{DissonanceCalc, DissonanceError};
use indicatif::{ProgressBar, ProgressStyle};

/// Voice and model selection shared by every analysis command.
#[derive(Args, Debug, Clone)]
pub struct AnalysisArgs {
    /// Analysis configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Voice as DISTRIBUTION@FREQ[:AMP] (repeatable, added after config voices)
    #[arg(short, long = "voice", value_parser = parse_voice)]
    pub voices: Vec<VoiceConfig>,

    /// Dissonance model (sethares, vassilakis)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Attribute dissonance to individual partials
    #[arg(long)]
    pub accumulate: bool,

    /// Disable the hearing range preprocessor
    #[arg(long)]
    pub no_hearing_range: bool,
}

impl AnalysisArgs {
    /// The config file (or defaults) with command-line overrides applied.
    pub fn to_config(&self) -> anyhow::Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::load(path)?,
            None => AnalysisConfig::default(),
        };
        if let Some(model) = &self.model {
            config.model.clone_from(model);
        }
        if self.accumulate {
            config.accumulate = true;
        }
        if self.no_hearing_range {
            config.hearing_range.enabled = false;
        }
        config.voices.extend(self.voices.iter().cloned());
        Ok(config)
    }
}

/// Sweep overrides shared by `map` and `extrema`.
#[derive(Args, Debug, Clone)]
pub struct SweepArgs {
    /// First swept frequency in Hz
    #[arg(long)]
    pub start: Option<f64>,

    /// Last swept frequency in Hz
    #[arg(long)]
    pub end: Option<f64>,

    /// Grid points per axis
    #[arg(long)]
    pub steps: Option<usize>,

    /// Logarithmic step spacing
    #[arg(long)]
    pub log: bool,

    /// Voice swept by a 2D sweep
    #[arg(long)]
    pub variable: Option<usize>,

    /// Sweep two voices into a surface, as X,Y voice indices
    #[arg(long, value_name = "X,Y", value_parser = parse_axes)]
    pub surface: Option<(usize, usize)>,
}

impl SweepArgs {
    /// Merge these overrides into the config's `[sweep]` table.
    pub fn apply(&self, config: &mut AnalysisConfig) -> anyhow::Result<()> {
        let base = config
            .sweep
            .or_else(|| Some(SweepConfig::new(self.start?, self.end?)));
        let Some(mut sweep) = base else {
            anyhow::bail!("No sweep range. Pass --start and --end or add a [sweep] table.");
        };

        if let Some(start) = self.start {
            sweep.start = start;
        }
        if let Some(end) = self.end {
            sweep.end = end;
        }
        if let Some(steps) = self.steps {
            sweep.steps = steps;
        }
        if self.log {
            sweep.logarithmic = true;
        }
        if let Some(variable) = self.variable {
            sweep.dimensions = 2;
            sweep.variable = variable;
        }
        if let Some((x, y)) = self.surface {
            sweep.dimensions = 3;
            sweep.x = x;
            sweep.y = y;
        }
        config.sweep = Some(sweep);
        Ok(())
    }
}

/// Build the calculator, logging what was configured.
pub fn build_calc(config: &AnalysisConfig) -> anyhow::Result<DissonanceCalc> {
    let calc = config.build()?;
    if calc.num_distributions() == 0 {
        anyhow::bail!("No voices. Pass --voice DISTRIBUTION@FREQ or add [[voices]] to a config.");
    }
    tracing::info!(
        model = calc.model().name(),
        voices = calc.num_distributions(),
        preprocessors = calc.num_preprocessors(),
        "calculator ready"
    );
    Ok(calc)
}

/// Parse `DISTRIBUTION@FREQ[:AMP]` for clap's `value_parser`.
pub fn parse_voice(s: &str) -> Result<VoiceConfig, String> {
    let (distribution, tone) = s
        .rsplit_once('@')
        .ok_or_else(|| format!("Invalid voice: '{s}' (expected DISTRIBUTION@FREQ[:AMP])"))?;
    if distribution.is_empty() {
        return Err(format!("Invalid voice: '{s}' (missing distribution)"));
    }
    let (freq, amp) = parse_tone(tone)?;
    let mut voice = VoiceConfig::new(distribution, freq);
    voice.amplitude = amp;
    Ok(voice)
}

/// Parse `FREQ[:AMP]`; the amplitude defaults to 1.
pub fn parse_tone(s: &str) -> Result<(f64, f64), String> {
    let (freq, amp) = match s.split_once(':') {
        Some((freq, amp)) => (freq, Some(amp)),
        None => (s, None),
    };
    let freq: f64 = freq
        .trim()
        .parse()
        .map_err(|_| format!("Invalid frequency: '{freq}'"))?;
    let amp: f64 = match amp {
        Some(amp) => amp
            .trim()
            .parse()
            .map_err(|_| format!("Invalid amplitude: '{amp}'"))?,
        None => 1.0,
    };
    Ok((freq, amp))
}

fn parse_axes(s: &str) -> Result<(usize, usize), String> {
    let parse = |v: &str| {
        v.trim()
            .parse::<usize>()
            .map_err(|_| format!("Invalid voice index: '{v}'"))
    };
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("Invalid axes: '{s}' (expected X,Y)"))?;
    Ok((parse(x)?, parse(y)?))
}

/// Progress bar plus Ctrl+C flag, driven through the calculator's
/// progress callbacks.
pub struct Progress {
    bar: ProgressBar,
    cancelled: Arc<AtomicBool>,
}

impl Progress {
    /// Install the Ctrl+C handler and create a bar labelled `label`.
    pub fn new(label: &str) -> anyhow::Result<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
                .progress_chars("##-"),
        );
        bar.set_message(label.to_string());

        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        ctrlc::set_handler(move || {
            flag.store(true, Ordering::SeqCst);
        })?;

        Ok(Self { bar, cancelled })
    }

    /// Progress callback; breaks once Ctrl+C was pressed.
    pub fn tick(&self, done: usize, total: usize) -> ControlFlow<()> {
        self.bar.set_length(total as u64);
        self.bar.set_position(done as u64);
        if self.cancelled.load(Ordering::SeqCst) {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }

    /// Remove the bar.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Turn a cancelled run into a readable error.
pub fn describe_cancel(err: DissonanceError) -> anyhow::Error {
    match err {
        DissonanceError::Cancelled { completed, total } => {
            anyhow::anyhow!("Interrupted after {completed} of {total} evaluations")
        }
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_voice_with_amplitude() {
        let voice = parse_voice("harmonic@261.63:0.5").unwrap();
        assert_eq!(voice.distribution, "harmonic");
        assert_eq!(voice.frequency, 261.63);
        assert_eq!(voice.amplitude, 0.5);
    }

    #[test]
    fn parse_voice_path_with_at_sign() {
        let voice = parse_voice("lib/a@b.dismal.toml@440").unwrap();
        assert_eq!(voice.distribution, "lib/a@b.dismal.toml");
        assert_eq!(voice.amplitude, 1.0);
    }

    #[test]
    fn parse_voice_rejects_garbage() {
        assert!(parse_voice("harmonic").is_err());
        assert!(parse_voice("@440").is_err());
        assert!(parse_voice("harmonic@abc").is_err());
        assert!(parse_voice("harmonic@440:loud").is_err());
    }

    #[test]
    fn parse_axes_pair() {
        assert_eq!(parse_axes("0, 2"), Ok((0, 2)));
        assert!(parse_axes("0").is_err());
    }

    #[test]
    fn sweep_args_need_a_range() {
        let args = SweepArgs {
            start: Some(200.0),
            end: None,
            steps: None,
            log: false,
            variable: None,
            surface: None,
        };
        let mut config = AnalysisConfig::default();
        assert!(args.apply(&mut config).is_err());

        let args = SweepArgs {
            end: Some(400.0),
            surface: Some((0, 1)),
            ..args
        };
        args.apply(&mut config).unwrap();
        let sweep = config.sweep.unwrap();
        assert_eq!((sweep.start, sweep.end, sweep.dimensions), (200.0, 400.0, 3));
    }
}
