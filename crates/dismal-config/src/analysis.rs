//! Analysis configuration files: everything needed to set up a
//! [`DissonanceCalc`] from TOML.
//!
//! # TOML Format
//!
//! ```toml
//! model = "sethares"
//! accumulate = true
//!
//! [hearing_range]
//! enabled = true
//! low = 20.0
//! high = 20000.0
//!
//! [sweep]
//! start = 261.63
//! end = 523.25
//! steps = 1000
//! logarithmic = false
//! dimensions = 2
//! variable = 1
//!
//! [[voices]]
//! distribution = "harmonic"
//! frequency = 261.63
//!
//! [[voices]]
//! distribution = "bell.dismal.toml"
//! frequency = 261.63
//! amplitude = 0.8
//!
//! [[chords]]
//! tones = [[261.63, 1.0], [392.0, 1.0]]
//! ```
//!
//! Voice distributions name a factory distribution, a file path (relative
//! paths resolve against the configuration file's directory), or an entry
//! in the distribution library.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use dismal_core::{
    DEFAULT_HEARING_HIGH, DEFAULT_HEARING_LOW, DEFAULT_NUM_STEPS, DissonanceCalc,
    HearingRange, InterferenceModel, OvertoneDistribution, StepMode, SweepAxes,
};

use crate::error::ConfigError;
use crate::factory::factory_distribution;
use crate::file::load_distribution;
use crate::paths::find_distribution;

/// A complete analysis setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Model identifier (`"sethares"` or `"vassilakis"`).
    #[serde(default = "default_model")]
    pub model: String,

    /// Attribute dissonance to individual partials.
    #[serde(default)]
    pub accumulate: bool,

    /// Hearing range preprocessor.
    #[serde(default)]
    pub hearing_range: HearingRangeConfig,

    /// Sweep settings. Without them only single and chord evaluations run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sweep: Option<SweepConfig>,

    /// Distributions under analysis, in calculator order.
    #[serde(default)]
    pub voices: Vec<VoiceConfig>,

    /// Chord table for batch evaluation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chords: Vec<ChordConfig>,

    /// Directory relative distribution paths resolve against.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

fn default_model() -> String {
    InterferenceModel::default().id().to_string()
}

/// `[hearing_range]` table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HearingRangeConfig {
    /// Run the hearing range preprocessor.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Lower edge in Hz.
    #[serde(default = "default_hearing_low")]
    pub low: f64,
    /// Upper edge in Hz.
    #[serde(default = "default_hearing_high")]
    pub high: f64,
}

impl Default for HearingRangeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            low: DEFAULT_HEARING_LOW,
            high: DEFAULT_HEARING_HIGH,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_hearing_low() -> f64 {
    DEFAULT_HEARING_LOW
}

fn default_hearing_high() -> f64 {
    DEFAULT_HEARING_HIGH
}

/// `[sweep]` table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// First swept frequency in Hz.
    pub start: f64,
    /// Last swept frequency in Hz.
    pub end: f64,
    /// Grid points per axis.
    #[serde(default = "default_steps")]
    pub steps: usize,
    /// Logarithmic rather than linear spacing.
    #[serde(default)]
    pub logarithmic: bool,
    /// 2 for a curve, 3 for a surface.
    #[serde(default = "default_dimensions")]
    pub dimensions: u8,
    /// Swept voice of a 2D sweep.
    #[serde(default = "default_variable")]
    pub variable: usize,
    /// Row-axis voice of a 3D sweep.
    #[serde(default)]
    pub x: usize,
    /// Column-axis voice of a 3D sweep.
    #[serde(default = "default_variable")]
    pub y: usize,
}

fn default_steps() -> usize {
    DEFAULT_NUM_STEPS
}

fn default_dimensions() -> u8 {
    2
}

fn default_variable() -> usize {
    1
}

impl SweepConfig {
    /// A linear 2D sweep of voice 1.
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            steps: DEFAULT_NUM_STEPS,
            logarithmic: false,
            dimensions: 2,
            variable: 1,
            x: 0,
            y: 1,
        }
    }

    /// The configured axes.
    pub fn axes(&self) -> Result<SweepAxes, ConfigError> {
        match self.dimensions {
            2 => Ok(SweepAxes::TwoD {
                variable: self.variable,
            }),
            3 => Ok(SweepAxes::ThreeD {
                x: self.x,
                y: self.y,
            }),
            other => Err(ConfigError::InvalidDimensions(other)),
        }
    }

    /// The configured step mode.
    pub fn step_mode(&self) -> StepMode {
        if self.logarithmic {
            StepMode::Logarithmic
        } else {
            StepMode::Linear
        }
    }

    fn apply(&self, calc: &mut DissonanceCalc) -> Result<(), ConfigError> {
        calc.set_range(self.start, self.end)?;
        calc.set_num_steps(self.steps)?;
        calc.set_step_mode(self.step_mode());
        calc.set_axes(self.axes()?)?;
        Ok(())
    }
}

/// One `[[voices]]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceConfig {
    /// Factory name, file path, or library name.
    pub distribution: String,
    /// Fundamental frequency in Hz.
    pub frequency: f64,
    /// Fundamental amplitude.
    #[serde(default = "default_amplitude")]
    pub amplitude: f64,
    /// Exclude the whole voice from evaluation.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub muted: bool,
}

fn default_amplitude() -> f64 {
    1.0
}

impl VoiceConfig {
    /// An audible voice at full amplitude.
    pub fn new(distribution: impl Into<String>, frequency: f64) -> Self {
        Self {
            distribution: distribution.into(),
            frequency,
            amplitude: 1.0,
            muted: false,
        }
    }
}

/// One `[[chords]]` entry: `[frequency, amplitude]` per voice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordConfig {
    /// Fundamentals, in voice order.
    pub tones: Vec<[f64; 2]>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            accumulate: false,
            hearing_range: HearingRangeConfig::default(),
            sweep: None,
            voices: Vec::new(),
            chords: Vec::new(),
            base_dir: None,
        }
    }
}

impl AnalysisConfig {
    /// Load a configuration file. Relative distribution paths resolve
    /// against its directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let mut config = Self::from_toml(&content)?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the configuration to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// The configured model.
    pub fn interference_model(&self) -> Result<InterferenceModel, ConfigError> {
        Ok(self.model.parse::<InterferenceModel>()?)
    }

    /// Build a calculator with every voice, preprocessor, sweep setting and
    /// chord applied.
    pub fn build(&self) -> Result<DissonanceCalc, ConfigError> {
        let mut calc = DissonanceCalc::new(self.interference_model()?);
        calc.set_accumulate(self.accumulate);

        if self.hearing_range.enabled {
            calc.add_preprocessor(HearingRange::new(
                self.hearing_range.low,
                self.hearing_range.high,
            )?);
        }

        for voice in &self.voices {
            let mut dist = resolve_distribution(&voice.distribution, self.base_dir.as_deref())?;
            dist.set_fundamental(voice.frequency, voice.amplitude)?;
            dist.mute(voice.muted);
            calc.add_distribution(dist);
        }

        // Axes are checked against the voices, so they go in first.
        if let Some(sweep) = &self.sweep {
            sweep.apply(&mut calc)?;
        }

        for chord in &self.chords {
            let tones: Vec<(f64, f64)> = chord.tones.iter().map(|&[f, a]| (f, a)).collect();
            calc.add_chord(&tones)?;
        }

        Ok(calc)
    }
}

/// Resolve a distribution reference.
///
/// Tries, in order: a factory name, a file path (relative to `base_dir`
/// when given), then the distribution library.
pub fn resolve_distribution(
    reference: &str,
    base_dir: Option<&Path>,
) -> Result<OvertoneDistribution, ConfigError> {
    if let Some(dist) = factory_distribution(reference) {
        return Ok(dist);
    }

    let path = Path::new(reference);
    if let Some(base) = base_dir
        && path.is_relative()
    {
        let joined = base.join(path);
        if joined.is_file() {
            return load_distribution(joined);
        }
    }

    match find_distribution(reference) {
        Some(found) => load_distribution(found),
        None => Err(ConfigError::NotFound(reference.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dismal_core::DissonanceError;

    const TWO_VOICES: &str = r#"
[[voices]]
distribution = "harmonic"
frequency = 261.63

[[voices]]
distribution = "sine"
frequency = 392.0
amplitude = 0.5
muted = true
"#;

    #[test]
    fn defaults() {
        let config = AnalysisConfig::from_toml("").unwrap();
        assert_eq!(config, AnalysisConfig::default());
        assert_eq!(config.model, "sethares");
        assert!(config.hearing_range.enabled);
        assert_eq!(config.hearing_range.high, 20000.0);
    }

    #[test]
    fn voices_build_in_order() {
        let config = AnalysisConfig::from_toml(TWO_VOICES).unwrap();
        let calc = config.build().unwrap();

        assert_eq!(calc.num_distributions(), 2);
        assert_eq!(calc.num_preprocessors(), 1);
        assert_eq!(calc.preprocessor_name(0), Some("Hearing Range"));

        let second = calc.distribution(1).unwrap();
        assert_eq!(second.name(), "sine");
        assert_eq!(second.fundamental_amp(), 0.5);
        assert!(second.is_muted());
    }

    #[test]
    fn sweep_defaults_to_2d_voice_one() {
        let toml = format!("{TWO_VOICES}\n[sweep]\nstart = 300.0\nend = 400.0\n");
        let calc = AnalysisConfig::from_toml(&toml).unwrap().build().unwrap();
        assert_eq!(calc.axes(), SweepAxes::TwoD { variable: 1 });
        assert_eq!(calc.num_steps(), DEFAULT_NUM_STEPS);
        assert_eq!(calc.step_mode(), StepMode::Linear);
        assert!(calc.is_ready_to_process());
    }

    #[test]
    fn three_d_sweep() {
        let mut config = AnalysisConfig::from_toml(TWO_VOICES).unwrap();
        let mut sweep = SweepConfig::new(200.0, 300.0);
        sweep.dimensions = 3;
        sweep.logarithmic = true;
        config.sweep = Some(sweep);

        let calc = config.build().unwrap();
        assert_eq!(calc.axes(), SweepAxes::ThreeD { x: 0, y: 1 });
        assert_eq!(calc.step_mode(), StepMode::Logarithmic);
    }

    #[test]
    fn bad_dimensions() {
        let mut config = AnalysisConfig::from_toml(TWO_VOICES).unwrap();
        let mut sweep = SweepConfig::new(200.0, 300.0);
        sweep.dimensions = 4;
        config.sweep = Some(sweep);
        assert!(matches!(config.build(), Err(ConfigError::InvalidDimensions(4))));
    }

    #[test]
    fn axis_past_last_voice() {
        let mut config = AnalysisConfig::from_toml(TWO_VOICES).unwrap();
        let mut sweep = SweepConfig::new(200.0, 300.0);
        sweep.variable = 2;
        config.sweep = Some(sweep);
        assert!(matches!(
            config.build(),
            Err(ConfigError::Dissonance(DissonanceError::DistributionOutOfBounds { .. }))
        ));
    }

    #[test]
    fn unknown_model() {
        let config = AnalysisConfig::from_toml("model = \"helmholtz\"").unwrap();
        assert!(matches!(
            config.build(),
            Err(ConfigError::Dissonance(DissonanceError::UnknownModel(_)))
        ));
    }

    #[test]
    fn disabled_hearing_range_adds_nothing() {
        let toml = format!("model = \"vassilakis\"\n[hearing_range]\nenabled = false\n{TWO_VOICES}");
        let calc = AnalysisConfig::from_toml(&toml).unwrap().build().unwrap();
        assert_eq!(calc.num_preprocessors(), 0);
        assert_eq!(calc.model().name(), "Vassilakis");
    }

    #[test]
    fn chords_are_loaded() {
        let toml = format!("{TWO_VOICES}\n[[chords]]\ntones = [[261.63, 1.0], [330.0, 0.7]]\n");
        let calc = AnalysisConfig::from_toml(&toml).unwrap().build().unwrap();
        assert_eq!(calc.num_chords(), 1);
        assert_eq!(calc.freq_in_chord(0, 1), Some(330.0));
        assert_eq!(calc.amp_in_chord(0, 1), Some(0.7));
    }

    #[test]
    fn invalid_fundamental_is_rejected() {
        let mut config = AnalysisConfig::default();
        config.voices.push(VoiceConfig::new("harmonic", -5.0));
        assert!(matches!(
            config.build(),
            Err(ConfigError::Dissonance(DissonanceError::InvalidFrequency(_)))
        ));
    }

    #[test]
    fn unresolvable_distribution() {
        let err = resolve_distribution("nonexistent_distribution_12345", None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn toml_roundtrip_keeps_settings() {
        let mut config = AnalysisConfig::from_toml(TWO_VOICES).unwrap();
        config.sweep = Some(SweepConfig::new(100.0, 200.0));
        config.chords.push(ChordConfig {
            tones: vec![[100.0, 1.0], [150.0, 1.0]],
        });
        let reparsed = AnalysisConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(reparsed, config);
    }
}
