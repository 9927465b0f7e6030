//! `.dismal.toml` files holding an overtone distribution or a tuning system.
//!
//! Every file carries a `kind` tag so a loader can tell the two apart
//! before parsing the rest. Loading rebuilds the object through its
//! validated mutators, so a hand-edited file that breaks an invariant is
//! rejected rather than loaded.
//!
//! # TOML Format
//!
//! ```toml
//! kind = "overtones"
//! name = "bell"
//! min_interval = 1.01
//!
//! [[partials]]
//! freq = 2.0
//! amp = 0.5
//!
//! [[partials]]
//! freq = 2.76
//! amp = 0.3
//! ```
//!
//! ```toml
//! kind = "tuning"
//! name = "12-TET"
//! min_interval = 1.0
//! reference_frequency = 261.63
//! repeat_ratio = 2.0
//! intervals = [1.0595, 1.1225]
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use dismal_core::OvertoneDistribution;

use crate::error::ConfigError;
use crate::tuning::TuningSystem;

/// File extension of DisMAL data files (without the leading dot).
pub const FILE_EXTENSION: &str = "dismal.toml";

/// What a data file contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    /// An overtone distribution.
    Overtones,
    /// A tuning system.
    Tuning,
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Overtones => "overtones",
            Self::Tuning => "tuning",
        })
    }
}

/// One overtone as stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PartialRecord {
    /// Frequency ratio to the fundamental.
    pub freq: f64,
    /// Amplitude ratio to the fundamental.
    pub amp: f64,
}

/// Stored form of an [`OvertoneDistribution`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OvertonesRecord {
    /// Distribution name.
    pub name: String,
    /// Minimum ratio between partials.
    #[serde(default = "default_min_interval")]
    pub min_interval: f64,
    /// Overtones, in any order.
    #[serde(default)]
    pub partials: Vec<PartialRecord>,
}

/// Stored form of a [`TuningSystem`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuningRecord {
    /// Tuning system name.
    pub name: String,
    /// Minimum ratio between notes.
    #[serde(default = "default_min_interval")]
    pub min_interval: f64,
    /// Tonic frequency in Hz.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_frequency: Option<f64>,
    /// Pseudo-octave ratio.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_ratio: Option<f64>,
    /// Interval ratios above the tonic.
    #[serde(default)]
    pub intervals: Vec<f64>,
}

fn default_min_interval() -> f64 {
    1.0
}

/// Contents of a data file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DismalFile {
    /// An overtone distribution.
    Overtones(OvertonesRecord),
    /// A tuning system.
    Tuning(TuningRecord),
}

#[derive(Deserialize)]
struct Header {
    kind: FileKind,
}

impl DismalFile {
    /// The kind of data held.
    pub fn kind(&self) -> FileKind {
        match self {
            Self::Overtones(_) => FileKind::Overtones,
            Self::Tuning(_) => FileKind::Tuning,
        }
    }

    /// Load a data file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse a data file from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Convert to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write to `path`. Without `overwrite`, an existing file is left alone.
    pub fn save(&self, path: impl AsRef<Path>, overwrite: bool) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if !overwrite && path.exists() {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()));
        }

        if let Some(parent) = path.parent()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))
    }
}

impl From<&OvertoneDistribution> for OvertonesRecord {
    fn from(dist: &OvertoneDistribution) -> Self {
        Self {
            name: dist.name().to_string(),
            min_interval: dist.min_interval(),
            partials: dist
                .partials()
                .iter()
                .map(|p| PartialRecord {
                    freq: p.freq(),
                    amp: p.amp(),
                })
                .collect(),
        }
    }
}

impl OvertonesRecord {
    /// Rebuild the distribution. The fundamental is left unset.
    pub fn build(&self) -> Result<OvertoneDistribution, ConfigError> {
        Ok(OvertoneDistribution::from_ratios(
            self.name.as_str(),
            self.min_interval,
            self.partials.iter().map(|p| (p.freq, p.amp)),
        )?)
    }
}

impl From<&TuningSystem> for TuningRecord {
    fn from(tuning: &TuningSystem) -> Self {
        Self {
            name: tuning.name().to_string(),
            min_interval: tuning.min_interval(),
            reference_frequency: tuning.reference_frequency(),
            repeat_ratio: tuning.repeat_ratio(),
            intervals: tuning.intervals().to_vec(),
        }
    }
}

impl TuningRecord {
    /// Rebuild the tuning system.
    pub fn build(&self) -> Result<TuningSystem, ConfigError> {
        let mut tuning = TuningSystem::new(self.name.as_str());
        tuning.set_min_interval(self.min_interval)?;
        for &ratio in &self.intervals {
            tuning.add_interval(ratio)?;
        }
        if let Some(freq) = self.reference_frequency {
            tuning.set_reference_frequency(freq)?;
        }
        if let Some(ratio) = self.repeat_ratio {
            tuning.set_repeat_ratio(ratio)?;
        }
        Ok(tuning)
    }
}

/// Report which kind of data a file holds without parsing the rest of it.
pub fn data_type_of_file(path: impl AsRef<Path>) -> Result<FileKind, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
    let header: Header = toml::from_str(&content)?;
    Ok(header.kind)
}

/// Save a distribution's overtones. A distribution without partials is
/// refused.
pub fn save_distribution(
    dist: &OvertoneDistribution,
    path: impl AsRef<Path>,
    overwrite: bool,
) -> Result<(), ConfigError> {
    if dist.num_partials() == 0 {
        return Err(ConfigError::Empty(format!("distribution '{}'", dist.name())));
    }
    DismalFile::Overtones(dist.into()).save(path, overwrite)
}

/// Load a distribution. The fundamental is left unset.
pub fn load_distribution(path: impl AsRef<Path>) -> Result<OvertoneDistribution, ConfigError> {
    match DismalFile::load(path)? {
        DismalFile::Overtones(record) => record.build(),
        other => Err(ConfigError::WrongKind {
            expected: FileKind::Overtones,
            found: other.kind(),
        }),
    }
}

/// Save a tuning system. It must have intervals, a reference frequency and
/// a repeat ratio.
pub fn save_tuning(
    tuning: &TuningSystem,
    path: impl AsRef<Path>,
    overwrite: bool,
) -> Result<(), ConfigError> {
    if tuning.intervals().is_empty() {
        return Err(ConfigError::Empty(format!("tuning system '{}'", tuning.name())));
    }
    let missing = if tuning.reference_frequency().is_none() {
        Some("reference frequency")
    } else if tuning.repeat_ratio().is_none() {
        Some("repeat ratio")
    } else {
        None
    };
    if let Some(missing) = missing {
        return Err(ConfigError::Incomplete {
            name: tuning.name().to_string(),
            missing,
        });
    }
    DismalFile::Tuning(tuning.into()).save(path, overwrite)
}

/// Load a tuning system.
pub fn load_tuning(path: impl AsRef<Path>) -> Result<TuningSystem, ConfigError> {
    match DismalFile::load(path)? {
        DismalFile::Tuning(record) => record.build(),
        other => Err(ConfigError::WrongKind {
            expected: FileKind::Tuning,
            found: other.kind(),
        }),
    }
}
