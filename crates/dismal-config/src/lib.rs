//! Persistence and configuration for DisMAL.
//!
//! # Features
//!
//! - **Data files**: Save and load overtone distributions and tuning systems as `.dismal.toml`
//! - **Tuning systems**: Interval scales with reference frequency and repeat ratio
//! - **Analysis configs**: Describe voices, sweeps and chords in TOML and build a calculator
//! - **Factory distributions**: Built-in harmonic, odd harmonic, stretched and sine spectra
//! - **Paths**: Platform-specific distribution library and config directories
//!
//! # Example
//!
//! ```rust,no_run
//! use dismal_config::{AnalysisConfig, factory_distribution, save_distribution, user_distributions_dir};
//!
//! // Build a calculator from a config file
//! let mut calc = AnalysisConfig::load("fifths.toml").unwrap().build().unwrap();
//! let dissonance = calc.calculate_dissonance();
//!
//! // Copy a factory distribution into the user library
//! let harmonic = factory_distribution("harmonic").unwrap();
//! let path = user_distributions_dir().join("my_harmonic.dismal.toml");
//! save_distribution(&harmonic, &path, false).unwrap();
//! ```

mod analysis;
mod error;
mod file;
mod tuning;

/// Platform-specific paths for the distribution library and configuration.
pub mod paths;

/// Factory distributions bundled with the library.
pub mod factory;

pub use analysis::{
    AnalysisConfig, ChordConfig, HearingRangeConfig, SweepConfig, VoiceConfig,
    resolve_distribution,
};
pub use error::ConfigError;
pub use factory::{
    FACTORY_DISTRIBUTION_NAMES, factory_distribution, factory_distributions,
    is_factory_distribution,
};
pub use file::{
    DismalFile, FILE_EXTENSION, FileKind, OvertonesRecord, PartialRecord, TuningRecord,
    data_type_of_file, load_distribution, load_tuning, save_distribution, save_tuning,
};
pub use paths::{
    distribution_name_from_path, ensure_user_distributions_dir, find_distribution,
    list_all_distributions, list_user_distributions, system_distributions_dir,
    user_config_dir, user_distributions_dir,
};
pub use tuning::{TuningError, TuningSystem};
