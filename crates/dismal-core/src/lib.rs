//! DisMAL Core - psychoacoustic dissonance of overtone distributions
//!
//! This crate models sounds as overtone distributions and measures how rough
//! they sound together, following the spectral-interference models of
//! Sethares and Vassilakis.
//!
//! # Core Abstractions
//!
//! ## Data Model
//!
//! - [`OvertoneDistribution`] - A fundamental plus sorted, validated overtone ratios
//! - [`Partial`] - One sinusoidal component with mute flag and attributed dissonance
//!
//! ## Models
//!
//! - [`DissonanceModel`] - Object-safe trait reducing distributions to a scalar
//! - [`InterferenceModel`] - Built-in Sethares and Vassilakis roughness models
//! - [`interference_sum`] - Shared pairwise summation for interference models
//!
//! ## Preprocessing
//!
//! - [`Preprocessor`] - Object-safe in-place transform of a working copy
//! - [`HearingRange`] - Mutes partials outside the audible band
//!
//! ## Orchestration
//!
//! - [`DissonanceCalc`] - Single, chord-batch, swept and extremum evaluations
//! - [`FrequencyGrid`] - Linear or logarithmic sweep grid
//! - [`LocalSearch`] - Bound-constrained derivative-free 1-D optimizer
//! - [`ExtremumList`] - Sorted, deduplicated minima or maxima
//!
//! # Features
//!
//! - `tracing` - Emit `tracing` debug events from the calculator
//!
//! # Example
//!
//! ```rust
//! use dismal_core::{DissonanceCalc, InterferenceModel, OvertoneDistribution};
//!
//! let mut tone = OvertoneDistribution::from_ratios("tone", 1.0, [(2.0, 0.5), (3.0, 0.33)]).unwrap();
//! tone.set_fundamental(261.6, 1.0).unwrap();
//! let mut fifth = tone.clone();
//! fifth.set_fundamental_freq(392.4).unwrap();
//!
//! let mut calc = DissonanceCalc::new(InterferenceModel::Sethares);
//! calc.add_distribution(tone);
//! calc.add_distribution(fifth);
//! let consonant = calc.calculate_dissonance();
//!
//! calc.distribution_mut(1).unwrap().set_fundamental_freq(370.0).unwrap();
//! let dissonant = calc.calculate_dissonance();
//! assert!(consonant < dissonant);
//! ```

pub mod calc;
pub mod distribution;
pub mod error;
pub mod export;
pub mod extrema;
pub mod grid;
pub mod model;
pub mod optimize;
pub mod preprocess;
pub mod sweep;

pub use calc::{DEFAULT_NUM_STEPS, DissonanceCalc};
pub use distribution::{OvertoneDistribution, Partial};
pub use error::{DissonanceError, Result};
pub use extrema::{DUPLICATE_TOLERANCE, Extremum, ExtremumList};
pub use grid::{FrequencyGrid, FrequencyRange, SEED_RATIO, StepMode};
pub use model::{DissonanceModel, InterferenceModel, interference_sum};
pub use optimize::{Direction, LocalSearch, Optimum};
pub use preprocess::{DEFAULT_HEARING_HIGH, DEFAULT_HEARING_LOW, HearingRange, Preprocessor};
pub use sweep::{DissonanceMap, SweepAxes, no_progress};
