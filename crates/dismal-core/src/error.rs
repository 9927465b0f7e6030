//! Error types for dissonance calculations.

use thiserror::Error;

/// Errors raised by validated mutators and calculation entry points.
///
/// Every operation that returns one of these leaves the receiver unchanged.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DissonanceError {
    /// A frequency or frequency ratio was zero, negative, or not finite.
    #[error("frequency must be positive and finite, got {0}")]
    InvalidFrequency(f64),

    /// An amplitude or amplitude ratio was zero, negative, or not finite.
    #[error("amplitude must be positive and finite, got {0}")]
    InvalidAmplitude(f64),

    /// The ratio is already taken by another partial (or by the tonic, ratio 1).
    #[error("distribution already contains a partial with ratio {0}")]
    DuplicateRatio(f64),

    /// The ratio falls inside the exclusion band of the tonic or another partial.
    #[error("ratio {ratio} lies within the minimum interval {min_interval} of an existing ratio")]
    RatioTooClose {
        /// The rejected ratio.
        ratio: f64,
        /// The distribution's minimum interval.
        min_interval: f64,
    },

    /// A minimum interval below 1, or one the existing partials would violate.
    #[error("invalid minimum interval {0}")]
    InvalidMinInterval(f64),

    /// Partial index past the end of the distribution.
    #[error("partial index {index} out of bounds ({len} partials)")]
    PartialOutOfBounds {
        /// Requested index.
        index: usize,
        /// Number of partials.
        len: usize,
    },

    /// Distribution index past the end of the calculator's distributions.
    #[error("distribution index {index} out of bounds ({len} distributions)")]
    DistributionOutOfBounds {
        /// Requested index.
        index: usize,
        /// Number of distributions.
        len: usize,
    },

    /// Preprocessor index past the end of the chain.
    #[error("preprocessor index {index} out of bounds ({len} preprocessors)")]
    PreprocessorOutOfBounds {
        /// Requested index.
        index: usize,
        /// Number of preprocessors.
        len: usize,
    },

    /// Frequency range with a non-positive start or `end <= start`.
    #[error("invalid frequency range [{start}, {end}]")]
    InvalidRange {
        /// Range start in Hz.
        start: f64,
        /// Range end in Hz.
        end: f64,
    },

    /// Dissonance maps need at least two steps.
    #[error("step count must be greater than 1, got {0}")]
    InvalidStepCount(usize),

    /// Both axes of a 3D map name the same distribution.
    #[error("x and y axes both use distribution {0}")]
    SharedAxis(usize),

    /// Chord index past the end of the chord table.
    #[error("chord index {index} out of bounds ({len} chords)")]
    ChordOutOfBounds {
        /// Requested index.
        index: usize,
        /// Number of chords.
        len: usize,
    },

    /// A chord row lacks a frequency or amplitude for one of the distributions.
    #[error("chord {chord} has no complete entry for distribution {distribution}")]
    IncompleteChord {
        /// Chord index.
        chord: usize,
        /// Distribution index.
        distribution: usize,
    },

    /// The calculator lacks the configuration a sweep or search needs.
    #[error("calculator is not ready: {0}")]
    NotReady(&'static str),

    /// A progress callback asked the calculation to stop.
    #[error("calculation cancelled after {completed} of {total} steps")]
    Cancelled {
        /// Steps finished before cancellation.
        completed: usize,
        /// Steps the calculation would have run.
        total: usize,
    },

    /// Model name not recognized.
    #[error("unknown dissonance model: {0}")]
    UnknownModel(String),
}

/// Result type for dissonance operations.
pub type Result<T> = core::result::Result<T, DissonanceError>;

/// Validate a frequency (or frequency ratio).
pub(crate) fn check_frequency(freq: f64) -> Result<()> {
    if freq.is_finite() && freq > 0.0 {
        Ok(())
    } else {
        Err(DissonanceError::InvalidFrequency(freq))
    }
}

/// Validate an amplitude (or amplitude ratio).
pub(crate) fn check_amplitude(amp: f64) -> Result<()> {
    if amp.is_finite() && amp > 0.0 {
        Ok(())
    } else {
        Err(DissonanceError::InvalidAmplitude(amp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequency_check_rejects_non_positive() {
        assert!(check_frequency(440.0).is_ok());
        assert_eq!(
            check_frequency(0.0),
            Err(DissonanceError::InvalidFrequency(0.0))
        );
        assert!(check_frequency(-1.0).is_err());
        assert!(check_frequency(f64::NAN).is_err());
        assert!(check_frequency(f64::INFINITY).is_err());
    }

    #[test]
    fn amplitude_check_rejects_non_positive() {
        assert!(check_amplitude(0.5).is_ok());
        assert_eq!(
            check_amplitude(-0.5),
            Err(DissonanceError::InvalidAmplitude(-0.5))
        );
    }

    #[test]
    fn too_close_display() {
        let err = DissonanceError::RatioTooClose {
            ratio: 2.01,
            min_interval: 1.05,
        };
        assert_eq!(
            err.to_string(),
            "ratio 2.01 lies within the minimum interval 1.05 of an existing ratio"
        );
    }

    #[test]
    fn cancelled_display() {
        let err = DissonanceError::Cancelled {
            completed: 3,
            total: 10,
        };
        assert_eq!(err.to_string(), "calculation cancelled after 3 of 10 steps");
    }
}
