//! Tuning systems: a scale of tonic-relative interval ratios that repeats
//! every pseudo-octave from a reference frequency.
//!
//! The reference frequency and repeat ratio are optional. A tuning system
//! that lacks either is still a valid scale, but cannot be expanded into
//! real frequencies or saved to a file.
//!
//! # Example
//!
//! ```rust
//! use dismal_config::TuningSystem;
//!
//! let mut just = TuningSystem::new("just major");
//! for ratio in [9.0 / 8.0, 5.0 / 4.0, 4.0 / 3.0, 3.0 / 2.0, 5.0 / 3.0, 15.0 / 8.0] {
//!     just.add_interval(ratio).unwrap();
//! }
//! just.set_repeat_ratio(2.0).unwrap();
//! just.set_reference_frequency(261.63).unwrap();
//!
//! assert_eq!(just.num_notes(), 7);
//! let notes = just.frequencies_between(261.63, 523.26).unwrap();
//! assert_eq!(notes.len(), 8);
//! ```

use thiserror::Error;

/// Errors from tuning system mutators. Every failure leaves the system unchanged.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TuningError {
    /// Interval ratios must lie above the tonic.
    #[error("interval ratio must be greater than 1 and finite, got {0}")]
    NotAboveTonic(f64),

    /// The ratio is already in the scale.
    #[error("tuning system already contains ratio {0}")]
    Duplicate(f64),

    /// The ratio violates the minimum interval against the tonic, another
    /// interval, or the repeat ratio.
    #[error("ratio {ratio} lies within the minimum interval {min_interval} of another note")]
    TooClose {
        /// The rejected ratio.
        ratio: f64,
        /// The tuning system's minimum interval.
        min_interval: f64,
    },

    /// Intervals must stay below the repeat ratio.
    #[error("ratio {ratio} is not below the repeat ratio {repeat_ratio}")]
    BeyondRepeat {
        /// The rejected ratio.
        ratio: f64,
        /// The configured repeat ratio.
        repeat_ratio: f64,
    },

    /// The repeat ratio must exceed every interval.
    #[error("repeat ratio {repeat_ratio} does not exceed the largest interval {largest}")]
    RepeatTooSmall {
        /// The rejected repeat ratio.
        repeat_ratio: f64,
        /// The largest interval in the scale.
        largest: f64,
    },

    /// A minimum interval below 1, or one the existing notes would violate.
    #[error("invalid minimum interval {0}")]
    InvalidMinInterval(f64),

    /// Reference frequencies must be positive and finite.
    #[error("reference frequency must be positive and finite, got {0}")]
    InvalidReferenceFrequency(f64),

    /// Interval index past the end of the scale.
    #[error("interval index {index} out of bounds ({len} intervals)")]
    OutOfBounds {
        /// Requested index.
        index: usize,
        /// Number of intervals.
        len: usize,
    },
}

/// A scale of interval ratios with optional reference frequency and repeat ratio.
#[derive(Debug, Clone, PartialEq)]
pub struct TuningSystem {
    name: String,
    intervals: Vec<f64>,
    reference_frequency: Option<f64>,
    repeat_ratio: Option<f64>,
    min_interval: f64,
}

impl Default for TuningSystem {
    fn default() -> Self {
        Self::new("untitled")
    }
}

impl TuningSystem {
    /// An empty scale with no reference frequency, repeat ratio, or minimum interval.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            intervals: Vec::new(),
            reference_frequency: None,
            repeat_ratio: None,
            min_interval: 1.0,
        }
    }

    /// An equal temperament of `divisions` steps per `repeat_ratio`.
    pub fn equal_temperament(
        name: impl Into<String>,
        divisions: u32,
        repeat_ratio: f64,
    ) -> Result<Self, TuningError> {
        let mut tuning = Self::new(name);
        let step = repeat_ratio.powf(1.0 / f64::from(divisions.max(1)));
        for k in 1..divisions {
            tuning.add_interval(step.powf(f64::from(k)))?;
        }
        tuning.set_repeat_ratio(repeat_ratio)?;
        Ok(tuning)
    }

    /// The system's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the system.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Notes per repeat, tonic included.
    pub fn num_notes(&self) -> usize {
        self.intervals.len() + 1
    }

    /// Interval ratios above the tonic, ascending.
    pub fn intervals(&self) -> &[f64] {
        &self.intervals
    }

    /// One interval ratio.
    pub fn freq_ratio(&self, index: usize) -> Option<f64> {
        self.intervals.get(index).copied()
    }

    /// Add an interval ratio. Returns its index in the sorted scale.
    pub fn add_interval(&mut self, ratio: f64) -> Result<usize, TuningError> {
        self.check_interval(ratio, None)?;
        let at = self.intervals.partition_point(|&r| r < ratio);
        self.intervals.insert(at, ratio);
        Ok(at)
    }

    /// Change an interval ratio. Returns its new index.
    pub fn set_freq_ratio(&mut self, index: usize, ratio: f64) -> Result<usize, TuningError> {
        self.check_index(index)?;
        self.check_interval(ratio, Some(index))?;
        self.intervals.remove(index);
        let at = self.intervals.partition_point(|&r| r < ratio);
        self.intervals.insert(at, ratio);
        Ok(at)
    }

    /// Remove an interval.
    pub fn remove_interval(&mut self, index: usize) -> Result<f64, TuningError> {
        self.check_index(index)?;
        Ok(self.intervals.remove(index))
    }

    /// Remove every interval.
    pub fn clear_intervals(&mut self) {
        self.intervals.clear();
    }

    /// Set the tonic's real frequency in Hz.
    pub fn set_reference_frequency(&mut self, freq: f64) -> Result<(), TuningError> {
        if !(freq.is_finite() && freq > 0.0) {
            return Err(TuningError::InvalidReferenceFrequency(freq));
        }
        self.reference_frequency = Some(freq);
        Ok(())
    }

    /// Forget the reference frequency.
    pub fn clear_reference_frequency(&mut self) {
        self.reference_frequency = None;
    }

    /// The tonic's real frequency, if configured.
    pub fn reference_frequency(&self) -> Option<f64> {
        self.reference_frequency
    }

    /// Set the pseudo-octave at which the scale repeats.
    ///
    /// Must exceed every interval and respect the minimum interval.
    pub fn set_repeat_ratio(&mut self, repeat_ratio: f64) -> Result<(), TuningError> {
        if !(repeat_ratio.is_finite() && repeat_ratio > 1.0) {
            return Err(TuningError::NotAboveTonic(repeat_ratio));
        }
        if let Some(&largest) = self.intervals.last()
            && repeat_ratio <= largest
        {
            return Err(TuningError::RepeatTooSmall {
                repeat_ratio,
                largest,
            });
        }
        let band = exclusion_band(self.min_interval);
        if self.min_interval > 1.0
            && (band.contains(&repeat_ratio)
                || self.intervals.iter().any(|&r| band.contains(&(repeat_ratio / r))))
        {
            return Err(TuningError::TooClose {
                ratio: repeat_ratio,
                min_interval: self.min_interval,
            });
        }
        self.repeat_ratio = Some(repeat_ratio);
        Ok(())
    }

    /// Forget the repeat ratio.
    pub fn clear_repeat_ratio(&mut self) {
        self.repeat_ratio = None;
    }

    /// The pseudo-octave, if configured.
    pub fn repeat_ratio(&self) -> Option<f64> {
        self.repeat_ratio
    }

    /// Set the minimum ratio between any two notes. Must be `>= 1` and hold
    /// for the existing notes.
    pub fn set_min_interval(&mut self, min_interval: f64) -> Result<(), TuningError> {
        if !(min_interval.is_finite() && min_interval >= 1.0) {
            return Err(TuningError::InvalidMinInterval(min_interval));
        }
        if min_interval > 1.0 {
            let band = exclusion_band(min_interval);
            let notes: Vec<f64> = self.intervals.iter().copied().chain(self.repeat_ratio).collect();
            let violates = notes.iter().enumerate().any(|(i, &a)| {
                band.contains(&a) || notes[i + 1..].iter().any(|&b| band.contains(&(b / a)))
            });
            if violates {
                return Err(TuningError::InvalidMinInterval(min_interval));
            }
        }
        self.min_interval = min_interval;
        Ok(())
    }

    /// The minimum ratio between any two notes.
    pub fn min_interval(&self) -> f64 {
        self.min_interval
    }

    /// Real frequency of a note in the first repeat (index 0 is the tonic).
    pub fn note_frequency(&self, note: usize) -> Option<f64> {
        let reference = self.reference_frequency?;
        if note == 0 {
            return Some(reference);
        }
        self.intervals.get(note - 1).map(|r| r * reference)
    }

    /// Every note frequency in `[low, high]`, repeating the scale up and
    /// down from the reference frequency.
    ///
    /// Returns `None` without a reference frequency or repeat ratio.
    pub fn frequencies_between(&self, low: f64, high: f64) -> Option<Vec<f64>> {
        let reference = self.reference_frequency?;
        let repeat = self.repeat_ratio?;
        if !(low > 0.0 && high >= low) {
            return Some(Vec::new());
        }

        // Tonic of the lowest repeat that can reach `low`.
        let mut tonic = reference * repeat.powf(((low / reference).ln() / repeat.ln()).floor());
        let mut freqs = Vec::new();
        while tonic <= high {
            for ratio in std::iter::once(1.0).chain(self.intervals.iter().copied()) {
                let freq = tonic * ratio;
                if freq >= low && freq <= high {
                    freqs.push(freq);
                }
            }
            tonic *= repeat;
        }
        Some(freqs)
    }

    fn check_index(&self, index: usize) -> Result<(), TuningError> {
        if index < self.intervals.len() {
            Ok(())
        } else {
            Err(TuningError::OutOfBounds {
                index,
                len: self.intervals.len(),
            })
        }
    }

    fn check_interval(&self, ratio: f64, skip: Option<usize>) -> Result<(), TuningError> {
        if !(ratio.is_finite() && ratio > 1.0) {
            return Err(TuningError::NotAboveTonic(ratio));
        }
        let others = || {
            self.intervals
                .iter()
                .enumerate()
                .filter(move |(i, _)| Some(*i) != skip)
                .map(|(_, &r)| r)
        };
        if others().any(|r| r == ratio) {
            return Err(TuningError::Duplicate(ratio));
        }
        if let Some(repeat_ratio) = self.repeat_ratio
            && ratio >= repeat_ratio
        {
            return Err(TuningError::BeyondRepeat {
                ratio,
                repeat_ratio,
            });
        }
        if self.min_interval > 1.0 {
            let band = exclusion_band(self.min_interval);
            let near_note = others()
                .chain(self.repeat_ratio)
                .any(|r| band.contains(&(ratio / r)));
            if band.contains(&ratio) || near_note {
                return Err(TuningError::TooClose {
                    ratio,
                    min_interval: self.min_interval,
                });
            }
        }
        Ok(())
    }
}

fn exclusion_band(min_interval: f64) -> std::ops::RangeInclusive<f64> {
    (1.0 / min_interval)..=min_interval
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pentatonic() -> TuningSystem {
        let mut tuning = TuningSystem::new("pentatonic");
        for ratio in [9.0 / 8.0, 5.0 / 4.0, 3.0 / 2.0, 5.0 / 3.0] {
            tuning.add_interval(ratio).unwrap();
        }
        tuning
    }

    #[test]
    fn new_tuning_is_unconfigured() {
        let tuning = TuningSystem::default();
        assert_eq!(tuning.num_notes(), 1);
        assert_eq!(tuning.reference_frequency(), None);
        assert_eq!(tuning.repeat_ratio(), None);
        assert_eq!(tuning.name(), "untitled");
    }

    #[test]
    fn intervals_stay_sorted() {
        let mut tuning = TuningSystem::new("t");
        assert_eq!(tuning.add_interval(1.5), Ok(0));
        assert_eq!(tuning.add_interval(1.25), Ok(0));
        assert_eq!(tuning.add_interval(1.875), Ok(2));
        assert_eq!(tuning.intervals(), &[1.25, 1.5, 1.875]);
        assert_eq!(tuning.set_freq_ratio(0, 1.75), Ok(1));
        assert_eq!(tuning.intervals(), &[1.5, 1.75, 1.875]);
    }

    #[test]
    fn rejects_invalid_intervals() {
        let mut tuning = pentatonic();
        let before = tuning.clone();
        assert_eq!(tuning.add_interval(1.0), Err(TuningError::NotAboveTonic(1.0)));
        assert_eq!(tuning.add_interval(0.5), Err(TuningError::NotAboveTonic(0.5)));
        assert_eq!(tuning.add_interval(1.5), Err(TuningError::Duplicate(1.5)));
        assert!(tuning.set_freq_ratio(9, 1.9).is_err());
        assert_eq!(tuning, before);
    }

    #[test]
    fn min_interval_band() {
        let mut tuning = pentatonic();
        tuning.set_min_interval(1.05).unwrap();
        assert!(matches!(
            tuning.add_interval(1.52),
            Err(TuningError::TooClose { .. })
        ));
        assert!(tuning.add_interval(1.03).is_err());
        assert!(tuning.add_interval(1.35).is_ok());
        assert_eq!(
            tuning.set_min_interval(1.2),
            Err(TuningError::InvalidMinInterval(1.2))
        );
    }

    #[test]
    fn repeat_ratio_bounds_the_scale() {
        let mut tuning = pentatonic();
        assert_eq!(
            tuning.set_repeat_ratio(1.6),
            Err(TuningError::RepeatTooSmall {
                repeat_ratio: 1.6,
                largest: 5.0 / 3.0
            })
        );
        tuning.set_repeat_ratio(2.0).unwrap();
        assert!(matches!(
            tuning.add_interval(2.5),
            Err(TuningError::BeyondRepeat { .. })
        ));
        assert!(tuning.set_repeat_ratio(0.0).is_err());
        assert_eq!(tuning.repeat_ratio(), Some(2.0));
    }

    #[test]
    fn zero_is_invalid_not_unset() {
        let mut tuning = pentatonic();
        assert_eq!(
            tuning.set_reference_frequency(0.0),
            Err(TuningError::InvalidReferenceFrequency(0.0))
        );
        assert_eq!(tuning.reference_frequency(), None);
        tuning.set_reference_frequency(440.0).unwrap();
        tuning.clear_reference_frequency();
        assert_eq!(tuning.reference_frequency(), None);
    }

    #[test]
    fn note_frequencies() {
        let mut tuning = pentatonic();
        assert_eq!(tuning.note_frequency(0), None);
        tuning.set_reference_frequency(200.0).unwrap();
        assert_eq!(tuning.note_frequency(0), Some(200.0));
        assert_eq!(tuning.note_frequency(3), Some(300.0));
        assert_eq!(tuning.note_frequency(5), None);
    }

    #[test]
    fn frequencies_repeat_across_range() {
        let mut tuning = pentatonic();
        assert!(tuning.frequencies_between(100.0, 1000.0).is_none());
        tuning.set_reference_frequency(200.0).unwrap();
        tuning.set_repeat_ratio(2.0).unwrap();

        let freqs = tuning.frequencies_between(100.0, 400.0).unwrap();
        assert_eq!(freqs.len(), 11);
        assert!((freqs[0] - 100.0).abs() < 1e-9);
        assert!((freqs[5] - 200.0).abs() < 1e-9);
        assert!((freqs[10] - 400.0).abs() < 1e-9);
        assert!(freqs.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn equal_temperament_has_even_steps() {
        let tet = TuningSystem::equal_temperament("12-TET", 12, 2.0).unwrap();
        assert_eq!(tet.num_notes(), 12);
        assert_eq!(tet.repeat_ratio(), Some(2.0));
        let semitone = 2.0_f64.powf(1.0 / 12.0);
        assert!((tet.freq_ratio(6).unwrap() - semitone.powi(7)).abs() < 1e-12);
    }
}
