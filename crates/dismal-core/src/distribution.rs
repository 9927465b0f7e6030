//! Overtone distributions: a fundamental plus an ordered set of partials.
//!
//! A distribution describes the spectrum of one sound. The fundamental holds
//! an absolute frequency (Hz) and amplitude; every other partial holds ratios
//! to those values, so the same distribution can be transposed by changing
//! only the fundamental.
//!
//! # Invariants
//!
//! - Partials are sorted ascending by frequency ratio.
//! - No partial has ratio 1 (the tonic) or duplicates another ratio.
//! - With a minimum interval `m > 1`, no partial ratio `r` satisfies
//!   `1/m <= r <= m`, and no pair of partials has `1/m <= r_a / r_b <= m`.
//!
//! Mute flags are plain state here. Excluding muted entities from a
//! calculation is the model's job (see [`crate::model`]).
//!
//! # Example
//!
//! ```rust
//! use dismal_core::OvertoneDistribution;
//!
//! let mut tone = OvertoneDistribution::new("clarinet-ish");
//! tone.set_fundamental(220.0, 1.0).unwrap();
//! tone.add_partial(3.0, 0.5).unwrap();
//! tone.add_partial(5.0, 0.25).unwrap();
//!
//! assert_eq!(tone.real_freq(0), Some(660.0));
//! assert!(tone.add_partial(1.0, 0.5).is_err()); // the tonic
//! ```

use crate::error::{DissonanceError, Result, check_amplitude, check_frequency};

/// A sinusoidal component of a sound.
///
/// For overtones, `freq` and `amp` are ratios to the fundamental. For the
/// fundamental itself they are absolute values.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Partial {
    pub(crate) freq: f64,
    pub(crate) amp: f64,
    pub(crate) muted: bool,
    pub(crate) dissonance: f64,
}

impl Partial {
    pub(crate) fn new(freq: f64, amp: f64) -> Self {
        Self {
            freq,
            amp,
            muted: false,
            dissonance: 0.0,
        }
    }

    /// Frequency (ratio for overtones, Hz for the fundamental).
    pub fn freq(&self) -> f64 {
        self.freq
    }

    /// Amplitude (ratio for overtones, absolute for the fundamental).
    pub fn amp(&self) -> f64 {
        self.amp
    }

    /// Whether this partial is excluded from calculations.
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Dissonance attributed to this partial by the last accumulating evaluation.
    pub fn dissonance(&self) -> f64 {
        self.dissonance
    }
}

/// The overtones of one sound.
#[derive(Debug, PartialEq)]
pub struct OvertoneDistribution {
    name: String,
    partials: Vec<Partial>,
    fundamental: Partial,
    min_interval: f64,
    muted: bool,
}

impl Clone for OvertoneDistribution {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            partials: self.partials.clone(),
            fundamental: self.fundamental,
            min_interval: self.min_interval,
            muted: self.muted,
        }
    }

    // Reuses the partial buffer so working copies don't reallocate per grid point.
    fn clone_from(&mut self, source: &Self) {
        self.name.clone_from(&source.name);
        self.partials.clone_from(&source.partials);
        self.fundamental = source.fundamental;
        self.min_interval = source.min_interval;
        self.muted = source.muted;
    }
}

impl Default for OvertoneDistribution {
    fn default() -> Self {
        Self::new("untitled")
    }
}

impl OvertoneDistribution {
    /// Create an empty distribution with no minimum interval.
    ///
    /// The fundamental starts unset (frequency and amplitude 0); call
    /// [`set_fundamental`](Self::set_fundamental) before evaluating.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            partials: Vec::new(),
            fundamental: Partial::default(),
            min_interval: 1.0,
            muted: false,
        }
    }

    /// Build a distribution from `(freq_ratio, amp_ratio)` pairs.
    ///
    /// Pairs are inserted in order through [`add_partial`](Self::add_partial);
    /// the first invalid pair aborts construction.
    pub fn from_ratios(
        name: impl Into<String>,
        min_interval: f64,
        ratios: impl IntoIterator<Item = (f64, f64)>,
    ) -> Result<Self> {
        let mut dist = Self::new(name);
        dist.set_min_interval(min_interval)?;
        for (freq, amp) in ratios {
            dist.add_partial(freq, amp)?;
        }
        Ok(dist)
    }

    /// Number of overtone partials (the fundamental is not counted).
    pub fn num_partials(&self) -> usize {
        self.partials.len()
    }

    /// The distribution's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the distribution.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// All overtone partials, ascending by frequency ratio.
    pub fn partials(&self) -> &[Partial] {
        &self.partials
    }

    /// A single partial.
    pub fn partial(&self, index: usize) -> Option<&Partial> {
        self.partials.get(index)
    }

    pub(crate) fn partials_mut(&mut self) -> &mut [Partial] {
        &mut self.partials
    }

    pub(crate) fn fundamental_mut(&mut self) -> &mut Partial {
        &mut self.fundamental
    }

    // ------------------------------------------------------------------
    // Partials
    // ------------------------------------------------------------------

    /// Add a partial and re-sort. Returns the partial's index after sorting.
    pub fn add_partial(&mut self, freq_ratio: f64, amp_ratio: f64) -> Result<usize> {
        check_frequency(freq_ratio)?;
        check_amplitude(amp_ratio)?;
        self.check_ratio(freq_ratio, None)?;

        self.partials.push(Partial::new(freq_ratio, amp_ratio));
        self.sort_partials();
        Ok(self.index_of_ratio(freq_ratio))
    }

    /// Change a partial's frequency ratio and re-sort.
    ///
    /// The partial being changed is ignored by the duplicate and proximity
    /// checks. Returns the partial's new index.
    pub fn set_freq_ratio(&mut self, index: usize, freq_ratio: f64) -> Result<usize> {
        self.check_index(index)?;
        check_frequency(freq_ratio)?;
        self.check_ratio(freq_ratio, Some(index))?;

        self.partials[index].freq = freq_ratio;
        self.sort_partials();
        Ok(self.index_of_ratio(freq_ratio))
    }

    /// Change a partial's amplitude ratio.
    pub fn set_amp_ratio(&mut self, index: usize, amp_ratio: f64) -> Result<()> {
        self.check_index(index)?;
        check_amplitude(amp_ratio)?;
        self.partials[index].amp = amp_ratio;
        Ok(())
    }

    /// A partial's frequency ratio to the fundamental.
    pub fn freq_ratio(&self, index: usize) -> Option<f64> {
        self.partials.get(index).map(|p| p.freq)
    }

    /// A partial's amplitude ratio to the fundamental.
    pub fn amp_ratio(&self, index: usize) -> Option<f64> {
        self.partials.get(index).map(|p| p.amp)
    }

    /// A partial's real frequency in Hz (`ratio * fundamental frequency`).
    pub fn real_freq(&self, index: usize) -> Option<f64> {
        self.partials
            .get(index)
            .map(|p| p.freq * self.fundamental.freq)
    }

    /// A partial's real amplitude (`ratio * fundamental amplitude`).
    pub fn real_amp(&self, index: usize) -> Option<f64> {
        self.partials.get(index).map(|p| p.amp * self.fundamental.amp)
    }

    /// Remove a partial. Later partials shift down by one index.
    pub fn remove_partial(&mut self, index: usize) -> Result<Partial> {
        self.check_index(index)?;
        Ok(self.partials.remove(index))
    }

    /// Remove all partials.
    pub fn clear_partials(&mut self) {
        self.partials.clear();
    }

    // ------------------------------------------------------------------
    // Fundamental
    // ------------------------------------------------------------------

    /// Set the fundamental's absolute frequency (Hz) and amplitude.
    pub fn set_fundamental(&mut self, freq: f64, amp: f64) -> Result<()> {
        check_frequency(freq)?;
        check_amplitude(amp)?;
        self.fundamental.freq = freq;
        self.fundamental.amp = amp;
        Ok(())
    }

    /// Set the fundamental frequency in Hz.
    pub fn set_fundamental_freq(&mut self, freq: f64) -> Result<()> {
        check_frequency(freq)?;
        self.fundamental.freq = freq;
        Ok(())
    }

    /// Set the fundamental's absolute amplitude.
    pub fn set_fundamental_amp(&mut self, amp: f64) -> Result<()> {
        check_amplitude(amp)?;
        self.fundamental.amp = amp;
        Ok(())
    }

    /// The fundamental frequency in Hz.
    pub fn fundamental_freq(&self) -> f64 {
        self.fundamental.freq
    }

    /// The fundamental's absolute amplitude.
    pub fn fundamental_amp(&self) -> f64 {
        self.fundamental.amp
    }

    /// The fundamental partial.
    pub fn fundamental(&self) -> &Partial {
        &self.fundamental
    }

    // ------------------------------------------------------------------
    // Muting
    // ------------------------------------------------------------------

    /// Mute or unmute the whole distribution.
    pub fn mute(&mut self, mute: bool) {
        self.muted = mute;
    }

    /// Whether the whole distribution is muted.
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Mute or unmute a single partial.
    pub fn mute_partial(&mut self, index: usize, mute: bool) -> Result<()> {
        self.check_index(index)?;
        self.partials[index].muted = mute;
        Ok(())
    }

    /// Whether a partial is muted.
    pub fn partial_is_muted(&self, index: usize) -> Option<bool> {
        self.partials.get(index).map(|p| p.muted)
    }

    /// Mute or unmute the fundamental.
    pub fn mute_fundamental(&mut self, mute: bool) {
        self.fundamental.muted = mute;
    }

    /// Whether the fundamental is muted.
    pub fn fundamental_is_muted(&self) -> bool {
        self.fundamental.muted
    }

    /// True when the fundamental takes part in calculations.
    pub(crate) fn fundamental_audible(&self) -> bool {
        !self.muted && !self.fundamental.muted
    }

    // ------------------------------------------------------------------
    // Dissonance attribution
    // ------------------------------------------------------------------

    /// Add to a partial's running dissonance total.
    pub fn add_partial_dissonance(&mut self, index: usize, dissonance: f64) -> Result<()> {
        self.check_index(index)?;
        self.partials[index].dissonance += dissonance;
        Ok(())
    }

    /// Add to the fundamental's running dissonance total.
    pub fn add_dissonance_to_fundamental(&mut self, dissonance: f64) {
        self.fundamental.dissonance += dissonance;
    }

    /// A partial's running dissonance total.
    pub fn partial_dissonance(&self, index: usize) -> Option<f64> {
        self.partials.get(index).map(|p| p.dissonance)
    }

    /// The fundamental's running dissonance total.
    pub fn fundamental_dissonance(&self) -> f64 {
        self.fundamental.dissonance
    }

    /// Sum of the fundamental's and every partial's running totals.
    pub fn total_dissonance(&self) -> f64 {
        self.fundamental.dissonance + self.partials.iter().map(|p| p.dissonance).sum::<f64>()
    }

    /// Zero the running totals of the fundamental and every partial.
    pub fn clear_partial_dissonances(&mut self) {
        self.fundamental.dissonance = 0.0;
        for partial in &mut self.partials {
            partial.dissonance = 0.0;
        }
    }

    // ------------------------------------------------------------------
    // Minimum interval
    // ------------------------------------------------------------------

    /// Set the minimum frequency ratio between any two partials.
    ///
    /// Must be `>= 1` (1 means no minimum), and the existing partials must
    /// already satisfy it.
    pub fn set_min_interval(&mut self, min_interval: f64) -> Result<()> {
        if !(min_interval.is_finite() && min_interval >= 1.0) {
            return Err(DissonanceError::InvalidMinInterval(min_interval));
        }
        if min_interval > 1.0 {
            let band = exclusion_band(min_interval);
            let violates = self.partials.iter().enumerate().any(|(i, a)| {
                band.contains(&a.freq)
                    || self.partials[i + 1..]
                        .iter()
                        .any(|b| band.contains(&(a.freq / b.freq)))
            });
            if violates {
                return Err(DissonanceError::InvalidMinInterval(min_interval));
            }
        }
        self.min_interval = min_interval;
        Ok(())
    }

    /// The minimum frequency ratio between any two partials.
    pub fn min_interval(&self) -> f64 {
        self.min_interval
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.partials.len() {
            Ok(())
        } else {
            Err(DissonanceError::PartialOutOfBounds {
                index,
                len: self.partials.len(),
            })
        }
    }

    /// Reject ratios equal to the tonic or another partial, or inside the
    /// exclusion band of either. `skip` names a partial to leave out.
    fn check_ratio(&self, ratio: f64, skip: Option<usize>) -> Result<()> {
        let others = || {
            self.partials
                .iter()
                .enumerate()
                .filter(move |(i, _)| Some(*i) != skip)
                .map(|(_, p)| p.freq)
        };

        if ratio == 1.0 || others().any(|r| r == ratio) {
            return Err(DissonanceError::DuplicateRatio(ratio));
        }

        if self.min_interval > 1.0 {
            let band = exclusion_band(self.min_interval);
            if band.contains(&ratio) || others().any(|r| band.contains(&(ratio / r))) {
                return Err(DissonanceError::RatioTooClose {
                    ratio,
                    min_interval: self.min_interval,
                });
            }
        }

        Ok(())
    }

    fn sort_partials(&mut self) {
        self.partials.sort_by(|a, b| a.freq.total_cmp(&b.freq));
    }

    fn index_of_ratio(&self, ratio: f64) -> usize {
        self.partials
            .iter()
            .position(|p| p.freq == ratio)
            .unwrap_or(self.partials.len())
    }
}

/// The symmetric band `[1/m, m]` of ratios considered too close.
fn exclusion_band(min_interval: f64) -> core::ops::RangeInclusive<f64> {
    (1.0 / min_interval)..=min_interval
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratios(dist: &OvertoneDistribution) -> Vec<f64> {
        dist.partials().iter().map(Partial::freq).collect()
    }

    #[test]
    fn new_distribution_is_empty() {
        let dist = OvertoneDistribution::new("empty");
        assert_eq!(dist.name(), "empty");
        assert_eq!(dist.num_partials(), 0);
        assert_eq!(dist.min_interval(), 1.0);
        assert!(!dist.is_muted());
        assert_eq!(dist.fundamental_freq(), 0.0);
    }

    #[test]
    fn add_partial_keeps_ascending_order() {
        let mut dist = OvertoneDistribution::new("t");
        assert_eq!(dist.add_partial(3.0, 0.5), Ok(0));
        assert_eq!(dist.add_partial(2.0, 0.7), Ok(0));
        assert_eq!(dist.add_partial(0.5, 0.2), Ok(0));
        assert_eq!(dist.add_partial(2.5, 0.1), Ok(2));
        assert_eq!(ratios(&dist), vec![0.5, 2.0, 2.5, 3.0]);
    }

    #[test]
    fn tonic_ratio_is_rejected() {
        let mut dist = OvertoneDistribution::new("t");
        assert_eq!(
            dist.add_partial(1.0, 0.5),
            Err(DissonanceError::DuplicateRatio(1.0))
        );
        assert_eq!(dist.num_partials(), 0);
    }

    #[test]
    fn duplicate_ratio_is_rejected() {
        let mut dist = OvertoneDistribution::new("t");
        dist.add_partial(2.0, 0.5).unwrap();
        let before = dist.clone();
        assert_eq!(
            dist.add_partial(2.0, 0.9),
            Err(DissonanceError::DuplicateRatio(2.0))
        );
        assert_eq!(dist, before);
    }

    #[test]
    fn ratio_inside_min_interval_band_is_rejected() {
        let mut dist = OvertoneDistribution::new("t");
        dist.set_min_interval(1.1).unwrap();
        dist.add_partial(2.0, 0.5).unwrap();
        let before = dist.clone();

        // Too close to the tonic.
        assert!(matches!(
            dist.add_partial(1.05, 0.5),
            Err(DissonanceError::RatioTooClose { .. })
        ));
        assert!(matches!(
            dist.add_partial(0.95, 0.5),
            Err(DissonanceError::RatioTooClose { .. })
        ));
        // Too close to 2.0 from either side.
        assert!(dist.add_partial(2.15, 0.5).is_err());
        assert!(dist.add_partial(1.85, 0.5).is_err());
        assert_eq!(dist, before);

        // Far enough away.
        assert!(dist.add_partial(2.5, 0.5).is_ok());
    }

    #[test]
    fn no_min_interval_allows_close_ratios() {
        let mut dist = OvertoneDistribution::new("t");
        dist.add_partial(2.0, 0.5).unwrap();
        assert!(dist.add_partial(2.0001, 0.5).is_ok());
        assert!(dist.add_partial(1.0001, 0.5).is_ok());
    }

    #[test]
    fn invalid_partial_values_are_rejected() {
        let mut dist = OvertoneDistribution::new("t");
        assert_eq!(
            dist.add_partial(0.0, 0.5),
            Err(DissonanceError::InvalidFrequency(0.0))
        );
        assert_eq!(
            dist.add_partial(2.0, -1.0),
            Err(DissonanceError::InvalidAmplitude(-1.0))
        );
        assert_eq!(dist.num_partials(), 0);
    }

    #[test]
    fn set_freq_ratio_resorts_and_ignores_self() {
        let mut dist = OvertoneDistribution::from_ratios(
            "t",
            1.05,
            [(2.0, 0.5), (3.0, 0.33), (4.0, 0.25)],
        )
        .unwrap();

        // Nudging a partial within its own band is allowed.
        assert_eq!(dist.set_freq_ratio(0, 2.02), Ok(0));
        // Moving the first partial past the others re-sorts.
        assert_eq!(dist.set_freq_ratio(0, 5.0), Ok(2));
        assert_eq!(ratios(&dist), vec![3.0, 4.0, 5.0]);
        assert_eq!(dist.amp_ratio(2), Some(0.5));
    }

    #[test]
    fn set_freq_ratio_rejects_neighbours() {
        let mut dist =
            OvertoneDistribution::from_ratios("t", 1.05, [(2.0, 0.5), (3.0, 0.33)]).unwrap();
        let before = dist.clone();
        assert_eq!(
            dist.set_freq_ratio(0, 3.0),
            Err(DissonanceError::DuplicateRatio(3.0))
        );
        assert!(dist.set_freq_ratio(0, 2.95).is_err());
        assert_eq!(
            dist.set_freq_ratio(7, 2.5),
            Err(DissonanceError::PartialOutOfBounds { index: 7, len: 2 })
        );
        assert_eq!(dist, before);
    }

    #[test]
    fn min_interval_must_hold_for_existing_partials() {
        let mut dist = OvertoneDistribution::from_ratios("t", 1.0, [(2.0, 0.5), (2.1, 0.5)]).unwrap();
        assert_eq!(
            dist.set_min_interval(1.2),
            Err(DissonanceError::InvalidMinInterval(1.2))
        );
        assert_eq!(
            dist.set_min_interval(0.5),
            Err(DissonanceError::InvalidMinInterval(0.5))
        );
        assert_eq!(dist.min_interval(), 1.0);
        assert!(dist.set_min_interval(1.01).is_ok());
    }

    #[test]
    fn real_values_scale_with_fundamental() {
        let mut dist = OvertoneDistribution::from_ratios("t", 1.0, [(2.0, 0.5)]).unwrap();
        dist.set_fundamental(110.0, 0.8).unwrap();
        assert_eq!(dist.real_freq(0), Some(220.0));
        assert_eq!(dist.real_amp(0), Some(0.4));
        assert_eq!(dist.real_freq(1), None);
    }

    #[test]
    fn fundamental_setters_validate() {
        let mut dist = OvertoneDistribution::new("t");
        dist.set_fundamental(440.0, 1.0).unwrap();
        assert!(dist.set_fundamental_freq(-2.0).is_err());
        assert!(dist.set_fundamental_amp(0.0).is_err());
        assert_eq!(dist.fundamental_freq(), 440.0);
        assert_eq!(dist.fundamental_amp(), 1.0);
    }

    #[test]
    fn mute_flags_are_independent() {
        let mut dist = OvertoneDistribution::from_ratios("t", 1.0, [(2.0, 0.5)]).unwrap();
        dist.mute_partial(0, true).unwrap();
        assert_eq!(dist.partial_is_muted(0), Some(true));
        assert!(!dist.fundamental_is_muted());
        dist.mute_fundamental(true);
        assert!(dist.fundamental_is_muted());
        assert!(!dist.is_muted());
        assert!(dist.mute_partial(4, true).is_err());
    }

    #[test]
    fn dissonance_totals_accumulate_and_clear() {
        let mut dist = OvertoneDistribution::from_ratios("t", 1.0, [(2.0, 0.5), (3.0, 0.3)]).unwrap();
        dist.add_dissonance_to_fundamental(0.25);
        dist.add_partial_dissonance(0, 0.5).unwrap();
        dist.add_partial_dissonance(1, 0.125).unwrap();
        dist.add_partial_dissonance(1, 0.125).unwrap();
        assert_eq!(dist.partial_dissonance(1), Some(0.25));
        assert_eq!(dist.total_dissonance(), 1.0);

        dist.clear_partial_dissonances();
        assert_eq!(dist.total_dissonance(), 0.0);
        assert_eq!(dist.fundamental_dissonance(), 0.0);
    }

    #[test]
    fn remove_partial_shifts_indices() {
        let mut dist =
            OvertoneDistribution::from_ratios("t", 1.0, [(2.0, 0.5), (3.0, 0.3), (4.0, 0.2)])
                .unwrap();
        let removed = dist.remove_partial(0).unwrap();
        assert_eq!(removed.freq(), 2.0);
        assert_eq!(ratios(&dist), vec![3.0, 4.0]);
        dist.clear_partials();
        assert_eq!(dist.num_partials(), 0);
    }

    #[test]
    fn clone_from_copies_every_field() {
        let mut source =
            OvertoneDistribution::from_ratios("source", 1.02, [(2.0, 0.5), (3.0, 0.3)]).unwrap();
        source.set_fundamental(200.0, 0.9).unwrap();
        source.mute(true);
        source.add_partial_dissonance(1, 0.4).unwrap();

        let mut target = OvertoneDistribution::from_ratios("target", 1.0, [(7.0, 0.1)]).unwrap();
        target.clone_from(&source);
        assert_eq!(target, source);
    }
}
