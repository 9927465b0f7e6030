//! Preprocessors: in-place transforms applied to a working copy of the
//! distributions before each evaluation.
//!
//! The calculator runs its preprocessors in order on a private copy, so a
//! preprocessor never touches the caller's canonical distributions.

use core::fmt;

use crate::distribution::OvertoneDistribution;
use crate::error::{DissonanceError, Result};

/// An ordered pipeline stage run before every evaluation.
pub trait Preprocessor: fmt::Debug + Send + Sync {
    /// Short display name.
    fn name(&self) -> &str;

    /// What the preprocessor does.
    fn description(&self) -> &str;

    /// Transform the working distributions in place.
    fn process(&self, distributions: &mut [OvertoneDistribution]);

    /// Boxed copy of this preprocessor.
    fn clone_box(&self) -> Box<dyn Preprocessor>;
}

impl Clone for Box<dyn Preprocessor> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Default lower edge of the audible band, in Hz.
pub const DEFAULT_HEARING_LOW: f64 = 20.0;
/// Default upper edge of the audible band, in Hz.
pub const DEFAULT_HEARING_HIGH: f64 = 20000.0;

/// Mutes fundamentals and partials whose real frequency is outside `[low, high]`.
///
/// Entities are muted, never removed, and never unmuted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HearingRange {
    low: f64,
    high: f64,
}

impl Default for HearingRange {
    fn default() -> Self {
        Self {
            low: DEFAULT_HEARING_LOW,
            high: DEFAULT_HEARING_HIGH,
        }
    }
}

impl HearingRange {
    /// Create a band. Requires `0 <= low < high`.
    pub fn new(low: f64, high: f64) -> Result<Self> {
        let mut range = Self::default();
        range.set_range(low, high)?;
        Ok(range)
    }

    /// Change the band. Requires `0 <= low < high`.
    pub fn set_range(&mut self, low: f64, high: f64) -> Result<()> {
        if !(low.is_finite() && high.is_finite() && low >= 0.0 && high > low) {
            return Err(DissonanceError::InvalidRange {
                start: low,
                end: high,
            });
        }
        self.low = low;
        self.high = high;
        Ok(())
    }

    /// The band as `(low, high)` in Hz.
    pub fn range(&self) -> (f64, f64) {
        (self.low, self.high)
    }

    /// Whether `freq` lies inside the band (edges included).
    pub fn contains(&self, freq: f64) -> bool {
        (self.low..=self.high).contains(&freq)
    }
}

impl Preprocessor for HearingRange {
    fn name(&self) -> &str {
        "Hearing Range"
    }

    fn description(&self) -> &str {
        "Mutes partials whose frequencies lie outside the human hearing range."
    }

    fn process(&self, distributions: &mut [OvertoneDistribution]) {
        for dist in distributions {
            if !self.contains(dist.fundamental_freq()) {
                dist.mute_fundamental(true);
            }
            let fundamental = dist.fundamental_freq();
            for partial in dist.partials_mut() {
                if !self.contains(partial.freq * fundamental) {
                    partial.muted = true;
                }
            }
        }
    }

    fn clone_box(&self) -> Box<dyn Preprocessor> {
        Box::new(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice(freq: f64) -> OvertoneDistribution {
        let mut dist =
            OvertoneDistribution::from_ratios("v", 1.0, [(2.0, 0.5), (10.0, 0.1), (100.0, 0.01)])
                .unwrap();
        dist.set_fundamental(freq, 1.0).unwrap();
        dist
    }

    fn muted(dist: &OvertoneDistribution) -> Vec<bool> {
        dist.partials().iter().map(|p| p.is_muted()).collect()
    }

    #[test]
    fn defaults_cover_human_hearing() {
        let range = HearingRange::default();
        assert_eq!(range.range(), (20.0, 20000.0));
        assert!(range.contains(20.0));
        assert!(range.contains(20000.0));
        assert!(!range.contains(19.9));
    }

    #[test]
    fn mutes_partials_above_band() {
        let mut voices = vec![voice(440.0)];
        HearingRange::default().process(&mut voices);
        assert!(!voices[0].fundamental_is_muted());
        assert_eq!(muted(&voices[0]), vec![false, false, true]);
    }

    #[test]
    fn mutes_fundamental_below_band() {
        let mut voices = vec![voice(15.0)];
        HearingRange::default().process(&mut voices);
        assert!(voices[0].fundamental_is_muted());
        assert_eq!(muted(&voices[0]), vec![false, false, false]);
    }

    #[test]
    fn never_unmutes() {
        let mut voices = vec![voice(440.0)];
        voices[0].mute_partial(0, true).unwrap();
        HearingRange::default().process(&mut voices);
        assert_eq!(voices[0].partial_is_muted(0), Some(true));
    }

    #[test]
    fn narrower_band_mutes_more() {
        let range = HearingRange::new(500.0, 5000.0).unwrap();
        let mut voices = vec![voice(440.0)];
        range.process(&mut voices);
        assert!(voices[0].fundamental_is_muted());
        assert_eq!(muted(&voices[0]), vec![false, false, true]);
    }

    #[test]
    fn rejects_inverted_band() {
        assert!(HearingRange::new(1000.0, 100.0).is_err());
        assert!(HearingRange::new(-1.0, 100.0).is_err());
        let mut range = HearingRange::default();
        assert!(range.set_range(100.0, 100.0).is_err());
        assert_eq!(range, HearingRange::default());
    }
}
