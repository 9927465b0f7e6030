//! Dissonance models.
//!
//! The [`DissonanceModel`] trait is the seam the calculator evaluates
//! through. The built-in models are the two variants of
//! [`InterferenceModel`], which share one pairwise summation
//! ([`interference_sum`]) and differ only in their elementary roughness
//! formula.
//!
//! ## Pairwise summation
//!
//! Over all unmuted distributions and their unmuted entities:
//!
//! 1. every unordered pair of distinct fundamentals,
//! 2. every partial against every fundamental, its own included,
//! 3. every unordered pair of distinct partials, where partials of the same
//!    distribution pair only with later-indexed partials.
//!
//! Each pair contributes `roughness(f1, a1, f2, a2)` to the total. When
//! accumulating, each contribution is split evenly between its two
//! participants' running totals.
//!
//! # Example
//!
//! ```rust
//! use dismal_core::{DissonanceModel, InterferenceModel, OvertoneDistribution};
//!
//! let mut a = OvertoneDistribution::from_ratios("a", 1.0, [(2.0, 0.5)]).unwrap();
//! a.set_fundamental(220.0, 1.0).unwrap();
//! let mut b = a.clone();
//! b.set_fundamental_freq(233.0).unwrap();
//!
//! let mut voices = vec![a, b];
//! let d = InterferenceModel::Sethares.evaluate(&mut voices, false);
//! assert!(d > 0.0);
//! ```

use core::fmt;
use core::str::FromStr;

use crate::distribution::OvertoneDistribution;
use crate::error::DissonanceError;

/// Point of maximum dissonance on the Plomp-Levelt curve.
pub const MAX_DISSONANCE_POINT: f64 = 0.24;
/// Slope of the critical-bandwidth interpolation (`s1`).
pub const CURVE_INTERP_SLOPE: f64 = 0.0207;
/// Offset of the critical-bandwidth interpolation (`s2`).
pub const CURVE_INTERP_OFFSET: f64 = 18.96;
/// Rate of the rising exponential (`b1`).
pub const CURVE_RATE_RISE: f64 = -3.51;
/// Rate of the falling exponential (`b2`).
pub const CURVE_RATE_FALL: f64 = -5.75;
/// Weight of the rising exponential.
pub const CURVE_FIT_RISE: f64 = 5.0;
/// Weight of the falling exponential.
pub const CURVE_FIT_FALL: f64 = -5.0;

/// Vassilakis' amplitude-fluctuation exponent.
const VASSILAKIS_FLUCTUATION_EXP: f64 = 3.11;
/// Vassilakis' SPL exponent.
const VASSILAKIS_SPL_EXP: f64 = 0.1;

/// A strategy reducing a set of overtone distributions to one dissonance value.
///
/// Implementations may write per-entity attributions into the distributions
/// when `accumulate` is true, and must leave every other field untouched.
pub trait DissonanceModel: fmt::Debug + Send + Sync {
    /// Human-readable model name.
    fn name(&self) -> &str;

    /// Total dissonance of `distributions`.
    fn evaluate(&self, distributions: &mut [OvertoneDistribution], accumulate: bool) -> f64;

    /// Boxed copy of this model.
    fn clone_box(&self) -> Box<dyn DissonanceModel>;
}

impl Clone for Box<dyn DissonanceModel> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Spectral-interference models: roughness summed over every pair of partials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InterferenceModel {
    /// Sethares, *Tuning, Timbre, Spectrum, Scale* (2005).
    #[default]
    Sethares,
    /// Vassilakis, *Perceptual and Physical Properties of Amplitude
    /// Fluctuation and their Musical Significance* (2001).
    Vassilakis,
}

impl InterferenceModel {
    /// Every built-in model.
    pub const ALL: [Self; 2] = [Self::Sethares, Self::Vassilakis];

    /// Stable lowercase identifier, as used in configuration files.
    pub const fn id(&self) -> &'static str {
        match self {
            Self::Sethares => "sethares",
            Self::Vassilakis => "vassilakis",
        }
    }

    /// One-line description.
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Sethares => "Plomp-Levelt curve fit weighted by the quieter partial",
            Self::Vassilakis => "Plomp-Levelt curve fit weighted by amplitude fluctuation degree",
        }
    }

    /// Roughness between two partials. Symmetric in its two `(freq, amp)` arguments.
    pub fn roughness(&self, freq1: f64, amp1: f64, freq2: f64, amp2: f64) -> f64 {
        let curve = plomp_levelt_curve(freq1, freq2);
        match self {
            Self::Sethares => amp1.min(amp2) * curve,
            Self::Vassilakis => {
                let spl = (amp1 * amp2).powf(VASSILAKIS_SPL_EXP);
                let fluctuation = 0.5
                    * (2.0 * amp1.min(amp2) / (amp1 + amp2)).powf(VASSILAKIS_FLUCTUATION_EXP);
                spl * fluctuation * curve
            }
        }
    }
}

/// The shared frequency-dependent curve `c1*e^(r1*s*Δ) + c2*e^(r2*s*Δ)`.
fn plomp_levelt_curve(freq1: f64, freq2: f64) -> f64 {
    let s = MAX_DISSONANCE_POINT / (CURVE_INTERP_SLOPE * freq1.min(freq2) + CURVE_INTERP_OFFSET);
    let diff = (freq1 - freq2).abs();
    CURVE_FIT_RISE * (CURVE_RATE_RISE * s * diff).exp()
        + CURVE_FIT_FALL * (CURVE_RATE_FALL * s * diff).exp()
}

impl fmt::Display for InterferenceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for InterferenceModel {
    type Err = DissonanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DissonanceError::UnknownModel(s.to_string()))
    }
}

impl DissonanceModel for InterferenceModel {
    fn name(&self) -> &str {
        match self {
            Self::Sethares => "Sethares",
            Self::Vassilakis => "Vassilakis",
        }
    }

    fn evaluate(&self, distributions: &mut [OvertoneDistribution], accumulate: bool) -> f64 {
        interference_sum(distributions, accumulate, |f1, a1, f2, a2| {
            self.roughness(f1, a1, f2, a2)
        })
    }

    fn clone_box(&self) -> Box<dyn DissonanceModel> {
        Box::new(*self)
    }
}

/// Sum `roughness` over every audible pair of partials (fundamentals included).
///
/// This is the summation behind [`InterferenceModel`]; custom interference
/// models can reuse it with their own roughness function. Distribution-level
/// mutes exclude the whole distribution; fundamental and partial mutes
/// exclude only that entity.
pub fn interference_sum<F>(
    distributions: &mut [OvertoneDistribution],
    accumulate: bool,
    roughness: F,
) -> f64
where
    F: Fn(f64, f64, f64, f64) -> f64,
{
    let n = distributions.len();
    let mut total = 0.0;

    // Fundamental against fundamental.
    for i in 0..n {
        if !distributions[i].fundamental_audible() {
            continue;
        }
        let (fi, ai) = fundamental_of(&distributions[i]);
        for j in (i + 1)..n {
            if !distributions[j].fundamental_audible() {
                continue;
            }
            let (fj, aj) = fundamental_of(&distributions[j]);
            let d = roughness(fi, ai, fj, aj);
            total += d;
            if accumulate {
                distributions[i].fundamental_mut().dissonance += d / 2.0;
                distributions[j].fundamental_mut().dissonance += d / 2.0;
            }
        }
    }

    for a in 0..n {
        if distributions[a].is_muted() {
            continue;
        }
        for p in 0..distributions[a].num_partials() {
            let Some((fp, ap)) = audible_partial(&distributions[a], p) else {
                continue;
            };

            // Partial against every fundamental, its own included.
            for b in 0..n {
                if !distributions[b].fundamental_audible() {
                    continue;
                }
                let (fb, ab) = fundamental_of(&distributions[b]);
                let d = roughness(fp, ap, fb, ab);
                total += d;
                if accumulate {
                    distributions[a].partials_mut()[p].dissonance += d / 2.0;
                    distributions[b].fundamental_mut().dissonance += d / 2.0;
                }
            }

            // Partial against later partials. A partial never pairs with itself.
            for b in a..n {
                if distributions[b].is_muted() {
                    continue;
                }
                let first = if a == b { p + 1 } else { 0 };
                for q in first..distributions[b].num_partials() {
                    let Some((fq, aq)) = audible_partial(&distributions[b], q) else {
                        continue;
                    };
                    let d = roughness(fp, ap, fq, aq);
                    total += d;
                    if accumulate {
                        distributions[a].partials_mut()[p].dissonance += d / 2.0;
                        distributions[b].partials_mut()[q].dissonance += d / 2.0;
                    }
                }
            }
        }
    }

    total
}

fn fundamental_of(dist: &OvertoneDistribution) -> (f64, f64) {
    (dist.fundamental_freq(), dist.fundamental_amp())
}

fn audible_partial(dist: &OvertoneDistribution, index: usize) -> Option<(f64, f64)> {
    let partial = dist.partial(index)?;
    if partial.is_muted() {
        return None;
    }
    Some((
        partial.freq() * dist.fundamental_freq(),
        partial.amp() * dist.fundamental_amp(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice(freq: f64, ratios: &[(f64, f64)]) -> OvertoneDistribution {
        let mut dist = OvertoneDistribution::from_ratios("v", 1.0, ratios.iter().copied()).unwrap();
        dist.set_fundamental(freq, 1.0).unwrap();
        dist
    }

    #[test]
    fn roughness_is_zero_at_unison() {
        for model in InterferenceModel::ALL {
            let d = model.roughness(440.0, 1.0, 440.0, 1.0);
            assert!(d.abs() < 1e-12, "{model} unison roughness {d}");
        }
    }

    #[test]
    fn roughness_is_symmetric() {
        for model in InterferenceModel::ALL {
            let a = model.roughness(300.0, 0.7, 320.0, 0.2);
            let b = model.roughness(320.0, 0.2, 300.0, 0.7);
            assert!((a - b).abs() < 1e-12, "{model}: {a} vs {b}");
        }
    }

    #[test]
    fn sethares_matches_closed_form() {
        let (f1, a1, f2, a2) = (200.0_f64, 1.0_f64, 210.0_f64, 0.5_f64);
        let s: f64 = 0.24 / (0.0207 * 200.0 + 18.96);
        let expected = 0.5 * (5.0 * (-3.51 * s * 10.0).exp() - 5.0 * (-5.75 * s * 10.0).exp());
        let got = InterferenceModel::Sethares.roughness(f1, a1, f2, a2);
        assert!((got - expected).abs() < 1e-12);
    }

    #[test]
    fn vassilakis_matches_closed_form() {
        let (f1, a1, f2, a2) = (200.0_f64, 1.0_f64, 210.0_f64, 0.5_f64);
        let s: f64 = 0.24 / (0.0207 * 200.0 + 18.96);
        let curve = 5.0 * (-3.51 * s * 10.0).exp() - 5.0 * (-5.75 * s * 10.0).exp();
        let expected = (0.5_f64).powf(0.1) * 0.5 * (2.0 * 0.5 / 1.5_f64).powf(3.11) * curve;
        let got = InterferenceModel::Vassilakis.roughness(f1, a1, f2, a2);
        assert!((got - expected).abs() < 1e-12);
    }

    #[test]
    fn roughness_peaks_near_quarter_critical_band() {
        let model = InterferenceModel::Sethares;
        let close = model.roughness(400.0, 1.0, 420.0, 1.0);
        let far = model.roughness(400.0, 1.0, 800.0, 1.0);
        assert!(close > far);
        assert!(far >= 0.0);
    }

    #[test]
    fn parse_model_names() {
        assert_eq!("sethares".parse(), Ok(InterferenceModel::Sethares));
        assert_eq!(" Vassilakis ".parse(), Ok(InterferenceModel::Vassilakis));
        assert_eq!(
            "plomp".parse::<InterferenceModel>(),
            Err(DissonanceError::UnknownModel("plomp".to_string()))
        );
    }

    #[test]
    fn two_bare_fundamentals_give_one_roughness() {
        let model = InterferenceModel::Sethares;
        let mut voices = vec![voice(300.0, &[]), voice(315.0, &[])];
        let d = model.evaluate(&mut voices, false);
        let expected = model.roughness(300.0, 1.0, 315.0, 1.0);
        assert!((d - expected).abs() < 1e-12);
    }

    #[test]
    fn partial_pairs_with_its_own_fundamental() {
        let model = InterferenceModel::Sethares;
        let mut voices = vec![voice(300.0, &[(1.05, 0.5)])];
        let d = model.evaluate(&mut voices, false);
        let expected = model.roughness(315.0, 0.5, 300.0, 1.0);
        assert!((d - expected).abs() < 1e-12);
    }

    #[test]
    fn partials_within_a_distribution_pair_once() {
        let model = InterferenceModel::Sethares;
        let mut voices = vec![voice(300.0, &[(2.0, 0.5), (2.1, 0.4)])];
        voices[0].mute_fundamental(true);
        let d = model.evaluate(&mut voices, false);
        let expected = model.roughness(600.0, 0.5, 630.0, 0.4);
        assert!((d - expected).abs() < 1e-12);
    }

    #[test]
    fn muted_distribution_contributes_nothing() {
        let model = InterferenceModel::Vassilakis;
        let mut voices = vec![voice(300.0, &[(2.0, 0.5)]), voice(310.0, &[(2.0, 0.5)])];
        voices[1].mute(true);
        let with_mute = model.evaluate(&mut voices, false);
        let mut alone = vec![voices[0].clone()];
        let single = model.evaluate(&mut alone, false);
        assert!((with_mute - single).abs() < 1e-12);
    }

    #[test]
    fn accumulation_splits_contributions_evenly() {
        let model = InterferenceModel::Sethares;
        let mut voices = vec![
            voice(300.0, &[(2.0, 0.5), (3.0, 0.3)]),
            voice(320.0, &[(2.0, 0.5), (3.0, 0.3)]),
        ];
        let total = model.evaluate(&mut voices, true);
        let attributed: f64 = voices.iter().map(OvertoneDistribution::total_dissonance).sum();
        assert!((total - attributed).abs() < 1e-9);

        // Accumulation must not change the total.
        for v in &mut voices {
            v.clear_partial_dissonances();
        }
        let plain = model.evaluate(&mut voices, false);
        assert!((total - plain).abs() < 1e-12);
        assert!(voices.iter().all(|v| v.total_dissonance() == 0.0));
    }

    #[test]
    fn accumulation_credits_the_right_partial() {
        let model = InterferenceModel::Sethares;
        let mut voices = vec![voice(300.0, &[(2.0, 0.5), (5.0, 0.3)]), voice(604.0, &[])];
        voices[0].mute_fundamental(true);
        voices[0].mute_partial(1, true).unwrap();
        let total = model.evaluate(&mut voices, true);

        let half = total / 2.0;
        assert!((voices[0].partial_dissonance(0).unwrap() - half).abs() < 1e-12);
        assert_eq!(voices[0].partial_dissonance(1), Some(0.0));
        assert!((voices[1].fundamental_dissonance() - half).abs() < 1e-12);
    }

    #[test]
    fn boxed_model_clones() {
        let model: Box<dyn DissonanceModel> = Box::new(InterferenceModel::Vassilakis);
        let copy = model.clone();
        assert_eq!(copy.name(), "Vassilakis");
    }
}
