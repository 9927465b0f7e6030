//! Factory overtone distributions bundled with the library.
//!
//! These are always available by name, without library files, and serve as
//! starting points for analysis configurations.

use dismal_core::OvertoneDistribution;

/// Names of every factory distribution.
pub static FACTORY_DISTRIBUTION_NAMES: &[&str] = &["harmonic", "odd_harmonic", "stretched", "sine"];

/// Highest partial number in the factory series.
const SERIES_LENGTH: u32 = 17;

/// Per-partial amplitude decay of the harmonic and stretched series.
const DECAY: f64 = 0.88;

/// Pseudo-octave of the stretched series.
const STRETCHED_OCTAVE: f64 = 2.1;

/// Get a factory distribution by name (case-insensitive). The fundamental
/// is left unset.
///
/// # Example
///
/// ```rust
/// use dismal_config::factory_distribution;
///
/// let harmonic = factory_distribution("harmonic").unwrap();
/// assert_eq!(harmonic.num_partials(), 16);
/// assert!(factory_distribution("kazoo").is_none());
/// ```
pub fn factory_distribution(name: &str) -> Option<OvertoneDistribution> {
    let name = name.to_lowercase();
    let ratios: Vec<(f64, f64)> = match name.as_str() {
        // Partial k at k×f0 with amplitude 0.88^(k-1).
        "harmonic" => (2..=SERIES_LENGTH)
            .map(|k| (f64::from(k), DECAY.powf(f64::from(k - 1))))
            .collect(),
        // Odd partials only, amplitude 1/k: a band-limited square wave.
        "odd_harmonic" => (3..=SERIES_LENGTH)
            .step_by(2)
            .map(|k| (f64::from(k), 1.0 / f64::from(k)))
            .collect(),
        // Harmonic k moved to 2.1^(log2 k): octaves become 2.1 pseudo-octaves.
        "stretched" => (2..SERIES_LENGTH)
            .map(|k| {
                let k = f64::from(k);
                (STRETCHED_OCTAVE.powf(k.log2()), DECAY.powf(k - 1.0))
            })
            .collect(),
        "sine" => Vec::new(),
        _ => return None,
    };
    OvertoneDistribution::from_ratios(name, 1.0, ratios).ok()
}

/// All factory distributions, in [`FACTORY_DISTRIBUTION_NAMES`] order.
pub fn factory_distributions() -> Vec<OvertoneDistribution> {
    FACTORY_DISTRIBUTION_NAMES
        .iter()
        .filter_map(|name| factory_distribution(name))
        .collect()
}

/// Check if a name refers to a factory distribution.
pub fn is_factory_distribution(name: &str) -> bool {
    FACTORY_DISTRIBUTION_NAMES
        .iter()
        .any(|n| n.eq_ignore_ascii_case(name))
}
