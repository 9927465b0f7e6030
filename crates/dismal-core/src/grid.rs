//! Frequency ranges and stepped grids for dissonance maps.
//!
//! A grid has `num_steps` points starting at the range start. Linear grids
//! add a fixed step, `(end - start) / num_steps`. Logarithmic grids multiply
//! by a fixed ratio, `(end / start)^(1 / num_steps)`, which spaces points
//! evenly in pitch rather than in Hz. In both cases the last point is one
//! step short of `end`.
//!
//! # Example
//!
//! ```rust
//! use dismal_core::{FrequencyGrid, FrequencyRange, StepMode};
//!
//! let range = FrequencyRange::new(100.0, 200.0).unwrap();
//! let linear = FrequencyGrid::new(range, 10, StepMode::Linear).unwrap();
//! assert_eq!(linear.step_size(), 10.0);
//! assert_eq!(linear.frequency_at_step(9.0), 190.0);
//!
//! let log = FrequencyGrid::new(range, 10, StepMode::Logarithmic).unwrap();
//! assert!((log.step_size() - 2.0_f64.powf(0.1)).abs() < 1e-12);
//! ```

use crate::error::{DissonanceError, Result};

/// Multiplicative spacing between extremum-search seeds.
pub const SEED_RATIO: f64 = 1.0008;

/// A frequency interval `[start, end]` in Hz with `0 < start < end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyRange {
    start: f64,
    end: f64,
}

impl FrequencyRange {
    /// Create a range. Requires `0 < start < end`, both finite.
    pub fn new(start: f64, end: f64) -> Result<Self> {
        if start.is_finite() && end.is_finite() && start > 0.0 && end > start {
            Ok(Self { start, end })
        } else {
            Err(DissonanceError::InvalidRange { start, end })
        }
    }

    /// Lower bound in Hz.
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Upper bound in Hz.
    pub fn end(&self) -> f64 {
        self.end
    }

    /// Whether `freq` lies in `[start, end]`.
    pub fn contains(&self, freq: f64) -> bool {
        (self.start..=self.end).contains(&freq)
    }

    /// Search seeds: `start, start*1.0008, start*1.0008^2, ...` while below `end`.
    pub fn seeds(&self) -> Vec<f64> {
        let mut seeds = Vec::new();
        let mut freq = self.start;
        while freq < self.end {
            seeds.push(freq);
            freq *= SEED_RATIO;
        }
        seeds
    }
}

/// How consecutive grid points relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StepMode {
    /// Constant difference in Hz.
    #[default]
    Linear,
    /// Constant frequency ratio.
    Logarithmic,
}

/// A validated range, step count, and step mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyGrid {
    range: FrequencyRange,
    num_steps: usize,
    mode: StepMode,
    step_size: f64,
}

impl FrequencyGrid {
    /// Create a grid. Requires `num_steps > 1`.
    pub fn new(range: FrequencyRange, num_steps: usize, mode: StepMode) -> Result<Self> {
        if num_steps <= 1 {
            return Err(DissonanceError::InvalidStepCount(num_steps));
        }
        let step_size = match mode {
            StepMode::Linear => (range.end - range.start) / num_steps as f64,
            StepMode::Logarithmic => (range.end / range.start).powf(1.0 / num_steps as f64),
        };
        Ok(Self {
            range,
            num_steps,
            mode,
            step_size,
        })
    }

    /// The swept range.
    pub fn range(&self) -> FrequencyRange {
        self.range
    }

    /// Number of grid points.
    pub fn num_steps(&self) -> usize {
        self.num_steps
    }

    /// Linear or logarithmic.
    pub fn mode(&self) -> StepMode {
        self.mode
    }

    /// Hz added per step (linear) or ratio applied per step (logarithmic).
    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    /// Advance `freq` by one step.
    pub fn increment(&self, freq: f64) -> f64 {
        match self.mode {
            StepMode::Linear => freq + self.step_size,
            StepMode::Logarithmic => freq * self.step_size,
        }
    }

    /// Frequency at a (possibly fractional) step.
    pub fn frequency_at_step(&self, step: f64) -> f64 {
        match self.mode {
            StepMode::Linear => self.range.start + self.step_size * step,
            StepMode::Logarithmic => self.range.start * self.step_size.powf(step),
        }
    }

    /// Ratio of the frequency at `step` to the range start.
    pub fn freq_ratio_at_step(&self, step: f64) -> f64 {
        self.frequency_at_step(step) / self.range.start
    }

    /// Fractional step at which `freq` would fall.
    pub fn step_of_frequency(&self, freq: f64) -> f64 {
        match self.mode {
            StepMode::Linear => (freq - self.range.start) / self.step_size,
            StepMode::Logarithmic => (freq / self.range.start).ln() / self.step_size.ln(),
        }
    }

    /// All grid frequencies, in order.
    pub fn frequencies(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.num_steps).map(|i| self.frequency_at_step(i as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range() -> FrequencyRange {
        FrequencyRange::new(100.0, 200.0).unwrap()
    }

    #[test]
    fn range_rejects_bad_bounds() {
        assert!(FrequencyRange::new(0.0, 100.0).is_err());
        assert!(FrequencyRange::new(200.0, 100.0).is_err());
        assert!(FrequencyRange::new(100.0, 100.0).is_err());
        assert!(FrequencyRange::new(f64::NAN, 100.0).is_err());
    }

    #[test]
    fn step_count_must_exceed_one() {
        assert_eq!(
            FrequencyGrid::new(range(), 1, StepMode::Linear),
            Err(DissonanceError::InvalidStepCount(1))
        );
        assert!(FrequencyGrid::new(range(), 0, StepMode::Logarithmic).is_err());
    }

    #[test]
    fn linear_step_size() {
        let grid = FrequencyGrid::new(range(), 10, StepMode::Linear).unwrap();
        assert_eq!(grid.step_size(), 10.0);
        assert_eq!(grid.increment(100.0), 110.0);
        let freqs: Vec<f64> = grid.frequencies().collect();
        assert_eq!(freqs.len(), 10);
        assert_eq!(freqs[0], 100.0);
        assert_eq!(freqs[9], 190.0);
    }

    #[test]
    fn logarithmic_step_size() {
        let grid = FrequencyGrid::new(range(), 10, StepMode::Logarithmic).unwrap();
        assert!((grid.step_size() - 1.071_773_462_536_293).abs() < 1e-12);
        let last = grid.frequency_at_step(9.0);
        assert!((last - 100.0 * grid.step_size().powi(9)).abs() < 1e-9);
        assert!((grid.frequency_at_step(10.0) - 200.0).abs() < 1e-9);
    }

    #[test]
    fn step_of_frequency_inverts_frequency_at_step() {
        for mode in [StepMode::Linear, StepMode::Logarithmic] {
            let grid = FrequencyGrid::new(range(), 64, mode).unwrap();
            for step in [0.0, 1.5, 17.0, 63.0] {
                let freq = grid.frequency_at_step(step);
                assert!((grid.step_of_frequency(freq) - step).abs() < 1e-9, "{mode:?} {step}");
            }
            assert!((grid.freq_ratio_at_step(0.0) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn seeds_span_the_range() {
        let seeds = range().seeds();
        assert_eq!(seeds[0], 100.0);
        assert!(*seeds.last().unwrap() < 200.0);
        assert!(*seeds.last().unwrap() * SEED_RATIO >= 200.0);
        let expected = (2.0_f64.ln() / SEED_RATIO.ln()).ceil() as usize;
        assert_eq!(seeds.len(), expected);
    }
}
