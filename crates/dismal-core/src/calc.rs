//! The dissonance calculator.
//!
//! [`DissonanceCalc`] owns the canonical distributions, one model, and an
//! ordered preprocessor chain. Every evaluation follows the same discipline:
//!
//! 1. copy the canonical distributions into a reusable working buffer,
//! 2. run each preprocessor over the working copy,
//! 3. reduce the working copy to a scalar with the model.
//!
//! Preprocessing never reaches the canonical distributions. The only state
//! merged back is per-entity attribution from an accumulating
//! [`calculate_dissonance`](DissonanceCalc::calculate_dissonance).
//!
//! # Example
//!
//! ```rust
//! use dismal_core::{
//!     DissonanceCalc, Direction, HearingRange, InterferenceModel,
//!     OvertoneDistribution, SweepAxes,
//! };
//!
//! let mut tone = OvertoneDistribution::from_ratios("tone", 1.0, [(2.0, 0.5), (3.0, 0.25)]).unwrap();
//! tone.set_fundamental(220.0, 1.0).unwrap();
//!
//! let mut calc = DissonanceCalc::new(InterferenceModel::Sethares);
//! calc.add_preprocessor(HearingRange::default());
//! calc.add_distribution(tone.clone());
//! calc.add_distribution(tone);
//! calc.set_range(220.0, 240.0).unwrap();
//! calc.set_num_steps(20).unwrap();
//! calc.set_axes(SweepAxes::TwoD { variable: 1 }).unwrap();
//!
//! let curve = calc.calculate_dissonance_map().unwrap().as_curve().unwrap().to_vec();
//! assert_eq!(curve.len(), 20);
//!
//! let minima = calc.optimize_2d(Direction::Minimize, None).unwrap();
//! assert!(!minima.is_empty());
//! ```

use core::ops::ControlFlow;

use crate::distribution::OvertoneDistribution;
use crate::error::{DissonanceError, Result, check_amplitude, check_frequency};
use crate::extrema::{Extremum, ExtremumList};
use crate::grid::{FrequencyGrid, FrequencyRange, StepMode};
use crate::model::{DissonanceModel, InterferenceModel};
use crate::optimize::{Direction, LocalSearch};
use crate::preprocess::Preprocessor;
use crate::sweep::{DissonanceMap, SweepAxes, no_progress};

/// Step count used until [`DissonanceCalc::set_num_steps`] is called.
pub const DEFAULT_NUM_STEPS: usize = 1000;

/// One distribution's fundamental in one chord. Either half may be unset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct ChordTone {
    freq: Option<f64>,
    amp: Option<f64>,
}

/// Orchestrates single, batch, sweep and extremum evaluations.
#[derive(Debug, Clone)]
pub struct DissonanceCalc {
    distributions: Vec<OvertoneDistribution>,
    model: Box<dyn DissonanceModel>,
    preprocessors: Vec<Box<dyn Preprocessor>>,
    accumulate: bool,

    chords: Vec<Vec<ChordTone>>,
    chord_dissonances: Vec<f64>,

    range: Option<FrequencyRange>,
    num_steps: usize,
    step_mode: StepMode,
    axes: SweepAxes,
    map: Option<DissonanceMap>,
    minima: ExtremumList,
    maxima: ExtremumList,

    working: Vec<OvertoneDistribution>,
}

impl Default for DissonanceCalc {
    fn default() -> Self {
        Self::new(InterferenceModel::default())
    }
}

impl DissonanceCalc {
    /// A calculator evaluating through `model`, with no distributions,
    /// preprocessors, chords, or range.
    pub fn new(model: impl DissonanceModel + 'static) -> Self {
        Self {
            distributions: Vec::new(),
            model: Box::new(model),
            preprocessors: Vec::new(),
            accumulate: false,
            chords: Vec::new(),
            chord_dissonances: Vec::new(),
            range: None,
            num_steps: DEFAULT_NUM_STEPS,
            step_mode: StepMode::Linear,
            axes: SweepAxes::default(),
            map: None,
            minima: ExtremumList::new(Direction::Minimize),
            maxima: ExtremumList::new(Direction::Maximize),
            working: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Model
    // ------------------------------------------------------------------

    /// Replace the model.
    pub fn set_model(&mut self, model: impl DissonanceModel + 'static) {
        #[cfg(feature = "tracing")]
        tracing::debug!("calc_model: {}", model.name());
        self.model = Box::new(model);
    }

    /// Replace the model with an already boxed one.
    pub fn set_boxed_model(&mut self, model: Box<dyn DissonanceModel>) {
        #[cfg(feature = "tracing")]
        tracing::debug!("calc_model: {}", model.name());
        self.model = model;
    }

    /// The active model.
    pub fn model(&self) -> &dyn DissonanceModel {
        &*self.model
    }

    // ------------------------------------------------------------------
    // Preprocessors
    // ------------------------------------------------------------------

    /// Append a preprocessor to the chain. Returns its index.
    pub fn add_preprocessor(&mut self, preprocessor: impl Preprocessor + 'static) -> usize {
        #[cfg(feature = "tracing")]
        tracing::debug!("calc_preprocess: add {}", preprocessor.name());
        self.preprocessors.push(Box::new(preprocessor));
        self.preprocessors.len() - 1
    }

    /// Move the preprocessor at `from` so it ends up at index `to`.
    pub fn move_preprocessor(&mut self, from: usize, to: usize) -> Result<()> {
        self.check_preprocessor(from)?;
        self.check_preprocessor(to)?;
        let preprocessor = self.preprocessors.remove(from);
        self.preprocessors.insert(to, preprocessor);
        Ok(())
    }

    /// Swap in a new preprocessor at `index`, returning the old one.
    pub fn replace_preprocessor(
        &mut self,
        index: usize,
        preprocessor: impl Preprocessor + 'static,
    ) -> Result<Box<dyn Preprocessor>> {
        self.check_preprocessor(index)?;
        Ok(core::mem::replace(
            &mut self.preprocessors[index],
            Box::new(preprocessor),
        ))
    }

    /// Remove the preprocessor at `index`.
    pub fn remove_preprocessor(&mut self, index: usize) -> Result<Box<dyn Preprocessor>> {
        self.check_preprocessor(index)?;
        #[cfg(feature = "tracing")]
        tracing::debug!("calc_preprocess: remove {index}");
        Ok(self.preprocessors.remove(index))
    }

    /// Remove every preprocessor.
    pub fn clear_preprocessors(&mut self) {
        self.preprocessors.clear();
    }

    /// The preprocessor at `index`.
    pub fn preprocessor(&self, index: usize) -> Option<&dyn Preprocessor> {
        self.preprocessors.get(index).map(|p| p.as_ref())
    }

    /// Name of the preprocessor at `index`.
    pub fn preprocessor_name(&self, index: usize) -> Option<&str> {
        self.preprocessor(index).map(|p| p.name())
    }

    /// Length of the chain.
    pub fn num_preprocessors(&self) -> usize {
        self.preprocessors.len()
    }

    fn check_preprocessor(&self, index: usize) -> Result<()> {
        if index < self.preprocessors.len() {
            Ok(())
        } else {
            Err(DissonanceError::PreprocessorOutOfBounds {
                index,
                len: self.preprocessors.len(),
            })
        }
    }

    // ------------------------------------------------------------------
    // Distributions
    // ------------------------------------------------------------------

    /// Append a distribution. Every chord gains an empty slot for it.
    pub fn add_distribution(&mut self, distribution: OvertoneDistribution) -> usize {
        self.distributions.push(distribution);
        self.chord_dissonances.clear();
        for chord in &mut self.chords {
            chord.push(ChordTone::default());
        }
        self.distributions.len() - 1
    }

    /// Remove a distribution together with its slot in every chord.
    pub fn remove_distribution(&mut self, index: usize) -> Result<OvertoneDistribution> {
        self.check_distribution(index)?;
        for chord in &mut self.chords {
            chord.remove(index);
        }
        self.chord_dissonances.clear();
        Ok(self.distributions.remove(index))
    }

    /// Remove every distribution and every chord slot.
    pub fn clear_distributions(&mut self) {
        self.distributions.clear();
        for chord in &mut self.chords {
            chord.clear();
        }
        self.chord_dissonances.clear();
    }

    /// The canonical distributions.
    pub fn distributions(&self) -> &[OvertoneDistribution] {
        &self.distributions
    }

    /// A canonical distribution.
    pub fn distribution(&self, index: usize) -> Option<&OvertoneDistribution> {
        self.distributions.get(index)
    }

    /// Mutable access to a canonical distribution.
    pub fn distribution_mut(&mut self, index: usize) -> Option<&mut OvertoneDistribution> {
        self.distributions.get_mut(index)
    }

    /// Number of distributions.
    pub fn num_distributions(&self) -> usize {
        self.distributions.len()
    }

    /// The working copy left by the most recent evaluation, after preprocessing.
    pub fn preprocessed_distributions(&self) -> &[OvertoneDistribution] {
        &self.working
    }

    fn check_distribution(&self, index: usize) -> Result<()> {
        if index < self.distributions.len() {
            Ok(())
        } else {
            Err(DissonanceError::DistributionOutOfBounds {
                index,
                len: self.distributions.len(),
            })
        }
    }

    // ------------------------------------------------------------------
    // Single evaluation
    // ------------------------------------------------------------------

    /// Enable or disable per-entity attribution in [`calculate_dissonance`](Self::calculate_dissonance).
    pub fn set_accumulate(&mut self, accumulate: bool) {
        self.accumulate = accumulate;
    }

    /// Whether single evaluations accumulate attribution.
    pub fn accumulate(&self) -> bool {
        self.accumulate
    }

    /// Total dissonance of the canonical distributions.
    ///
    /// When accumulating, the canonical running totals are zeroed first and
    /// receive the attribution computed on the working copy afterwards.
    pub fn calculate_dissonance(&mut self) -> f64 {
        if self.accumulate {
            for dist in &mut self.distributions {
                dist.clear_partial_dissonances();
            }
        }

        self.working.clone_from(&self.distributions);
        let dissonance = evaluate(
            &*self.model,
            &self.preprocessors,
            &mut self.working,
            self.accumulate,
        );

        if self.accumulate {
            merge_attribution(&mut self.distributions, &self.working);
        }
        dissonance
    }

    // ------------------------------------------------------------------
    // Chords
    // ------------------------------------------------------------------

    /// Append a chord of `(freq, amp)` fundamentals, one per distribution in
    /// order. Distributions past the end of `tones` get empty slots.
    /// Returns the chord's index. Earlier chord results are discarded.
    pub fn add_chord(&mut self, tones: &[(f64, f64)]) -> Result<usize> {
        if tones.len() > self.distributions.len() {
            return Err(DissonanceError::DistributionOutOfBounds {
                index: tones.len() - 1,
                len: self.distributions.len(),
            });
        }
        for &(freq, amp) in tones {
            check_frequency(freq)?;
            check_amplitude(amp)?;
        }

        let mut chord = vec![ChordTone::default(); self.distributions.len()];
        for (slot, &(freq, amp)) in chord.iter_mut().zip(tones) {
            *slot = ChordTone {
                freq: Some(freq),
                amp: Some(amp),
            };
        }
        self.chords.push(chord);
        self.chord_dissonances.clear();
        Ok(self.chords.len() - 1)
    }

    /// Set one distribution's fundamental frequency in a chord.
    pub fn set_freq_in_chord(&mut self, chord: usize, distribution: usize, freq: f64) -> Result<()> {
        check_frequency(freq)?;
        self.chord_tone_mut(chord, distribution)?.freq = Some(freq);
        self.chord_dissonances.clear();
        Ok(())
    }

    /// Set one distribution's fundamental amplitude in a chord.
    pub fn set_amp_in_chord(&mut self, chord: usize, distribution: usize, amp: f64) -> Result<()> {
        check_amplitude(amp)?;
        self.chord_tone_mut(chord, distribution)?.amp = Some(amp);
        self.chord_dissonances.clear();
        Ok(())
    }

    /// A distribution's fundamental frequency in a chord, if set.
    pub fn freq_in_chord(&self, chord: usize, distribution: usize) -> Option<f64> {
        self.chords.get(chord)?.get(distribution)?.freq
    }

    /// A distribution's fundamental amplitude in a chord, if set.
    pub fn amp_in_chord(&self, chord: usize, distribution: usize) -> Option<f64> {
        self.chords.get(chord)?.get(distribution)?.amp
    }

    /// Remove a chord and its result, if one was computed.
    pub fn remove_chord(&mut self, chord: usize) -> Result<()> {
        if chord >= self.chords.len() {
            return Err(DissonanceError::ChordOutOfBounds {
                index: chord,
                len: self.chords.len(),
            });
        }
        self.chords.remove(chord);
        if chord < self.chord_dissonances.len() {
            self.chord_dissonances.remove(chord);
        }
        Ok(())
    }

    /// Remove every chord and every result.
    pub fn clear_chords(&mut self) {
        self.chords.clear();
        self.chord_dissonances.clear();
    }

    /// Number of chords.
    pub fn num_chords(&self) -> usize {
        self.chords.len()
    }

    /// Evaluate every chord. Result `i` belongs to chord `i`.
    ///
    /// Each chord overwrites every distribution's fundamental on a fresh
    /// working copy; nothing accumulates. Fails without evaluating anything
    /// if any chord slot is incomplete.
    pub fn calculate_dissonances(&mut self) -> Result<&[f64]> {
        let mut fundamentals = Vec::with_capacity(self.chords.len());
        for (c, chord) in self.chords.iter().enumerate() {
            let tones = chord
                .iter()
                .enumerate()
                .map(|(d, tone)| match (tone.freq, tone.amp) {
                    (Some(freq), Some(amp)) => Ok((freq, amp)),
                    _ => Err(DissonanceError::IncompleteChord {
                        chord: c,
                        distribution: d,
                    }),
                })
                .collect::<Result<Vec<_>>>()?;
            fundamentals.push(tones);
        }

        let mut results = Vec::with_capacity(fundamentals.len());
        for tones in &fundamentals {
            self.working.clone_from(&self.distributions);
            for (dist, &(freq, amp)) in self.working.iter_mut().zip(tones) {
                let fundamental = dist.fundamental_mut();
                fundamental.freq = freq;
                fundamental.amp = amp;
            }
            results.push(evaluate(
                &*self.model,
                &self.preprocessors,
                &mut self.working,
                false,
            ));
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("calc_chords: evaluated {} chords", results.len());
        self.chord_dissonances = results;
        Ok(self.chord_dissonances.as_slice())
    }

    /// Results of the last [`calculate_dissonances`](Self::calculate_dissonances).
    ///
    /// Emptied when a chord is added or edited, or a distribution is added or
    /// removed, until it runs again.
    pub fn chord_dissonances(&self) -> &[f64] {
        &self.chord_dissonances
    }

    /// Result for one chord.
    pub fn chord_dissonance(&self, chord: usize) -> Option<f64> {
        self.chord_dissonances.get(chord).copied()
    }

    fn chord_tone_mut(&mut self, chord: usize, distribution: usize) -> Result<&mut ChordTone> {
        let len = self.chords.len();
        let row = self
            .chords
            .get_mut(chord)
            .ok_or(DissonanceError::ChordOutOfBounds { index: chord, len })?;
        let len = row.len();
        row.get_mut(distribution)
            .ok_or(DissonanceError::DistributionOutOfBounds {
                index: distribution,
                len,
            })
    }

    // ------------------------------------------------------------------
    // Sweep configuration
    // ------------------------------------------------------------------

    /// Set the swept frequency range. Requires `0 < start < end`.
    pub fn set_range(&mut self, start: f64, end: f64) -> Result<()> {
        self.range = Some(FrequencyRange::new(start, end)?);
        Ok(())
    }

    /// The swept range, if set.
    pub fn range(&self) -> Option<FrequencyRange> {
        self.range
    }

    /// Set the number of grid points per axis. Requires `num_steps > 1`.
    pub fn set_num_steps(&mut self, num_steps: usize) -> Result<()> {
        if num_steps <= 1 {
            return Err(DissonanceError::InvalidStepCount(num_steps));
        }
        self.num_steps = num_steps;
        Ok(())
    }

    /// Grid points per axis.
    pub fn num_steps(&self) -> usize {
        self.num_steps
    }

    /// Choose linear or logarithmic stepping.
    pub fn set_step_mode(&mut self, mode: StepMode) {
        self.step_mode = mode;
    }

    /// Linear or logarithmic stepping.
    pub fn step_mode(&self) -> StepMode {
        self.step_mode
    }

    /// Choose which distributions sweep. Indices must be in bounds, and a 3D
    /// sweep needs two different distributions.
    pub fn set_axes(&mut self, axes: SweepAxes) -> Result<()> {
        self.check_axes(axes)?;
        self.axes = axes;
        Ok(())
    }

    /// The sweep axes.
    pub fn axes(&self) -> SweepAxes {
        self.axes
    }

    /// The grid implied by the current range, step count and step mode.
    pub fn grid(&self) -> Result<FrequencyGrid> {
        let range = self
            .range
            .ok_or(DissonanceError::NotReady("no frequency range set"))?;
        FrequencyGrid::new(range, self.num_steps, self.step_mode)
    }

    /// Whether a sweep or extremum search can run now.
    pub fn is_ready_to_process(&self) -> bool {
        self.readiness().is_ok()
    }

    /// Like [`is_ready_to_process`](Self::is_ready_to_process), but says what is missing.
    pub fn readiness(&self) -> Result<FrequencyGrid> {
        if self.distributions.len() < 2 {
            return Err(DissonanceError::NotReady("at least two distributions are required"));
        }
        let grid = self.grid()?;
        self.check_axes(self.axes)?;
        let all_positive = self.distributions.iter().all(|d| {
            d.fundamental_freq() > 0.0 && d.partials().iter().all(|p| p.freq() > 0.0)
        });
        if !all_positive {
            return Err(DissonanceError::NotReady("a fundamental frequency is unset"));
        }
        let all_audible = self.distributions.iter().all(|d| {
            let amp = d.fundamental_amp();
            amp.is_finite() && amp > 0.0
        });
        if !all_audible {
            return Err(DissonanceError::NotReady("a fundamental amplitude is unset"));
        }
        Ok(grid)
    }

    fn check_axes(&self, axes: SweepAxes) -> Result<()> {
        let index = axes.max_index();
        self.check_distribution(index)?;
        match axes {
            SweepAxes::ThreeD { x, y } if x == y => Err(DissonanceError::SharedAxis(x)),
            _ => Ok(()),
        }
    }

    // ------------------------------------------------------------------
    // Dissonance maps
    // ------------------------------------------------------------------

    /// Sweep the configured axes and store the resulting map.
    pub fn calculate_dissonance_map(&mut self) -> Result<&DissonanceMap> {
        self.calculate_dissonance_map_with(no_progress)
    }

    /// Sweep with a progress callback called after every grid point.
    ///
    /// Returning [`ControlFlow::Break`] stops the sweep with
    /// [`DissonanceError::Cancelled`]; the previously stored map is kept.
    pub fn calculate_dissonance_map_with<P>(&mut self, mut progress: P) -> Result<&DissonanceMap>
    where
        P: FnMut(usize, usize) -> ControlFlow<()>,
    {
        let grid = self.readiness()?;
        let n = grid.num_steps();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "calc_sweep: {}D, {n} steps, step size {}",
            self.axes.dimensions(),
            grid.step_size()
        );

        let mut point = |moves: &[(usize, f64)]| {
            self.working.clone_from(&self.distributions);
            for &(index, freq) in moves {
                self.working[index].fundamental_mut().freq = freq;
            }
            evaluate(&*self.model, &self.preprocessors, &mut self.working, false)
        };

        let map = match self.axes {
            SweepAxes::TwoD { variable } => {
                let mut values = Vec::with_capacity(n);
                for (i, freq) in grid.frequencies().enumerate() {
                    values.push(point(&[(variable, freq)]));
                    check_progress(&mut progress, i + 1, n)?;
                }
                DissonanceMap::TwoD(values)
            }
            SweepAxes::ThreeD { x, y } => {
                let total = n * n;
                let mut rows = Vec::with_capacity(n);
                for (i, x_freq) in grid.frequencies().enumerate() {
                    let mut row = Vec::with_capacity(n);
                    for (j, y_freq) in grid.frequencies().enumerate() {
                        row.push(point(&[(x, x_freq), (y, y_freq)]));
                        check_progress(&mut progress, i * n + j + 1, total)?;
                    }
                    rows.push(row);
                }
                DissonanceMap::ThreeD(rows)
            }
        };

        #[cfg(feature = "tracing")]
        tracing::debug!("calc_sweep: done");
        Ok(&*self.map.insert(map))
    }

    /// The last computed map.
    pub fn dissonance_map(&self) -> Option<&DissonanceMap> {
        self.map.as_ref()
    }

    /// Value of a 2D map at `step`.
    pub fn dissonance_at_step(&self, step: usize) -> Option<f64> {
        self.map.as_ref()?.as_curve()?.get(step).copied()
    }

    /// Value of a 3D map at `(x_step, y_step)`.
    pub fn dissonance_at_step_2d(&self, x_step: usize, y_step: usize) -> Option<f64> {
        self.map
            .as_ref()?
            .as_surface()?
            .get(x_step)?
            .get(y_step)
            .copied()
    }

    /// Move the 2D variable distribution to `freq` and re-evaluate.
    ///
    /// The canonical distribution keeps the new fundamental.
    pub fn dissonance_at_freq(&mut self, freq: f64) -> Result<f64> {
        let SweepAxes::TwoD { variable } = self.axes else {
            return Err(DissonanceError::NotReady("axes are not two-dimensional"));
        };
        self.check_distribution(variable)?;
        self.distributions[variable].set_fundamental_freq(freq)?;
        Ok(self.calculate_dissonance())
    }

    /// Move both 3D axis distributions and re-evaluate.
    ///
    /// The canonical distributions keep the new fundamentals.
    pub fn dissonance_at_freqs(&mut self, x_freq: f64, y_freq: f64) -> Result<f64> {
        let SweepAxes::ThreeD { x, y } = self.axes else {
            return Err(DissonanceError::NotReady("axes are not three-dimensional"));
        };
        self.check_axes(self.axes)?;
        check_frequency(x_freq)?;
        check_frequency(y_freq)?;
        self.distributions[x].set_fundamental_freq(x_freq)?;
        self.distributions[y].set_fundamental_freq(y_freq)?;
        Ok(self.calculate_dissonance())
    }

    /// Frequency at a (possibly fractional) grid step.
    pub fn frequency_at_step(&self, step: f64) -> Result<f64> {
        Ok(self.grid()?.frequency_at_step(step))
    }

    /// Ratio of the frequency at `step` to the range start.
    pub fn freq_ratio_at_step(&self, step: f64) -> Result<f64> {
        Ok(self.grid()?.freq_ratio_at_step(step))
    }

    /// Fractional grid step of `freq`.
    pub fn step_of_frequency(&self, freq: f64) -> Result<f64> {
        Ok(self.grid()?.step_of_frequency(freq))
    }

    // ------------------------------------------------------------------
    // Extremum search
    // ------------------------------------------------------------------

    /// Locate minima or maxima of dissonance against the 2D variable
    /// distribution's fundamental.
    ///
    /// Seeds always scan the configured range. `bounds` confines the local
    /// optimizer, so seeds outside it start from the nearest bound; by
    /// default the configured range is used.
    pub fn optimize_2d(
        &mut self,
        direction: Direction,
        bounds: Option<FrequencyRange>,
    ) -> Result<&ExtremumList> {
        self.optimize_2d_with(direction, bounds, no_progress)
    }

    /// Extremum search with a progress callback called after every seed.
    ///
    /// Returning [`ControlFlow::Break`] stops the search with
    /// [`DissonanceError::Cancelled`]; the previously stored list is kept.
    pub fn optimize_2d_with<P>(
        &mut self,
        direction: Direction,
        bounds: Option<FrequencyRange>,
        mut progress: P,
    ) -> Result<&ExtremumList>
    where
        P: FnMut(usize, usize) -> ControlFlow<()>,
    {
        let grid = self.readiness()?;
        let SweepAxes::TwoD { variable } = self.axes else {
            return Err(DissonanceError::NotReady(
                "extremum search needs two-dimensional axes",
            ));
        };
        let bounds = bounds.unwrap_or(grid.range());
        let seeds = grid.range().seeds();
        let total = seeds.len();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "calc_optimize: {direction:?} within [{}, {}], {total} seeds",
            bounds.start(),
            bounds.end()
        );

        let mut objective = |freq: f64| {
            self.working.clone_from(&self.distributions);
            self.working[variable].fundamental_mut().freq = freq;
            evaluate(&*self.model, &self.preprocessors, &mut self.working, false)
        };

        let search = LocalSearch::new(bounds.start(), bounds.end());
        let mut found = ExtremumList::new(direction);
        for (i, &seed) in seeds.iter().enumerate() {
            let optimum = search.optimize(direction, seed, &mut objective);
            found.insert(Extremum {
                frequency: optimum.x,
                dissonance: optimum.value,
            });
            check_progress(&mut progress, i + 1, total)?;
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("calc_optimize: {} extrema", found.len());

        let slot = match direction {
            Direction::Minimize => &mut self.minima,
            Direction::Maximize => &mut self.maxima,
        };
        *slot = found;
        Ok(&*slot)
    }

    /// Extrema found by the last search in `direction`.
    pub fn extrema(&self, direction: Direction) -> &ExtremumList {
        match direction {
            Direction::Minimize => &self.minima,
            Direction::Maximize => &self.maxima,
        }
    }

    /// Located minima.
    pub fn minima(&self) -> &ExtremumList {
        &self.minima
    }

    /// Located maxima.
    pub fn maxima(&self) -> &ExtremumList {
        &self.maxima
    }

    /// Frequencies of the extrema found in `direction`.
    pub fn optimal_freqs(&self, direction: Direction) -> Vec<f64> {
        self.extrema(direction).frequencies()
    }
}

/// Preprocess `working` in chain order, then reduce it with `model`.
fn evaluate(
    model: &dyn DissonanceModel,
    preprocessors: &[Box<dyn Preprocessor>],
    working: &mut [OvertoneDistribution],
    accumulate: bool,
) -> f64 {
    for preprocessor in preprocessors {
        preprocessor.process(working);
    }
    model.evaluate(working, accumulate)
}

/// Copy running totals from the working copy onto the canonical distributions.
fn merge_attribution(canonical: &mut [OvertoneDistribution], working: &[OvertoneDistribution]) {
    for (dest, src) in canonical.iter_mut().zip(working) {
        dest.fundamental_mut().dissonance = src.fundamental().dissonance();
        for (partial, worked) in dest.partials_mut().iter_mut().zip(src.partials()) {
            partial.dissonance = worked.dissonance();
        }
    }
}

fn check_progress<P>(progress: &mut P, done: usize, total: usize) -> Result<()>
where
    P: FnMut(usize, usize) -> ControlFlow<()>,
{
    match progress(done, total) {
        ControlFlow::Continue(()) => Ok(()),
        ControlFlow::Break(()) => {
            #[cfg(feature = "tracing")]
            tracing::debug!("calc_cancel: {done}/{total}");
            Err(DissonanceError::Cancelled {
                completed: done,
                total,
            })
        }
    }
}
