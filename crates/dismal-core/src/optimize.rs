//! Bound-constrained, derivative-free 1-D local search.
//!
//! [`LocalSearch`] is a compass (pattern) search: from the current point it
//! probes one step to each side, moves when a probe strictly improves the
//! objective, and halves the step otherwise. It stops once the step falls
//! below the absolute tolerance or the evaluation budget runs out.
//!
//! A search holds no state between calls to [`LocalSearch::optimize`].

use crate::grid::SEED_RATIO;

/// Default absolute tolerance on the argument, in Hz.
pub const DEFAULT_XTOL_ABS: f64 = 1e-4;
/// Default evaluation budget per search.
pub const DEFAULT_MAX_EVALUATIONS: usize = 10_000;

/// Whether a search looks for minima or maxima.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Lower dissonance is better (consonant points).
    Minimize,
    /// Higher dissonance is better (dissonant points).
    Maximize,
}

impl Direction {
    /// Whether `candidate` is strictly better than `incumbent`.
    pub fn is_better(self, candidate: f64, incumbent: f64) -> bool {
        match self {
            Self::Minimize => candidate < incumbent,
            Self::Maximize => candidate > incumbent,
        }
    }

    /// Whether `candidate` is at least as good as `incumbent`.
    pub fn is_at_least_as_good(self, candidate: f64, incumbent: f64) -> bool {
        !self.is_better(incumbent, candidate)
    }
}

/// A located optimum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Optimum {
    /// Argument of the optimum.
    pub x: f64,
    /// Objective value at `x`.
    pub value: f64,
    /// Objective evaluations spent.
    pub evaluations: usize,
}

/// Compass search over `[lower, upper]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalSearch {
    lower: f64,
    upper: f64,
    xtol_abs: f64,
    max_evaluations: usize,
}

impl LocalSearch {
    /// Search within `[lower, upper]` with default tolerance and budget.
    pub fn new(lower: f64, upper: f64) -> Self {
        Self {
            lower: lower.min(upper),
            upper: upper.max(lower),
            xtol_abs: DEFAULT_XTOL_ABS,
            max_evaluations: DEFAULT_MAX_EVALUATIONS,
        }
    }

    /// Set the absolute argument tolerance.
    pub fn with_xtol(mut self, xtol_abs: f64) -> Self {
        self.xtol_abs = xtol_abs;
        self
    }

    /// Set the evaluation budget (at least one evaluation always runs).
    pub fn with_max_evaluations(mut self, max_evaluations: usize) -> Self {
        self.max_evaluations = max_evaluations.max(1);
        self
    }

    /// Lower bound.
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// Upper bound.
    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// Refine `seed` towards a local optimum of `objective` in `direction`.
    ///
    /// The seed is clamped into bounds first. The initial step is the seed
    /// spacing used by extremum search, `seed * (1.0008 - 1)`.
    pub fn optimize<F>(&self, direction: Direction, seed: f64, mut objective: F) -> Optimum
    where
        F: FnMut(f64) -> f64,
    {
        let mut x = seed.clamp(self.lower, self.upper);
        let mut value = objective(x);
        let mut evaluations = 1;
        let mut step = (x * (SEED_RATIO - 1.0)).abs().max(self.xtol_abs);

        while step >= self.xtol_abs && evaluations < self.max_evaluations {
            let mut moved = false;
            for candidate in [x + step, x - step] {
                let candidate = candidate.clamp(self.lower, self.upper);
                if candidate == x || evaluations >= self.max_evaluations {
                    continue;
                }
                let candidate_value = objective(candidate);
                evaluations += 1;
                if direction.is_better(candidate_value, value) {
                    x = candidate;
                    value = candidate_value;
                    moved = true;
                    break;
                }
            }
            if !moved {
                step *= 0.5;
            }
        }

        Optimum {
            x,
            value,
            evaluations,
        }
    }
}
