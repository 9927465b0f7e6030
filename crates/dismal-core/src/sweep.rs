//! Sweep axes and the dissonance maps they produce.

use core::ops::ControlFlow;

/// Which distributions move during a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SweepAxes {
    /// One distribution's fundamental sweeps the range; the result is a curve.
    TwoD {
        /// Index of the swept distribution.
        variable: usize,
    },
    /// Two distributions sweep independently; the result is a surface.
    ThreeD {
        /// Distribution swept by the outer loop (matrix rows).
        x: usize,
        /// Distribution swept by the inner loop (matrix columns).
        y: usize,
    },
}

impl Default for SweepAxes {
    fn default() -> Self {
        Self::TwoD { variable: 1 }
    }
}

impl SweepAxes {
    /// 2 for a curve, 3 for a surface.
    pub fn dimensions(&self) -> usize {
        match self {
            Self::TwoD { .. } => 2,
            Self::ThreeD { .. } => 3,
        }
    }

    /// The largest distribution index the axes refer to.
    pub(crate) fn max_index(&self) -> usize {
        match *self {
            Self::TwoD { variable } => variable,
            Self::ThreeD { x, y } => x.max(y),
        }
    }
}

/// Result of a dissonance-map sweep.
#[derive(Debug, Clone, PartialEq)]
pub enum DissonanceMap {
    /// One value per step.
    TwoD(Vec<f64>),
    /// `map[x_step][y_step]`.
    ThreeD(Vec<Vec<f64>>),
}

impl DissonanceMap {
    /// 2 or 3.
    pub fn dimensions(&self) -> usize {
        match self {
            Self::TwoD(_) => 2,
            Self::ThreeD(_) => 3,
        }
    }

    /// Steps along each axis.
    pub fn num_steps(&self) -> usize {
        match self {
            Self::TwoD(values) => values.len(),
            Self::ThreeD(rows) => rows.len(),
        }
    }

    /// The curve, if this is a 2D map.
    pub fn as_curve(&self) -> Option<&[f64]> {
        match self {
            Self::TwoD(values) => Some(values),
            Self::ThreeD(_) => None,
        }
    }

    /// The surface, if this is a 3D map.
    pub fn as_surface(&self) -> Option<&[Vec<f64>]> {
        match self {
            Self::TwoD(_) => None,
            Self::ThreeD(rows) => Some(rows),
        }
    }

    /// Smallest and largest value in the map.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        let values: Box<dyn Iterator<Item = f64> + '_> = match self {
            Self::TwoD(values) => Box::new(values.iter().copied()),
            Self::ThreeD(rows) => Box::new(rows.iter().flatten().copied()),
        };
        values.fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}

/// A progress callback that never cancels.
pub fn no_progress(_done: usize, _total: usize) -> ControlFlow<()> {
    ControlFlow::Continue(())
}
