//! Sorted, deduplicated lists of located extrema.

use crate::optimize::Direction;

/// Relative tolerance under which two extrema count as the same point (±0.1%).
pub const DUPLICATE_TOLERANCE: f64 = 1.001;

/// A locally optimal tuning point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extremum {
    /// Frequency of the variable distribution's fundamental, in Hz.
    pub frequency: f64,
    /// Dissonance at that frequency.
    pub dissonance: f64,
}

/// Extrema for one search direction, ascending by frequency.
///
/// No two entries lie within [`DUPLICATE_TOLERANCE`] of each other. On a
/// collision the entry that scores better for the list's direction survives;
/// ties keep the entry already present.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtremumList {
    direction: Direction,
    entries: Vec<Extremum>,
}

impl ExtremumList {
    /// An empty list for `direction`.
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            entries: Vec::new(),
        }
    }

    /// The list's optimization direction.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Insert a candidate. Returns `true` if it was kept.
    pub fn insert(&mut self, candidate: Extremum) -> bool {
        let f = candidate.frequency;
        if self.entries.iter().any(|e| e.frequency == f) {
            return false;
        }

        let close = |e: &Extremum| is_close(e.frequency, f);
        if self
            .entries
            .iter()
            .filter(|e| close(e))
            .any(|e| self.direction.is_at_least_as_good(e.dissonance, candidate.dissonance))
        {
            return false;
        }

        self.entries.retain(|e| !close(e));
        let at = self.entries.partition_point(|e| e.frequency < f);
        self.entries.insert(at, candidate);
        true
    }

    /// All entries, ascending by frequency.
    pub fn entries(&self) -> &[Extremum] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in frequency order.
    pub fn iter(&self) -> core::slice::Iter<'_, Extremum> {
        self.entries.iter()
    }

    /// Entry frequencies in order.
    pub fn frequencies(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.frequency).collect()
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<'a> IntoIterator for &'a ExtremumList {
    type Item = &'a Extremum;
    type IntoIter = core::slice::Iter<'a, Extremum>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Whether `existing` lies within `[candidate / 1.001, candidate * 1.001]`.
pub fn is_close(existing: f64, candidate: f64) -> bool {
    existing >= candidate / DUPLICATE_TOLERANCE && existing <= candidate * DUPLICATE_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(frequency: f64, dissonance: f64) -> Extremum {
        Extremum {
            frequency,
            dissonance,
        }
    }

    #[test]
    fn keeps_entries_sorted() {
        let mut list = ExtremumList::new(Direction::Minimize);
        assert!(list.insert(point(300.0, 0.5)));
        assert!(list.insert(point(200.0, 0.4)));
        assert!(list.insert(point(250.0, 0.1)));
        assert_eq!(list.frequencies(), vec![200.0, 250.0, 300.0]);
    }

    #[test]
    fn exact_duplicate_is_rejected() {
        let mut list = ExtremumList::new(Direction::Minimize);
        list.insert(point(200.0, 0.4));
        assert!(!list.insert(point(200.0, 0.0)));
        assert_eq!(list.entries(), &[point(200.0, 0.4)]);
    }

    #[test]
    fn better_close_candidate_replaces() {
        let mut list = ExtremumList::new(Direction::Minimize);
        list.insert(point(200.0, 0.4));
        assert!(list.insert(point(200.1, 0.3)));
        assert_eq!(list.entries(), &[point(200.1, 0.3)]);
    }

    #[test]
    fn worse_close_candidate_is_dropped() {
        let mut list = ExtremumList::new(Direction::Maximize);
        list.insert(point(200.0, 0.4));
        assert!(!list.insert(point(200.1, 0.3)));
        assert!(!list.insert(point(199.9, 0.4)));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn replacement_removes_every_close_entry() {
        let mut list = ExtremumList::new(Direction::Maximize);
        list.insert(point(1000.0, 0.2));
        list.insert(point(1001.5, 0.3));
        assert_eq!(list.len(), 2);
        // 1000.8 is within 0.1% of both.
        assert!(list.insert(point(1000.8, 0.9)));
        assert_eq!(list.entries(), &[point(1000.8, 0.9)]);
    }

    #[test]
    fn distant_entries_coexist() {
        let mut list = ExtremumList::new(Direction::Minimize);
        list.insert(point(200.0, 0.4));
        list.insert(point(200.3, 0.5));
        assert_eq!(list.len(), 2);
        list.clear();
        assert!(list.is_empty());
    }
}
