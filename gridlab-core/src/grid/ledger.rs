//! Position ledger: the ordered set of open legs.
//!
//! Insertion order is open order (oldest first). Grid spacing always compares
//! against the last leg; re-anchoring reads the first and the last.

use crate::domain::{Direction, Leg};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Ledger {
    legs: Vec<Leg>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.legs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    pub fn first(&self) -> Option<&Leg> {
        self.legs.first()
    }

    pub fn last(&self) -> Option<&Leg> {
        self.legs.last()
    }

    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    pub fn iter(&self) -> impl Iterator<Item = &Leg> {
        self.legs.iter()
    }

    /// Number of open legs in `direction`.
    pub fn count(&self, direction: Direction) -> usize {
        self.legs.iter().filter(|l| l.direction() == direction).count()
    }

    /// Sum of leg sizes.
    pub fn total_size(&self) -> f64 {
        self.legs.iter().map(Leg::size).sum()
    }

    /// Sum of per-leg risk, recomputed from scratch.
    pub fn total_risk(&self) -> f64 {
        self.legs.iter().map(Leg::risk).sum()
    }

    pub(crate) fn push(&mut self, leg: Leg) {
        self.legs.push(leg);
    }

    /// Remove the legs at `indices` (ascending), returning them oldest first.
    pub(crate) fn remove_indices(&mut self, indices: &[usize]) -> Vec<Leg> {
        debug_assert!(indices.windows(2).all(|w| w[0] < w[1]));
        // Walk back to front so earlier indices stay valid.
        let mut removed: Vec<Leg> = indices.iter().rev().map(|&i| self.legs.remove(i)).collect();
        removed.reverse();
        removed
    }

    pub(crate) fn legs_mut(&mut self) -> &mut [Leg] {
        &mut self.legs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leg(direction: Direction, entry: f64) -> Leg {
        Leg::from_distances(direction, entry, 0.01, 1.0, 10.0).unwrap()
    }

    #[test]
    fn preserves_open_order() {
        let mut ledger = Ledger::new();
        ledger.push(leg(Direction::Long, 100.0));
        ledger.push(leg(Direction::Long, 98.0));
        ledger.push(leg(Direction::Short, 103.0));
        assert_eq!(ledger.first().unwrap().entry_price(), 100.0);
        assert_eq!(ledger.last().unwrap().entry_price(), 103.0);
        assert_eq!(ledger.count(Direction::Long), 2);
        assert_eq!(ledger.count(Direction::Short), 1);
    }

    #[test]
    fn remove_indices_keeps_survivor_order() {
        let mut ledger = Ledger::new();
        for entry in [100.0, 99.0, 98.0, 97.0, 96.0] {
            ledger.push(leg(Direction::Long, entry));
        }
        let removed = ledger.remove_indices(&[0, 2, 4]);
        let removed: Vec<f64> = removed.iter().map(Leg::entry_price).collect();
        let kept: Vec<f64> = ledger.iter().map(Leg::entry_price).collect();
        assert_eq!(removed, vec![100.0, 98.0, 96.0]);
        assert_eq!(kept, vec![99.0, 97.0]);
    }

    #[test]
    fn totals_are_sums_over_legs() {
        let mut ledger = Ledger::new();
        ledger.push(leg(Direction::Long, 100.0));
        ledger.push(leg(Direction::Short, 50.0));
        assert!((ledger.total_size() - 0.02).abs() < 1e-12);
        // 10 * 0.01 / 100 + 10 * 0.01 / 50
        assert!((ledger.total_risk() - 0.003).abs() < 1e-12);
    }
}
