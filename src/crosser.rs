//! The pairs-of-inequalities engine (spec.md §4.5): given two groups of
//! store keys, visit every overlapping pair exactly once via a bit-indexed
//! outer loop, cross them, and feed derived inequalities back into the
//! store.

use std::collections::HashSet;

use crate::cellset::CellSet;
use crate::error::SolveError;
use crate::store::ConstraintStore;

/// Cross every pair `(l, r)` with `l != r`, `l` in `lefts`, `r` in `rights`,
/// `l.cells ∩ r.cells != ∅`. Each unordered pair is visited once, at the
/// bit equal to the lowest set bit of their intersection — this plays the
/// role of the "seen-bits cursor" from spec.md §4.5 without needing mutable
/// cursor state.
///
/// Returns whether any derived inequality changed the store.
pub fn cross_all_pairs(
    store: &mut ConstraintStore,
    lefts: &HashSet<CellSet>,
    rights: &HashSet<CellSet>,
    max_cells: u32,
    max_mines: u32,
) -> Result<bool, SolveError> {
    let mut any_changed = false;
    let mut visited_pairs: HashSet<(u128, u128)> = HashSet::new();

    for bit in 0..CellSet::CAPACITY {
        let left_at_bit: Vec<CellSet> = store.keys_with_bit(bit).copied().filter(|k| lefts.contains(k)).collect();
        if left_at_bit.is_empty() {
            continue;
        }
        let right_at_bit: Vec<CellSet> = store.keys_with_bit(bit).copied().filter(|k| rights.contains(k)).collect();
        if right_at_bit.is_empty() {
            continue;
        }

        for &l in &left_at_bit {
            for &r in &right_at_bit {
                if l == r {
                    continue;
                }

                let shared = l.intersection(&r);
                let lowest_shared_bit = match shared.iter().next() {
                    Some(b) => b,
                    None => continue,
                };
                if lowest_shared_bit != bit {
                    continue; // this pair is handled when we reach its true lowest bit
                }

                let pair_key = if l.bits() < r.bits() { (l.bits(), r.bits()) } else { (r.bits(), l.bits()) };
                if !visited_pairs.insert(pair_key) {
                    continue;
                }

                let (left_ineq, right_ineq) = match (store.get(&l).copied(), store.get(&r).copied()) {
                    (Some(a), Some(b)) => (a, b),
                    _ => continue,
                };

                for derived in left_ineq.cross_with_guard(&right_ineq, max_cells, max_mines) {
                    if store.add(derived)? {
                        any_changed = true;
                    }
                }
            }
        }
    }

    Ok(any_changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inequality::Inequality;

    fn ineq(ids: &[u32], lo: u32, hi: u32) -> Inequality {
        Inequality::new(CellSet::from_ids(ids.iter().copied()), lo, hi)
    }

    #[test]
    fn test_cross_all_pairs_derives_residue() {
        let mut store = ConstraintStore::new();
        let a = ineq(&[0, 1, 2], 1, 1);
        let b = ineq(&[0, 1], 1, 1);
        store.add(a).unwrap();
        store.add(b).unwrap();

        let lefts: HashSet<CellSet> = [CellSet::from_ids([0, 1, 2])].into_iter().collect();
        let rights: HashSet<CellSet> = [CellSet::from_ids([0, 1])].into_iter().collect();

        let changed = cross_all_pairs(&mut store, &lefts, &rights, 9, 3).unwrap();
        assert!(changed);

        let residue = store.get(&CellSet::from_ids([2])).unwrap();
        assert_eq!((residue.lo, residue.hi), (0, 0));
    }

    #[test]
    fn test_cross_all_pairs_visits_each_pair_once() {
        // A and B share two bits (0 and 1); ensure no duplicate derivation work
        // causes an unsatisfiable spurious conflict from double-adding.
        let mut store = ConstraintStore::new();
        store.add(ineq(&[0, 1, 2], 1, 2)).unwrap();
        store.add(ineq(&[0, 1, 3], 0, 1)).unwrap();

        let lefts: HashSet<CellSet> = store.exact_keys().copied().chain(store.inexact_keys().copied()).collect();
        let rights = lefts.clone();

        assert!(cross_all_pairs(&mut store, &lefts, &rights, 9, 3).is_ok());
    }

    #[test]
    fn test_cross_all_pairs_no_overlap_no_change() {
        let mut store = ConstraintStore::new();
        store.add(ineq(&[0, 1], 1, 1)).unwrap();
        store.add(ineq(&[2, 3], 1, 1)).unwrap();

        let lefts: HashSet<CellSet> = store.exact_keys().copied().collect();
        let rights = lefts.clone();
        let changed = cross_all_pairs(&mut store, &lefts, &rights, 9, 3).unwrap();
        assert!(!changed);
    }
}
