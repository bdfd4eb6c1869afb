//! The round-loop state machine: adjust, resolve trivials, cross exact
//! pairs, then (budget permitting) cross inexact pairs, until the store
//! empties or no stage can make progress (spec.md §4.6).

use std::collections::{HashMap, HashSet};

use crate::cellset::{CellId, CellSet};
use crate::crosser;
use crate::error::SolveError;
use crate::inequality::{Inequality, DEFAULT_MAX_CELLS, DEFAULT_MAX_MINES};
use crate::store::ConstraintStore;

/// Tunables from spec.md §6.
#[derive(Clone, Copy, Debug)]
pub struct SolveConfig {
    /// `-1` = unlimited: every round with no trivial or exact progress
    /// crosses the inexact group, giving up with `Stuck` only once that
    /// crossing itself makes no progress. A positive value instead bounds
    /// how many such stuck rounds are tolerated, giving up early with
    /// `StuckBudgetExhausted` once the budget reaches zero (resolution of
    /// spec.md §9 Open Question 3 — see `SPEC_FULL.md` §2).
    pub max_inexact_stages: i32,
    pub max_cells: u32,
    pub max_mines: u32,
    pub verbose: bool,
}

impl Default for SolveConfig {
    fn default() -> Self {
        SolveConfig {
            max_inexact_stages: -1,
            max_cells: DEFAULT_MAX_CELLS,
            max_mines: DEFAULT_MAX_MINES,
            verbose: false,
        }
    }
}

/// Which cells the trivial stage resolved this round.
#[derive(Debug, Clone, Default)]
pub struct TrivialStage {
    pub revealed: Vec<CellId>,
    pub flagged: Vec<CellId>,
}

/// Number of inequalities crossed in an exact or inexact stage.
#[derive(Debug, Clone, Copy)]
pub struct StageCount {
    pub count: usize,
}

/// Per-round progress record consumed by an external difficulty scorer.
/// `original_source/scorer.py` implements two strategies over a sequence of
/// these: `lognum` (sums `log(count)` per crossing stage, `1` per trivial
/// round) and `seqnum` (rewards runs of consecutive exact/inexact rounds
/// quadratically/sublinearly). Neither is implemented here — this crate
/// only guarantees the shape a scorer needs.
#[derive(Debug, Clone, Default)]
pub struct RoundRecord {
    pub num_ineqs: usize,
    pub trivial: Option<TrivialStage>,
    pub exact: Option<StageCount>,
    pub inexact: Option<StageCount>,
}

/// Outcome of a `solve()` call.
#[derive(Debug, Clone)]
pub struct SolveResult {
    pub solved: bool,
    pub revealed: CellSet,
    pub flagged: CellSet,
    pub summary: Vec<RoundRecord>,
    pub error: Option<SolveError>,
}

pub struct Driver {
    store: ConstraintStore,
    revealed: CellSet,
    flagged: CellSet,
    board_ineqs: HashMap<CellId, Inequality>,
    config: SolveConfig,
}

impl Driver {
    /// Seed the store with `seed_constraints`, then immediately contribute
    /// the board-derived neighborhood inequality for any cell already in
    /// `initial_revealed` (mirrors `original_source/solver.py`'s
    /// `for tile in self.revealed: ... add_ineq(board_ineqs.pop(tile))`).
    pub fn new(
        seed_constraints: Vec<Inequality>,
        mut board_ineqs: HashMap<CellId, Inequality>,
        initial_revealed: CellSet,
        config: SolveConfig,
    ) -> Result<Self, SolveError> {
        let mut store = ConstraintStore::new();
        for constraint in seed_constraints {
            store.add(constraint)?;
        }
        for cell in initial_revealed.iter() {
            if let Some(ineq) = board_ineqs.remove(&cell) {
                store.add(ineq)?;
            }
        }

        Ok(Driver { store, revealed: initial_revealed, flagged: CellSet::empty(), board_ineqs, config })
    }

    pub fn solve(mut self) -> SolveResult {
        let mut summary = Vec::new();
        let mut inexact_budget = self.config.max_inexact_stages;
        let mut error = None;

        loop {
            let mut record = RoundRecord { num_ineqs: self.store.len(), ..Default::default() };

            if let Err(e) = self.adjust() {
                error = Some(e);
                break;
            }

            if self.store.is_empty() {
                summary.push(record);
                break;
            }

            if !self.store.trivial_is_empty() {
                match self.apply_trivial() {
                    Ok(stage) => {
                        record.trivial = Some(stage);
                        inexact_budget = self.config.max_inexact_stages;
                        summary.push(record);
                        continue;
                    }
                    Err(e) => {
                        error = Some(e);
                        break;
                    }
                }
            }

            let mut progressed = false;

            if !self.store.exact_is_empty() {
                let lefts: HashSet<CellSet> = self.store.exact_keys().copied().collect();
                let count = lefts.len();
                let mut rights = lefts.clone();
                rights.extend(self.store.inexact_keys().copied());
                rights.extend(self.store.stale_keys().copied());

                log::debug!("cross-exact: {count} exact inequalities");
                match crosser::cross_all_pairs(&mut self.store, &lefts, &rights, self.config.max_cells, self.config.max_mines) {
                    Ok(changed) => {
                        for key in &lefts {
                            self.store.mark_stale(key);
                        }
                        record.exact = Some(StageCount { count });
                        inexact_budget = self.config.max_inexact_stages;
                        progressed = changed;
                    }
                    Err(e) => {
                        error = Some(e);
                        break;
                    }
                }
            }

            if !progressed {
                // Unlimited budget: cross the inexact group every stuck round and
                // only give up once that crossing itself makes no progress. A
                // finite budget instead spends itself down first, declaring
                // `StuckBudgetExhausted` without attempting the final crossing.
                if inexact_budget >= 0 {
                    inexact_budget -= 1;
                    if inexact_budget == 0 {
                        summary.push(record);
                        error = Some(SolveError::StuckBudgetExhausted);
                        break;
                    }
                }

                let lefts: HashSet<CellSet> = self.store.inexact_keys().copied().collect();
                let count = lefts.len();
                let mut rights = lefts.clone();
                rights.extend(self.store.stale_keys().copied());

                log::debug!("cross-inexact: {count} inexact inequalities, budget {inexact_budget}");
                match crosser::cross_all_pairs(&mut self.store, &lefts, &rights, self.config.max_cells, self.config.max_mines) {
                    Ok(changed) => {
                        for key in &lefts {
                            self.store.mark_stale(key);
                        }
                        record.inexact = Some(StageCount { count });
                        progressed = changed;
                    }
                    Err(e) => {
                        error = Some(e);
                        break;
                    }
                }

                if !progressed && inexact_budget < 0 {
                    summary.push(record);
                    error = Some(SolveError::Stuck);
                    break;
                }
            }

            summary.push(record);
        }

        let solved = error.is_none();
        if self.config.verbose {
            log::trace!("solve finished: solved={solved} rounds={}", summary.len());
        }

        SolveResult { solved, revealed: self.revealed, flagged: self.flagged, summary, error }
    }

    /// Strip `revealed ∪ flagged` out of every overlapping inequality,
    /// shrinking bounds by the flagged contribution (spec.md §4.6 step 1).
    fn adjust(&mut self) -> Result<bool, SolveError> {
        let marked = self.revealed.union(&self.flagged);
        let overlapping = self.store.keys_overlapping(&marked);
        let mut changed = false;

        for key in overlapping {
            if let Some(ineq) = self.store.pop(&key) {
                let new_cells = ineq.cells.difference(&marked);
                if new_cells.is_empty() {
                    changed = true;
                    continue;
                }

                let flagged_count = ineq.cells.intersection(&self.flagged).len() as i64;
                let new_size = new_cells.len();
                let new_lo = (ineq.lo as i64 - flagged_count).max(0) as u32;
                let new_hi = new_size.min((ineq.hi as i64 - flagged_count).max(0) as u32);

                if self.store.add(Inequality::new(new_cells, new_lo, new_hi))? {
                    changed = true;
                }
            }
        }

        Ok(changed)
    }

    /// Resolve every currently-trivial key: union its cells into `revealed`
    /// or `flagged`, contribute any now-available board-derived
    /// inequalities, and drop the resolved entries from the store.
    fn apply_trivial(&mut self) -> Result<TrivialStage, SolveError> {
        let keys = self.store.trivial_keys();
        self.store.clear_trivial_group();

        let mut stage = TrivialStage::default();

        for key in keys {
            let ineq = match self.store.pop(&key) {
                Some(i) => i,
                None => continue,
            };

            if ineq.is_empty_trivial() {
                for cell in ineq.cells.iter() {
                    if !self.revealed.contains(cell) {
                        self.revealed.insert(cell);
                        stage.revealed.push(cell);
                    }
                }
            } else if ineq.is_full_trivial() {
                for cell in ineq.cells.iter() {
                    if !self.flagged.contains(cell) {
                        self.flagged.insert(cell);
                        stage.flagged.push(cell);
                    }
                }
            }
        }

        for &cell in &stage.revealed {
            if let Some(ineq) = self.board_ineqs.remove(&cell) {
                self.store.add(ineq)?;
            }
        }

        Ok(stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ineq(ids: &[u32], lo: u32, hi: u32) -> Inequality {
        Inequality::new(CellSet::from_ids(ids.iter().copied()), lo, hi)
    }

    #[test]
    fn test_solve_trivial_two_cell_one_mine_with_hint() {
        // cell 1 is already revealed, and its neighborhood {0} has 0 mines.
        let mut board = HashMap::new();
        board.insert(1, ineq(&[0], 0, 0));

        let driver = Driver::new(Vec::new(), board, CellSet::from_ids([1]), SolveConfig::default()).unwrap();
        let result = driver.solve();
        assert!(result.solved);
        assert_eq!(result.revealed, CellSet::from_ids([0, 1]));
        assert_eq!(result.flagged, CellSet::empty());
    }

    #[test]
    fn test_solve_unsatisfiable() {
        let seeds = vec![ineq(&[0, 1], 1, 1), ineq(&[0, 1], 0, 0)];
        let err = Driver::new(seeds, HashMap::new(), CellSet::empty(), SolveConfig::default());
        assert!(matches!(err, Err(SolveError::UnsatisfiableConstraint { .. })));
    }

    #[test]
    fn test_solve_stuck_budget_exhausted() {
        // Single inexact inequality, nothing to cross it against.
        let seeds = vec![ineq(&[0, 1], 0, 1)];
        let config = SolveConfig { max_inexact_stages: 3, ..Default::default() };
        let driver = Driver::new(seeds, HashMap::new(), CellSet::empty(), config).unwrap();
        let result = driver.solve();
        assert!(!result.solved);
        assert_eq!(result.error, Some(SolveError::StuckBudgetExhausted));
    }

    #[test]
    fn test_unlimited_budget_attempts_inexact_cross_before_declaring_stuck() {
        // Two overlapping inexact inequalities with no exact fact anywhere:
        // the only way to make progress is to cross them.
        let seeds = vec![ineq(&[0, 1, 2], 0, 1), ineq(&[1, 2, 3], 1, 2)];
        let driver = Driver::new(seeds, HashMap::new(), CellSet::empty(), SolveConfig::default()).unwrap();
        let result = driver.solve();

        // Unresolved overall, but the first round must have actually run the
        // inexact crossing (and derived the narrower {1,2} fact) rather than
        // bailing out with `Stuck` before ever attempting it.
        assert!(result.summary[0].inexact.is_some());
        assert_eq!(result.error, Some(SolveError::Stuck));
    }

    #[test]
    fn test_adjust_removes_marked_cells_from_constraints() {
        let seeds = vec![ineq(&[0, 1, 2], 1, 1)];
        let driver = Driver::new(seeds, HashMap::new(), CellSet::from_ids([0]), SolveConfig::default()).unwrap();
        // With 0 revealed and no board hint for it, {1,2} keeps bound (1,1) -> exact, no crossing partner -> stuck.
        let result = driver.solve();
        assert!(!result.solved);
    }
}
