//! Error kinds surfaced by the solving core (spec.md §7).

use crate::cellset::CellSet;
use thiserror::Error;

/// Failure modes of the propagation engine. None of these are exceptions in
/// the control-flow sense — `Driver::solve` always returns a structured
/// `SolveResult`; this type is carried inside it as a diagnostic.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveError {
    /// Meet-tightening two bounds over the same cell set collapsed
    /// (`lo > hi`). Either the puzzle's hints contradict each other, or the
    /// caller revealed a cell that should have been mined.
    #[error("constraint over {cells:?} is unsatisfiable after meet-tightening")]
    UnsatisfiableConstraint { cells: CellSet },

    /// The inexact-stage budget reached zero with a non-empty store.
    #[error("inexact-crossing budget exhausted with constraints remaining")]
    StuckBudgetExhausted,

    /// No stage produced progress in a round and the store is non-empty.
    #[error("no propagation stage made progress; puzzle cannot be closed by crossing alone")]
    Stuck,
}

/// Failure modes of the board adapter (spec.md §4.7), ingesting puzzle
/// descriptions before they ever reach the constraint store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("cell id {0} exceeds the solver's cell-set capacity ({1})")]
    CapacityExceeded(u32, u32),

    #[error("cell id {0} referenced as a neighbor or constraint member but not declared")]
    UnknownCell(u32),

    #[error("cell {0} was revealed but its ground-truth role is mined")]
    RevealedMine(u32),

    #[error(transparent)]
    Solve(#[from] SolveError),
}
