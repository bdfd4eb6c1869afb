//! Board Adapter (spec.md §4.7): turns a puzzle description into the seed
//! material a `Driver` needs — seed constraints, a `board_ineqs` map, and
//! the initial revealed set.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::cellset::{CellId, CellSet};
use crate::error::BoardError;
use crate::inequality::Inequality;

/// Ground-truth role of a cell as declared by the puzzle description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellRole {
    /// Safe; contributes a neighborhood mine-count inequality once revealed.
    Empty,
    Mined,
    /// Role not yet known to the caller; contributes no inequality even if
    /// later revealed (spec.md §6).
    Unknown,
}

impl CellRole {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '.' => Some(CellRole::Empty),
            '*' => Some(CellRole::Mined),
            '?' => Some(CellRole::Unknown),
            _ => None,
        }
    }
}

/// One cell in the Board Adapter's ingest form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardCell {
    pub id: CellId,
    pub role: CellRole,
    pub neighbors: Vec<CellId>,
}

/// A group hint: exactly `count` mines among `cells`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupConstraint {
    pub count: u32,
    pub cells: Vec<CellId>,
}

/// The external puzzle representation (spec.md §6 "Puzzle input").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PuzzleInput {
    pub cells: Vec<BoardCell>,
    pub revealed: Vec<CellId>,
    pub constraints: Vec<GroupConstraint>,
}

/// What a `Driver::new` call needs, assembled from a `PuzzleInput`.
#[derive(Debug, PartialEq)]
pub struct BoardAdapter {
    pub initial_revealed: CellSet,
    pub seed_constraints: Vec<Inequality>,
    pub board_ineqs: HashMap<CellId, Inequality>,
}

impl BoardAdapter {
    /// Validate and convert a `PuzzleInput` into driver-ready seed material.
    ///
    /// Fails fast on any cell id referenced outside the declared cell list
    /// (`UnknownCell`), any id beyond `CellSet::CAPACITY` (`CapacityExceeded`),
    /// or a declared-revealed cell whose role is `Mined` (`RevealedMine`).
    pub fn build(input: &PuzzleInput) -> Result<Self, BoardError> {
        let mut roles: HashMap<CellId, CellRole> = HashMap::new();

        for cell in &input.cells {
            if cell.id >= CellSet::CAPACITY {
                return Err(BoardError::CapacityExceeded(cell.id, CellSet::CAPACITY));
            }
            roles.insert(cell.id, cell.role);
        }

        for cell in &input.cells {
            for &n in &cell.neighbors {
                if !roles.contains_key(&n) {
                    return Err(BoardError::UnknownCell(n));
                }
            }
        }

        let mut initial_revealed = CellSet::empty();
        for &id in &input.revealed {
            match roles.get(&id) {
                None => return Err(BoardError::UnknownCell(id)),
                Some(CellRole::Mined) => return Err(BoardError::RevealedMine(id)),
                Some(_) => initial_revealed.insert(id),
            }
        }

        let mut board_ineqs = HashMap::new();
        for cell in &input.cells {
            if cell.role != CellRole::Empty {
                continue;
            }
            let mut members = Vec::new();
            let mut known_mines = 0u32;
            for &n in &cell.neighbors {
                if initial_revealed.contains(n) {
                    continue;
                }
                if roles.get(&n) == Some(&CellRole::Mined) {
                    known_mines += 1;
                }
                members.push(n);
            }
            if members.is_empty() {
                continue;
            }
            let cells = CellSet::from_ids(members);
            board_ineqs.insert(cell.id, Inequality::new(cells, known_mines, known_mines));
        }

        let mut seed_constraints = Vec::new();
        for constraint in &input.constraints {
            let mut members = Vec::new();
            for &id in &constraint.cells {
                if !roles.contains_key(&id) {
                    return Err(BoardError::UnknownCell(id));
                }
                if !initial_revealed.contains(id) {
                    members.push(id);
                }
            }
            if members.is_empty() {
                continue;
            }
            let cells = CellSet::from_ids(members);
            let size = cells.len();
            seed_constraints.push(Inequality::new(cells, constraint.count.min(size), constraint.count.min(size)));
        }

        Ok(BoardAdapter { initial_revealed, seed_constraints, board_ineqs })
    }
}

/// Parse a compact `.`/`*`/`?` board description of known length into
/// `CellRole`s, e.g. for test fixtures lifted from puzzle literature.
pub fn roles_from_str(s: &str) -> Option<Vec<CellRole>> {
    s.chars().map(CellRole::from_char).collect()
}
