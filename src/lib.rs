//! Cardinality-constraint propagation engine for mine-deduction puzzles.
//!
//! Given a puzzle description (cells, neighbor lists, initial reveals, group
//! hints) this crate derives every cell that can be proven safe or mined by
//! repeatedly tightening and crossing cardinality inequalities, without
//! guessing or backtracking. See `Driver::solve` for the entry point.

pub mod board;
pub mod cellset;
pub mod crosser;
pub mod driver;
pub mod error;
pub mod grid;
pub mod inequality;
pub mod store;

pub use board::{BoardAdapter, BoardCell, CellRole, GroupConstraint, PuzzleInput};
pub use cellset::{CellId, CellSet};
pub use driver::{Driver, RoundRecord, SolveConfig, SolveResult, StageCount, TrivialStage};
pub use error::{BoardError, SolveError};
pub use grid::GridTopology;
pub use inequality::Inequality;

/// Run the Board Adapter and Driver end to end over a `PuzzleInput`.
pub fn solve_puzzle(input: &PuzzleInput, config: SolveConfig) -> Result<SolveResult, BoardError> {
    let adapter = BoardAdapter::build(input)?;
    let driver = Driver::new(adapter.seed_constraints, adapter.board_ineqs, adapter.initial_revealed, config)?;
    Ok(driver.solve())
}

#[cfg(target_arch = "wasm32")]
mod wasm_exports {
    use wasm_bindgen::prelude::*;

    use crate::{solve_puzzle, PuzzleInput, SolveConfig};

    /// Solve a puzzle passed as a JSON-serialized `PuzzleInput`.
    /// Returns `{ solved, revealed: Uint32Array, flagged: Uint32Array, rounds: u32 }`.
    #[wasm_bindgen(js_name = "solvePuzzle")]
    pub fn wasm_solve_puzzle(puzzle_json: JsValue, verbose: bool) -> Result<JsValue, JsValue> {
        let input: PuzzleInput = serde_wasm_bindgen::from_value(puzzle_json)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let config = SolveConfig { verbose, ..SolveConfig::default() };

        let result = solve_puzzle(&input, config).map_err(|e| JsValue::from_str(&e.to_string()))?;

        let obj = js_sys::Object::new();
        js_sys::Reflect::set(&obj, &"solved".into(), &result.solved.into()).unwrap();
        js_sys::Reflect::set(&obj, &"rounds".into(), &(result.summary.len() as u32).into()).unwrap();

        let revealed: Vec<u32> = result.revealed.to_vec();
        let revealed_arr = js_sys::Uint32Array::new_with_length(revealed.len() as u32);
        revealed_arr.copy_from(&revealed);
        js_sys::Reflect::set(&obj, &"revealed".into(), &revealed_arr.into()).unwrap();

        let flagged: Vec<u32> = result.flagged.to_vec();
        let flagged_arr = js_sys::Uint32Array::new_with_length(flagged.len() as u32);
        flagged_arr.copy_from(&flagged);
        js_sys::Reflect::set(&obj, &"flagged".into(), &flagged_arr.into()).unwrap();

        if let Some(err) = result.error {
            js_sys::Reflect::set(&obj, &"error".into(), &err.to_string().into()).unwrap();
        }

        Ok(obj.into())
    }

    /// Ping function to verify WASM is loaded.
    #[wasm_bindgen(js_name = "ping")]
    pub fn wasm_ping() -> String {
        "inequality-puzzle-solver ready".to_string()
    }
}
