//! Minesweeper Solver.
//!
//! Given a partially revealed board and its total mine count, deduces the next
//! safe reveals and certain flags, escalating through progressively stronger
//! deduction tiers, and falls back to the least risky guess when nothing is
//! certain.
//!
//! Boards are read as rows (`rows[y][x]`) of any cell type implementing
//! [`SourceCell`]; internally everything is a flat `Vec` in column-major
//! layout: `cells[x * height + y]`. The WASM exports take that flat layout
//! directly.

pub mod board;
pub mod config;
pub mod error;
pub mod frontier;
pub mod grouping;
pub mod local;
pub mod merge;
pub mod probability;
pub mod search;
pub mod snapshot;
pub mod solver;
pub mod state;
pub mod types;

pub use config::SolverConfig;
pub use error::SolverError;
pub use solver::{solve, SolveResult};
pub use types::{Action, CellStatus, GameState, Interaction, Position, SolverTag, SourceCell};

/// Decode a flat column-major board: `-1` unknown, `-2` flagged, `0` empty,
/// `1..=8` digit, `9` revealed mine. Returns rows (`rows[y][x]`).
pub fn decode_cells(width: usize, height: usize, cells: &[i8]) -> Result<Vec<Vec<CellStatus>>, SolverError> {
    let expected = width.checked_mul(height);
    if expected != Some(cells.len()) {
        return Err(SolverError::CellCount {
            expected: expected.unwrap_or(usize::MAX),
            found: cells.len(),
        });
    }

    let mut rows = vec![Vec::with_capacity(width); height];
    for x in 0..width {
        for (y, row) in rows.iter_mut().enumerate() {
            let value = cells[x * height + y];
            let status = match value {
                -1 => CellStatus::Unknown,
                -2 => CellStatus::Flagged,
                0 => CellStatus::Empty,
                1..=8 => CellStatus::Digit(value as u8),
                9 => CellStatus::Mine,
                _ => {
                    return Err(SolverError::InvalidCell {
                        position: Position::new(x, y),
                        value,
                    })
                }
            };
            row.push(status);
        }
    }
    Ok(rows)
}

// ─── WASM Exports (only compiled for wasm32 target) ─────────────────────────

#[cfg(target_arch = "wasm32")]
mod wasm_exports {
    use crate::{decode_cells, solver, SolverConfig};
    use wasm_bindgen::prelude::*;

    /// Solve one step of a flat column-major board.
    /// Returns JS object: `{ state, tag, interactions: [{ x, y, action }] }`
    #[wasm_bindgen(js_name = "solve")]
    pub fn wasm_solve(
        cells: &[i8],
        width: usize,
        height: usize,
        mine_count: usize,
        guessing: bool,
    ) -> Result<JsValue, JsError> {
        let config = SolverConfig {
            guessing,
            ..SolverConfig::default()
        };
        solve_with(cells, width, height, mine_count, &config)
    }

    /// Same as `solve`, with the full configuration passed as a JS object.
    /// Missing fields take their defaults.
    #[wasm_bindgen(js_name = "solveWithConfig")]
    pub fn wasm_solve_with_config(
        cells: &[i8],
        width: usize,
        height: usize,
        mine_count: usize,
        config: JsValue,
    ) -> Result<JsValue, JsError> {
        let config: SolverConfig = if config.is_undefined() || config.is_null() {
            SolverConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        solve_with(cells, width, height, mine_count, &config)
    }

    fn solve_with(
        cells: &[i8],
        width: usize,
        height: usize,
        mine_count: usize,
        config: &SolverConfig,
    ) -> Result<JsValue, JsError> {
        let rows = decode_cells(width, height, cells)?;
        let result = solver::solve(&rows, mine_count, config)?;
        Ok(serde_wasm_bindgen::to_value(&result)?)
    }

    /// Ping function to verify WASM is loaded.
    #[wasm_bindgen(js_name = "ping")]
    pub fn wasm_ping() -> String {
        "WASM solver ready".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_column_major() {
        // 3 wide, 2 tall; column x holds cells[x * 2..x * 2 + 2]
        let cells = [-1, 1, -2, 2, 0, 9];
        let rows = decode_cells(3, 2, &cells).unwrap();
        assert_eq!(
            rows,
            vec![
                vec![CellStatus::Unknown, CellStatus::Flagged, CellStatus::Empty],
                vec![CellStatus::Digit(1), CellStatus::Digit(2), CellStatus::Mine],
            ]
        );
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        assert_eq!(
            decode_cells(2, 2, &[0, 0, 0]),
            Err(SolverError::CellCount { expected: 4, found: 3 })
        );
        assert_eq!(
            decode_cells(2, 2, &[0, 0, 0, -3]),
            Err(SolverError::InvalidCell {
                position: Position::new(1, 1),
                value: -3
            })
        );
    }

    #[test]
    fn test_decode_rejects_overflowing_dimensions() {
        // usize::MAX * 2 wraps to usize::MAX - 1 without the checked multiply
        let cells = vec![-1i8; 4];
        assert_eq!(
            decode_cells(usize::MAX, 2, &cells),
            Err(SolverError::CellCount {
                expected: usize::MAX,
                found: 4
            })
        );
        assert!(decode_cells(2, usize::MAX / 2 + 1, &[]).is_err());
    }

    #[test]
    fn test_decode_then_solve() {
        // 1-2-1 over an empty row, column-major
        let cells = [-1, 1, 0, -1, 2, 0, -1, 1, 0];
        let rows = decode_cells(3, 3, &cells).unwrap();
        let result = solve(&rows, 2, &SolverConfig::default()).unwrap();
        assert_eq!(result.state, GameState::Solving);
        assert_eq!(result.interactions.len(), 1);
        assert_eq!(result.interactions[0].position, Position::new(1, 0));
        assert_eq!(result.interactions[0].action, Action::Reveal);
    }
}
