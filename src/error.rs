//! Fatal solver errors.
//!
//! Every variant means the board handed to the solver is malformed or
//! logically inconsistent. Death and Stuck are game states, not errors.

use crate::types::Position;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("expected {expected} cells, got {found}")]
    CellCount { expected: usize, found: usize },

    #[error("cell {position} has invalid encoding {value}")]
    InvalidCell { position: Position, value: i8 },

    #[error("{flagged} flags placed but the board only has {mines} mines")]
    MineCountExceeded { flagged: usize, mines: usize },

    #[error("inconsistent board: {mines_left} mines left for {unknown} unknown cells")]
    NotEnoughCells { mines_left: usize, unknown: usize },

    #[error("inconsistent board: clue at {position} has no satisfying mine arrangement")]
    UnsatisfiableDigit { position: Position },

    #[error("inconsistent board: no mine arrangement satisfies the clues around {position}")]
    UnsatisfiableGrouping { position: Position },

    #[error("inconsistent board: cell {position} deduced both safe and mined")]
    ConflictingActions { position: Position },
}
