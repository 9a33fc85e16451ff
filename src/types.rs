//! Core data types for the Minesweeper solver.
//!
//! Grid storage is a flat `Vec` in column-major layout: `cells[x * height + y]`,
//! where `x` is the column and `y` the row.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A cell coordinate: `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// What is known about a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellStatus {
    /// Hidden, no flag.
    Unknown,
    /// Hidden, flagged as a mine.
    Flagged,
    /// Revealed with no adjacent mine.
    Empty,
    /// Revealed with `1..=8` adjacent mines.
    Digit(u8),
    /// Revealed mine. The game is over.
    Mine,
}

impl CellStatus {
    /// Unknown or flagged.
    #[inline(always)]
    pub fn is_hidden(self) -> bool {
        matches!(self, CellStatus::Unknown | CellStatus::Flagged)
    }

    /// The clue value of a revealed number cell. Empty cells count as `0`.
    #[inline(always)]
    pub fn clue(self) -> Option<u8> {
        match self {
            CellStatus::Empty => Some(0),
            CellStatus::Digit(n) => Some(n),
            _ => None,
        }
    }
}

/// A caller-owned cell the solver can read a status from.
///
/// The solver keeps shared references to these and hands them back inside
/// [`Interaction`]s, so callers can act on their own representation directly.
pub trait SourceCell {
    fn status(&self) -> CellStatus;
}

impl SourceCell for CellStatus {
    fn status(&self) -> CellStatus {
        *self
    }
}

/// What to do with a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Reveal,
    Flag,
}

/// One action on one of the caller's cells.
#[derive(Debug, Serialize)]
pub struct Interaction<'a, C> {
    #[serde(skip)]
    pub target: &'a C,
    #[serde(flatten)]
    pub position: Position,
    pub action: Action,
}

impl<C> Clone for Interaction<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Interaction<'_, C> {}

/// Classification of the board at the time of a solve call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameState {
    Start,
    Solving,
    Stuck,
    Solved,
    Death,
}

/// The deduction tier that produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SolverTag {
    /// Fixed first reveal on an untouched board.
    Opening,
    /// Single-clue flag and reveal passes.
    Trivial,
    /// One-step lookahead contradiction.
    Suffocation,
    /// Per-digit enumeration of neighbor mine masks.
    DigitCombination,
    /// Exhaustive grouping search found a certain move.
    ExhaustiveNoGuess,
    /// Exhaustive grouping search fell back to the least risky guess.
    ExhaustiveGuess,
    /// Nothing certain and guessing disabled.
    Stuck,
}

impl SolverTag {
    /// Short code used in run statistics.
    pub fn code(self) -> &'static str {
        match self {
            SolverTag::Opening => "start",
            SolverTag::Trivial => "0",
            SolverTag::Suffocation => "1",
            SolverTag::DigitCombination => "2",
            SolverTag::ExhaustiveNoGuess => "3",
            SolverTag::ExhaustiveGuess => "4",
            SolverTag::Stuck => "stuck",
        }
    }
}

impl fmt::Display for SolverTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Pre-computed neighbor cache for all cells.
///
/// Stores the 8-directional neighbors (clipped to grid bounds) for every cell
/// as flat indices. Indexed by `x * height + y`.
pub struct NeighborCache {
    pub width: usize,
    pub height: usize,
    /// Flat storage of all neighbor indices.
    data: Vec<usize>,
    /// offsets[i] = start index in `data` for cell i.
    /// offsets[i+1] - offsets[i] = number of neighbors for cell i.
    offsets: Vec<usize>,
}

impl NeighborCache {
    /// Build the neighbor cache for a grid of the given dimensions.
    pub fn new(width: usize, height: usize) -> Self {
        let total = width * height;
        let mut data = Vec::with_capacity(total * 8);
        let mut offsets = Vec::with_capacity(total + 1);

        for x in 0..width {
            for y in 0..height {
                offsets.push(data.len());
                for dx in -1i64..=1 {
                    for dy in -1i64..=1 {
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        let nx = x as i64 + dx;
                        let ny = y as i64 + dy;
                        if nx >= 0 && nx < width as i64 && ny >= 0 && ny < height as i64 {
                            data.push(nx as usize * height + ny as usize);
                        }
                    }
                }
            }
        }
        offsets.push(data.len()); // sentinel

        Self {
            width,
            height,
            data,
            offsets,
        }
    }

    /// Get the pre-computed neighbors of the cell at flat index `idx`.
    #[inline(always)]
    pub fn get(&self, idx: usize) -> &[usize] {
        &self.data[self.offsets[idx]..self.offsets[idx + 1]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbor_cache_corners() {
        let nc = NeighborCache::new(5, 5);
        // Corner (0,0) should have 3 neighbors
        assert_eq!(nc.get(0).len(), 3);
        // Edge (0,2) should have 5 neighbors
        assert_eq!(nc.get(2).len(), 5);
        // Center (2,2) should have 8 neighbors
        assert_eq!(nc.get(2 * 5 + 2).len(), 8);
    }

    #[test]
    fn test_neighbor_cache_non_square() {
        let (width, height) = (7, 3);
        let nc = NeighborCache::new(width, height);
        let idx = 4 * height + 1;
        for &n in nc.get(idx) {
            let (nx, ny) = (n / height, n % height);
            assert!(nx < width && ny < height);
            let dx = nx as i64 - 4;
            let dy = ny as i64 - 1;
            assert!(dx.abs() <= 1 && dy.abs() <= 1);
            assert!(dx != 0 || dy != 0);
        }
        assert_eq!(nc.get(idx).len(), 8);
    }

    #[test]
    fn test_clue_values() {
        assert_eq!(CellStatus::Empty.clue(), Some(0));
        assert_eq!(CellStatus::Digit(3).clue(), Some(3));
        assert_eq!(CellStatus::Flagged.clue(), None);
        assert!(CellStatus::Flagged.is_hidden());
        assert!(!CellStatus::Mine.is_hidden());
    }

    #[test]
    fn test_tag_codes() {
        assert_eq!(SolverTag::Trivial.to_string(), "0");
        assert_eq!(SolverTag::ExhaustiveNoGuess.code(), "3");
    }
}
