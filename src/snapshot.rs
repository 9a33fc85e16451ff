//! Grid snapshot: the solver's working copy of the caller's board.
//!
//! Built once per solve call. Neighbor statistics are computed up front and
//! never updated afterwards, so every deduction tier reads the same board.

use crate::error::SolverError;
use crate::types::{CellStatus, NeighborCache, Position, SourceCell};

/// Neighbor counts of a single cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NeighborStats {
    pub unknown: u8,
    pub flagged: u8,
    /// Unknown plus flagged.
    pub hidden: u8,
    pub total: u8,
}

pub struct Snapshot<'a, C> {
    width: usize,
    height: usize,
    statuses: Vec<CellStatus>,
    sources: Vec<&'a C>,
    stats: Vec<NeighborStats>,
    nc: NeighborCache,
    mine_count: usize,
    flag_count: usize,
    hidden_count: usize,
}

impl<'a, C: SourceCell> Snapshot<'a, C> {
    /// Read a board given as rows (`rows[y][x]`).
    pub fn new(rows: &'a [Vec<C>], mine_count: usize) -> Result<Self, SolverError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != width {
                return Err(SolverError::RaggedRow {
                    row,
                    expected: width,
                    found: cells.len(),
                });
            }
        }

        let total = width * height;
        let mut statuses = Vec::with_capacity(total);
        let mut sources = Vec::with_capacity(total);
        for x in 0..width {
            for y in 0..height {
                let cell = &rows[y][x];
                statuses.push(cell.status());
                sources.push(cell);
            }
        }

        let nc = NeighborCache::new(width, height);
        let mut stats = vec![NeighborStats::default(); total];
        for (idx, s) in stats.iter_mut().enumerate() {
            for &n in nc.get(idx) {
                s.total += 1;
                match statuses[n] {
                    CellStatus::Unknown => s.unknown += 1,
                    CellStatus::Flagged => s.flagged += 1,
                    _ => {}
                }
            }
            s.hidden = s.unknown + s.flagged;
        }

        let flag_count = statuses.iter().filter(|&&s| s == CellStatus::Flagged).count();
        let hidden_count = statuses.iter().filter(|s| s.is_hidden()).count();

        Ok(Self {
            width,
            height,
            statuses,
            sources,
            stats,
            nc,
            mine_count,
            flag_count,
            hidden_count,
        })
    }
}

impl<'a, C> Snapshot<'a, C> {
    #[inline(always)]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline(always)]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    #[inline(always)]
    pub fn index(&self, pos: Position) -> usize {
        pos.x * self.height + pos.y
    }

    #[inline(always)]
    pub fn position(&self, idx: usize) -> Position {
        Position::new(idx / self.height, idx % self.height)
    }

    #[inline(always)]
    pub fn status(&self, idx: usize) -> CellStatus {
        self.statuses[idx]
    }

    /// The caller's cell behind `idx`.
    #[inline(always)]
    pub fn source(&self, idx: usize) -> &'a C {
        self.sources[idx]
    }

    #[inline(always)]
    pub fn neighbors(&self, idx: usize) -> &[usize] {
        self.nc.get(idx)
    }

    #[inline(always)]
    pub fn stats(&self, idx: usize) -> NeighborStats {
        self.stats[idx]
    }

    #[inline(always)]
    pub fn is_unknown(&self, idx: usize) -> bool {
        self.statuses[idx] == CellStatus::Unknown
    }

    /// Clue value of a revealed number or empty cell.
    #[inline(always)]
    pub fn clue(&self, idx: usize) -> Option<u8> {
        self.statuses[idx].clue()
    }

    /// Mines a clue still needs among its unknown neighbors.
    /// Negative when the clue is over-flagged; zero for non-clues.
    #[inline(always)]
    pub fn remaining(&self, idx: usize) -> i32 {
        match self.clue(idx) {
            Some(v) => i32::from(v) - i32::from(self.stats[idx].flagged),
            None => 0,
        }
    }

    /// Flagged neighbors account for the whole clue.
    pub fn is_satisfied(&self, idx: usize) -> bool {
        self.clue(idx) == Some(self.stats[idx].flagged)
    }

    /// Every hidden neighbor must be a mine.
    pub fn is_exhausted(&self, idx: usize) -> bool {
        self.clue(idx) == Some(self.stats[idx].hidden)
    }

    pub fn unknown_neighbors(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        self.nc.get(idx).iter().copied().filter(move |&n| self.is_unknown(n))
    }

    pub fn clue_neighbors(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        self.nc
            .get(idx)
            .iter()
            .copied()
            .filter(move |&n| self.clue(n).is_some())
    }

    pub fn unknown_cells(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len()).filter(move |&i| self.is_unknown(i))
    }

    /// Unknown plus flagged cells on the whole board.
    pub fn hidden_count(&self) -> usize {
        self.hidden_count
    }

    pub fn flag_count(&self) -> usize {
        self.flag_count
    }

    pub fn unknown_count(&self) -> usize {
        self.hidden_count - self.flag_count
    }

    pub fn mine_count(&self) -> usize {
        self.mine_count
    }

    /// Mines not yet accounted for by flags.
    pub fn mines_left(&self) -> Result<usize, SolverError> {
        self.mine_count
            .checked_sub(self.flag_count)
            .ok_or(SolverError::MineCountExceeded {
                flagged: self.flag_count,
                mines: self.mine_count,
            })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::CellStatus::{Digit, Empty, Flagged, Unknown};

    /// Parse a board drawn as text: `.` unknown, `F` flag, `0`-`8` revealed,
    /// `*` revealed mine. One string per row.
    pub(crate) fn parse_rows(rows: &[&str]) -> Vec<Vec<CellStatus>> {
        rows.iter()
            .map(|row| {
                row.chars()
                    .map(|c| match c {
                        '.' => Unknown,
                        'F' => Flagged,
                        '*' => CellStatus::Mine,
                        '0' => Empty,
                        d => Digit(d.to_digit(10).expect("digit") as u8),
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_stats_and_layout() {
        let rows = parse_rows(&["..F", "12.", "000"]);
        let snap = Snapshot::new(&rows, 3).unwrap();
        assert_eq!(snap.width(), 3);
        assert_eq!(snap.height(), 3);

        let one = snap.index(Position::new(0, 1));
        assert_eq!(snap.status(one), Digit(1));
        assert_eq!(snap.position(one), Position::new(0, 1));
        let s = snap.stats(one);
        assert_eq!((s.unknown, s.flagged, s.hidden, s.total), (2, 0, 2, 5));

        let two = snap.index(Position::new(1, 1));
        let s = snap.stats(two);
        assert_eq!((s.unknown, s.flagged, s.hidden, s.total), (3, 1, 4, 8));
        assert_eq!(snap.remaining(two), 1);
        assert!(!snap.is_satisfied(two));

        assert_eq!(snap.hidden_count(), 4);
        assert_eq!(snap.flag_count(), 1);
        assert_eq!(snap.unknown_count(), 3);
        assert_eq!(snap.mines_left(), Ok(2));
    }

    #[test]
    fn test_source_references_caller_cells() {
        let rows = parse_rows(&[".1", "F1"]);
        let snap = Snapshot::new(&rows, 1).unwrap();
        let idx = snap.index(Position::new(0, 1));
        assert!(std::ptr::eq(snap.source(idx), &rows[1][0]));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let rows = parse_rows(&["...", ".."]);
        assert_eq!(
            Snapshot::new(&rows, 1).err(),
            Some(SolverError::RaggedRow { row: 1, expected: 3, found: 2 })
        );
    }

    #[test]
    fn test_over_flagged_board() {
        let rows = parse_rows(&["FF", "11"]);
        let snap = Snapshot::new(&rows, 1).unwrap();
        assert!(matches!(snap.mines_left(), Err(SolverError::MineCountExceeded { .. })));
    }
}
