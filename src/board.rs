//! Simulated minefield: mine placement, number calculation and move playback.
//!
//! Lets whole games be played against the solver. The solver only ever sees
//! [`Minefield::rows`]; mine positions stay hidden inside the field.

use crate::types::{Action, CellStatus, NeighborCache, Position};
use rand::Rng;

pub struct Minefield {
    width: usize,
    height: usize,
    /// Mine layout (flat, column-major).
    mines: Vec<bool>,
    /// Adjacent mine count per cell. Mine cells keep 0.
    numbers: Vec<u8>,
    /// What the player currently sees.
    cells: Vec<CellStatus>,
    nc: NeighborCache,
    mine_count: usize,
}

impl Minefield {
    /// Place `mine_count` mines randomly, skipping cells within `safe_radius`
    /// (Chebyshev distance) of `safe`.
    ///
    /// Gives up after a fixed number of draws, so a board with too few
    /// eligible cells ends up with fewer mines; see [`mine_count`](Self::mine_count).
    pub fn random(
        width: usize,
        height: usize,
        mine_count: usize,
        safe: Position,
        safe_radius: usize,
        rng: &mut impl Rng,
    ) -> Self {
        let mut mines = vec![false; width * height];
        let mut placed = 0;
        let mut attempts = 0;
        let max_placement_attempts = 100_000;

        while placed < mine_count && attempts < max_placement_attempts {
            attempts += 1;
            let x = rng.random_range(0..width);
            let y = rng.random_range(0..height);

            // Check exclusion zone
            if x.abs_diff(safe.x) <= safe_radius && y.abs_diff(safe.y) <= safe_radius {
                continue;
            }

            let idx = x * height + y;
            if !mines[idx] {
                mines[idx] = true;
                placed += 1;
            }
        }

        Self::with_mines(width, height, mines)
    }

    /// Build a field with mines at exactly the given positions.
    pub fn from_mines(width: usize, height: usize, positions: &[Position]) -> Self {
        let mut mines = vec![false; width * height];
        for p in positions {
            mines[p.x * height + p.y] = true;
        }
        Self::with_mines(width, height, mines)
    }

    fn with_mines(width: usize, height: usize, mines: Vec<bool>) -> Self {
        let nc = NeighborCache::new(width, height);
        let numbers = calculate_numbers(&mines, &nc);
        let mine_count = mines.iter().filter(|&&m| m).count();
        Self {
            width,
            height,
            cells: vec![CellStatus::Unknown; mines.len()],
            mines,
            numbers,
            nc,
            mine_count,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn mine_count(&self) -> usize {
        self.mine_count
    }

    pub fn is_mine(&self, pos: Position) -> bool {
        self.mines[pos.x * self.height + pos.y]
    }

    pub fn status(&self, pos: Position) -> CellStatus {
        self.cells[pos.x * self.height + pos.y]
    }

    /// The visible board as rows (`rows[y][x]`).
    pub fn rows(&self) -> Vec<Vec<CellStatus>> {
        (0..self.height)
            .map(|y| (0..self.width).map(|x| self.cells[x * self.height + y]).collect())
            .collect()
    }

    /// Play one move. Revealing an empty cell opens its whole empty region;
    /// revealing a mine shows it and ends the game.
    pub fn apply(&mut self, pos: Position, action: Action) {
        let idx = pos.x * self.height + pos.y;
        match action {
            Action::Flag => {
                if self.cells[idx] == CellStatus::Unknown {
                    self.cells[idx] = CellStatus::Flagged;
                }
            }
            Action::Reveal if self.mines[idx] => self.cells[idx] = CellStatus::Mine,
            Action::Reveal => self.flood_reveal(idx),
        }
    }

    fn flood_reveal(&mut self, start: usize) {
        let mut stack = vec![start];
        while let Some(i) = stack.pop() {
            if self.cells[i] != CellStatus::Unknown {
                continue;
            }
            match self.numbers[i] {
                0 => {
                    self.cells[i] = CellStatus::Empty;
                    stack.extend(self.nc.get(i).iter().copied().filter(|&n| !self.mines[n]));
                }
                n => self.cells[i] = CellStatus::Digit(n),
            }
        }
    }
}

/// Adjacent mine count for every non-mine cell.
fn calculate_numbers(mines: &[bool], nc: &NeighborCache) -> Vec<u8> {
    (0..mines.len())
        .map(|idx| {
            if mines[idx] {
                0
            } else {
                nc.get(idx).iter().filter(|&&n| mines[n]).count() as u8
            }
        })
        .collect()
}
