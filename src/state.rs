//! Board classification ahead of any deduction.

use crate::snapshot::Snapshot;
use crate::types::{CellStatus, GameState, Position};

/// Classify the board when its state follows from the snapshot alone.
///
/// Returns `None` when the game is in progress; whether it is `Solving` or
/// `Stuck` then depends on the deduction tiers.
pub fn classify<C>(snap: &Snapshot<'_, C>) -> Option<GameState> {
    if (0..snap.len()).any(|i| snap.status(i) == CellStatus::Mine) {
        return Some(GameState::Death);
    }
    if (0..snap.len()).all(|i| snap.status(i) == CellStatus::Unknown) && !snap.is_empty() {
        return Some(GameState::Start);
    }
    if snap.hidden_count() == snap.mine_count() {
        return Some(GameState::Solved);
    }
    None
}

/// The fixed first reveal of a fresh game.
pub fn opening_cell<C>(snap: &Snapshot<'_, C>) -> Position {
    Position::new(snap.width() / 2, snap.height() / 2)
}
