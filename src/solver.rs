//! Top-level solve call.
//!
//! Classifies the board, then tries each deduction tier in order and returns
//! the first one that finds something:
//! - Tier 0: trivial flag and reveal passes
//! - Tier 1: suffocation
//! - Tier 2: digit-flag combinations
//! - Tier 3: exhaustive grouping search and cross-grouping merge
//! - Tier 4: probability-ranked guess (only when guessing is enabled)

use crate::config::SolverConfig;
use crate::error::SolverError;
use crate::frontier::Frontier;
use crate::grouping::{self, Candidate, Grouping};
use crate::local;
use crate::merge;
use crate::probability;
use crate::search::{self, Certainty};
use crate::snapshot::Snapshot;
use crate::state;
use crate::types::{Action, GameState, Interaction, SolverTag, SourceCell};
use serde::Serialize;

/// Cells a tier proved safe or mined, as snapshot indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deductions {
    pub reveal: Vec<usize>,
    pub flag: Vec<usize>,
}

impl Deductions {
    pub fn is_empty(&self) -> bool {
        self.reveal.is_empty() && self.flag.is_empty()
    }

    pub fn reveal(&mut self, idx: usize) {
        if !self.reveal.contains(&idx) {
            self.reveal.push(idx);
        }
    }

    pub fn flag(&mut self, idx: usize) {
        if !self.flag.contains(&idx) {
            self.flag.push(idx);
        }
    }
}

/// Outcome of one solve call.
#[derive(Debug, Serialize)]
#[serde(bound(serialize = ""))]
pub struct SolveResult<'a, C> {
    pub state: GameState,
    pub tag: Option<SolverTag>,
    pub interactions: Vec<Interaction<'a, C>>,
}

impl<C> SolveResult<'_, C> {
    fn idle(state: GameState, tag: Option<SolverTag>) -> Self {
        Self {
            state,
            tag,
            interactions: Vec::new(),
        }
    }
}

/// Solve one step of the board given as rows (`rows[y][x]`).
///
/// Interactions point back into `rows`; the board itself is never modified.
pub fn solve<'a, C: SourceCell>(
    rows: &'a [Vec<C>],
    mine_count: usize,
    config: &SolverConfig,
) -> Result<SolveResult<'a, C>, SolverError> {
    let snap = Snapshot::new(rows, mine_count)?;
    solve_snapshot(&snap, config)
}

/// Solve one step of an already built snapshot.
pub fn solve_snapshot<'a, C>(
    snap: &Snapshot<'a, C>,
    config: &SolverConfig,
) -> Result<SolveResult<'a, C>, SolverError> {
    match state::classify(snap) {
        Some(GameState::Start) if config.guessing => {
            let mut found = Deductions::default();
            found.reveal(snap.index(state::opening_cell(snap)));
            return finish(snap, GameState::Start, SolverTag::Opening, &found);
        }
        Some(state) => return Ok(SolveResult::idle(state, None)),
        None => {}
    }

    let mines_left = snap.mines_left()?;

    let found = local::trivial(snap);
    if !found.is_empty() {
        return finish(snap, GameState::Solving, SolverTag::Trivial, &found);
    }

    if config.suffocation {
        let found = local::suffocation(snap);
        if !found.is_empty() {
            return finish(snap, GameState::Solving, SolverTag::Suffocation, &found);
        }
    }

    if config.digit_combination {
        let found = local::digit_combination(snap)?;
        if !found.is_empty() {
            return finish(snap, GameState::Solving, SolverTag::DigitCombination, &found);
        }
    }

    exhaustive(snap, mines_left, config)
}

// ─── Tiers 3 and 4 ──────────────────────────────────────────────────────────

fn exhaustive<'a, C>(
    snap: &Snapshot<'a, C>,
    mines_left: usize,
    config: &SolverConfig,
) -> Result<SolveResult<'a, C>, SolverError> {
    let frontier = Frontier::new(snap);
    let groupings = grouping::build_groupings(snap, &frontier);
    let outsiders = frontier.outsiders.len();
    log::debug!(
        "exhaustive search: {} groupings, {} border unknowns, {} outsiders, {} mines left",
        groupings.len(),
        frontier.unknowns.len(),
        outsiders,
        mines_left
    );

    let mut budget = mines_left;
    let mut parts = Vec::with_capacity(groupings.len());

    for g in &groupings {
        let assignments = search::search(g, budget);
        log::trace!(
            "grouping of {} candidates / {} digits: {} assignments within {} mines",
            g.candidates.len(),
            g.constraints.len(),
            assignments.len(),
            budget
        );
        if assignments.is_empty() {
            return Err(unsatisfiable(snap, g));
        }

        let certain = search::certainty(g, &assignments, budget, outsiders > 0);
        if certain.is_certain() {
            let found = apply_certainty(&certain, g.candidates.iter(), &frontier);
            return finish(snap, GameState::Solving, SolverTag::ExhaustiveNoGuess, &found);
        }

        budget -= search::min_total(&assignments);
        parts.push(merge::summarize(g, &assignments));
    }

    let dist = merge::merge_all(&parts, mines_left, outsiders);
    if dist.is_empty() {
        return Err(match groupings.first() {
            Some(g) => unsatisfiable(snap, g),
            None => SolverError::NotEnoughCells {
                mines_left,
                unknown: snap.unknown_count(),
            },
        });
    }

    let certain = merge::certainty(&dist, mines_left, outsiders);
    if certain.is_certain() {
        let candidates = groupings.iter().flat_map(|g| &g.candidates);
        let found = apply_certainty(&certain, candidates, &frontier);
        return finish(snap, GameState::Solving, SolverTag::ExhaustiveNoGuess, &found);
    }

    if !config.guessing {
        return Ok(SolveResult::idle(GameState::Stuck, Some(SolverTag::Stuck)));
    }

    let report = probability::estimate(snap, &frontier, &groupings, &dist, mines_left);
    match report.guess {
        Some(guess) => {
            log::debug!(
                "guessing {} with mine probability {:.4}",
                snap.position(guess.cell),
                guess.probability
            );
            let mut found = Deductions::default();
            found.reveal(guess.cell);
            finish(snap, GameState::Solving, SolverTag::ExhaustiveGuess, &found)
        }
        None => Ok(SolveResult::idle(GameState::Stuck, Some(SolverTag::Stuck))),
    }
}

fn unsatisfiable<C>(snap: &Snapshot<'_, C>, g: &Grouping) -> SolverError {
    let cell = g.constraints.first().map_or(0, |c| c.cell);
    SolverError::UnsatisfiableGrouping {
        position: snap.position(cell),
    }
}

/// Expand candidate-level findings to every member cell.
fn apply_certainty<'g>(
    certain: &Certainty,
    candidates: impl Iterator<Item = &'g Candidate>,
    frontier: &Frontier,
) -> Deductions {
    let mut found = Deductions::default();
    for (i, cand) in candidates.enumerate() {
        if certain.safe.contains(&i) {
            cand.members.iter().for_each(|&m| found.reveal(m));
        } else if certain.mines.contains(&i) {
            cand.members.iter().for_each(|&m| found.flag(m));
        }
    }
    if certain.outsiders_safe {
        frontier.outsiders.iter().for_each(|&o| found.reveal(o));
    } else if certain.outsiders_mined {
        frontier.outsiders.iter().for_each(|&o| found.flag(o));
    }
    found
}

// ─── Result assembly ────────────────────────────────────────────────────────

fn finish<'a, C>(
    snap: &Snapshot<'a, C>,
    state: GameState,
    tag: SolverTag,
    found: &Deductions,
) -> Result<SolveResult<'a, C>, SolverError> {
    if let Some(&both) = found.reveal.iter().find(|idx| found.flag.contains(idx)) {
        return Err(SolverError::ConflictingActions {
            position: snap.position(both),
        });
    }

    log::debug!(
        "tier {}: {} reveals, {} flags",
        tag,
        found.reveal.len(),
        found.flag.len()
    );

    let reveals = found.reveal.iter().map(|&idx| (idx, Action::Reveal));
    let flags = found.flag.iter().map(|&idx| (idx, Action::Flag));
    let interactions = reveals
        .chain(flags)
        .map(|(idx, action)| Interaction {
            target: snap.source(idx),
            position: snap.position(idx),
            action,
        })
        .collect();

    Ok(SolveResult {
        state,
        tag: Some(tag),
        interactions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Minefield;
    use crate::snapshot::tests::parse_rows;
    use crate::types::{CellStatus, Position};
    use proptest::prelude::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn actions<C>(result: &SolveResult<'_, C>) -> Vec<(Position, Action)> {
        let mut v: Vec<(Position, Action)> = result.interactions.iter().map(|i| (i.position, i.action)).collect();
        v.sort_by_key(|&(p, a)| (p, a == Action::Flag));
        v
    }

    fn flags<C>(result: &SolveResult<'_, C>) -> Vec<Position> {
        actions(result)
            .into_iter()
            .filter(|&(_, a)| a == Action::Flag)
            .map(|(p, _)| p)
            .collect()
    }

    #[test]
    fn test_exhausted_one_is_flagged() {
        let rows = parse_rows(&[".1..", "11..", "00.."]);
        let result = solve(&rows, 2, &SolverConfig::default()).unwrap();
        assert_eq!(result.state, GameState::Solving);
        assert_eq!(result.tag, Some(SolverTag::Trivial));
        assert_eq!(result.tag.unwrap().code(), "0");
        assert_eq!(flags(&result), vec![Position::new(0, 0)]);
    }

    #[test]
    fn test_satisfied_two_reveals_remaining_neighbor() {
        let rows = parse_rows(&["F.F", "121", "000"]);
        let result = solve(&rows, 2, &SolverConfig::default()).unwrap();
        assert_eq!(result.state, GameState::Solving);
        assert_eq!(result.tag, Some(SolverTag::Trivial));
        assert_eq!(actions(&result), vec![(Position::new(1, 0), Action::Reveal)]);
    }

    #[test]
    fn test_fresh_board_opens_center() {
        let rows = vec![vec![CellStatus::Unknown; 9]; 9];
        let result = solve(&rows, 10, &SolverConfig::default()).unwrap();
        assert_eq!(result.state, GameState::Start);
        assert_eq!(result.tag, Some(SolverTag::Opening));
        assert_eq!(actions(&result), vec![(Position::new(4, 4), Action::Reveal)]);

        let passive = solve(&rows, 10, &SolverConfig::no_guess()).unwrap();
        assert_eq!(passive.state, GameState::Start);
        assert_eq!(passive.tag, None);
        assert!(passive.interactions.is_empty());
    }

    #[test]
    fn test_interactions_point_at_caller_cells() {
        struct Tile {
            status: CellStatus,
        }
        impl SourceCell for Tile {
            fn status(&self) -> CellStatus {
                self.status
            }
        }
        fn assert_serialize<T: Serialize>(_: &T) {}

        let rows: Vec<Vec<Tile>> = (0..3)
            .map(|_| (0..3).map(|_| Tile { status: CellStatus::Unknown }).collect())
            .collect();
        let result = solve(&rows, 1, &SolverConfig::default()).unwrap();
        assert_serialize(&result);
        assert_eq!(result.interactions.len(), 1);
        assert!(std::ptr::eq(result.interactions[0].target, &rows[1][1]));
    }

    #[test]
    fn test_hidden_equals_mines_is_solved() {
        for rows in [["F.", "22"], ["..", "22"]] {
            let rows = parse_rows(&rows);
            let result = solve(&rows, 2, &SolverConfig::default()).unwrap();
            assert_eq!(result.state, GameState::Solved);
            assert_eq!(result.tag, None);
            assert!(result.interactions.is_empty());
        }
    }

    #[test]
    fn test_empty_board_is_solved() {
        let rows: Vec<Vec<CellStatus>> = Vec::new();
        let result = solve(&rows, 0, &SolverConfig::default()).unwrap();
        assert_eq!(result.state, GameState::Solved);
    }

    #[test]
    fn test_revealed_mine_is_death() {
        let rows = parse_rows(&["*1", "11"]);
        let result = solve(&rows, 1, &SolverConfig::default()).unwrap();
        assert_eq!(result.state, GameState::Death);
        assert_eq!(result.tag, None);
        assert!(result.interactions.is_empty());
    }

    #[test]
    fn test_one_two_one_resolved_by_exhaustive_search() {
        let rows = parse_rows(&["...", "121", "000"]);
        let result = solve(&rows, 2, &SolverConfig::exhaustive_only(false)).unwrap();
        assert_eq!(result.state, GameState::Solving);
        assert_eq!(result.tag, Some(SolverTag::ExhaustiveNoGuess));
        assert_eq!(result.tag.unwrap().code(), "3");
        assert_eq!(
            actions(&result),
            vec![
                (Position::new(0, 0), Action::Flag),
                (Position::new(1, 0), Action::Reveal),
                (Position::new(2, 0), Action::Flag),
            ]
        );
    }

    #[test]
    fn test_one_two_one_with_outsiders() {
        // Same pattern with untouched cells above it and a spare mine
        let rows = parse_rows(&["...", "...", "121", "000"]);
        let result = solve(&rows, 3, &SolverConfig::exhaustive_only(false)).unwrap();
        assert_eq!(result.tag, Some(SolverTag::ExhaustiveNoGuess));
        assert_eq!(
            actions(&result),
            vec![
                (Position::new(0, 1), Action::Flag),
                (Position::new(1, 1), Action::Reveal),
                (Position::new(2, 1), Action::Flag),
            ]
        );
    }

    #[test]
    fn test_local_tiers_run_before_exhaustive_search() {
        let rows = parse_rows(&["...", "121", "000"]);
        let result = solve(&rows, 2, &SolverConfig::default()).unwrap();
        assert_eq!(result.tag, Some(SolverTag::Suffocation));
        assert_eq!(actions(&result), vec![(Position::new(1, 0), Action::Reveal)]);

        let config = SolverConfig {
            suffocation: false,
            ..SolverConfig::default()
        };
        let result = solve(&rows, 2, &config).unwrap();
        assert_eq!(result.tag, Some(SolverTag::DigitCombination));
        assert_eq!(flags(&result), vec![Position::new(0, 0), Position::new(2, 0)]);
    }

    #[test]
    fn test_fifty_fifty_stuck_without_guessing() {
        let rows = parse_rows(&["..", "11", "00"]);
        let result = solve(&rows, 1, &SolverConfig::no_guess()).unwrap();
        assert_eq!(result.state, GameState::Stuck);
        assert_eq!(result.tag, Some(SolverTag::Stuck));
        assert!(result.interactions.is_empty());

        // Calling again changes nothing
        let again = solve(&rows, 1, &SolverConfig::no_guess()).unwrap();
        assert_eq!(again.state, GameState::Stuck);
        assert!(again.interactions.is_empty());

        let guessed = solve(&rows, 1, &SolverConfig::default()).unwrap();
        assert_eq!(guessed.state, GameState::Solving);
        assert_eq!(guessed.tag, Some(SolverTag::ExhaustiveGuess));
        assert_eq!(guessed.interactions.len(), 1);
        assert_eq!(guessed.interactions[0].action, Action::Reveal);
        assert_eq!(guessed.interactions[0].position.y, 0);
    }

    #[test]
    fn test_global_count_clears_outsiders() {
        // The "1" holds the only mine, so every cell away from it is safe.
        let rows = parse_rows(&[".1..........", "............"]);
        let result = solve(&rows, 1, &SolverConfig::default()).unwrap();
        assert_eq!(result.tag, Some(SolverTag::ExhaustiveNoGuess));
        let found = actions(&result);
        assert_eq!(found.len(), 18);
        assert!(found.iter().all(|&(p, a)| a == Action::Reveal && p.x >= 3));
    }

    #[test]
    fn test_inconsistent_board_is_an_error() {
        // A "3" with only two hidden neighbors
        let rows = parse_rows(&["...", "31."]);
        let config = SolverConfig {
            suffocation: false,
            ..SolverConfig::default()
        };
        assert_eq!(
            solve(&rows, 3, &config).err(),
            Some(SolverError::UnsatisfiableDigit {
                position: Position::new(0, 1)
            })
        );
        assert!(matches!(
            solve(&rows, 3, &SolverConfig::exhaustive_only(true)).err(),
            Some(SolverError::UnsatisfiableGrouping { .. })
        ));
    }

    #[test]
    fn test_over_flagged_board_is_an_error() {
        let rows = parse_rows(&["FF..", "22..", "...."]);
        assert!(matches!(
            solve(&rows, 1, &SolverConfig::default()).err(),
            Some(SolverError::MineCountExceeded { flagged: 2, mines: 1 })
        ));
    }

    #[test]
    fn test_deductions_deduplicate() {
        let mut d = Deductions::default();
        assert!(d.is_empty());
        d.reveal(3);
        d.reveal(3);
        d.flag(5);
        d.flag(5);
        assert_eq!(d.reveal, vec![3]);
        assert_eq!(d.flag, vec![5]);
    }

    // ─── Simulated games ────────────────────────────────────────────────────

    /// Play a seeded game from a revealed center, checking every certain move
    /// against the real mines. Returns the state the game ends in.
    fn play(width: usize, height: usize, mines: usize, seed: u64, config: &SolverConfig) -> GameState {
        let mut rng = SmallRng::seed_from_u64(seed);
        let center = Position::new(width / 2, height / 2);
        let mut field = Minefield::random(width, height, mines, center, 1, &mut rng);
        field.apply(center, Action::Reveal);

        for _ in 0..=width * height {
            let rows = field.rows();
            let result = solve(&rows, field.mine_count(), config).unwrap();
            if result.interactions.is_empty() {
                return result.state;
            }

            let guess = result.tag == Some(SolverTag::ExhaustiveGuess);
            for i in &result.interactions {
                if !guess {
                    match i.action {
                        Action::Flag => assert!(field.is_mine(i.position), "flagged safe cell {}", i.position),
                        Action::Reveal => assert!(!field.is_mine(i.position), "revealed mine {}", i.position),
                    }
                }
                field.apply(i.position, i.action);
            }

            // No clue ever ends up with more flags than its value
            let rows = field.rows();
            let snap = Snapshot::new(&rows, field.mine_count()).unwrap();
            for idx in 0..snap.len() {
                if let Some(v) = snap.clue(idx) {
                    assert!(snap.stats(idx).flagged <= v, "over-flagged clue at {}", snap.position(idx));
                }
            }
        }
        panic!("game did not finish");
    }

    #[test]
    fn test_beginner_games_finish() {
        for seed in 0..20 {
            let state = play(9, 9, 10, seed, &SolverConfig::default());
            assert!(matches!(state, GameState::Solved | GameState::Death), "seed {seed}: {state:?}");
        }
    }

    #[test]
    fn test_no_guess_games_end_solved_or_stuck() {
        for seed in 0..10 {
            let state = play(16, 16, 40, seed, &SolverConfig::no_guess());
            assert!(matches!(state, GameState::Solved | GameState::Stuck), "seed {seed}: {state:?}");
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_exhaustive_moves_are_sound(seed in any::<u64>(), mines in 5usize..=25) {
            let state = play(10, 8, mines, seed, &SolverConfig::exhaustive_only(true));
            prop_assert!(matches!(state, GameState::Solved | GameState::Death));
        }

        #[test]
        fn prop_no_guess_result_is_idempotent(seed in any::<u64>()) {
            let mut rng = SmallRng::seed_from_u64(seed);
            let mut field = Minefield::random(8, 8, 12, Position::new(4, 4), 1, &mut rng);
            field.apply(Position::new(4, 4), Action::Reveal);
            loop {
                let rows = field.rows();
                let result = solve(&rows, field.mine_count(), &SolverConfig::no_guess()).unwrap();
                if result.interactions.is_empty() {
                    let again = solve(&rows, field.mine_count(), &SolverConfig::no_guess()).unwrap();
                    prop_assert_eq!(again.state, result.state);
                    prop_assert_eq!(again.tag, result.tag);
                    prop_assert!(again.interactions.is_empty());
                    break;
                }
                for i in &result.interactions {
                    field.apply(i.position, i.action);
                }
            }
        }
    }
}
