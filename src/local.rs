//! Single-clue and one-hop deductions.
//!
//! - Tier 0: flag and reveal passes over every clue
//! - Tier 1: suffocation (contradiction one flag-assumption away)
//! - Tier 2: per-digit enumeration of neighbor mine masks
//!
//! All tiers read the untouched snapshot; nothing they find is fed back into
//! the statistics within the same solve call.

use crate::error::SolverError;
use crate::snapshot::Snapshot;
use crate::solver::Deductions;
use std::collections::HashMap;

// ─── Tier 0: Trivial ────────────────────────────────────────────────────────

/// Flag pass and reveal pass against the same pre-pass statistics.
pub fn trivial<C>(snap: &Snapshot<'_, C>) -> Deductions {
    let mut out = Deductions::default();

    // Flag pass: every hidden neighbor must be a mine
    for idx in 0..snap.len() {
        let Some(value) = snap.clue(idx) else { continue };
        let stats = snap.stats(idx);
        if stats.unknown > 0 && stats.hidden == value && stats.flagged < value {
            for n in snap.unknown_neighbors(idx) {
                out.flag(n);
            }
        }
    }

    // Reveal pass: flags already account for the clue
    for idx in 0..snap.len() {
        let Some(value) = snap.clue(idx) else { continue };
        let stats = snap.stats(idx);
        if stats.unknown > 0 && stats.flagged == value {
            for n in snap.unknown_neighbors(idx) {
                out.reveal(n);
            }
        }
    }

    out
}

// ─── Tier 1: Suffocation ────────────────────────────────────────────────────

/// Reveal every border unknown whose hypothetical mine would starve some
/// other clue of the slots it needs.
pub fn suffocation<C>(snap: &Snapshot<'_, C>) -> Deductions {
    let mut out = Deductions::default();

    for u in snap.unknown_cells() {
        // Clues that a mine on `u` would exactly satisfy
        let filled: Vec<usize> = snap.clue_neighbors(u).filter(|&d| snap.remaining(d) == 1).collect();
        if filled.is_empty() {
            continue;
        }

        // Their other unknown neighbors would have to be safe
        let mut secondary: Vec<usize> = Vec::new();
        for &f in &filled {
            for s in snap.unknown_neighbors(f) {
                if s != u && !secondary.contains(&s) {
                    secondary.push(s);
                }
            }
        }

        let mut excluded: HashMap<usize, i32> = HashMap::new();
        for &s in &secondary {
            for e in snap.clue_neighbors(s) {
                if !filled.contains(&e) {
                    *excluded.entry(e).or_default() += 1;
                }
            }
        }

        let suffocated = excluded
            .iter()
            .any(|(&e, &n)| snap.remaining(e) > i32::from(snap.stats(e).unknown) - n);
        if suffocated {
            out.reveal(u);
        }
    }

    out
}

// ─── Tier 2: Digit-flag combinations ────────────────────────────────────────

/// Enumerate, per border digit, every way to place its remaining mines among
/// its unknown neighbors, keeping only placements its neighboring clues can
/// tolerate.
///
/// A digit with no tolerable placement means the board is inconsistent.
pub fn digit_combination<C>(snap: &Snapshot<'_, C>) -> Result<Deductions, SolverError> {
    let mut out = Deductions::default();

    for d in 0..snap.len() {
        if snap.clue(d).is_none() || snap.stats(d).unknown == 0 {
            continue;
        }

        let unknowns: Vec<usize> = snap.unknown_neighbors(d).collect();
        let need = snap.remaining(d);
        let mut survivors = 0u32;
        let mut mined = [0u32; 8];

        if need >= 0 && need as usize <= unknowns.len() {
            for mask in 0u32..(1 << unknowns.len()) {
                if mask.count_ones() != need as u32 {
                    continue;
                }
                if !mask_fits(snap, d, &unknowns, mask) {
                    continue;
                }
                survivors += 1;
                for (i, count) in mined.iter_mut().enumerate().take(unknowns.len()) {
                    if (mask >> i) & 1 == 1 {
                        *count += 1;
                    }
                }
            }
        }

        if survivors == 0 {
            return Err(SolverError::UnsatisfiableDigit { position: snap.position(d) });
        }

        for (i, &u) in unknowns.iter().enumerate() {
            if mined[i] == 0 {
                out.reveal(u);
            } else if mined[i] == survivors {
                out.flag(u);
            }
        }
    }

    Ok(out)
}

/// Check one placement around `digit` against every other clue one hop away.
fn mask_fits<C>(snap: &Snapshot<'_, C>, digit: usize, unknowns: &[usize], mask: u32) -> bool {
    // clue -> (mines added, slots cleared)
    let mut touched: HashMap<usize, (i32, i32)> = HashMap::new();

    for (i, &u) in unknowns.iter().enumerate() {
        let is_mine = (mask >> i) & 1 == 1;
        for e in snap.clue_neighbors(u) {
            if e == digit {
                continue;
            }
            let entry = touched.entry(e).or_default();
            if is_mine {
                entry.0 += 1;
            } else {
                entry.1 += 1;
            }
        }
    }

    touched.iter().all(|(&e, &(mines, cleared))| {
        let need = snap.remaining(e) - mines;
        let slots = i32::from(snap.stats(e).unknown) - mines - cleared;
        need >= 0 && need <= slots
    })
}
