//! Grouping & clustering.
//!
//! Splits the frontier into independent connected components and, inside
//! each, collapses unknowns with identical clue sets into one candidate.

use crate::frontier::Frontier;
use crate::snapshot::Snapshot;
use std::collections::HashMap;

/// Constraint-equivalent border unknowns searched as one variable.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub representative: usize,
    /// Cell indices, representative first.
    pub members: Vec<usize>,
    /// Constraint indices within the grouping, ascending.
    pub digits: Vec<usize>,
}

impl Candidate {
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.members.len()
    }
}

/// A border digit: the candidates around it must hold exactly `remaining` mines.
#[derive(Debug, Clone)]
pub struct Constraint {
    pub cell: usize,
    pub remaining: i32,
    pub candidates: Vec<usize>,
}

/// One connected component of the border graph.
#[derive(Debug, Clone)]
pub struct Grouping {
    pub constraints: Vec<Constraint>,
    pub candidates: Vec<Candidate>,
}

impl Grouping {
    /// Number of border unknowns covered.
    pub fn cell_count(&self) -> usize {
        self.candidates.iter().map(Candidate::size).sum()
    }
}

/// Build all groupings, cheapest to search first.
pub fn build_groupings<C>(snap: &Snapshot<'_, C>, frontier: &Frontier) -> Vec<Grouping> {
    let mut seen_unknown = vec![false; frontier.unknowns.len()];
    let mut seen_digit = vec![false; frontier.digits.len()];
    let mut groupings = Vec::new();

    for start in 0..frontier.unknowns.len() {
        if seen_unknown[start] {
            continue;
        }

        let mut unknowns = Vec::new();
        let mut digits = Vec::new();
        let mut stack = vec![start];
        seen_unknown[start] = true;

        while let Some(u) = stack.pop() {
            unknowns.push(u);
            for &d in frontier.unknown_links(u) {
                if seen_digit[d] {
                    continue;
                }
                seen_digit[d] = true;
                digits.push(d);
                for &next in frontier.digit_links(d) {
                    if !seen_unknown[next] {
                        seen_unknown[next] = true;
                        stack.push(next);
                    }
                }
            }
        }

        unknowns.sort_unstable();
        digits.sort_unstable();
        groupings.push(cluster(snap, frontier, &unknowns, &digits));
    }

    // Small groupings first; more digits means more pruning
    groupings.sort_by(|a, b| {
        a.candidates
            .len()
            .cmp(&b.candidates.len())
            .then(b.constraints.len().cmp(&a.constraints.len()))
    });
    groupings
}

/// Merge unknowns sharing the same neighbor-digit set into candidates.
fn cluster<C>(
    snap: &Snapshot<'_, C>,
    frontier: &Frontier,
    unknowns: &[usize],
    digits: &[usize],
) -> Grouping {
    let constraint_of: HashMap<usize, usize> = digits.iter().enumerate().map(|(i, &d)| (d, i)).collect();

    let mut constraints: Vec<Constraint> = digits
        .iter()
        .map(|&d| {
            let cell = frontier.digits[d];
            Constraint {
                cell,
                remaining: snap.remaining(cell),
                candidates: Vec::new(),
            }
        })
        .collect();

    let mut by_key: HashMap<Vec<usize>, usize> = HashMap::new();
    let mut candidates: Vec<Candidate> = Vec::new();

    for &u in unknowns {
        let cell = frontier.unknowns[u];
        let mut key: Vec<usize> = frontier.unknown_links(u).iter().map(|d| constraint_of[d]).collect();
        key.sort_unstable();

        match by_key.get(&key) {
            Some(&ci) => candidates[ci].members.push(cell),
            None => {
                by_key.insert(key.clone(), candidates.len());
                candidates.push(Candidate {
                    representative: cell,
                    members: vec![cell],
                    digits: key,
                });
            }
        }
    }

    for (ci, cand) in candidates.iter().enumerate() {
        for &c in &cand.digits {
            constraints[c].candidates.push(ci);
        }
    }

    Grouping { constraints, candidates }
}
