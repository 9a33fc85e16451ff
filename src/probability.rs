//! Probability estimation and guess selection.
//!
//! Every bucket of the merged distribution is weighted by how likely it is
//! that the frontier holds exactly that many mines given the mines left on
//! the whole board. The exact hypergeometric term is used unless the frontier
//! is small next to the unresolved area, where its binomial approximation is
//! close enough. Both are evaluated in log space.

use crate::frontier::Frontier;
use crate::grouping::Grouping;
use crate::merge::Distribution;
use crate::snapshot::Snapshot;
use std::collections::HashMap;

/// The binomial approximation is used when `frontier * BINOMIAL_RATIO <= unresolved`.
const BINOMIAL_RATIO: usize = 20;

/// The cell recommended for a guess.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Guess {
    pub cell: usize,
    pub probability: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityReport {
    /// `(frontier mines, normalized weight)`, one entry per bucket.
    pub bucket_weights: Vec<(usize, f64)>,
    /// Mine probability per merged candidate.
    pub candidate_probabilities: Vec<f64>,
    /// Expected number of mines on the frontier.
    pub frontier_mines: f64,
    /// Shared mine probability of every outsider.
    pub outsider_probability: Option<f64>,
    /// The outsider least exposed to uncertain frontier cells.
    pub representative_outsider: Option<usize>,
    pub guess: Option<Guess>,
}

/// `ln C(n, k)`, `-inf` when `k > n`.
fn ln_choose(n: usize, k: usize) -> f64 {
    if k > n {
        return f64::NEG_INFINITY;
    }
    let k = k.min(n - k);
    (0..k).map(|i| ((n - i) as f64 / (i + 1) as f64).ln()).sum()
}

/// `x * ln(y)` with `0 * ln(0) = 0`.
fn x_ln_y(x: f64, y: f64) -> f64 {
    if x == 0.0 {
        0.0
    } else {
        x * y.ln()
    }
}

/// Log-likelihood of one specific frontier placement holding `mines` mines.
fn placement_ln_likelihood(mines: usize, frontier: usize, unresolved: usize, mines_left: usize) -> f64 {
    if frontier * BINOMIAL_RATIO <= unresolved {
        let p = mines_left as f64 / unresolved as f64;
        x_ln_y(mines as f64, p) + x_ln_y((frontier - mines) as f64, 1.0 - p)
    } else {
        let outsiders = unresolved - frontier;
        match mines_left.checked_sub(mines) {
            Some(rest) => ln_choose(outsiders, rest) - ln_choose(unresolved, mines_left),
            None => f64::NEG_INFINITY,
        }
    }
}

/// Estimate mine probabilities for the whole unresolved area and pick the
/// least risky cell.
///
/// Candidate indices follow the concatenation of `groupings`' candidate lists,
/// the same order [`merge_all`](crate::merge::merge_all) produces.
pub fn estimate<C>(
    snap: &Snapshot<'_, C>,
    frontier: &Frontier,
    groupings: &[Grouping],
    dist: &Distribution,
    mines_left: usize,
) -> ProbabilityReport {
    let frontier_cells: usize = groupings.iter().map(Grouping::cell_count).sum();
    let outsiders = frontier.outsiders.len();
    let unresolved = frontier_cells + outsiders;

    // Normalized bucket weights
    let logs: Vec<f64> = dist
        .buckets
        .iter()
        .map(|b| b.weight.ln() + placement_ln_likelihood(b.mines, frontier_cells, unresolved, mines_left))
        .collect();
    let top = logs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let raw: Vec<f64> = logs
        .iter()
        .map(|&l| if top.is_finite() { (l - top).exp() } else { 0.0 })
        .collect();
    let total: f64 = raw.iter().sum();
    let weights: Vec<f64> = raw.iter().map(|&w| if total > 0.0 { w / total } else { 0.0 }).collect();

    let mut candidate_probabilities = vec![0.0; dist.sizes.len()];
    let mut frontier_mines = 0.0;
    for (b, &w) in dist.buckets.iter().zip(&weights) {
        frontier_mines += w * b.mines as f64;
        if b.weight <= 0.0 {
            continue;
        }
        for (i, p) in candidate_probabilities.iter_mut().enumerate() {
            *p += w * (b.mine_sums[i] / b.weight) / dist.sizes[i] as f64;
        }
    }

    let outsider_probability =
        (outsiders > 0).then(|| ((mines_left as f64 - frontier_mines) / outsiders as f64).clamp(0.0, 1.0));

    // Per-cell probabilities of frontier unknowns
    let mut cell_probability: HashMap<usize, f64> = HashMap::new();
    let members = groupings.iter().flat_map(|g| &g.candidates);
    for (cand, &p) in members.clone().zip(&candidate_probabilities) {
        for &m in &cand.members {
            cell_probability.insert(m, p);
        }
    }

    // Prefer outsiders whose frontier neighbors are least likely to hide mines
    let mut representative_outsider: Option<(usize, f64)> = None;
    for &o in &frontier.outsiders {
        let clear: f64 = snap
            .neighbors(o)
            .iter()
            .filter_map(|n| cell_probability.get(n))
            .map(|p| 1.0 - p)
            .product();
        if representative_outsider.map_or(true, |(_, best)| clear > best) {
            representative_outsider = Some((o, clear));
        }
    }

    let mut guess: Option<Guess> = None;
    for (cand, &p) in members.zip(&candidate_probabilities) {
        if guess.map_or(true, |g| p < g.probability) {
            guess = Some(Guess {
                cell: cand.representative,
                probability: p,
            });
        }
    }
    if let (Some((cell, _)), Some(p)) = (representative_outsider, outsider_probability) {
        if guess.map_or(true, |g| p < g.probability) {
            guess = Some(Guess { cell, probability: p });
        }
    }

    ProbabilityReport {
        bucket_weights: dist.buckets.iter().map(|b| b.mines).zip(weights).collect(),
        candidate_probabilities,
        frontier_mines,
        outsider_probability,
        representative_outsider: representative_outsider.map(|(o, _)| o),
        guess,
    }
}
