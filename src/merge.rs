//! Cross-grouping merge.
//!
//! Each grouping's assignments are summarized as a distribution over its
//! total mine count. Bucket weights count distinct cell-level placements
//! (clustering collapsed equivalent cells, so every assignment stands for
//! Π choose(size, value) placements). Distributions are then convolved
//! across groupings under the global mine budget.

use crate::grouping::{Candidate, Grouping};
use crate::search::{Assignment, Certainty};
use std::collections::BTreeMap;

/// All placements that put exactly `mines` mines on the frontier.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub mines: usize,
    /// Number of placements, up to a common scale factor.
    pub weight: f64,
    /// Per candidate: Σ placements × value. Divide by `weight` for the
    /// expected value inside this bucket.
    pub mine_sums: Vec<f64>,
    /// Per candidate: smallest value seen in this bucket.
    pub min: Vec<u8>,
    /// Per candidate: largest value seen in this bucket.
    pub max: Vec<u8>,
}

/// Mine-count distribution over a list of candidates.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    /// Cluster size per candidate.
    pub sizes: Vec<usize>,
    /// Ascending by `mines`.
    pub buckets: Vec<Bucket>,
}

impl Distribution {
    /// No candidates, a single empty placement.
    pub fn identity() -> Self {
        Self {
            sizes: Vec::new(),
            buckets: vec![Bucket {
                mines: 0,
                weight: 1.0,
                mine_sums: Vec::new(),
                min: Vec::new(),
                max: Vec::new(),
            }],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Divide all weights by the largest one; the ratios are all that matter.
    fn rescale(&mut self) {
        let top = self.buckets.iter().map(|b| b.weight).fold(0.0f64, f64::max);
        if top > 0.0 && top.is_finite() {
            for b in &mut self.buckets {
                b.weight /= top;
                for s in &mut b.mine_sums {
                    *s /= top;
                }
            }
        }
    }
}

/// Binomial coefficient as a float.
pub fn choose(n: usize, k: usize) -> f64 {
    if k > n {
        return 0.0;
    }
    let k = k.min(n - k);
    (0..k).fold(1.0, |acc, i| acc * (n - i) as f64 / (i + 1) as f64)
}

/// Bucket one grouping's assignments by total mines.
pub fn summarize(grouping: &Grouping, assignments: &[Assignment]) -> Distribution {
    let sizes: Vec<usize> = grouping.candidates.iter().map(Candidate::size).collect();
    let n = sizes.len();
    let mut buckets: BTreeMap<usize, Bucket> = BTreeMap::new();

    for a in assignments {
        let mines: usize = a.iter().map(|&v| v as usize).sum();
        let weight: f64 = a.iter().zip(&sizes).map(|(&v, &s)| choose(s, v as usize)).product();

        let bucket = buckets.entry(mines).or_insert_with(|| Bucket {
            mines,
            weight: 0.0,
            mine_sums: vec![0.0; n],
            min: vec![u8::MAX; n],
            max: vec![0; n],
        });
        bucket.weight += weight;
        for (i, &v) in a.iter().enumerate() {
            bucket.mine_sums[i] += weight * f64::from(v);
            bucket.min[i] = bucket.min[i].min(v);
            bucket.max[i] = bucket.max[i].max(v);
        }
    }

    let mut dist = Distribution {
        sizes,
        buckets: buckets.into_values().collect(),
    };
    dist.rescale();
    dist
}

/// Combine two independent distributions; candidates of `b` follow those of
/// `a`. Totals above `mines_left` are dropped.
pub fn convolve(a: &Distribution, b: &Distribution, mines_left: usize) -> Distribution {
    let mut buckets: BTreeMap<usize, Bucket> = BTreeMap::new();
    let n = a.sizes.len() + b.sizes.len();

    for x in &a.buckets {
        for y in &b.buckets {
            let mines = x.mines + y.mines;
            if mines > mines_left {
                continue;
            }
            let bucket = buckets.entry(mines).or_insert_with(|| Bucket {
                mines,
                weight: 0.0,
                mine_sums: vec![0.0; n],
                min: vec![u8::MAX; n],
                max: vec![0; n],
            });
            bucket.weight += x.weight * y.weight;

            let sums = x.mine_sums.iter().map(|s| s * y.weight).chain(y.mine_sums.iter().map(|s| s * x.weight));
            for (acc, s) in bucket.mine_sums.iter_mut().zip(sums) {
                *acc += s;
            }
            let mins = x.min.iter().chain(&y.min);
            for (acc, &v) in bucket.min.iter_mut().zip(mins) {
                *acc = (*acc).min(v);
            }
            let maxs = x.max.iter().chain(&y.max);
            for (acc, &v) in bucket.max.iter_mut().zip(maxs) {
                *acc = (*acc).max(v);
            }
        }
    }

    let mut dist = Distribution {
        sizes: a.sizes.iter().chain(&b.sizes).copied().collect(),
        buckets: buckets.into_values().collect(),
    };
    dist.rescale();
    dist
}

/// Merge every grouping's distribution and keep only totals the rest of the
/// board can complete: at most `mines_left`, and leaving no more mines than
/// there are `outsiders`.
pub fn merge_all(parts: &[Distribution], mines_left: usize, outsiders: usize) -> Distribution {
    let mut merged = parts
        .iter()
        .fold(Distribution::identity(), |acc, part| convolve(&acc, part, mines_left));
    let floor = mines_left.saturating_sub(outsiders);
    merged.buckets.retain(|b| b.mines >= floor);
    log::trace!(
        "merged {} groupings into {} buckets ({}..={} mines)",
        parts.len(),
        merged.buckets.len(),
        floor,
        mines_left
    );
    merged
}

/// Certainty test over a merged distribution.
pub fn certainty(dist: &Distribution, mines_left: usize, outsiders: usize) -> Certainty {
    let mut out = Certainty::default();
    if dist.is_empty() {
        return out;
    }

    for (i, &size) in dist.sizes.iter().enumerate() {
        if dist.buckets.iter().all(|b| b.max[i] == 0) {
            out.safe.push(i);
        } else if dist.buckets.iter().all(|b| b.min[i] as usize == size) {
            out.mines.push(i);
        }
    }

    if outsiders > 0 {
        out.outsiders_safe = dist.buckets.iter().all(|b| b.mines == mines_left);
        out.outsiders_mined = dist.buckets.iter().all(|b| mines_left - b.mines == outsiders);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::tests::groupings_of;
    use crate::search::search;
    use crate::snapshot::tests::parse_rows;

    #[test]
    fn test_choose() {
        assert_eq!(choose(5, 0), 1.0);
        assert_eq!(choose(5, 2), 10.0);
        assert_eq!(choose(8, 8), 1.0);
        assert_eq!(choose(3, 4), 0.0);
    }

    #[test]
    fn test_summarize_weights_by_placements() {
        // "3" with two flags over three equivalent cells: three placements
        let rows = parse_rows(&["...", "F3F"]);
        let groupings = groupings_of(&rows, 3);
        let dist = summarize(&groupings[0], &search(&groupings[0], 3));
        assert_eq!(dist.buckets.len(), 1);
        let b = &dist.buckets[0];
        assert_eq!(b.mines, 1);
        // rescaled to 1, expected value inside the bucket is 1 mine over 3 cells
        assert!((b.weight - 1.0).abs() < 1e-12);
        assert!((b.mine_sums[0] / b.weight - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_convolve_respects_budget() {
        let rows = parse_rows(&[".1..1."]);
        let groupings = groupings_of(&rows, 2);
        let parts: Vec<Distribution> = groupings.iter().map(|g| summarize(g, &search(g, 2))).collect();

        let both = convolve(&parts[0], &parts[1], 2);
        assert_eq!(both.sizes, vec![2, 2]);
        assert_eq!(both.buckets.len(), 1);
        assert_eq!(both.buckets[0].mines, 2);

        let tight = convolve(&parts[0], &parts[1], 1);
        assert!(tight.is_empty());
    }

    #[test]
    fn test_merge_all_drops_totals_outsiders_cannot_complete() {
        // Pair under a "1" can hold one mine; the other mine must be outside.
        let rows = parse_rows(&[".1..."]);
        let groupings = groupings_of(&rows, 2);
        let parts: Vec<Distribution> = groupings.iter().map(|g| summarize(g, &search(g, 2))).collect();

        let merged = merge_all(&parts, 2, 2);
        assert_eq!(merged.buckets.len(), 1);
        assert_eq!(merged.buckets[0].mines, 1);

        let c = certainty(&merged, 2, 2);
        assert!(!c.outsiders_safe);
        assert!(!c.outsiders_mined);

        // Only one outsider left for the second mine: it must be a mine.
        let c = certainty(&merged, 2, 1);
        assert!(c.outsiders_mined);
    }

    #[test]
    fn test_merged_certainty_finds_safe_candidates() {
        let rows = parse_rows(&["...", "121", "000"]);
        let groupings = groupings_of(&rows, 2);
        let parts: Vec<Distribution> = groupings.iter().map(|g| summarize(g, &search(g, 2))).collect();
        let merged = merge_all(&parts, 2, 0);
        let c = certainty(&merged, 2, 0);
        assert_eq!(c.safe.len(), 1);
        assert_eq!(c.mines.len(), 2);
    }

    #[test]
    fn test_identity_merge() {
        let merged = merge_all(&[], 0, 4);
        assert_eq!(merged.buckets.len(), 1);
        let c = certainty(&merged, 0, 4);
        assert!(c.outsiders_safe);
        assert!(merge_all(&[], 3, 2).is_empty());
    }
}
