//! Combinatorial search over one grouping.
//!
//! Enumerates every assignment of mine counts to candidates that satisfies all
//! of the grouping's constraints within a mine budget. Works on an explicit
//! stack of partial-assignment nodes; each unassigned candidate's legal values
//! form an interval, and the candidate with the narrowest interval is branched
//! on next.

use crate::grouping::Grouping;

/// A valid per-grouping assignment: mines placed in each candidate, by index.
pub type Assignment = Vec<u8>;

#[derive(Clone)]
struct Node {
    values: Vec<Option<u8>>,
    /// Mines placed so far, per constraint.
    placed: Vec<i32>,
    /// Total size of still-unassigned candidates, per constraint.
    open: Vec<i32>,
    total: usize,
}

impl Node {
    fn root(grouping: &Grouping) -> Self {
        let open = grouping
            .constraints
            .iter()
            .map(|c| c.candidates.iter().map(|&i| grouping.candidates[i].size() as i32).sum::<i32>())
            .collect();
        Self {
            values: vec![None; grouping.candidates.len()],
            placed: vec![0; grouping.constraints.len()],
            open,
            total: 0,
        }
    }

    /// Interval of values candidate `i` can still take, or `None` if empty.
    fn legal(&self, grouping: &Grouping, budget: usize, i: usize) -> Option<(i32, i32)> {
        let cand = &grouping.candidates[i];
        let size = cand.size() as i32;
        let mut lo = 0i32;
        let mut hi = (budget - self.total).min(cand.size()) as i32;

        for &c in &cand.digits {
            let need = grouping.constraints[c].remaining - self.placed[c];
            let others = self.open[c] - size;
            lo = lo.max(need - others);
            hi = hi.min(need);
        }

        (lo <= hi).then_some((lo, hi))
    }

    fn assign(&mut self, grouping: &Grouping, i: usize, value: i32) {
        let cand = &grouping.candidates[i];
        self.values[i] = Some(value as u8);
        for &c in &cand.digits {
            self.placed[c] += value;
            self.open[c] -= cand.size() as i32;
        }
        self.total += value as usize;
    }
}

/// Find every valid assignment of `grouping` using at most `budget` mines.
pub fn search(grouping: &Grouping, budget: usize) -> Vec<Assignment> {
    let n = grouping.candidates.len();

    // Total size of the other candidates sharing a digit; smaller shrinks the tree faster
    let crowding: Vec<i32> = grouping
        .candidates
        .iter()
        .map(|cand| {
            cand.digits
                .iter()
                .flat_map(|&c| &grouping.constraints[c].candidates)
                .map(|&j| grouping.candidates[j].size() as i32)
                .sum::<i32>()
                - cand.size() as i32 * cand.digits.len() as i32
        })
        .collect();

    let mut found = Vec::new();
    let mut stack = vec![Node::root(grouping)];

    'nodes: while let Some(node) = stack.pop() {
        // (candidate, lo, hi) of the most constrained unassigned candidate
        let mut pick: Option<(usize, i32, i32)> = None;

        for i in 0..n {
            if node.values[i].is_some() {
                continue;
            }
            let Some((lo, hi)) = node.legal(grouping, budget, i) else {
                continue 'nodes;
            };
            let better = match pick {
                None => true,
                Some((j, plo, phi)) => {
                    let key = (hi - lo, -(grouping.candidates[i].digits.len() as i32), crowding[i]);
                    let best = (phi - plo, -(grouping.candidates[j].digits.len() as i32), crowding[j]);
                    key < best
                }
            };
            if better {
                pick = Some((i, lo, hi));
            }
        }

        match pick {
            None => {
                let satisfied = grouping
                    .constraints
                    .iter()
                    .zip(&node.placed)
                    .all(|(c, &placed)| c.remaining == placed);
                if satisfied {
                    found.push(node.values.iter().map(|v| v.unwrap_or(0)).collect());
                }
            }
            Some((i, lo, hi)) => {
                // Pushed high to low so the lowest value is explored first
                for value in (lo..=hi).rev() {
                    let mut child = node.clone();
                    child.assign(grouping, i, value);
                    stack.push(child);
                }
            }
        }
    }

    found
}

// ─── Certainty test ─────────────────────────────────────────────────────────

/// Moves proven by a set of valid assignments. Candidate indices refer to the
/// candidate list the assignments were made over.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Certainty {
    /// Candidates with no mine in any assignment.
    pub safe: Vec<usize>,
    /// Candidates completely mined in every assignment.
    pub mines: Vec<usize>,
    /// No mines remain for cells outside the frontier.
    pub outsiders_safe: bool,
    /// Every cell outside the frontier must be a mine.
    pub outsiders_mined: bool,
}

impl Certainty {
    pub fn is_certain(&self) -> bool {
        !self.safe.is_empty() || !self.mines.is_empty() || self.outsiders_safe || self.outsiders_mined
    }
}

/// Run the certainty test over one grouping's valid assignments.
pub fn certainty(grouping: &Grouping, assignments: &[Assignment], budget: usize, has_outsiders: bool) -> Certainty {
    let mut out = Certainty::default();
    if assignments.is_empty() {
        return out;
    }

    for (i, cand) in grouping.candidates.iter().enumerate() {
        if assignments.iter().all(|a| a[i] == 0) {
            out.safe.push(i);
        } else if assignments.iter().all(|a| a[i] as usize == cand.size()) {
            out.mines.push(i);
        }
    }

    out.outsiders_safe = has_outsiders && min_total(assignments) == budget;
    out
}

/// Fewest mines used by any assignment.
pub fn min_total(assignments: &[Assignment]) -> usize {
    assignments
        .iter()
        .map(|a| a.iter().map(|&v| v as usize).sum())
        .min()
        .unwrap_or(0)
}
