//! Frontier extraction: border digits, border unknowns and outsiders.
//!
//! The border forms a bipartite graph between clue cells that still have an
//! unknown neighbor and the unknown cells next to them. Local indices into
//! `digits` / `unknowns` are used for all adjacency lists.

use crate::snapshot::Snapshot;
use std::collections::HashMap;

pub struct Frontier {
    /// Clue cells with at least one unknown neighbor.
    pub digits: Vec<usize>,
    /// Unknown cells next to at least one border digit.
    pub unknowns: Vec<usize>,
    /// Unknown cells with no clue neighbor.
    pub outsiders: Vec<usize>,
    /// digit (local) -> adjacent unknowns (local)
    digit_links: Vec<Vec<usize>>,
    /// unknown (local) -> adjacent digits (local)
    unknown_links: Vec<Vec<usize>>,
    /// cell index -> local unknown index
    unknown_slots: HashMap<usize, usize>,
}

impl Frontier {
    pub fn new<C>(snap: &Snapshot<'_, C>) -> Self {
        let mut digits = Vec::new();
        let mut digit_slots: HashMap<usize, usize> = HashMap::new();
        for idx in 0..snap.len() {
            if snap.clue(idx).is_some() && snap.stats(idx).unknown > 0 {
                digit_slots.insert(idx, digits.len());
                digits.push(idx);
            }
        }

        let mut unknowns = Vec::new();
        let mut outsiders = Vec::new();
        let mut unknown_links = Vec::new();
        let mut unknown_slots = HashMap::new();
        let mut digit_links = vec![Vec::new(); digits.len()];

        for u in snap.unknown_cells() {
            let links: Vec<usize> = snap
                .clue_neighbors(u)
                .filter_map(|d| digit_slots.get(&d).copied())
                .collect();
            if links.is_empty() {
                outsiders.push(u);
                continue;
            }
            let slot = unknowns.len();
            for &d in &links {
                digit_links[d].push(slot);
            }
            unknown_slots.insert(u, slot);
            unknowns.push(u);
            unknown_links.push(links);
        }

        Self {
            digits,
            unknowns,
            outsiders,
            digit_links,
            unknown_links,
            unknown_slots,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.unknowns.is_empty()
    }

    /// Border unknowns (local) adjacent to border digit `digit` (local).
    pub fn digit_links(&self, digit: usize) -> &[usize] {
        &self.digit_links[digit]
    }

    /// Border digits (local) adjacent to border unknown `unknown` (local).
    pub fn unknown_links(&self, unknown: usize) -> &[usize] {
        &self.unknown_links[unknown]
    }

    /// Local index of a border unknown, by cell index.
    pub fn unknown_slot(&self, cell: usize) -> Option<usize> {
        self.unknown_slots.get(&cell).copied()
    }
}
