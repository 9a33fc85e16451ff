//! Per-call solver configuration.

use serde::{Deserialize, Serialize};

/// Options passed explicitly into every [`solve`](crate::solver::solve) call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Open an untouched board and guess when nothing is certain.
    /// When off, such calls report `Stuck` instead.
    pub guessing: bool,
    /// Run the suffocation tier.
    pub suffocation: bool,
    /// Run the per-digit mask enumeration tier.
    pub digit_combination: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            guessing: true,
            suffocation: true,
            digit_combination: true,
        }
    }
}

impl SolverConfig {
    /// Certain moves only.
    pub fn no_guess() -> Self {
        Self {
            guessing: false,
            ..Self::default()
        }
    }

    /// Skip the local tiers so every non-trivial deduction goes through the
    /// exhaustive grouping search.
    pub fn exhaustive_only(guessing: bool) -> Self {
        Self {
            guessing,
            suffocation: false,
            digit_combination: false,
        }
    }
}
