//! Role-model selection for recruitment.

use serde::{Deserialize, Serialize};

use orgsim_types::{PersonState, WorldState, count_f64};

use crate::policy::IdentityAmounts;

/// Which live individuals seed the candidate distribution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoleModelSelection {
    /// Everyone, with equal weight.
    #[default]
    Everyone,
    /// The top `floor(percentile * N) + 1` contributors, with equal weight.
    TopContributors {
        /// Fraction of the population to keep, in `[0, 1]`.
        percentile: f64,
    },
}

impl RoleModelSelection {
    /// Weight 1.0 for every selected individual.
    ///
    /// Contribution ties are broken by identity order. An empty population
    /// yields an empty map.
    pub fn select(self, state: &WorldState) -> IdentityAmounts {
        match self {
            Self::Everyone => state.people.keys().map(|id| (id.clone(), 1.0)).collect(),
            Self::TopContributors { percentile } => {
                let mut ranked: Vec<&PersonState> = state.people.values().collect();
                // Stable sort keeps identity order among equal contributions.
                ranked.sort_by(|a, b| b.contribution.total_cmp(&a.contribution));
                let keep = top_count(percentile, ranked.len());
                ranked
                    .into_iter()
                    .take(keep)
                    .map(|p| (p.identity.clone(), 1.0))
                    .collect()
            }
        }
    }
}

/// `floor(percentile * n) + 1`, capped at `n`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn top_count(percentile: f64, n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    // Clamped into [0, n] before the cast.
    let scaled = (percentile.clamp(0.0, 1.0) * count_f64(n)).floor() as usize;
    scaled.saturating_add(1).min(n)
}
