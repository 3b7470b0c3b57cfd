//! How the org splits a reward pool among the live population.

use serde::{Deserialize, Serialize};
use tracing::debug;

use orgsim_types::{WorldState, count_f64};

use crate::policy::IdentityAmounts;

/// Reward split rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardDistribution {
    /// Everyone gets `total / N`.
    #[default]
    AllEqual,
    /// Everyone gets `total * contribution / sum(contributions)`.
    EqualContribution,
}

impl RewardDistribution {
    /// Split `total` among everyone in `state.people`.
    ///
    /// Returns `None` when no split is possible: an empty population, or a
    /// zero contribution sum under [`RewardDistribution::EqualContribution`].
    /// The caller leaves the pool untouched in that case.
    pub fn compute(self, total: f64, state: &WorldState) -> Option<IdentityAmounts> {
        if state.people.is_empty() {
            return None;
        }
        match self {
            Self::AllEqual => {
                let share = total / count_f64(state.people.len());
                Some(state.people.keys().map(|id| (id.clone(), share)).collect())
            }
            Self::EqualContribution => {
                let sum = state.total_contribution();
                if sum <= 0.0 {
                    debug!(total, "no contribution this period, reward rolls over");
                    return None;
                }
                Some(
                    state
                        .people
                        .iter()
                        .map(|(id, p)| (id.clone(), p.contribution * total / sum))
                        .collect(),
                )
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use orgsim_types::{Candidate, Identity, PersonSeed, PersonState, PublicProfile, WorldSeed};

    use super::*;

    fn state_with(contributions: &[f64]) -> WorldState {
        let mut state = WorldState::new(WorldSeed::default());
        for (i, c) in contributions.iter().enumerate() {
            let id = Identity::new((i + 1).to_string());
            let mut p = PersonState::new(
                id.clone(),
                Candidate::new(PublicProfile::default(), PersonSeed::new(0.5)),
                10.0,
                1.0,
                0,
            );
            p.contribution = *c;
            state.people.insert(id, p);
        }
        state
    }

    #[test]
    fn all_equal_splits_evenly() {
        let state = state_with(&[0.0, 5.0, 1.0, 2.0]);
        let shares = RewardDistribution::AllEqual.compute(100.0, &state).unwrap();
        assert_eq!(shares.len(), 4);
        assert!(shares.values().all(|s| (s - 25.0).abs() < 1e-12));
    }

    #[test]
    fn equal_contribution_is_proportional_and_conserves() {
        let state = state_with(&[1.0, 3.0, 0.0]);
        let shares = RewardDistribution::EqualContribution
            .compute(40.0, &state)
            .unwrap();
        assert!((shares.get(&Identity::from("1")).copied().unwrap() - 10.0).abs() < 1e-12);
        assert!((shares.get(&Identity::from("2")).copied().unwrap() - 30.0).abs() < 1e-12);
        assert!(shares.get(&Identity::from("3")).copied().unwrap().abs() < 1e-12);
        assert!((shares.values().sum::<f64>() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn zero_contribution_skips() {
        let state = state_with(&[0.0, 0.0]);
        assert!(RewardDistribution::EqualContribution.compute(40.0, &state).is_none());
    }

    #[test]
    fn empty_population_skips() {
        let state = state_with(&[]);
        assert!(RewardDistribution::AllEqual.compute(40.0, &state).is_none());
    }

    #[test]
    fn serde_names() {
        let json = serde_json::to_string(&RewardDistribution::EqualContribution).unwrap();
        assert_eq!(json, "\"equal_contribution\"");
    }
}
