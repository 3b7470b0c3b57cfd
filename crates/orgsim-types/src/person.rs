//! Per-individual records.
//!
//! A prospective individual starts life as a [`Candidate`] produced by the
//! nature policy. If the org admits it, the candidate is folded into a
//! [`PersonState`], which the engine owns until the individual dies. Death
//! produces a [`Departure`] that outlives the population entry.

use serde::{Deserialize, Serialize};

use crate::ids::Identity;

/// Policy-private traits of an individual, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PersonSeed {
    /// Propensity to keep effort for oneself, in `[0, 1]`.
    pub selfishness: f64,
}

impl PersonSeed {
    /// Create a seed, clipping `selfishness` into `[0, 1]`.
    ///
    /// NaN is mapped to the neutral value 0.5.
    pub fn new(selfishness: f64) -> Self {
        let selfishness = if selfishness.is_nan() {
            0.5
        } else {
            selfishness.clamp(0.0, 1.0)
        };
        Self { selfishness }
    }
}

/// What the org is allowed to see about a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PublicProfile {
    /// Noisy signal of the candidate's willingness to contribute, in `[0, 1]`.
    pub interview_score: f64,
}

impl Default for PublicProfile {
    fn default() -> Self {
        Self {
            interview_score: 0.5,
        }
    }
}

/// A prospective individual: public data for the org, private data for
/// the individual's own policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Visible to the org's admission decision.
    pub public: PublicProfile,
    /// Hidden from the org.
    pub private: PersonSeed,
}

impl Candidate {
    /// Build a candidate from its two halves.
    pub const fn new(public: PublicProfile, private: PersonSeed) -> Self {
        Self { public, private }
    }
}

/// Mutable state of a live individual.
///
/// Owned by the engine's population map. Policies see it through a shared
/// reference to the world state and never hold on to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonState {
    /// Who this is.
    pub identity: Identity,
    /// The candidate this individual was admitted as.
    pub candidate: Candidate,
    /// Days lived.
    pub age: u32,
    /// Current wealth. Strictly negative wealth is fatal.
    pub wealth: f64,
    /// Contribution accumulated during the current fiscal period.
    pub contribution: f64,
    /// Daily salary credited each day the individual acts.
    pub salary: f64,
    /// Lifetime income received from the org (salaries plus bonuses).
    pub accumulated_value: f64,
    /// Contribution accumulated over the individual's whole life.
    pub lifetime_contribution: f64,
    /// Fiscal period in which the individual joined.
    pub joined_period: u64,
}

impl PersonState {
    /// Create a freshly admitted individual with zero age and contribution.
    pub const fn new(
        identity: Identity,
        candidate: Candidate,
        initial_wealth: f64,
        salary: f64,
        joined_period: u64,
    ) -> Self {
        Self {
            identity,
            candidate,
            age: 0,
            wealth: initial_wealth,
            contribution: 0.0,
            salary,
            accumulated_value: 0.0,
            lifetime_contribution: 0.0,
            joined_period,
        }
    }

    /// Shortcut to the private selfishness trait.
    pub const fn selfishness(&self) -> f64 {
        self.candidate.private.selfishness
    }
}

/// Why an individual left the population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathCause {
    /// Wealth went strictly negative after the daily cost of living.
    Starvation,
    /// Age reached the configured maximum.
    OldAge,
    /// The environment killed the individual.
    Killed,
}

impl DeathCause {
    /// Whether the death follows from the individual's own action.
    ///
    /// Starvation and old age count as suicides in the fiscal counters;
    /// environmental kills do not.
    pub const fn is_suicide(self) -> bool {
        matches!(self, Self::Starvation | Self::OldAge)
    }
}

impl core::fmt::Display for DeathCause {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Starvation => write!(f, "starvation"),
            Self::OldAge => write!(f, "old_age"),
            Self::Killed => write!(f, "killed"),
        }
    }
}

/// Record written when an individual is removed from the population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Departure {
    /// Who died.
    pub identity: Identity,
    /// Why.
    pub cause: DeathCause,
    /// Age at death, in days.
    pub age: u32,
    /// Wealth at death.
    pub wealth: f64,
    /// Lifetime income received from the org.
    pub accumulated_value: f64,
    /// Lifetime contribution.
    pub lifetime_contribution: f64,
    /// Date of death.
    pub date: u64,
    /// Fiscal period of death.
    pub period: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_clips_selfishness() {
        assert!((PersonSeed::new(1.7).selfishness - 1.0).abs() < f64::EPSILON);
        assert!(PersonSeed::new(-0.2).selfishness.abs() < f64::EPSILON);
        assert!((PersonSeed::new(f64::NAN).selfishness - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn new_person_starts_fresh() {
        let person = PersonState::new(
            Identity::from("1"),
            Candidate::new(PublicProfile::default(), PersonSeed::new(0.3)),
            100.0,
            10.0,
            4,
        );
        assert_eq!(person.age, 0);
        assert!(person.contribution.abs() < f64::EPSILON);
        assert!((person.selfishness() - 0.3).abs() < f64::EPSILON);
        assert_eq!(person.joined_period, 4);
    }

    #[test]
    fn only_self_inflicted_deaths_are_suicides() {
        assert!(DeathCause::Starvation.is_suicide());
        assert!(DeathCause::OldAge.is_suicide());
        assert!(!DeathCause::Killed.is_suicide());
    }

    #[test]
    fn death_cause_serializes_snake_case() {
        let json = serde_json::to_string(&DeathCause::OldAge).ok();
        assert_eq!(json.as_deref(), Some("\"old_age\""));
        assert_eq!(DeathCause::OldAge.to_string(), "old_age");
    }
}
