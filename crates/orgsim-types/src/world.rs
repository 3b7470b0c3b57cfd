//! The shared simulation record.
//!
//! [`WorldState`] is owned by the engine for the whole run. Policies only
//! ever receive `&WorldState`; every change they want made is returned as a
//! value and applied by the engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::count_f64;
use crate::ids::Identity;
use crate::person::PersonState;

// ---------------------------------------------------------------------------
// Seed
// ---------------------------------------------------------------------------

/// Economic constants of a run, fixed at world creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSeed {
    /// Days per fiscal period.
    pub fiscal_length: u32,
    /// Reward added to the pool per unit of contribution.
    pub productivity: f64,
    /// Initial daily salary of a newly admitted individual.
    pub daily_salary: f64,
    /// Amount deducted from every individual's wealth each day.
    pub daily_living_cost: f64,
    /// Wealth of a newly created individual.
    pub initial_wealth: f64,
    /// Age in days at which an individual dies.
    pub max_age: u32,
    /// Upper bound on admissions per recruitment pass.
    pub recruitment_quota: u32,
}

impl Default for WorldSeed {
    fn default() -> Self {
        Self {
            fiscal_length: 30,
            productivity: 2.0,
            daily_salary: 1.0,
            daily_living_cost: 1.0,
            initial_wealth: 30.0,
            max_age: 3650,
            recruitment_quota: 5,
        }
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// Position of the simulation in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SimTime {
    /// Days elapsed since the start of the run.
    pub date: u64,
    /// Index of the current fiscal period.
    pub period: u64,
    /// Days already completed in the current period.
    pub day_of_period: u32,
}

impl SimTime {
    /// Time at the very start of a run.
    pub const fn start() -> Self {
        Self {
            date: 0,
            period: 0,
            day_of_period: 0,
        }
    }
}

impl core::fmt::Display for SimTime {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "period {} day {} (date {})", self.period, self.day_of_period, self.date)
    }
}

// ---------------------------------------------------------------------------
// Sub-records
// ---------------------------------------------------------------------------

/// Org bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrgState {
    /// Cumulative value retained for shareholders.
    pub shareholder_value: f64,
    /// Admissions in the recruitment pass currently running.
    pub recruited_this_period: u32,
    /// Cumulative bonuses paid to individuals.
    pub bonuses_paid: f64,
}

/// Nature bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NatureState {
    /// Candidates produced by every recruitment pass so far.
    pub candidates_offered: u64,
    /// Individuals killed by the environment so far.
    pub hazard_kills: u64,
}

/// Counters shared by everyone, reset at each period boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonState {
    /// Deaths by the individual's own action in the current period.
    pub fiscal_suicides: u32,
    /// Deaths by the environment in the current period.
    pub fiscal_killed: u32,
}

impl CommonState {
    /// Zero both counters.
    pub const fn reset(&mut self) {
        self.fiscal_suicides = 0;
        self.fiscal_killed = 0;
    }
}

// ---------------------------------------------------------------------------
// World state
// ---------------------------------------------------------------------------

/// Complete mutable state of a run.
///
/// `people` keys are exactly the live population. After every day no entry
/// has negative wealth or an age at or above `seed.max_age`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    /// Current time.
    pub time: SimTime,
    /// Economic constants.
    pub seed: WorldSeed,
    /// Live population, ordered by identity.
    pub people: BTreeMap<Identity, PersonState>,
    /// Org bookkeeping.
    pub org: OrgState,
    /// Nature bookkeeping.
    pub nature: NatureState,
    /// Period counters.
    pub common: CommonState,
    /// Reward pool awaiting distribution.
    pub total_reward: f64,
}

impl WorldState {
    /// Empty world at time zero.
    pub fn new(seed: WorldSeed) -> Self {
        Self {
            time: SimTime::start(),
            seed,
            people: BTreeMap::new(),
            org: OrgState::default(),
            nature: NatureState::default(),
            common: CommonState::default(),
            total_reward: 0.0,
        }
    }

    /// Number of live individuals.
    pub fn population(&self) -> usize {
        self.people.len()
    }

    /// Look up a live individual.
    pub fn person(&self, identity: &Identity) -> Option<&PersonState> {
        self.people.get(identity)
    }

    /// Sum of current-period contributions over the live population.
    pub fn total_contribution(&self) -> f64 {
        self.people.values().map(|p| p.contribution).sum()
    }

    /// Mean wealth, or `None` for an empty population.
    pub fn average_wealth(&self) -> Option<f64> {
        if self.people.is_empty() {
            return None;
        }
        let total: f64 = self.people.values().map(|p| p.wealth).sum();
        Some(total / count_f64(self.people.len()))
    }

    /// Mean selfishness, or `None` for an empty population.
    pub fn average_selfishness(&self) -> Option<f64> {
        if self.people.is_empty() {
            return None;
        }
        let total: f64 = self.people.values().map(PersonState::selfishness).sum();
        Some(total / count_f64(self.people.len()))
    }

    /// Days left in the current period, counting today.
    pub const fn days_remaining_in_period(&self) -> u32 {
        self.seed.fiscal_length.saturating_sub(self.time.day_of_period)
    }
}
