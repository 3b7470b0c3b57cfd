//! The three strategy contracts the engine drives.
//!
//! Policies receive the world state by shared reference only. Anything a
//! policy wants changed is returned as a value and applied by the engine,
//! which is the only component that inserts into or removes from the
//! population map.

use std::collections::BTreeMap;

use rand::RngCore;

use orgsim_types::{Candidate, Identity, IdentityGenerator, PersonState, PublicProfile, WorldState};

/// A freshly materialized individual: identity, behavior, and state.
pub type NewIndividual = (Identity, Box<dyn IndividualPolicy>, PersonState);

/// Per-identity amounts returned by the org (scores, bonuses, salaries).
pub type IdentityAmounts = BTreeMap<Identity, f64>;

// ---------------------------------------------------------------------------
// Individual
// ---------------------------------------------------------------------------

/// Behavior of one individual.
pub trait IndividualPolicy {
    /// Short name used in logs.
    fn kind(&self) -> &'static str;

    /// Decide today's contribution.
    ///
    /// Negative returns are treated as zero by the engine.
    fn act(&mut self, state: &WorldState, identity: &Identity, rng: &mut dyn RngCore) -> f64;

    /// Cleanup hook run exactly once, just before the individual is removed.
    fn die(&mut self, _state: &WorldState, _identity: &Identity) {}
}

/// Builds individual behaviors for admitted candidates.
pub trait IndividualFactory {
    /// Create the behavior for `candidate`.
    fn create(&self, candidate: &Candidate) -> Box<dyn IndividualPolicy>;
}

// ---------------------------------------------------------------------------
// Org
// ---------------------------------------------------------------------------

/// Outcome of [`OrgPolicy::evaluate_candidate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateVerdict {
    /// Admit this candidate.
    Admit,
    /// Pass on this candidate and keep looking.
    Reject,
    /// Pass on this candidate and end the recruitment pass.
    Stop,
}

/// The organizing entity.
///
/// Every map returned by [`compute_bonuses`](OrgPolicy::compute_bonuses) and
/// [`re_evaluate_salaries`](OrgPolicy::re_evaluate_salaries) must contain
/// an entry for every live identity.
pub trait OrgPolicy {
    /// Short name used in logs.
    fn kind(&self) -> &'static str;

    /// A new individual joined, either at start-up or via recruitment.
    fn register(&mut self, _state: &WorldState, _identity: &Identity) {}

    /// Called after each individual is processed on a day.
    fn react_to_individual(&mut self, _state: &WorldState, _identity: &Identity, _dead: bool) {}

    /// Share of the pending reward pool retained for shareholders.
    fn compute_shareholder_value(&mut self, state: &WorldState) -> f64;

    /// Bonuses for every live identity, or `None` to skip distribution and
    /// leave the pool for the next period.
    fn compute_bonuses(&mut self, state: &WorldState) -> Option<IdentityAmounts>;

    /// Daily salary for every live identity.
    fn re_evaluate_salaries(&mut self, state: &WorldState) -> IdentityAmounts;

    /// Role-model weights for the recruitment pass.
    fn evaluate_individuals(&mut self, state: &WorldState) -> IdentityAmounts;

    /// Admission decision for one candidate, from its public data only.
    fn evaluate_candidate(&mut self, state: &WorldState, public: &PublicProfile)
    -> CandidateVerdict;

    /// An admitted candidate has been added to the population.
    fn recruit(&mut self, _state: &WorldState, _identity: &Identity, _public: &PublicProfile) {}
}

// ---------------------------------------------------------------------------
// Nature
// ---------------------------------------------------------------------------

/// Lazy, possibly unbounded, sequence of candidates.
///
/// Safe to drop at any point.
pub trait CandidateStream {
    /// Produce the next candidate, or `None` when the supply is exhausted.
    fn next_candidate(
        &mut self,
        rng: &mut dyn RngCore,
        identities: &mut dyn IdentityGenerator,
    ) -> Option<(Identity, Candidate)>;
}

/// The environment.
pub trait NaturePolicy {
    /// Short name used in logs.
    fn kind(&self) -> &'static str;

    /// The population the run starts with.
    fn generate_initial_individuals(
        &mut self,
        state: &WorldState,
        identities: &mut dyn IdentityGenerator,
        rng: &mut dyn RngCore,
    ) -> Vec<NewIndividual>;

    /// Daily hazard. `true` kills the individual.
    fn act_on_individual(
        &mut self,
        state: &WorldState,
        identity: &Identity,
        rng: &mut dyn RngCore,
    ) -> bool;

    /// Candidates seeded from the role-model weights.
    fn generate_candidates(
        &mut self,
        state: &WorldState,
        role_models: &IdentityAmounts,
        rng: &mut dyn RngCore,
    ) -> Box<dyn CandidateStream>;

    /// Materialize an admitted candidate.
    fn generate_individual(
        &mut self,
        state: &WorldState,
        identity: Identity,
        candidate: Candidate,
    ) -> (Box<dyn IndividualPolicy>, PersonState);
}

/// A stream that never yields.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyStream;

impl CandidateStream for EmptyStream {
    fn next_candidate(
        &mut self,
        _rng: &mut dyn RngCore,
        _identities: &mut dyn IdentityGenerator,
    ) -> Option<(Identity, Candidate)> {
        None
    }
}
