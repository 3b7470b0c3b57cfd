//! Built-in environment: Gaussian trait inheritance and a flat daily hazard.
//!
//! New candidates inherit the role models' mean selfishness plus Gaussian
//! spread. The org only sees an interview score, a noisy reading of
//! `1 - selfishness`.
//!
//! # Random draws
//!
//! In order, per recruitment pass: the candidate count (finite supply
//! only), then per candidate the selfishness draw and, when the interview
//! noise is positive, the interview draw. Every Gaussian draw consumes two
//! uniforms. The daily hazard consumes one uniform per individual per day,
//! and only when the hazard rate is positive.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use orgsim_types::{
    Candidate, Identity, IdentityGenerator, PersonSeed, PersonState, PublicProfile, WorldState,
};

use crate::error::{PolicyError, check_non_negative, check_unit};
use crate::gaussian::{normal, unit_clip};
use crate::individual::IndividualVariant;
use crate::policy::{
    CandidateStream, EmptyStream, IdentityAmounts, IndividualFactory, IndividualPolicy,
    NaturePolicy, NewIndividual,
};

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// How many candidates a recruitment pass can see.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "max", rename_all = "snake_case")]
pub enum CandidateSupply {
    /// Candidates keep coming until the org stops the pass.
    #[default]
    Unbounded,
    /// A count drawn uniformly from `0..=n`.
    UpTo(u32),
}

/// Where the starting population comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InitialPopulation {
    /// One individual per listed selfishness value.
    Listed {
        /// Selfishness values, clipped to `[0, 1]`.
        selfishness: Vec<f64>,
    },
    /// `count` individuals with selfishness drawn from N(mean, spread).
    Sampled {
        /// Population size.
        count: u32,
        /// Mean selfishness.
        mean: f64,
        /// Standard deviation of selfishness.
        spread: f64,
    },
}

impl Default for InitialPopulation {
    fn default() -> Self {
        Self::Sampled {
            count: 20,
            mean: 0.5,
            spread: 0.1,
        }
    }
}

/// Parameters of [`GaussianNature`].
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianNatureParams {
    /// Starting population.
    pub initial: InitialPopulation,
    /// Standard deviation of inherited selfishness.
    pub spread: f64,
    /// Standard deviation of interview noise; zero makes interviews exact.
    pub interview_noise: f64,
    /// Candidate supply per recruitment pass.
    pub supply: CandidateSupply,
    /// Daily probability that the environment kills an individual.
    pub hazard_rate: f64,
    /// Behavior given to every individual.
    pub individuals: IndividualVariant,
}

impl Default for GaussianNatureParams {
    fn default() -> Self {
        Self {
            initial: InitialPopulation::default(),
            spread: 0.05,
            interview_noise: 0.0,
            supply: CandidateSupply::Unbounded,
            hazard_rate: 0.0,
            individuals: IndividualVariant::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Nature
// ---------------------------------------------------------------------------

/// Environment with Gaussian trait inheritance.
#[derive(Debug, Clone)]
pub struct GaussianNature {
    params: GaussianNatureParams,
}

impl GaussianNature {
    /// Validate parameters and build the policy.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] if a spread or noise is negative or the
    /// hazard rate is outside `[0, 1]`.
    pub fn new(params: GaussianNatureParams) -> Result<Self, PolicyError> {
        check_non_negative("spread", params.spread)?;
        check_non_negative("interview_noise", params.interview_noise)?;
        check_unit("hazard_rate", params.hazard_rate)?;
        if let InitialPopulation::Sampled { spread, .. } = params.initial {
            check_non_negative("initial spread", spread)?;
        }
        Ok(Self { params })
    }

    /// The validated parameters.
    pub const fn params(&self) -> &GaussianNatureParams {
        &self.params
    }

    fn materialize(
        &self,
        state: &WorldState,
        identity: Identity,
        candidate: Candidate,
    ) -> (Box<dyn IndividualPolicy>, PersonState) {
        let policy = self.params.individuals.create(&candidate);
        let person = PersonState::new(
            identity,
            candidate,
            state.seed.initial_wealth,
            state.seed.daily_salary,
            state.time.period,
        );
        (policy, person)
    }
}

/// Weighted mean selfishness of the role models still alive.
fn role_model_mean(state: &WorldState, role_models: &IdentityAmounts) -> Option<f64> {
    let (weighted, total) = role_models
        .iter()
        .filter(|(_, w)| **w > 0.0)
        .filter_map(|(id, w)| state.person(id).map(|p| (p.selfishness(), *w)))
        .fold((0.0, 0.0), |(sum, total), (s, w)| (s.mul_add(w, sum), total + w));
    (total > 0.0).then(|| weighted / total)
}

fn interview(selfishness: f64, noise: f64, rng: &mut dyn RngCore) -> PublicProfile {
    let signal = 1.0 - selfishness;
    let interview_score = if noise > 0.0 {
        unit_clip(normal(rng, signal, noise))
    } else {
        signal
    };
    PublicProfile { interview_score }
}

impl NaturePolicy for GaussianNature {
    fn kind(&self) -> &'static str {
        "gaussian"
    }

    fn generate_initial_individuals(
        &mut self,
        state: &WorldState,
        identities: &mut dyn IdentityGenerator,
        rng: &mut dyn RngCore,
    ) -> Vec<NewIndividual> {
        let traits: Vec<f64> = match &self.params.initial {
            InitialPopulation::Listed { selfishness } => selfishness.clone(),
            InitialPopulation::Sampled {
                count,
                mean,
                spread,
            } => (0..*count).map(|_| normal(rng, *mean, *spread)).collect(),
        };

        let mut individuals = Vec::with_capacity(traits.len());
        for selfishness in traits {
            let seed = PersonSeed::new(selfishness);
            let public = interview(seed.selfishness, self.params.interview_noise, rng);
            let identity = identities.generate();
            let (policy, person) =
                self.materialize(state, identity.clone(), Candidate::new(public, seed));
            individuals.push((identity, policy, person));
        }
        individuals
    }

    fn act_on_individual(
        &mut self,
        _state: &WorldState,
        _identity: &Identity,
        rng: &mut dyn RngCore,
    ) -> bool {
        if self.params.hazard_rate <= 0.0 {
            return false;
        }
        let roll: f64 = rng.random_range(0.0..1.0);
        roll < self.params.hazard_rate
    }

    fn generate_candidates(
        &mut self,
        state: &WorldState,
        role_models: &IdentityAmounts,
        rng: &mut dyn RngCore,
    ) -> Box<dyn CandidateStream> {
        if role_models.is_empty() {
            debug!("no role models, no candidates");
            return Box::new(EmptyStream);
        }
        let Some(mean) = role_model_mean(state, role_models) else {
            warn!(
                role_models = role_models.len(),
                "role-model weights sum to zero, no candidates"
            );
            return Box::new(EmptyStream);
        };

        let remaining = match self.params.supply {
            CandidateSupply::Unbounded => None,
            CandidateSupply::UpTo(max) => Some(rng.random_range(0..=max)),
        };
        debug!(mean, ?remaining, "candidate stream opened");

        Box::new(GaussianCandidates {
            mean,
            spread: self.params.spread,
            interview_noise: self.params.interview_noise,
            remaining,
        })
    }

    fn generate_individual(
        &mut self,
        state: &WorldState,
        identity: Identity,
        candidate: Candidate,
    ) -> (Box<dyn IndividualPolicy>, PersonState) {
        self.materialize(state, identity, candidate)
    }
}

// ---------------------------------------------------------------------------
// Candidate stream
// ---------------------------------------------------------------------------

/// Candidates drawn from N(mean, spread), clipped to `[0, 1]`.
#[derive(Debug, Clone)]
pub struct GaussianCandidates {
    mean: f64,
    spread: f64,
    interview_noise: f64,
    /// `None` for an unbounded supply.
    remaining: Option<u32>,
}

impl CandidateStream for GaussianCandidates {
    fn next_candidate(
        &mut self,
        rng: &mut dyn RngCore,
        identities: &mut dyn IdentityGenerator,
    ) -> Option<(Identity, Candidate)> {
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining = remaining.checked_sub(1)?;
        }
        let seed = PersonSeed::new(normal(rng, self.mean, self.spread));
        let public = interview(seed.selfishness, self.interview_noise, rng);
        Some((identities.generate(), Candidate::new(public, seed)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use orgsim_types::{SequentialIdentityGenerator, WorldSeed};

    use super::*;

    fn nature(params: GaussianNatureParams) -> GaussianNature {
        GaussianNature::new(params).unwrap()
    }

    fn populated(nature: &mut GaussianNature) -> WorldState {
        let mut state = WorldState::new(WorldSeed::default());
        let mut ids = SequentialIdentityGenerator::new();
        let mut rng = SmallRng::seed_from_u64(1);
        for (id, _, person) in nature.generate_initial_individuals(&state, &mut ids, &mut rng) {
            state.people.insert(id, person);
        }
        state
    }

    #[test]
    fn listed_population_keeps_values_and_seed_economy() {
        let mut n = nature(GaussianNatureParams {
            initial: InitialPopulation::Listed {
                selfishness: vec![0.1, 0.9, 1.4],
            },
            ..GaussianNatureParams::default()
        });
        let state = populated(&mut n);
        assert_eq!(state.population(), 3);
        let first = state.person(&Identity::from("1")).unwrap();
        assert!((first.selfishness() - 0.1).abs() < 1e-12);
        assert!((first.wealth - state.seed.initial_wealth).abs() < 1e-12);
        assert!((first.salary - state.seed.daily_salary).abs() < 1e-12);
        // Clipped.
        let third = state.person(&Identity::from("3")).unwrap();
        assert!((third.selfishness() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn exact_interview_reads_complement() {
        let mut n = nature(GaussianNatureParams {
            initial: InitialPopulation::Listed {
                selfishness: vec![0.25],
            },
            ..GaussianNatureParams::default()
        });
        let state = populated(&mut n);
        let p = state.person(&Identity::from("1")).unwrap();
        assert!((p.candidate.public.interview_score - 0.75).abs() < 1e-12);
    }

    #[test]
    fn candidates_center_on_role_model_mean() {
        let mut n = nature(GaussianNatureParams {
            initial: InitialPopulation::Listed {
                selfishness: vec![0.2, 0.4],
            },
            spread: 0.05,
            ..GaussianNatureParams::default()
        });
        let state = populated(&mut n);
        let role_models: IdentityAmounts = state.people.keys().map(|id| (id.clone(), 1.0)).collect();

        let mut rng = SmallRng::seed_from_u64(5);
        let mut ids = SequentialIdentityGenerator::starting_after(2);
        let mut stream = n.generate_candidates(&state, &role_models, &mut rng);
        let drawn: Vec<f64> = (0..2000)
            .filter_map(|_| stream.next_candidate(&mut rng, &mut ids))
            .map(|(_, c)| c.private.selfishness)
            .collect();
        assert_eq!(drawn.len(), 2000);
        let mean = drawn.iter().sum::<f64>() / 2000.0;
        assert!((mean - 0.3).abs() < 0.01, "mean {mean}");
        assert!(drawn.iter().all(|s| (0.0..=1.0).contains(s)));
        assert_eq!(ids.last(), 2002);
    }

    #[test]
    fn weights_shift_the_mean() {
        let mut n = nature(GaussianNatureParams {
            initial: InitialPopulation::Listed {
                selfishness: vec![0.0, 1.0],
            },
            ..GaussianNatureParams::default()
        });
        let state = populated(&mut n);
        let mut role_models = IdentityAmounts::new();
        role_models.insert(Identity::from("1"), 3.0);
        role_models.insert(Identity::from("2"), 1.0);
        assert!((role_model_mean(&state, &role_models).unwrap() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn empty_or_zero_weight_role_models_yield_nothing() {
        let mut n = nature(GaussianNatureParams::default());
        let state = populated(&mut n);
        let mut rng = SmallRng::seed_from_u64(5);
        let mut ids = SequentialIdentityGenerator::starting_after(100);

        let mut empty = n.generate_candidates(&state, &IdentityAmounts::new(), &mut rng);
        assert!(empty.next_candidate(&mut rng, &mut ids).is_none());

        let zeroed: IdentityAmounts = state.people.keys().map(|id| (id.clone(), 0.0)).collect();
        let mut zero = n.generate_candidates(&state, &zeroed, &mut rng);
        assert!(zero.next_candidate(&mut rng, &mut ids).is_none());
        assert_eq!(ids.last(), 100);
    }

    #[test]
    fn finite_supply_is_bounded() {
        let mut n = nature(GaussianNatureParams {
            supply: CandidateSupply::UpTo(4),
            ..GaussianNatureParams::default()
        });
        let state = populated(&mut n);
        let role_models: IdentityAmounts = state.people.keys().map(|id| (id.clone(), 1.0)).collect();
        let mut rng = SmallRng::seed_from_u64(11);
        let mut ids = SequentialIdentityGenerator::starting_after(100);
        for _ in 0..20 {
            let mut stream = n.generate_candidates(&state, &role_models, &mut rng);
            let count = std::iter::from_fn(|| stream.next_candidate(&mut rng, &mut ids)).count();
            assert!(count <= 4);
        }
    }

    #[test]
    fn hazard_extremes() {
        let mut safe = nature(GaussianNatureParams::default());
        let mut deadly = nature(GaussianNatureParams {
            hazard_rate: 1.0,
            ..GaussianNatureParams::default()
        });
        let state = WorldState::new(WorldSeed::default());
        let mut rng = SmallRng::seed_from_u64(2);
        let id = Identity::from("1");
        assert!((0..100).all(|_| !safe.act_on_individual(&state, &id, &mut rng)));
        assert!((0..100).all(|_| deadly.act_on_individual(&state, &id, &mut rng)));
    }

    #[test]
    fn invalid_parameters_rejected() {
        assert!(
            GaussianNature::new(GaussianNatureParams {
                hazard_rate: 1.5,
                ..GaussianNatureParams::default()
            })
            .is_err()
        );
        assert!(
            GaussianNature::new(GaussianNatureParams {
                spread: -0.1,
                ..GaussianNatureParams::default()
            })
            .is_err()
        );
    }

    #[test]
    fn supply_serde_shape() {
        let json = serde_json::to_string(&CandidateSupply::UpTo(3)).unwrap();
        assert_eq!(json, r#"{"kind":"up_to","max":3}"#);
    }
}
