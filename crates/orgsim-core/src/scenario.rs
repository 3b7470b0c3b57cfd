//! Builds a ready-to-run [`World`] from a [`SimulationConfig`].

use tracing::info;

use orgsim_policies::{GaussianNature, GaussianNatureParams, PolicyError, QuotaOrg, QuotaOrgParams};
use orgsim_types::{IdentityGenerator, SequentialIdentityGenerator, UuidIdentityGenerator};

use crate::config::{ConfigError, IdentityScheme, SimulationConfig};
use crate::results::RunResults;
use crate::world::{World, WorldConfig, WorldError};

/// Errors raised while building or playing a scenario.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// The configuration failed validation.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// A built-in policy rejected its parameters.
    #[error("policy error: {source}")]
    Policy {
        /// The underlying policy error.
        #[from]
        source: PolicyError,
    },

    /// The world failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },
}

/// A configured world and the number of periods to play it for.
#[derive(Debug)]
pub struct Scenario {
    world: World,
    periods: u64,
}

impl Scenario {
    /// Validate `config` and build the world with the built-in org and
    /// nature.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError`] if validation or policy construction fails.
    pub fn from_config(config: &SimulationConfig) -> Result<Self, ScenarioError> {
        config.validate()?;

        let org = QuotaOrg::new(QuotaOrgParams {
            quota: config.org.quota,
            min_interview_score: config.org.min_interview_score,
            max_interviews: config.org.max_interviews,
            distribution: config.org.distribution,
            shareholder_cut: config.org.shareholder_cut,
            salary: config.org.salary,
            role_models: config.org.role_models,
        })?;
        let nature = GaussianNature::new(GaussianNatureParams {
            initial: config.population.initial.clone(),
            spread: config.nature.spread,
            interview_noise: config.nature.interview_noise,
            supply: config.nature.supply,
            hazard_rate: config.nature.hazard_rate,
            individuals: config.population.individuals,
        })?;
        let identities: Box<dyn IdentityGenerator> = match config.run.identities {
            IdentityScheme::Sequential => Box::new(SequentialIdentityGenerator::new()),
            IdentityScheme::Uuid => Box::new(UuidIdentityGenerator::new()),
        };

        let world = World::new(WorldConfig {
            seed: config.world_seed(),
            org: Box::new(org),
            nature: Box::new(nature),
            identities,
            rng_seed: config.run.rng_seed,
            metrics: config.metrics,
        })?;

        info!(
            periods = config.run.periods,
            rng_seed = config.run.rng_seed,
            fiscal_length = config.economy.fiscal_length,
            "scenario built"
        );
        Ok(Self {
            world,
            periods: config.run.periods,
        })
    }

    /// Periods [`Scenario::play`] will run.
    pub const fn periods(&self) -> u64 {
        self.periods
    }

    /// The world being played.
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Consume the scenario, returning its world.
    pub fn into_world(self) -> World {
        self.world
    }

    /// Initialize the world and run it for the configured periods.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::World`] on an engine contract violation.
    pub fn play(&mut self) -> Result<RunResults, ScenarioError> {
        Ok(self.world.play(self.periods)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use orgsim_policies::{CandidateSupply, InitialPopulation};

    use super::*;

    fn small_config() -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.run.periods = 3;
        config.economy.fiscal_length = 5;
        config.population.initial = InitialPopulation::Listed {
            selfishness: vec![0.1, 0.3, 0.5],
        };
        config
    }

    #[test]
    fn builds_and_plays() {
        let mut scenario = Scenario::from_config(&small_config()).unwrap();
        assert_eq!(scenario.periods(), 3);
        let results = scenario.play().unwrap();
        assert_eq!(results.periods_played, 3);
        assert!(!results.extinct);
        assert!(results.final_population >= 3);
        assert!(scenario.world().is_initialized());
    }

    #[test]
    fn invalid_config_rejected_before_building() {
        let mut config = small_config();
        config.nature.hazard_rate = 2.0;
        assert!(matches!(
            Scenario::from_config(&config),
            Err(ScenarioError::Config { .. })
        ));
    }

    #[test]
    fn unreachable_interview_score_still_finishes() {
        let mut config = small_config();
        config.run.periods = 2;
        config.population.initial = InitialPopulation::Listed {
            selfishness: vec![1.0],
        };
        config.nature.spread = 0.0;
        config.nature.supply = CandidateSupply::Unbounded;
        config.org.min_interview_score = Some(0.5);
        let results = Scenario::from_config(&config).unwrap().play().unwrap();
        assert_eq!(results.periods_played, 2);
        assert_eq!(results.final_population, 1);
    }

    #[test]
    fn same_seed_same_metrics() {
        let config = small_config();
        let mut a = Scenario::from_config(&config).unwrap();
        let mut b = Scenario::from_config(&config).unwrap();
        assert_eq!(a.play().unwrap(), b.play().unwrap());
        assert_eq!(
            a.into_world().into_metrics().data(),
            b.into_world().into_metrics().data()
        );
    }
}
