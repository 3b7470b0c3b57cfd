//! Configuration loading and typed config structures for Orgsim.
//!
//! The canonical configuration lives in `orgsim-config.yaml` at the project
//! root. Every section and field is optional; anything left out takes the
//! default shown on its `default_*` function.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use orgsim_metrics::MetricsConfig;
use orgsim_policies::{
    CandidateSupply, DEFAULT_MAX_INTERVIEWS, IndividualVariant, InitialPopulation,
    RewardDistribution, RoleModelSelection, SalaryPolicy,
};
use orgsim_types::WorldSeed;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value is out of range.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `orgsim-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Run length, random seed, identity scheme.
    #[serde(default)]
    pub run: RunConfig,

    /// Economic constants.
    #[serde(default)]
    pub economy: EconomyConfig,

    /// Starting population and individual behavior.
    #[serde(default)]
    pub population: PopulationConfig,

    /// Org parameters.
    #[serde(default)]
    pub org: OrgConfig,

    /// Environment parameters.
    #[serde(default)]
    pub nature: NatureConfig,

    /// Which metric families to record.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file, then apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.run.apply_env_overrides();
        Ok(config)
    }

    /// Reject values no world can be built from.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let economy = &self.economy;
        if economy.fiscal_length == 0 {
            return Err(invalid("economy.fiscal_length", "must be at least 1"));
        }
        if economy.max_age == 0 {
            return Err(invalid("economy.max_age", "must be at least 1"));
        }
        non_negative("economy.productivity", economy.productivity)?;
        non_negative("economy.daily_salary", economy.daily_salary)?;
        non_negative("economy.daily_living_cost", economy.daily_living_cost)?;
        if !economy.initial_wealth.is_finite() {
            return Err(invalid("economy.initial_wealth", "must be finite"));
        }

        match &self.population.initial {
            InitialPopulation::Listed { selfishness } => {
                for s in selfishness {
                    unit("population.initial.selfishness", *s)?;
                }
            }
            InitialPopulation::Sampled { mean, spread, .. } => {
                unit("population.initial.mean", *mean)?;
                non_negative("population.initial.spread", *spread)?;
            }
        }

        unit("org.shareholder_cut", self.org.shareholder_cut)?;
        if let Some(min) = self.org.min_interview_score {
            unit("org.min_interview_score", min)?;
        }
        if let RoleModelSelection::TopContributors { percentile } = self.org.role_models {
            unit("org.role_models.percentile", percentile)?;
        }

        non_negative("nature.spread", self.nature.spread)?;
        non_negative("nature.interview_noise", self.nature.interview_noise)?;
        unit("nature.hazard_rate", self.nature.hazard_rate)?;
        Ok(())
    }

    /// The economic constants as a [`WorldSeed`].
    pub const fn world_seed(&self) -> WorldSeed {
        WorldSeed {
            fiscal_length: self.economy.fiscal_length,
            productivity: self.economy.productivity,
            daily_salary: self.economy.daily_salary,
            daily_living_cost: self.economy.daily_living_cost,
            initial_wealth: self.economy.initial_wealth,
            max_age: self.economy.max_age,
            recruitment_quota: self.economy.recruitment_quota,
        }
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_owned(),
    }
}

fn unit(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("{value} is outside [0, 1]"),
        })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("{value} must be a finite non-negative number"),
        })
    }
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Identity scheme for new individuals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityScheme {
    /// `"1"`, `"2"`, ... Reproducible across runs.
    #[default]
    Sequential,
    /// UUID v7 strings.
    Uuid,
}

/// Run-level settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of periods to play.
    #[serde(default = "default_periods")]
    pub periods: u64,

    /// Seed of the shared random source.
    #[serde(default = "default_rng_seed")]
    pub rng_seed: u64,

    /// How identities are minted.
    #[serde(default)]
    pub identities: IdentityScheme,
}

impl RunConfig {
    /// Override fields from environment variables, if set.
    ///
    /// `ORGSIM_RNG_SEED` replaces `rng_seed` and `ORGSIM_PERIODS` replaces
    /// `periods`. Unparseable values are ignored with a warning.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("ORGSIM_RNG_SEED") {
            match val.parse() {
                Ok(seed) => self.rng_seed = seed,
                Err(_) => warn!(value = %val, "ignoring invalid ORGSIM_RNG_SEED"),
            }
        }
        if let Ok(val) = std::env::var("ORGSIM_PERIODS") {
            match val.parse() {
                Ok(periods) => self.periods = periods,
                Err(_) => warn!(value = %val, "ignoring invalid ORGSIM_PERIODS"),
            }
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            periods: default_periods(),
            rng_seed: default_rng_seed(),
            identities: IdentityScheme::default(),
        }
    }
}

const fn default_periods() -> u64 {
    50
}

const fn default_rng_seed() -> u64 {
    42
}

// ---------------------------------------------------------------------------
// Economy
// ---------------------------------------------------------------------------

/// Economic constants of the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomyConfig {
    /// Days per fiscal period.
    #[serde(default = "default_fiscal_length")]
    pub fiscal_length: u32,

    /// Reward per unit of contribution.
    #[serde(default = "default_productivity")]
    pub productivity: f64,

    /// Starting daily salary.
    #[serde(default = "default_daily_salary")]
    pub daily_salary: f64,

    /// Daily cost of living.
    #[serde(default = "default_daily_living_cost")]
    pub daily_living_cost: f64,

    /// Wealth of a new individual.
    #[serde(default = "default_initial_wealth")]
    pub initial_wealth: f64,

    /// Age in days at which individuals die.
    #[serde(default = "default_max_age")]
    pub max_age: u32,

    /// Admissions per recruitment pass, unless the org overrides it.
    #[serde(default = "default_recruitment_quota")]
    pub recruitment_quota: u32,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            fiscal_length: default_fiscal_length(),
            productivity: default_productivity(),
            daily_salary: default_daily_salary(),
            daily_living_cost: default_daily_living_cost(),
            initial_wealth: default_initial_wealth(),
            max_age: default_max_age(),
            recruitment_quota: default_recruitment_quota(),
        }
    }
}

const fn default_fiscal_length() -> u32 {
    30
}

const fn default_productivity() -> f64 {
    2.0
}

const fn default_daily_salary() -> f64 {
    1.0
}

const fn default_daily_living_cost() -> f64 {
    1.0
}

const fn default_initial_wealth() -> f64 {
    30.0
}

const fn default_max_age() -> u32 {
    3650
}

const fn default_recruitment_quota() -> u32 {
    5
}

// ---------------------------------------------------------------------------
// Population
// ---------------------------------------------------------------------------

/// Starting population and the behavior every individual gets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Where the starting population comes from.
    #[serde(default)]
    pub initial: InitialPopulation,

    /// Individual behavior.
    #[serde(default)]
    pub individuals: IndividualVariant,
}

// ---------------------------------------------------------------------------
// Org
// ---------------------------------------------------------------------------

/// Parameters of the built-in quota org.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrgConfig {
    /// Admissions per pass; absent uses `economy.recruitment_quota`.
    #[serde(default)]
    pub quota: Option<u32>,

    /// Minimum interview score for admission.
    #[serde(default)]
    pub min_interview_score: Option<f64>,

    /// Candidates evaluated per pass before the pass stops.
    #[serde(default = "default_max_interviews")]
    pub max_interviews: u32,

    /// Bonus split.
    #[serde(default)]
    pub distribution: RewardDistribution,

    /// Fraction of the pool retained for shareholders.
    #[serde(default)]
    pub shareholder_cut: f64,

    /// Salary rule.
    #[serde(default)]
    pub salary: SalaryPolicy,

    /// Role models that seed candidates.
    #[serde(default)]
    pub role_models: RoleModelSelection,
}

impl Default for OrgConfig {
    fn default() -> Self {
        Self {
            quota: None,
            min_interview_score: None,
            max_interviews: default_max_interviews(),
            distribution: RewardDistribution::default(),
            shareholder_cut: 0.0,
            salary: SalaryPolicy::default(),
            role_models: RoleModelSelection::default(),
        }
    }
}

const fn default_max_interviews() -> u32 {
    DEFAULT_MAX_INTERVIEWS
}

// ---------------------------------------------------------------------------
// Nature
// ---------------------------------------------------------------------------

/// Parameters of the built-in Gaussian nature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NatureConfig {
    /// Standard deviation of inherited selfishness.
    #[serde(default = "default_spread")]
    pub spread: f64,

    /// Standard deviation of interview noise.
    #[serde(default)]
    pub interview_noise: f64,

    /// Candidates available per pass.
    #[serde(default)]
    pub supply: CandidateSupply,

    /// Daily kill probability.
    #[serde(default)]
    pub hazard_rate: f64,
}

impl Default for NatureConfig {
    fn default() -> Self {
        Self {
            spread: default_spread(),
            interview_noise: 0.0,
            supply: CandidateSupply::default(),
            hazard_rate: 0.0,
        }
    }
}

const fn default_spread() -> f64 {
    0.05
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = SimulationConfig::parse("{}").unwrap();
        assert_eq!(config.economy, EconomyConfig::default());
        assert_eq!(config.org.max_interviews, 1000);
        assert_eq!(config.run.identities, IdentityScheme::Sequential);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_full_document() {
        let yaml = r"
economy:
  fiscal_length: 10
  productivity: 3.0
population:
  initial:
    kind: listed
    selfishness: [0.1, 0.9]
  individuals:
    kind: forecast_effort
    comfort_days: 20.0
org:
  quota: 3
  distribution: equal_contribution
  shareholder_cut: 0.2
  salary:
    kind: contribution_indexed
    floor: 0.5
    rate: 1.5
  role_models:
    kind: top_contributors
    percentile: 0.25
nature:
  supply:
    kind: up_to
    max: 7
  hazard_rate: 0.001
metrics:
  daily: true
";
        let config = SimulationConfig::parse(yaml).unwrap();
        assert_eq!(config.economy.fiscal_length, 10);
        assert_eq!(config.economy.max_age, 3650);
        assert_eq!(
            config.population.initial,
            InitialPopulation::Listed {
                selfishness: vec![0.1, 0.9]
            }
        );
        assert_eq!(
            config.population.individuals,
            IndividualVariant::ForecastEffort { comfort_days: 20.0 }
        );
        assert_eq!(config.org.quota, Some(3));
        assert_eq!(config.org.distribution, RewardDistribution::EqualContribution);
        assert_eq!(
            config.org.role_models,
            RoleModelSelection::TopContributors { percentile: 0.25 }
        );
        assert_eq!(config.nature.supply, CandidateSupply::UpTo(7));
        assert!(config.metrics.daily);
        assert!(config.metrics.fiscal);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        assert!(matches!(
            SimulationConfig::parse("economy: [unclosed"),
            Err(ConfigError::Yaml { .. })
        ));
    }

    #[test]
    fn null_interview_budget_is_rejected() {
        assert!(matches!(
            SimulationConfig::parse("org:\n  max_interviews: null\n"),
            Err(ConfigError::Yaml { .. })
        ));
        let config = SimulationConfig::parse("org:\n  max_interviews: 25\n").unwrap();
        assert_eq!(config.org.max_interviews, 25);
    }

    #[test]
    fn validate_rejects_zero_fiscal_length() {
        let mut config = SimulationConfig::default();
        config.economy.fiscal_length = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "economy.fiscal_length",
                ..
            })
        ));
    }

    #[test]
    fn validate_rejects_fractions_out_of_range() {
        let mut config = SimulationConfig::default();
        config.nature.hazard_rate = 1.5;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.org.shareholder_cut = -0.1;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.population.initial = InitialPopulation::Listed {
            selfishness: vec![0.5, 2.0],
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn world_seed_copies_economy() {
        let mut config = SimulationConfig::default();
        config.economy.recruitment_quota = 9;
        let seed = config.world_seed();
        assert_eq!(seed.recruitment_quota, 9);
        assert_eq!(seed.fiscal_length, 30);
    }

    #[test]
    fn shipped_config_is_valid() {
        let config = SimulationConfig::parse(include_str!("../../../orgsim-config.yaml")).unwrap();
        assert_eq!(config.economy.fiscal_length, 30);
        assert!((config.org.shareholder_cut - 0.1).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = SimulationConfig::from_file(Path::new("/nonexistent/orgsim-config.yaml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
