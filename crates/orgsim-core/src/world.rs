//! The world engine: owns the population and drives the day/period loop.
//!
//! # Day
//!
//! For every individual alive when the day starts, in identity order:
//!
//! 1. The individual's policy decides a contribution (negative means 0).
//! 2. The contribution is credited to the individual and, scaled by
//!    productivity, to the reward pool.
//! 3. Salary is credited, the cost of living deducted, age incremented.
//! 4. Strictly negative wealth kills by starvation; reaching the maximum age
//!    kills by old age. Otherwise nature may kill the individual.
//! 5. A dead individual's `die` hook runs, it is removed, and a
//!    [`Departure`] is recorded.
//! 6. The org is told about the individual, dead or alive.
//!
//! # Period
//!
//! `fiscal_length` days, stopping early if the population empties. An
//! emptied period logs nothing and recruits nobody. Otherwise the period
//! ends with, in order: fiscal counters, settlement (shareholder cut,
//! bonuses, salaries), population averages and per-individual series,
//! recruitment, and a contribution reset.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use orgsim_metrics::{Labels, Metrics, MetricsConfig, MetricsError, labels, names};
use orgsim_policies::{
    CandidateVerdict, IdentityAmounts, IndividualPolicy, NaturePolicy, OrgPolicy,
};
use orgsim_types::{
    DeathCause, Departure, Identity, IdentityGenerator, PersonState, SimTime, WorldSeed,
    WorldState, count_f64,
};

use crate::clock::{ClockError, SimClock};
use crate::results::{RunResults, ValueStats};

// ---------------------------------------------------------------------------
// Errors and outcomes
// ---------------------------------------------------------------------------

/// Contract violations that abort a run.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// The metrics store rejected an observation.
    #[error("metrics error: {source}")]
    Metrics {
        /// The underlying metrics error.
        #[from]
        source: MetricsError,
    },

    /// The org returned amounts that omit a live individual.
    #[error("{operation} in period {period} has no entry for live identity {identity}")]
    MissingIdentity {
        /// The org operation at fault.
        operation: &'static str,
        /// The identity left out.
        identity: Identity,
        /// Period of the violation.
        period: u64,
    },

    /// Nature produced an identity that is already alive.
    #[error("identity {identity} is already alive")]
    DuplicateIdentity {
        /// The reused identity.
        identity: Identity,
    },

    /// The world was initialized twice.
    #[error("world is already initialized")]
    AlreadyInitialized,

    /// Days or periods were run before [`World::init`].
    #[error("world is not initialized")]
    NotInitialized,
}

/// How a period ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodOutcome {
    /// All days ran; settlement and recruitment happened.
    Completed,
    /// The population died out; nothing was logged or recruited.
    Extinct,
}

/// How a multi-period run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    /// Periods completed by this call.
    pub periods_completed: u64,
    /// Whether the run stopped because the population died out.
    pub extinct: bool,
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

/// Everything a [`World`] is built from.
pub struct WorldConfig {
    /// Economic constants.
    pub seed: WorldSeed,
    /// The org.
    pub org: Box<dyn OrgPolicy>,
    /// The environment.
    pub nature: Box<dyn NaturePolicy>,
    /// Source of fresh identities.
    pub identities: Box<dyn IdentityGenerator>,
    /// Seed of the shared random source.
    pub rng_seed: u64,
    /// Metric families to record.
    pub metrics: MetricsConfig,
}

/// The simulation engine.
pub struct World {
    state: WorldState,
    clock: SimClock,
    individuals: BTreeMap<Identity, Box<dyn IndividualPolicy>>,
    org: Box<dyn OrgPolicy>,
    nature: Box<dyn NaturePolicy>,
    identities: Box<dyn IdentityGenerator>,
    rng: StdRng,
    metrics: Metrics,
    metrics_config: MetricsConfig,
    departures: Vec<Departure>,
    initialized: bool,
    periods_played: u64,
    extinct: bool,
}

impl core::fmt::Debug for World {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("World")
            .field("time", &self.state.time)
            .field("population", &self.state.population())
            .field("org", &self.org.kind())
            .field("nature", &self.nature.kind())
            .field("departures", &self.departures.len())
            .field("initialized", &self.initialized)
            .finish_non_exhaustive()
    }
}

impl World {
    /// Build an empty, uninitialized world.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Clock`] if the seed's fiscal length is 0.
    pub fn new(config: WorldConfig) -> Result<Self, WorldError> {
        let clock = SimClock::new(config.seed.fiscal_length)?;
        Ok(Self {
            state: WorldState::new(config.seed),
            clock,
            individuals: BTreeMap::new(),
            org: config.org,
            nature: config.nature,
            identities: config.identities,
            rng: StdRng::seed_from_u64(config.rng_seed),
            metrics: Metrics::new(),
            metrics_config: config.metrics,
            departures: Vec::new(),
            initialized: false,
            periods_played: 0,
            extinct: false,
        })
    }

    /// Build a world from a seed and its policies.
    ///
    /// # Errors
    ///
    /// Same as [`World::new`].
    pub fn from_seed(
        seed: WorldSeed,
        org: Box<dyn OrgPolicy>,
        nature: Box<dyn NaturePolicy>,
        identities: Box<dyn IdentityGenerator>,
        rng_seed: u64,
    ) -> Result<Self, WorldError> {
        Self::new(WorldConfig {
            seed,
            org,
            nature,
            identities,
            rng_seed,
            metrics: MetricsConfig::default(),
        })
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The shared state.
    pub const fn state(&self) -> &WorldState {
        &self.state
    }

    /// Current time.
    pub const fn time(&self) -> SimTime {
        self.state.time
    }

    /// The metrics recorded so far.
    pub const fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Consume the world, returning its metrics.
    pub fn into_metrics(self) -> Metrics {
        self.metrics
    }

    /// Everyone who has died, in order of death.
    pub fn departures(&self) -> &[Departure] {
        &self.departures
    }

    /// Whether nobody is alive.
    pub fn is_empty(&self) -> bool {
        self.state.people.is_empty()
    }

    /// Whether [`World::init`] has run.
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Periods completed so far.
    pub const fn periods_played(&self) -> u64 {
        self.periods_played
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Create the initial population.
    ///
    /// An empty initial population is allowed; the first period will then
    /// report extinction.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::AlreadyInitialized`] on a second call, or
    /// [`WorldError::DuplicateIdentity`] if nature repeats an identity.
    pub fn init(&mut self) -> Result<(), WorldError> {
        if self.initialized {
            return Err(WorldError::AlreadyInitialized);
        }
        self.initialized = true;

        let newcomers = self.nature.generate_initial_individuals(
            &self.state,
            self.identities.as_mut(),
            &mut self.rng,
        );
        let count = newcomers.len();
        for (identity, policy, person) in newcomers {
            self.admit(identity, policy, person)?;
        }

        if self.metrics_config.fiscal {
            self.metrics.log(
                self.state.time,
                names::RECRUITED,
                count_f64(count),
                &labels([(names::PHASE_LABEL, names::INITIAL)]),
            )?;
        }
        info!(
            population = count,
            org = self.org.kind(),
            nature = self.nature.kind(),
            "world initialized"
        );
        Ok(())
    }

    /// Run up to `periods` periods, stopping early on extinction.
    ///
    /// Initializes the world first if needed.
    ///
    /// # Errors
    ///
    /// Propagates any [`WorldError`] from the periods.
    pub fn run(&mut self, periods: u64) -> Result<RunOutcome, WorldError> {
        if !self.initialized {
            self.init()?;
        }
        let mut completed = 0_u64;
        for _ in 0..periods {
            if self.run_period()? == PeriodOutcome::Extinct {
                return Ok(RunOutcome {
                    periods_completed: completed,
                    extinct: true,
                });
            }
            completed = completed.saturating_add(1);
        }
        Ok(RunOutcome {
            periods_completed: completed,
            extinct: false,
        })
    }

    /// Run `periods` periods and summarize.
    ///
    /// # Errors
    ///
    /// Propagates any [`WorldError`] from the run.
    pub fn play(&mut self, periods: u64) -> Result<RunResults, WorldError> {
        let outcome = self.run(periods)?;
        let results = self.results();
        info!(
            periods = outcome.periods_completed,
            extinct = outcome.extinct,
            population = results.final_population,
            shareholder_value = results.shareholder_value,
            total_individual_value = results.total_individual_value,
            "run finished"
        );
        Ok(results)
    }

    /// Summarize the run so far.
    pub fn results(&self) -> RunResults {
        let values: Vec<f64> = self
            .departures
            .iter()
            .map(|d| d.accumulated_value)
            .chain(self.state.people.values().map(|p| p.accumulated_value))
            .collect();
        let stats = ValueStats::of(values);
        RunResults {
            periods_played: self.periods_played,
            final_population: self.state.population(),
            extinct: self.extinct,
            shareholder_value: self.state.org.shareholder_value,
            total_individual_value: stats.total,
            min_individual_value: stats.min,
            median_individual_value: stats.median,
            max_individual_value: stats.max,
        }
    }

    // -----------------------------------------------------------------------
    // Period
    // -----------------------------------------------------------------------

    /// Run one fiscal period.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NotInitialized`] before [`World::init`], and
    /// propagates clock, metrics, and org contract violations.
    pub fn run_period(&mut self) -> Result<PeriodOutcome, WorldError> {
        if !self.initialized {
            return Err(WorldError::NotInitialized);
        }
        while !self.clock.period_complete() {
            if self.is_empty() {
                return Ok(self.mark_extinct());
            }
            self.run_day()?;
        }
        if self.is_empty() {
            return Ok(self.mark_extinct());
        }

        let period = self.state.time.period;
        self.log_fiscal(names::POPULATION, count_f64(self.state.population()))?;
        self.log_fiscal(names::SUICIDES, f64::from(self.state.common.fiscal_suicides))?;
        self.log_fiscal(names::KILLED, f64::from(self.state.common.fiscal_killed))?;

        self.settle()?;
        self.log_population_summary()?;
        let recruited = self.perform_recruitment()?;

        for person in self.state.people.values_mut() {
            person.contribution = 0.0;
        }

        info!(
            period,
            population = self.state.population(),
            suicides = self.state.common.fiscal_suicides,
            killed = self.state.common.fiscal_killed,
            recruited,
            shareholder_value = self.state.org.shareholder_value,
            "period complete"
        );

        self.state.common.reset();
        self.clock.advance_period()?;
        self.state.time = self.clock.time();
        self.periods_played = self.periods_played.saturating_add(1);
        Ok(PeriodOutcome::Completed)
    }

    fn mark_extinct(&mut self) -> PeriodOutcome {
        if !self.extinct {
            info!(time = %self.state.time, "population extinct");
        }
        self.extinct = true;
        PeriodOutcome::Extinct
    }

    // -----------------------------------------------------------------------
    // Day
    // -----------------------------------------------------------------------

    /// Run one day.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NotInitialized`] before [`World::init`], a
    /// clock error if the period already ran all its days, or a metrics
    /// error from daily logging.
    pub fn run_day(&mut self) -> Result<(), WorldError> {
        if !self.initialized {
            return Err(WorldError::NotInitialized);
        }
        if self.clock.period_complete() {
            return Err(ClockError::PeriodExhausted {
                period: self.state.time.period,
                fiscal_length: self.clock.fiscal_length(),
            }
            .into());
        }

        let productivity = self.state.seed.productivity;
        let living_cost = self.state.seed.daily_living_cost;
        let max_age = self.state.seed.max_age;
        let mut suicides = 0_u32;
        let mut killed = 0_u32;

        // Policies may cause removals; iterate a snapshot of the roster.
        let roster: Vec<Identity> = self.individuals.keys().cloned().collect();
        for identity in roster {
            let Some(policy) = self.individuals.get_mut(&identity) else {
                continue;
            };
            let contribution = policy
                .act(&self.state, &identity, &mut self.rng)
                .max(0.0);

            let Some(person) = self.state.people.get_mut(&identity) else {
                continue;
            };
            person.contribution += contribution;
            person.lifetime_contribution += contribution;
            person.wealth += person.salary - living_cost;
            person.accumulated_value += person.salary;
            person.age = person.age.saturating_add(1);
            let own_cause = if person.wealth < 0.0 {
                Some(DeathCause::Starvation)
            } else if person.age >= max_age {
                Some(DeathCause::OldAge)
            } else {
                None
            };
            self.state.total_reward += contribution * productivity;

            let cause = own_cause.or_else(|| {
                self.nature
                    .act_on_individual(&self.state, &identity, &mut self.rng)
                    .then_some(DeathCause::Killed)
            });

            if let Some(cause) = cause {
                if cause.is_suicide() {
                    suicides = suicides.saturating_add(1);
                } else {
                    killed = killed.saturating_add(1);
                }
                self.remove(&identity, cause);
            }
            self.org
                .react_to_individual(&self.state, &identity, cause.is_some());
        }

        let common = &mut self.state.common;
        common.fiscal_suicides = common.fiscal_suicides.saturating_add(suicides);
        common.fiscal_killed = common.fiscal_killed.saturating_add(killed);
        self.state.nature.hazard_kills = self
            .state
            .nature
            .hazard_kills
            .saturating_add(u64::from(killed));

        if self.metrics_config.daily {
            let daily = labels([(names::GRANULARITY_LABEL, names::DAILY)]);
            let time = self.state.time;
            let population = count_f64(self.state.population());
            self.metrics.log(time, names::POPULATION, population, &daily)?;
            self.metrics.log(time, names::SUICIDES, f64::from(suicides), &daily)?;
            self.metrics.log(time, names::KILLED, f64::from(killed), &daily)?;
        }

        self.clock.advance_day()?;
        self.state.time = self.clock.time();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Settlement
    // -----------------------------------------------------------------------

    /// Pay shareholders, then bonuses, then re-evaluate salaries.
    fn settle(&mut self) -> Result<(), WorldError> {
        let pool = self.state.total_reward;
        self.log_fiscal(names::TOTAL_REWARD, pool)?;

        let cut = self.org.compute_shareholder_value(&self.state);
        let cut = if cut.is_nan() {
            0.0
        } else {
            cut.clamp(0.0, pool.max(0.0))
        };
        self.state.org.shareholder_value += cut;
        self.state.total_reward -= cut;

        let mut paid = 0.0;
        match self.org.compute_bonuses(&self.state) {
            Some(bonuses) => {
                self.require_coverage(&bonuses, "compute_bonuses")?;
                for (identity, person) in &mut self.state.people {
                    if let Some(bonus) = bonuses.get(identity) {
                        person.wealth += bonus;
                        person.accumulated_value += bonus;
                        paid += bonus;
                    }
                }
                self.state.total_reward = 0.0;
            }
            None => {
                debug!(
                    pool = self.state.total_reward,
                    "bonus distribution skipped, pool rolls over"
                );
            }
        }
        self.state.org.bonuses_paid += paid;

        let salaries = self.org.re_evaluate_salaries(&self.state);
        self.require_coverage(&salaries, "re_evaluate_salaries")?;
        for (identity, person) in &mut self.state.people {
            if let Some(salary) = salaries.get(identity) {
                person.salary = *salary;
            }
        }

        self.log_fiscal(names::BONUSES_PAID, paid)?;
        self.log_fiscal(names::SHAREHOLDER_VALUE, self.state.org.shareholder_value)?;
        debug!(pool, shareholder_cut = cut, bonuses = paid, "period settled");
        Ok(())
    }

    fn require_coverage(
        &self,
        amounts: &IdentityAmounts,
        operation: &'static str,
    ) -> Result<(), WorldError> {
        match self.state.people.keys().find(|id| !amounts.contains_key(*id)) {
            Some(identity) => Err(WorldError::MissingIdentity {
                operation,
                identity: identity.clone(),
                period: self.state.time.period,
            }),
            None => Ok(()),
        }
    }

    // -----------------------------------------------------------------------
    // Recruitment
    // -----------------------------------------------------------------------

    /// Run one recruitment pass. Returns the number admitted.
    ///
    /// The candidate stream ends when nature runs out of candidates or the
    /// org answers [`CandidateVerdict::Stop`]. Candidates admitted before a
    /// stop stay admitted.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateIdentity`] if nature reuses a live
    /// identity, or a metrics error.
    pub fn perform_recruitment(&mut self) -> Result<u32, WorldError> {
        self.state.org.recruited_this_period = 0;
        let role_models = self.org.evaluate_individuals(&self.state);
        let mut stream = self
            .nature
            .generate_candidates(&self.state, &role_models, &mut self.rng);

        let mut offered = 0_usize;
        let mut admitted = 0_u32;
        while let Some((identity, candidate)) =
            stream.next_candidate(&mut self.rng, self.identities.as_mut())
        {
            offered = offered.saturating_add(1);
            match self.org.evaluate_candidate(&self.state, &candidate.public) {
                CandidateVerdict::Admit => {}
                CandidateVerdict::Reject => continue,
                CandidateVerdict::Stop => break,
            }
            let public = candidate.public;
            let (policy, person) =
                self.nature
                    .generate_individual(&self.state, identity.clone(), candidate);
            self.admit(identity.clone(), policy, person)?;
            admitted = admitted.saturating_add(1);
            self.state.org.recruited_this_period = admitted;
            self.org.recruit(&self.state, &identity, &public);
        }

        self.state.nature.candidates_offered = self
            .state
            .nature
            .candidates_offered
            .saturating_add(u64::try_from(offered).unwrap_or(u64::MAX));
        self.log_fiscal(names::RECRUITED, f64::from(admitted))?;
        self.log_fiscal(names::CANDIDATES_OFFERED, count_f64(offered))?;
        debug!(
            role_models = role_models.len(),
            offered, admitted, "recruitment pass finished"
        );
        Ok(admitted)
    }

    // -----------------------------------------------------------------------
    // Population bookkeeping
    // -----------------------------------------------------------------------

    fn admit(
        &mut self,
        identity: Identity,
        policy: Box<dyn IndividualPolicy>,
        person: PersonState,
    ) -> Result<(), WorldError> {
        if self.state.people.contains_key(&identity) {
            return Err(WorldError::DuplicateIdentity { identity });
        }
        self.state.people.insert(identity.clone(), person);
        self.individuals.insert(identity.clone(), policy);
        self.org.register(&self.state, &identity);
        Ok(())
    }

    fn remove(&mut self, identity: &Identity, cause: DeathCause) {
        if let Some(mut policy) = self.individuals.remove(identity) {
            policy.die(&self.state, identity);
        }
        let Some(person) = self.state.people.remove(identity) else {
            return;
        };
        debug!(
            identity = %identity,
            %cause,
            age = person.age,
            wealth = person.wealth,
            "individual died"
        );
        self.departures.push(Departure {
            identity: person.identity,
            cause,
            age: person.age,
            wealth: person.wealth,
            accumulated_value: person.accumulated_value,
            lifetime_contribution: person.lifetime_contribution,
            date: self.state.time.date,
            period: self.state.time.period,
        });
    }

    // -----------------------------------------------------------------------
    // Metrics
    // -----------------------------------------------------------------------

    fn log_fiscal(&mut self, name: &str, value: f64) -> Result<(), WorldError> {
        if self.metrics_config.fiscal {
            self.metrics.log(self.state.time, name, value, &Labels::new())?;
        }
        Ok(())
    }

    fn log_population_summary(&mut self) -> Result<(), WorldError> {
        if let Some(wealth) = self.state.average_wealth() {
            self.log_fiscal(names::AVERAGE_WEALTH, wealth)?;
        }
        if let Some(selfishness) = self.state.average_selfishness() {
            self.log_fiscal(names::AVERAGE_SELFISHNESS, selfishness)?;
        }
        if !self.metrics_config.individual {
            return Ok(());
        }
        let time = self.state.time;
        for (identity, person) in &self.state.people {
            let tag = labels([(names::IDENTITY_LABEL, identity.as_str())]);
            self.metrics
                .log(time, names::INDIVIDUAL_WEALTH, person.wealth, &tag)?;
            self.metrics
                .log(time, names::INDIVIDUAL_CONTRIBUTION, person.contribution, &tag)?;
            self.metrics
                .log(time, names::INDIVIDUAL_VALUE, person.accumulated_value, &tag)?;
        }
        Ok(())
    }
}
