//! World engine for the Orgsim population simulation.
//!
//! The engine owns the population, drives the day and period loop, settles
//! rewards at each period end, and runs recruitment. Behavior is delegated
//! to the policies in `orgsim-policies`; every observation goes to an
//! `orgsim-metrics` store.
//!
//! # Modules
//!
//! - [`clock`] -- [`SimClock`]: days grouped into fiscal periods.
//! - [`world`] -- [`World`]: initialization, days, periods, recruitment.
//! - [`results`] -- [`RunResults`]: end-of-run summary.
//! - [`config`] -- [`SimulationConfig`]: YAML configuration.
//! - [`scenario`] -- [`Scenario`]: a world built from configuration.
//!
//! # Determinism
//!
//! The population is iterated in identity order and all randomness comes
//! from one seeded generator, so a configuration and seed fully determine
//! a run when sequential identities are used.

pub mod clock;
pub mod config;
pub mod results;
pub mod scenario;
pub mod world;

pub use clock::{ClockError, SimClock};
pub use config::{ConfigError, IdentityScheme, SimulationConfig};
pub use results::RunResults;
pub use scenario::{Scenario, ScenarioError};
pub use world::{PeriodOutcome, RunOutcome, World, WorldConfig, WorldError};
