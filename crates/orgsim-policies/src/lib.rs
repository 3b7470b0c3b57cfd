//! Behavioral strategies for the Orgsim simulation.
//!
//! This crate holds the contracts the world engine drives and the built-in
//! implementations of them. Nothing here owns simulation state: policies
//! read `&WorldState` and return values for the engine to apply.
//!
//! # Modules
//!
//! - [`policy`] -- The [`IndividualPolicy`], [`OrgPolicy`], [`NaturePolicy`],
//!   and [`CandidateStream`] contracts.
//! - [`reward`] -- [`RewardDistribution`]: how a reward pool is split.
//! - [`recruitment`] -- [`RoleModelSelection`]: who seeds new candidates.
//! - [`individual`] -- Built-in individual behaviors ([`IndividualVariant`]).
//! - [`org`] -- [`QuotaOrg`], the built-in org.
//! - [`nature`] -- [`GaussianNature`], the built-in environment.
//! - [`gaussian`] -- Normal draws over the shared random source.
//! - [`error`] -- [`PolicyError`], raised only at construction time.

pub mod error;
pub mod gaussian;
pub mod individual;
pub mod nature;
pub mod org;
pub mod policy;
pub mod recruitment;
pub mod reward;

pub use error::PolicyError;
pub use individual::IndividualVariant;
pub use nature::{CandidateSupply, GaussianNature, GaussianNatureParams, InitialPopulation};
pub use org::{DEFAULT_MAX_INTERVIEWS, QuotaOrg, QuotaOrgParams, SalaryPolicy};
pub use policy::{
    CandidateStream, CandidateVerdict, EmptyStream, IdentityAmounts, IndividualFactory,
    IndividualPolicy, NaturePolicy, NewIndividual, OrgPolicy,
};
pub use recruitment::RoleModelSelection;
pub use reward::RewardDistribution;
