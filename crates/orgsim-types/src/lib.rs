//! Shared type definitions for the Orgsim population simulation.
//!
//! This crate is the single source of truth for the data model shared by the
//! metrics store, the policy layer, and the world engine. It holds pure data:
//! nothing here mutates itself beyond trivial constructors, and nothing here
//! knows about scheduling.
//!
//! # Modules
//!
//! - [`ids`] -- The opaque [`Identity`] token and the [`IdentityGenerator`]
//!   capability that mints it.
//! - [`person`] -- Per-individual records: [`PersonSeed`], [`Candidate`],
//!   [`PersonState`], and the [`Departure`] written when someone dies.
//! - [`world`] -- The shared record: [`WorldSeed`], [`SimTime`], and the
//!   [`WorldState`] the engine owns and policies read.

pub mod ids;
pub mod person;
pub mod world;

// Re-export all public types at crate root for convenience.
pub use ids::{Identity, IdentityGenerator, SequentialIdentityGenerator, UuidIdentityGenerator};
pub use person::{Candidate, DeathCause, Departure, PersonSeed, PersonState, PublicProfile};
pub use world::{CommonState, NatureState, OrgState, SimTime, WorldSeed, WorldState};

/// Convert a population-sized count into an `f64` for averaging.
///
/// Counts above `u32::MAX` saturate; no simulated population comes close.
pub fn count_f64(count: usize) -> f64 {
    f64::from(u32::try_from(count).unwrap_or(u32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_f64_converts_small_counts_exactly() {
        assert!((count_f64(0) - 0.0).abs() < f64::EPSILON);
        assert!((count_f64(12) - 12.0).abs() < f64::EPSILON);
    }
}
