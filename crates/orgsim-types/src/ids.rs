//! Opaque identity tokens and the capability that mints them.
//!
//! An [`Identity`] is an opaque string. The simulation never parses it; it is
//! only compared, ordered, and used as a map key and a metric label. Tokens
//! are produced by an [`IdentityGenerator`] that the engine receives
//! explicitly. There is no module-level counter anywhere in the workspace.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an individual in the simulation.
///
/// Never reused while the individual it names is alive.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Wrap a raw token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Borrow the raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the inner [`String`].
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl core::fmt::Display for Identity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Identity {
    fn from(token: &str) -> Self {
        Self(token.to_owned())
    }
}

impl From<String> for Identity {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl core::borrow::Borrow<str> for Identity {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Capability that mints fresh identities.
///
/// Implementations must never hand out a token that is still in use by a
/// live individual. The engine owns exactly one generator per run and lends
/// it to the nature policy during initial population and recruitment.
pub trait IdentityGenerator {
    /// Produce the next identity.
    fn generate(&mut self) -> Identity;
}

/// Reference generator: a monotonically increasing counter.
///
/// The first identity is `"1"`, then `"2"`, and so on. Identities are never
/// reused, so the uniqueness contract holds for the whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequentialIdentityGenerator {
    /// The last value handed out (0 before the first call).
    last: u64,
}

impl SequentialIdentityGenerator {
    /// Create a generator whose first identity is `"1"`.
    pub const fn new() -> Self {
        Self { last: 0 }
    }

    /// Create a generator that continues after `last`.
    pub const fn starting_after(last: u64) -> Self {
        Self { last }
    }

    /// Return the last value handed out.
    pub const fn last(&self) -> u64 {
        self.last
    }
}

impl IdentityGenerator for SequentialIdentityGenerator {
    fn generate(&mut self) -> Identity {
        self.last = self.last.saturating_add(1);
        Identity(self.last.to_string())
    }
}

/// Generator backed by UUID v7.
///
/// Globally unique across processes, which makes it suitable when metrics
/// from several runs are merged. Identity strings differ between runs, so
/// two runs with the same seed are identical only up to identity renaming.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UuidIdentityGenerator;

impl UuidIdentityGenerator {
    /// Create a new UUID generator.
    pub const fn new() -> Self {
        Self
    }
}

impl IdentityGenerator for UuidIdentityGenerator {
    fn generate(&mut self) -> Identity {
        Identity(Uuid::now_v7().to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn sequential_starts_at_one() {
        let mut ids = SequentialIdentityGenerator::new();
        assert_eq!(ids.generate().as_str(), "1");
        assert_eq!(ids.generate().as_str(), "2");
        assert_eq!(ids.last(), 2);
    }

    #[test]
    fn sequential_resumes_after_restored_counter() {
        let mut ids = SequentialIdentityGenerator::starting_after(41);
        assert_eq!(ids.generate(), Identity::from("42"));
    }

    #[test]
    fn uuid_generator_never_repeats() {
        let mut ids = UuidIdentityGenerator::new();
        let minted: BTreeSet<Identity> = (0..100).map(|_| ids.generate()).collect();
        assert_eq!(minted.len(), 100);
    }

    #[test]
    fn identity_serializes_as_plain_string() {
        let id = Identity::from("7");
        let json = serde_json::to_string(&id).ok();
        assert_eq!(json.as_deref(), Some("\"7\""));
    }

    #[test]
    fn identity_display_matches_token() {
        let id = Identity::new(String::from("abc"));
        assert_eq!(id.to_string(), "abc");
        assert_eq!(id.into_inner(), "abc");
    }
}
