//! Which metric families the engine records.

use serde::{Deserialize, Serialize};

/// Metric family switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Per-day population, suicide, and kill counters.
    #[serde(default)]
    pub daily: bool,
    /// Period aggregates (population, deaths, rewards, recruitment).
    #[serde(default = "default_true")]
    pub fiscal: bool,
    /// Per-individual wealth, contribution, and value series.
    #[serde(default = "default_true")]
    pub individual: bool,
}

const fn default_true() -> bool {
    true
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            daily: false,
            fiscal: true,
            individual: true,
        }
    }
}

impl MetricsConfig {
    /// Record nothing.
    pub const fn disabled() -> Self {
        Self {
            daily: false,
            fiscal: false,
            individual: false,
        }
    }

    /// Record every family.
    pub const fn all() -> Self {
        Self {
            daily: true,
            fiscal: true,
            individual: true,
        }
    }
}
