//! Built-in individual behaviors.
//!
//! Each variant maps the individual's private selfishness (and, for the
//! forecasting variant, its view of its own finances) to a daily effort
//! fraction in `[0, 1]`. The effort is the contribution for that day.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use orgsim_types::{Candidate, Identity, WorldState, count_f64};

use crate::gaussian::unit_clip;
use crate::policy::{IndividualFactory, IndividualPolicy};

// ---------------------------------------------------------------------------
// Variant selection
// ---------------------------------------------------------------------------

/// Which behavior new individuals get.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IndividualVariant {
    /// Effort `1 - selfishness`, every day.
    #[default]
    ConstantSelfishness,
    /// The same effort every day regardless of traits.
    FixedEffort {
        /// Effort fraction, in `[0, 1]`.
        effort: f64,
    },
    /// Full effort with probability `1 - selfishness`, none otherwise.
    StochasticEffort,
    /// Effort shrinks as the individual's forecast finances improve.
    ForecastEffort {
        /// Days of living cost the individual considers a comfortable buffer.
        comfort_days: f64,
    },
}

impl IndividualFactory for IndividualVariant {
    fn create(&self, candidate: &Candidate) -> Box<dyn IndividualPolicy> {
        let selfishness = candidate.private.selfishness;
        match *self {
            Self::ConstantSelfishness => Box::new(ConstantSelfishness { selfishness }),
            Self::FixedEffort { effort } => Box::new(FixedEffort {
                effort: unit_clip(effort),
            }),
            Self::StochasticEffort => Box::new(StochasticEffort { selfishness }),
            Self::ForecastEffort { comfort_days } => Box::new(ForecastEffort {
                selfishness,
                comfort_days,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Behaviors
// ---------------------------------------------------------------------------

/// Contributes `1 - selfishness` every day.
#[derive(Debug, Clone, Copy)]
pub struct ConstantSelfishness {
    selfishness: f64,
}

impl IndividualPolicy for ConstantSelfishness {
    fn kind(&self) -> &'static str {
        "constant_selfishness"
    }

    fn act(&mut self, _state: &WorldState, _identity: &Identity, _rng: &mut dyn RngCore) -> f64 {
        1.0 - self.selfishness
    }
}

/// Contributes a fixed fraction every day.
#[derive(Debug, Clone, Copy)]
pub struct FixedEffort {
    effort: f64,
}

impl IndividualPolicy for FixedEffort {
    fn kind(&self) -> &'static str {
        "fixed_effort"
    }

    fn act(&mut self, _state: &WorldState, _identity: &Identity, _rng: &mut dyn RngCore) -> f64 {
        self.effort
    }
}

/// Flips a biased coin each day.
#[derive(Debug, Clone, Copy)]
pub struct StochasticEffort {
    selfishness: f64,
}

impl IndividualPolicy for StochasticEffort {
    fn kind(&self) -> &'static str {
        "stochastic_effort"
    }

    fn act(&mut self, _state: &WorldState, _identity: &Identity, rng: &mut dyn RngCore) -> f64 {
        let roll: f64 = rng.random_range(0.0..1.0);
        if roll < 1.0 - self.selfishness { 1.0 } else { 0.0 }
    }
}

/// Forecasts its wealth at period end and eases off once comfortable.
///
/// The forecast is current wealth, plus net salary for the days left in the
/// period, plus an even share of the pending reward pool. The comfort ratio
/// is that forecast over `daily_living_cost * comfort_days`, and effort is
/// `clip(1 - selfishness * ratio, 0, 1)`. A selfless individual therefore
/// always works fully; a selfish one stops as soon as its buffer is full.
#[derive(Debug, Clone, Copy)]
pub struct ForecastEffort {
    selfishness: f64,
    comfort_days: f64,
}

impl ForecastEffort {
    fn comfort_ratio(&self, state: &WorldState, identity: &Identity) -> Option<f64> {
        let person = state.person(identity)?;
        let threshold = state.seed.daily_living_cost * self.comfort_days;
        if threshold <= 0.0 {
            return None;
        }
        let days_left = f64::from(state.days_remaining_in_period());
        let net_salary = (person.salary - state.seed.daily_living_cost) * days_left;
        let pool_share = state.total_reward / count_f64(state.population().max(1));
        Some((person.wealth + net_salary + pool_share) / threshold)
    }
}

impl IndividualPolicy for ForecastEffort {
    fn kind(&self) -> &'static str {
        "forecast_effort"
    }

    fn act(&mut self, state: &WorldState, identity: &Identity, _rng: &mut dyn RngCore) -> f64 {
        self.comfort_ratio(state, identity).map_or_else(
            || 1.0 - self.selfishness,
            |ratio| unit_clip(self.selfishness.mul_add(-ratio, 1.0)),
        )
    }
}
