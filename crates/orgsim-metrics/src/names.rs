//! Well-known metric names and label keys.

/// Live population at period end.
pub const POPULATION: &str = "population";
/// Deaths by starvation or old age.
pub const SUICIDES: &str = "suicides";
/// Deaths by environmental hazard.
pub const KILLED: &str = "killed";
/// Admissions in a recruitment pass.
pub const RECRUITED: &str = "recruited";
/// Candidates produced during a recruitment pass.
pub const CANDIDATES_OFFERED: &str = "candidates_offered";
/// Reward pool before settlement.
pub const TOTAL_REWARD: &str = "total_reward";
/// Cumulative shareholder value.
pub const SHAREHOLDER_VALUE: &str = "shareholder_value";
/// Bonuses paid in a settlement.
pub const BONUSES_PAID: &str = "bonuses_paid";
/// Mean wealth of the live population.
pub const AVERAGE_WEALTH: &str = "average_wealth";
/// Mean selfishness of the live population.
pub const AVERAGE_SELFISHNESS: &str = "average_selfishness";
/// Per-individual wealth.
pub const INDIVIDUAL_WEALTH: &str = "individual_wealth";
/// Per-individual contribution in the period.
pub const INDIVIDUAL_CONTRIBUTION: &str = "individual_contribution";
/// Per-individual lifetime income.
pub const INDIVIDUAL_VALUE: &str = "individual_value";

/// Label key carrying an individual's identity.
pub const IDENTITY_LABEL: &str = "identity";
/// Label key distinguishing daily counters from fiscal aggregates.
pub const GRANULARITY_LABEL: &str = "granularity";
/// Value of [`GRANULARITY_LABEL`] on daily counters.
pub const DAILY: &str = "daily";
/// Label key separating the start-up population from recruitment passes.
pub const PHASE_LABEL: &str = "phase";
/// Value of [`PHASE_LABEL`] on the start-up population count.
pub const INITIAL: &str = "initial";
