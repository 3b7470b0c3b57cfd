//! End-of-run summary.

use serde::{Deserialize, Serialize};

/// Aggregate outcome of a run.
///
/// The individual-value statistics range over everyone who ever lived:
/// the departed and the survivors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunResults {
    /// Periods that ran to completion.
    pub periods_played: u64,
    /// Live population at the end.
    pub final_population: usize,
    /// Whether the run ended because the population died out.
    pub extinct: bool,
    /// Cumulative value retained for shareholders.
    pub shareholder_value: f64,
    /// Sum of lifetime income over everyone.
    pub total_individual_value: f64,
    /// Smallest lifetime income.
    pub min_individual_value: f64,
    /// Lifetime income at index `len / 2` of the sorted values.
    pub median_individual_value: f64,
    /// Largest lifetime income.
    pub max_individual_value: f64,
}

/// Summary statistics of lifetime income.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct ValueStats {
    pub total: f64,
    pub min: f64,
    pub median: f64,
    pub max: f64,
}

impl ValueStats {
    /// Compute the statistics; all zero for an empty input.
    pub(crate) fn of(mut values: Vec<f64>) -> Self {
        values.sort_by(f64::total_cmp);
        let (Some(min), Some(max)) = (values.first().copied(), values.last().copied()) else {
            return Self::default();
        };
        let median = values.get(values.len() / 2).copied().unwrap_or_default();
        Self {
            total: values.iter().sum(),
            min,
            median,
            max,
        }
    }
}
