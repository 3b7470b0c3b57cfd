//! Append-only, label-indexed time-series store for the Orgsim simulation.
//!
//! Every quantity the engine observes is logged here as a scalar tagged by
//! a metric name, a label set, and the simulation time at which it was
//! observed. The store never evicts: full history is retained for the run.
//!
//! # Architecture
//!
//! - [`labels`] -- [`Labels`] and the content-hashed [`LabelSetId`].
//! - [`store`] -- The [`Metrics`] store and its exportable [`MetricsData`].
//! - [`config`] -- [`MetricsConfig`], which metric families the engine logs.
//! - [`names`] -- Well-known metric names used by the engine.
//!
//! # Duplicate guard
//!
//! A metric name with an empty label set is a fiscal aggregate. Logging it
//! twice in the same period is a contract violation and returns
//! [`MetricsError::DuplicateEntry`]. Labeled series are unrestricted.
//!
//! # Usage
//!
//! ```
//! use orgsim_metrics::{Labels, Metrics};
//! use orgsim_types::SimTime;
//!
//! let mut metrics = Metrics::new();
//! let time = SimTime::start();
//! metrics.log(time, "population", 10.0, &Labels::new()).ok();
//!
//! let series = metrics.get_series("population", &Labels::new()).ok();
//! assert_eq!(series.map(|s| s.len()), Some(1));
//! ```

pub mod config;
pub mod labels;
pub mod names;
pub mod store;

pub use config::MetricsConfig;
pub use labels::{LabelSetId, Labels, labels};
pub use store::{Metrics, MetricsData, SeriesEntry, TimeSeriesClass};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised by the metrics store.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// An unlabeled metric was logged twice in the same period.
    #[error("metric '{name}' already has an unlabeled entry for period {period}")]
    DuplicateEntry {
        /// Metric name.
        name: String,
        /// Period that already holds a value.
        period: u64,
    },

    /// No series class exists under this name.
    #[error("no such metric: '{name}'")]
    UnknownMetric {
        /// Metric name that was queried.
        name: String,
    },

    /// The metric exists but was never logged with this label set.
    #[error("metric '{name}' has no series for label set {labels:?}")]
    UnknownLabelSet {
        /// Metric name that was queried.
        name: String,
        /// Label set that was queried.
        labels: Labels,
    },

    /// The label set could not be canonically encoded.
    #[error("failed to encode label set: {source}")]
    Encoding {
        /// The underlying serializer error.
        #[from]
        source: serde_json::Error,
    },
}
