//! The metrics store.
//!
//! [`MetricsData`] is the exportable record: metric name, then label-set
//! id, then the ordered list of [`SeriesEntry`] values. [`Metrics`] wraps
//! it with the logging and query operations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use orgsim_types::SimTime;

use crate::MetricsError;
use crate::labels::{LabelSetId, Labels};

// ---------------------------------------------------------------------------
// Data
// ---------------------------------------------------------------------------

/// One observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesEntry {
    /// Day of the observation.
    pub date: u64,
    /// Fiscal period of the observation.
    pub period: u64,
    /// Observed value.
    pub value: f64,
}

/// Every series logged under one metric name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesClass {
    /// Label set behind each id.
    pub label_mapping: BTreeMap<LabelSetId, Labels>,
    /// Observations per label set, in logging order.
    pub series: BTreeMap<LabelSetId, Vec<SeriesEntry>>,
}

/// The full observational record of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsData {
    /// Series classes keyed by metric name.
    pub series_classes: BTreeMap<String, TimeSeriesClass>,
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Append-only metrics store.
#[derive(Debug, Clone, Default)]
pub struct Metrics {
    data: MetricsData,
}

impl Metrics {
    /// Create an empty store.
    pub const fn new() -> Self {
        Self {
            data: MetricsData {
                series_classes: BTreeMap::new(),
            },
        }
    }

    /// Resume logging on top of previously exported data.
    pub const fn from_data(data: MetricsData) -> Self {
        Self { data }
    }

    /// Borrow the exportable record.
    pub const fn data(&self) -> &MetricsData {
        &self.data
    }

    /// Consume the store, returning the exportable record.
    pub fn into_data(self) -> MetricsData {
        self.data
    }

    /// Whether nothing has been logged.
    pub fn is_empty(&self) -> bool {
        self.data.series_classes.is_empty()
    }

    /// Append `value` to the series for `(name, labels)` at `time`.
    ///
    /// The series class is created on first use.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::DuplicateEntry`] if `labels` is empty and the
    /// unlabeled series of `name` already holds a value for `time.period`.
    /// Nothing is appended in that case.
    pub fn log(
        &mut self,
        time: SimTime,
        name: &str,
        value: f64,
        labels: &Labels,
    ) -> Result<(), MetricsError> {
        let id = LabelSetId::of(labels)?;
        let class = self.data.series_classes.entry(name.to_owned()).or_default();

        if labels.is_empty()
            && class
                .series
                .get(&id)
                .is_some_and(|entries| entries.iter().any(|e| e.period == time.period))
        {
            return Err(MetricsError::DuplicateEntry {
                name: name.to_owned(),
                period: time.period,
            });
        }

        class
            .label_mapping
            .entry(id.clone())
            .or_insert_with(|| labels.clone());
        class.series.entry(id).or_default().push(SeriesEntry {
            date: time.date,
            period: time.period,
            value,
        });

        trace!(metric = name, value, period = time.period, "metric logged");
        Ok(())
    }

    /// Raw observations of the series for `(name, labels)`.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::UnknownMetric`] or
    /// [`MetricsError::UnknownLabelSet`] if the combination was never logged.
    pub fn entries(&self, name: &str, labels: &Labels) -> Result<&[SeriesEntry], MetricsError> {
        let class = self.class(name)?;
        let id = LabelSetId::of(labels)?;
        class
            .series
            .get(&id)
            .map(Vec::as_slice)
            .ok_or_else(|| MetricsError::UnknownLabelSet {
                name: name.to_owned(),
                labels: labels.clone(),
            })
    }

    /// Values of the series for `(name, labels)` as `(period, value)` pairs.
    ///
    /// # Errors
    ///
    /// Same as [`Metrics::entries`].
    pub fn get_series(&self, name: &str, labels: &Labels) -> Result<Vec<(u64, f64)>, MetricsError> {
        Ok(self
            .entries(name, labels)?
            .iter()
            .map(|e| (e.period, e.value))
            .collect())
    }

    /// Every series under `name` whose labels contain all of `filter`.
    ///
    /// An empty filter matches every series in the class, including the
    /// unlabeled one.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::UnknownMetric`] if `name` was never logged.
    pub fn get_series_in_class<'a>(
        &'a self,
        name: &str,
        filter: &Labels,
    ) -> Result<Vec<(&'a [SeriesEntry], &'a Labels)>, MetricsError> {
        let class = self.class(name)?;
        Ok(class
            .label_mapping
            .iter()
            .filter(|(_, labels)| {
                filter
                    .iter()
                    .all(|(k, v)| labels.get(k).is_some_and(|actual| actual == v))
            })
            .filter_map(|(id, labels)| {
                class
                    .series
                    .get(id)
                    .map(|entries| (entries.as_slice(), labels))
            })
            .collect())
    }

    /// Metric names logged so far, in sorted order.
    pub fn metric_names(&self) -> impl Iterator<Item = &str> {
        self.data.series_classes.keys().map(String::as_str)
    }

    fn class(&self, name: &str) -> Result<&TimeSeriesClass, MetricsError> {
        self.data
            .series_classes
            .get(name)
            .ok_or_else(|| MetricsError::UnknownMetric {
                name: name.to_owned(),
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::labels::labels;

    fn at(period: u64, date: u64) -> SimTime {
        SimTime {
            date,
            period,
            day_of_period: 0,
        }
    }

    #[test]
    fn first_log_creates_class() {
        let mut metrics = Metrics::new();
        assert!(metrics.is_empty());
        metrics.log(at(0, 30), "population", 5.0, &Labels::new()).unwrap();
        assert!(!metrics.is_empty());
        assert_eq!(metrics.metric_names().collect::<Vec<_>>(), vec!["population"]);
    }

    #[test]
    fn series_is_indexed_by_period() {
        let mut metrics = Metrics::new();
        metrics.log(at(0, 30), "population", 5.0, &Labels::new()).unwrap();
        metrics.log(at(1, 60), "population", 7.0, &Labels::new()).unwrap();

        let series = metrics.get_series("population", &Labels::new()).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.first().map(|s| s.0), Some(0));
        assert_eq!(series.get(1).map(|s| s.0), Some(1));
        assert!((series.get(1).map_or(0.0, |s| s.1) - 7.0).abs() < f64::EPSILON);

        let entries = metrics.entries("population", &Labels::new()).unwrap();
        assert_eq!(entries.get(1).map(|e| e.date), Some(60));
    }

    #[test]
    fn unlabeled_duplicate_in_same_period_rejected() {
        let mut metrics = Metrics::new();
        metrics.log(at(3, 90), "suicides", 1.0, &Labels::new()).unwrap();
        let err = metrics.log(at(3, 91), "suicides", 2.0, &Labels::new());

        match err {
            Err(MetricsError::DuplicateEntry { name, period }) => {
                assert_eq!(name, "suicides");
                assert_eq!(period, 3);
            }
            other => panic!("expected DuplicateEntry, got {other:?}"),
        }
        // Rejected value was not appended.
        assert_eq!(metrics.entries("suicides", &Labels::new()).unwrap().len(), 1);
    }

    #[test]
    fn labeled_series_share_a_period() {
        let mut metrics = Metrics::new();
        let one = labels([("identity", "1")]);
        let two = labels([("identity", "2")]);
        metrics.log(at(0, 30), "individual_wealth", 10.0, &one).unwrap();
        metrics.log(at(0, 30), "individual_wealth", 20.0, &two).unwrap();

        let s1 = metrics.get_series("individual_wealth", &one).unwrap();
        let s2 = metrics.get_series("individual_wealth", &two).unwrap();
        assert!((s1.first().map_or(0.0, |s| s.1) - 10.0).abs() < f64::EPSILON);
        assert!((s2.first().map_or(0.0, |s| s.1) - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn labeled_and_unlabeled_are_independent() {
        let mut metrics = Metrics::new();
        let daily = labels([("granularity", "daily")]);
        metrics.log(at(0, 1), "population", 4.0, &daily).unwrap();
        metrics.log(at(0, 2), "population", 4.0, &daily).unwrap();
        metrics.log(at(0, 2), "population", 4.0, &Labels::new()).unwrap();
        assert_eq!(metrics.entries("population", &daily).unwrap().len(), 2);
    }

    #[test]
    fn unknown_metric_and_label_set_fail() {
        let mut metrics = Metrics::new();
        assert!(matches!(
            metrics.get_series("nope", &Labels::new()),
            Err(MetricsError::UnknownMetric { .. })
        ));

        metrics.log(at(0, 0), "population", 1.0, &Labels::new()).unwrap();
        assert!(matches!(
            metrics.get_series("population", &labels([("identity", "9")])),
            Err(MetricsError::UnknownLabelSet { .. })
        ));
        assert!(matches!(
            metrics.get_series_in_class("nope", &Labels::new()),
            Err(MetricsError::UnknownMetric { .. })
        ));
    }

    #[test]
    fn class_query_matches_supersets() {
        let mut metrics = Metrics::new();
        let a = labels([("identity", "1"), ("team", "red")]);
        let b = labels([("identity", "2"), ("team", "blue")]);
        let c = labels([("identity", "3"), ("team", "red")]);
        for l in [&a, &b, &c] {
            metrics.log(at(0, 0), "individual_wealth", 1.0, l).unwrap();
        }

        let red = metrics
            .get_series_in_class("individual_wealth", &labels([("team", "red")]))
            .unwrap();
        let ids: Vec<&str> = red
            .iter()
            .filter_map(|(_, l)| l.get("identity").map(String::as_str))
            .collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&"1"));
        assert!(ids.contains(&"3"));

        let everyone = metrics
            .get_series_in_class("individual_wealth", &Labels::new())
            .unwrap();
        assert_eq!(everyone.len(), 3);
    }

    #[test]
    fn data_round_trips_through_json() {
        let mut metrics = Metrics::new();
        metrics.log(at(0, 30), "population", 3.0, &Labels::new()).unwrap();
        metrics
            .log(at(0, 30), "individual_value", 2.5, &labels([("identity", "1")]))
            .unwrap();

        let json = serde_json::to_string(metrics.data()).unwrap();
        let restored: MetricsData = serde_json::from_str(&json).unwrap();
        assert_eq!(&restored, metrics.data());

        let mut resumed = Metrics::from_data(restored);
        assert!(resumed.log(at(0, 31), "population", 3.0, &Labels::new()).is_err());
        assert!(resumed.log(at(1, 60), "population", 3.0, &Labels::new()).is_ok());
    }
}
