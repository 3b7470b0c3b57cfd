//! JSON export of a finished run.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use orgsim_core::{RunResults, SimulationConfig};
use orgsim_metrics::MetricsData;
use orgsim_types::Departure;

use crate::error::EngineError;

/// Everything written by `--dump`.
#[derive(Debug, Serialize)]
pub struct RunDump<'a> {
    /// When the dump was written.
    pub generated_at: DateTime<Utc>,
    /// The configuration the run was played with.
    pub config: &'a SimulationConfig,
    /// Summary of the run.
    pub results: &'a RunResults,
    /// Everyone who died, in order of death.
    pub departures: &'a [Departure],
    /// The full metrics store.
    pub metrics: &'a MetricsData,
}

impl RunDump<'_> {
    /// Encode as pretty JSON.
    pub fn to_json(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write to `path`, replacing any existing file.
    pub fn write(&self, path: &Path) -> Result<(), EngineError> {
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        info!(
            path = %path.display(),
            departures = self.departures.len(),
            series_classes = self.metrics.series_classes.len(),
            "metrics dump written"
        );
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use orgsim_metrics::{Labels, Metrics};
    use orgsim_types::SimTime;

    use super::*;

    #[test]
    fn dump_contains_every_section() {
        let config = SimulationConfig::default();
        let results = RunResults::default();
        let mut metrics = Metrics::new();
        metrics
            .log(SimTime::start(), "population", 3.0, &Labels::new())
            .unwrap();
        let dump = RunDump {
            generated_at: Utc::now(),
            config: &config,
            results: &results,
            departures: &[],
            metrics: metrics.data(),
        };

        let value: serde_json::Value = serde_json::from_str(&dump.to_json().unwrap()).unwrap();
        for key in ["generated_at", "config", "results", "departures", "metrics"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(
            value.pointer("/config/economy/fiscal_length"),
            Some(&serde_json::json!(30))
        );
        assert!(value.pointer("/metrics/series_classes/population").is_some());
    }
}
