//! Command-line runner for the Orgsim simulation.
//!
//! # Usage
//!
//! ```text
//! orgsim-engine [config-path] [--dump <path>]
//! ```
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing, `RUST_LOG`, default `info`)
//! 2. Load configuration from `config-path`, or `orgsim-config.yaml`, or
//!    built-in defaults when neither exists
//! 3. Build the scenario (validates the configuration)
//! 4. Play the configured number of periods
//! 5. Log the results and optionally write a JSON dump

mod dump;
mod error;

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use orgsim_core::{Scenario, SimulationConfig};

use crate::dump::RunDump;
use crate::error::EngineError;

const DEFAULT_CONFIG: &str = "orgsim-config.yaml";

/// Parsed command line.
#[derive(Debug, Default, PartialEq, Eq)]
struct Args {
    config: Option<PathBuf>,
    dump: Option<PathBuf>,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, EngineError> {
        let mut parsed = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            if arg == "--dump" {
                let path = args.next().ok_or_else(|| EngineError::Usage {
                    message: "--dump needs a path".to_owned(),
                })?;
                parsed.dump = Some(PathBuf::from(path));
            } else if arg.starts_with("--") {
                return Err(EngineError::Usage {
                    message: format!("unknown flag {arg}"),
                });
            } else if parsed.config.is_none() {
                parsed.config = Some(PathBuf::from(arg));
            } else {
                return Err(EngineError::Usage {
                    message: format!("unexpected argument {arg}"),
                });
            }
        }
        Ok(parsed)
    }
}

/// Application entry point.
///
/// # Errors
///
/// Returns an error if the arguments, configuration, run, or dump fail.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("orgsim-engine starting");

    let args = Args::parse(std::env::args().skip(1))?;
    let config = load_config(args.config.as_deref())?;
    info!(
        periods = config.run.periods,
        rng_seed = config.run.rng_seed,
        fiscal_length = config.economy.fiscal_length,
        productivity = config.economy.productivity,
        "Configuration loaded"
    );

    let mut scenario = Scenario::from_config(&config).map_err(EngineError::from)?;
    let results = scenario.play().map_err(EngineError::from)?;
    info!(
        periods_played = results.periods_played,
        final_population = results.final_population,
        extinct = results.extinct,
        shareholder_value = results.shareholder_value,
        total_individual_value = results.total_individual_value,
        min_individual_value = results.min_individual_value,
        median_individual_value = results.median_individual_value,
        max_individual_value = results.max_individual_value,
        "Simulation ended"
    );

    if let Some(path) = args.dump {
        let world = scenario.world();
        RunDump {
            generated_at: Utc::now(),
            config: &config,
            results: &results,
            departures: world.departures(),
            metrics: world.metrics().data(),
        }
        .write(&path)?;
    }

    Ok(())
}

/// Load configuration from `path`, or the default file, or defaults.
///
/// An explicit path must exist; the default file may be absent.
fn load_config(path: Option<&Path>) -> Result<SimulationConfig, EngineError> {
    let config = match path {
        Some(path) => SimulationConfig::from_file(path)?,
        None => {
            let default_path = Path::new(DEFAULT_CONFIG);
            if default_path.exists() {
                SimulationConfig::from_file(default_path)?
            } else {
                info!("Config file not found, using defaults");
                let mut config = SimulationConfig::default();
                config.run.apply_env_overrides();
                config
            }
        }
    };
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args, EngineError> {
        Args::parse(list.iter().map(|s| (*s).to_owned()))
    }

    #[test]
    fn no_arguments() {
        assert_eq!(args(&[]).unwrap(), Args::default());
    }

    #[test]
    fn config_and_dump() {
        let parsed = args(&["run.yaml", "--dump", "out.json"]).unwrap();
        assert_eq!(parsed.config, Some(PathBuf::from("run.yaml")));
        assert_eq!(parsed.dump, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn dump_without_path_rejected() {
        assert!(matches!(args(&["--dump"]), Err(EngineError::Usage { .. })));
    }

    #[test]
    fn unknown_flag_and_extra_positional_rejected() {
        assert!(args(&["--fast"]).is_err());
        assert!(args(&["a.yaml", "b.yaml"]).is_err());
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let result = load_config(Some(Path::new("/nonexistent/orgsim.yaml")));
        assert!(matches!(result, Err(EngineError::Config { .. })));
    }
}
