//! Error types for the engine binary.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: orgsim_core::ConfigError,
    },

    /// Building or playing the scenario failed.
    #[error("scenario error: {source}")]
    Scenario {
        /// The underlying scenario error.
        #[from]
        source: orgsim_core::ScenarioError,
    },

    /// Writing the metrics dump failed.
    #[error("dump error: {source}")]
    Dump {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Encoding the metrics dump failed.
    #[error("dump encoding error: {source}")]
    Encoding {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// The command line could not be understood.
    #[error("usage: orgsim-engine [config-path] [--dump <path>] ({message})")]
    Usage {
        /// What was wrong with the arguments.
        message: String,
    },
}
