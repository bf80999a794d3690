//! # bobsim-engine::errors
//!
//! Collects every typed error surface under one `EngineError`, the single
//! error type the CLI boundary converts to `anyhow::Error`.

use bobsim_types::errors::{ConfigError, LoadError, PredicateError, RealTimeError, StepError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Predicate(#[from] PredicateError),

    #[error(transparent)]
    Step(#[from] StepError),

    #[error(transparent)]
    RealTime(#[from] RealTimeError),

    #[error("failed to write results artifact {path}: {source}")]
    Output {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
