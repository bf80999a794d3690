//! # bobsim-types::errors
//!
//! Typed error enums for each concern that can fail, collected under
//! `bobsim-engine::errors::EngineError` at the top level. Keeping them here
//! rather than in `bobsim-engine` lets `bobsim-predicate` and `bobsim-proto`
//! report errors without depending on the engine crate.

use crate::time::SimTime;
use thiserror::Error;

/// Errors arising from simulated-time arithmetic.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SimError {
    #[error("simulated time overflow: {base} + {offset} exceeds the representable range")]
    TimeOverflow { base: SimTime, offset: SimTime },

    #[error("simulated time underflow: {base} - {offset} would be negative")]
    TimeUnderflow { base: SimTime, offset: SimTime },
}

/// Errors raised while parsing or resolving a scenario's config blocks,
/// before the network graph has been built.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required config key `{0}`")]
    MissingKey(String),

    #[error("config key `{key}` has the wrong type: expected {expected}, found {found}")]
    WrongType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("config key `{key}` is out of range: {reason}")]
    OutOfRange { key: String, reason: String },

    #[error("unknown node behavior `{0}`")]
    UnknownBehavior(String),

    #[error("config key `{key}` has an invalid predicate: {source}")]
    InvalidPredicate {
        key: String,
        #[source]
        source: PredicateError,
    },
}

/// Errors raised while loading and validating a scenario file into a
/// runnable network.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read scenario file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse scenario file {path} as {format}: {source}")]
    Parse {
        path: String,
        format: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("scenario file has unrecognized extension: {0}")]
    UnknownFormat(String),

    #[error("duplicate node name `{0}`")]
    DuplicateNode(String),

    #[error("link references unknown node `{0}`")]
    UnknownNode(String),

    #[error("node `{0}` has no outgoing links and is not a sink")]
    UnreachableOutput(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Predicate(#[from] PredicateError),
}

/// Errors raised while compiling the predicate DSL (§4.4).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PredicateError {
    #[error("unbalanced parentheses in predicate `{0}`")]
    UnbalancedParens(String),

    #[error("invalid comparison operator `{0}`")]
    InvalidOperator(String),

    #[error("invalid regex in predicate pattern: {0}")]
    InvalidRegex(String),

    #[error("empty predicate expression")]
    Empty,

    #[error("dangling boolean operator in predicate `{0}`")]
    DanglingOperator(String),
}

/// Errors a node behavior can raise from inside `step`.
#[derive(Debug, Error)]
pub enum StepError {
    #[error("node `{node}` behavior `{behavior}` failed: {reason}")]
    BehaviorFailed {
        node: String,
        behavior: &'static str,
        reason: String,
    },

    #[error(transparent)]
    Time(#[from] SimError),
}

/// Errors raised by the real-time pacing mode (`--real-time`).
#[derive(Debug, Error)]
pub enum RealTimeError {
    #[error("real-time run fell behind simulated time by {behind_ms}ms, exceeding the {slack_ms}ms slack budget")]
    SlackExceeded { behind_ms: u64, slack_ms: u64 },
}
