//! # bobsim-proto
//!
//! Defines the node-behavior SDK: the `NodeBehavior` trait authors implement,
//! the `NodeCtx` capabilities the engine exposes during a step, and a small
//! library of reference behaviors covering the building blocks most test
//! scenarios need (sources, delays, fan-in/fan-out, propagators).
//!
//! Unlike a message-passing protocol that calls back into the simulator for
//! every side effect, a `NodeBehavior` is a pure state machine: `step` takes
//! at most one inbound message and returns the delays and outbound messages
//! it produces, leaving all scheduling to the engine. This keeps behaviors
//! trivially testable in isolation and keeps the engine free of re-entrant
//! calls back into itself.

pub mod behaviors;
pub mod config;
pub mod ctx;
pub mod ctx_rng;

mod behavior;

pub use behavior::{NodeBehavior, StepOutcome};
pub use ctx::NodeCtx;

pub use bobsim_types::errors::StepError;

/// Every behavior name `build_behavior` recognizes, for the `list-behaviors`
/// CLI subcommand to enumerate without constructing one.
pub const BEHAVIOR_NAMES: &[&str] = &[
    "source.random",
    "source.pulse",
    "identity_delay",
    "sink",
    "and_gate",
    "maximizer",
    "propagator",
    "variable_delay",
    "key_delay",
    "add_key",
];

/// Constructs the behavior named in a node's scenario entry, resolving its
/// config block against that behavior's schema. Returns `ConfigError` if the
/// name is unrecognized; each behavior's own `from_config` reports its own
/// missing/malformed keys.
pub fn build_behavior(
    name: &str,
    config: &indexmap::IndexMap<String, toml::Value>,
) -> Result<Box<dyn NodeBehavior>, bobsim_types::errors::ConfigError> {
    use behaviors::*;

    match name {
        "source.random" => Ok(Box::new(RandomSource::from_config(config)?)),
        "source.pulse" => Ok(Box::new(PulseSource::from_config(config)?)),
        "identity_delay" => Ok(Box::new(IdentityDelay::from_config(config)?)),
        "sink" => Ok(Box::new(Sink::from_config(config)?)),
        "and_gate" => Ok(Box::new(AndGate::from_config(config)?)),
        "maximizer" => Ok(Box::new(Maximizer::from_config(config)?)),
        "propagator" => Ok(Box::new(Propagator::from_config(config)?)),
        "variable_delay" => Ok(Box::new(VariableDelay::from_config(config)?)),
        "key_delay" => Ok(Box::new(KeyDelay::from_config(config)?)),
        "add_key" => Ok(Box::new(AddKey::from_config(config)?)),
        other => Err(bobsim_types::errors::ConfigError::UnknownBehavior(other.to_string())),
    }
}
