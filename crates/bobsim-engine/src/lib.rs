//! # bobsim-engine
//!
//! The simulation engine: resolves a loaded scenario into a runnable
//! network, drives the event-driven scheduler loop over every node's
//! behavior, and writes the results artifacts a run produces.

pub mod errors;
pub mod events;
pub mod ids;
pub mod network;
pub mod node_runtime;
pub mod output;
pub mod realtime;
pub mod rng;
pub mod scenario;
pub mod simulation;
pub mod stats;

pub use errors::EngineError;
pub use network::Network;
pub use simulation::{RunConfig, Simulation};
