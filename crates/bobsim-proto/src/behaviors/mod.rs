//! # bobsim-proto::behaviors
//!
//! A small library of reference node behaviors. These are not meant to
//! cover every scenario a user might build -- they are the building blocks
//! the worked examples (§8) compose: a couple of sources, a delay, a sink,
//! and a handful of fan-in/fan-out combinators.

mod add_key;
mod and_gate;
mod identity_delay;
mod key_delay;
mod maximizer;
mod propagator;
mod sink;
mod source;
mod variable_delay;

pub use add_key::AddKey;
pub use and_gate::AndGate;
pub use identity_delay::IdentityDelay;
pub use key_delay::KeyDelay;
pub use maximizer::Maximizer;
pub use propagator::Propagator;
pub use sink::Sink;
pub use source::{PulseSource, RandomSource};
pub use variable_delay::VariableDelay;
