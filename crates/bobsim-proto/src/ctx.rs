//! # bobsim-proto::ctx
//!
//! `NodeCtx` is the engine-provided capability surface a behavior sees
//! during `step`. It deliberately exposes far less than the teacher SDK's
//! `ProtoCtx` (no send/broadcast/timer calls) because outbound messages and
//! rescheduling are now plain return values on `StepOutcome` -- `NodeCtx`
//! only covers what a behavior cannot derive from its own state: identity,
//! the current simulated time, the recorder-backed RNG, and structured
//! logging.

use bobsim_types::id::NodeId;
use bobsim_types::time::SimTime;

/// Capabilities the engine lends a behavior for the duration of one `step`
/// or `init` call. Never stored past that call; the engine constructs a
/// fresh one (or reuses a borrow) per invocation.
pub trait NodeCtx {
    fn node_id(&self) -> NodeId;

    fn now(&self) -> SimTime;

    /// Draws a uniform `f64` in `[0, 1)` from the master RNG, recorded
    /// under this node's draw site for reproducibility.
    fn rand_f64(&mut self) -> f64;

    /// Draws a `u64` from the master RNG, recorded the same way.
    fn rand_u64(&mut self) -> u64;

    /// Attaches a key/value to this node's entry in `node_log.txt` for the
    /// current step, without affecting routing or scheduling.
    fn log_kv(&mut self, key: &'static str, value: String);

    /// Queries this node's attached meta-node (if any) for its
    /// Earth-centered-inertial position, in kilometers, at the given sim
    /// time. `None` when no meta-node is attached to this node.
    fn eci_position_km(&mut self, at: SimTime) -> Option<(f64, f64, f64)>;
}
