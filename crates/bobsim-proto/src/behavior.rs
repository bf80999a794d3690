//! # bobsim-proto::behavior
//!
//! The object-safe `NodeBehavior` trait every node implements, and the
//! `StepOutcome` its `step` returns.

use crate::ctx::NodeCtx;
use bobsim_types::errors::StepError;
use bobsim_types::message::Message;
use bobsim_types::time::SimTime;

/// The result of one call to `NodeBehavior::step`.
#[derive(Debug, Default)]
pub struct StepOutcome {
    /// Time the node spends preparing to process, before `processing_delay`
    /// begins. Distinct from `processing_delay` so a node can report setup
    /// and work time separately in `node_stats.txt`.
    pub setup_delay: SimTime,

    /// Time the node spends actively processing, after `setup_delay`. The
    /// node is unavailable for its next queued input until both have
    /// elapsed (the reservation window, §4.2).
    pub processing_delay: SimTime,

    /// Messages this step produced, to be routed across matching outgoing
    /// links in declaration order.
    pub outputs: Vec<Message>,

    /// If set, the engine schedules a follow-up step with no input at
    /// `now + reschedule_after`, regardless of whether new input arrives
    /// first. Source behaviors use this to self-pace generation; most
    /// behaviors leave it `None`.
    pub reschedule_after: Option<SimTime>,
}

impl StepOutcome {
    pub fn idle() -> Self {
        StepOutcome::default()
    }

    pub fn with_output(mut self, msg: Message) -> Self {
        self.outputs.push(msg);
        self
    }
}

/// A node's behavior: the state machine that turns inbound messages into
/// outbound ones. Implementors own all node-local state; the engine owns
/// scheduling, queueing, and routing.
pub trait NodeBehavior: Send {
    /// A short, stable name used in `node_stats.txt` and log context.
    fn name(&self) -> &'static str;

    /// Called once before the first event a node participates in, with no
    /// input. Most behaviors return `StepOutcome::idle()`; sources use this
    /// to schedule their first generation.
    fn init(&mut self, ctx: &mut dyn NodeCtx) -> Result<StepOutcome, StepError> {
        let _ = ctx;
        Ok(StepOutcome::idle())
    }

    /// Called with `Some(message)` when a queued input is dequeued for
    /// processing, or `None` when a self-scheduled `reschedule_after` fires
    /// with nothing in queue.
    fn step(&mut self, ctx: &mut dyn NodeCtx, input: Option<&Message>) -> Result<StepOutcome, StepError>;
}
