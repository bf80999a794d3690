//! # bobsim-engine::node_runtime
//!
//! The per-node reservation-window state machine (§4.2). A node is either
//! `Idle` or `Busy` until some simtime; while busy it cannot start another
//! `step`, but arrivals still land in its FIFO input queue. The queue holds
//! `PendingInput::Message` for real arrivals and `PendingInput::Tick` for a
//! behavior's self-scheduled re-invocation (`StepOutcome::reschedule_after`)
//! -- unifying both under one dequeue-and-invoke loop rather than giving
//! ticks a separate code path.

use bobsim_proto::behavior::NodeBehavior;
use bobsim_types::id::NodeId;
use bobsim_types::message::Message;
use bobsim_types::metrics as met;
use bobsim_types::time::SimTime;
use std::collections::VecDeque;

use crate::stats::NodeStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reservation {
    Idle,
    Busy { until: SimTime },
}

#[derive(Debug)]
pub enum PendingInput {
    Message(Message),
    Tick,
}

pub struct RuntimeNode {
    pub id: NodeId,
    pub name: String,
    pub behavior: Box<dyn NodeBehavior>,
    pub reservation: Reservation,
    pub queue: VecDeque<PendingInput>,
    pub stats: NodeStats,
}

impl RuntimeNode {
    pub fn new(id: NodeId, name: String, behavior: Box<dyn NodeBehavior>, outgoing_edges: usize) -> Self {
        RuntimeNode {
            id,
            name,
            behavior,
            reservation: Reservation::Idle,
            queue: VecDeque::new(),
            stats: NodeStats::new(outgoing_edges),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.reservation, Reservation::Idle)
    }

    /// Enqueues an arrival and reports whether the node needs waking (it was
    /// idle with an otherwise-empty queue) -- the scheduler uses this to
    /// decide whether to drive a dequeue right away.
    pub fn enqueue_message(&mut self, message: Message) -> bool {
        let was_empty_idle = self.is_idle() && self.queue.is_empty();
        self.queue.push_back(PendingInput::Message(message));
        self.report_queue_depth();
        was_empty_idle
    }

    pub fn enqueue_tick(&mut self) -> bool {
        let was_empty_idle = self.is_idle() && self.queue.is_empty();
        self.queue.push_back(PendingInput::Tick);
        self.report_queue_depth();
        was_empty_idle
    }

    /// Pops the next pending input for dispatch, if the node is idle and has
    /// one queued. Returns `None` if the node is busy or the queue is empty;
    /// the caller is responsible for marking the node busy afterward.
    pub fn pop_ready(&mut self) -> Option<PendingInput> {
        if !self.is_idle() {
            return None;
        }
        let next = self.queue.pop_front();
        self.report_queue_depth();
        next
    }

    fn report_queue_depth(&mut self) {
        self.stats.set_queue_depth(self.queue.len() as u64);
        ::metrics::gauge!(met::MET_QUEUE_DEPTH_GAUGE, met::LBL_NODE => self.name.clone()).set(self.stats.queue_depth as f64);
        ::metrics::gauge!(met::MET_QUEUE_HIGH_WATER_GAUGE, met::LBL_NODE => self.name.clone()).set(self.stats.queue_high_water as f64);
    }

    pub fn begin_reservation(&mut self, now: SimTime, setup_delay: SimTime, processing_delay: SimTime) {
        let total = setup_delay.saturating_add(processing_delay);
        self.reservation = Reservation::Busy { until: now.saturating_add(total) };
        self.stats.record_processing(total);
    }

    pub fn end_reservation(&mut self) {
        self.reservation = Reservation::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bobsim_proto::behavior::StepOutcome;
    use bobsim_proto::ctx::NodeCtx;
    use bobsim_types::errors::StepError;

    struct NoopBehavior;
    impl NodeBehavior for NoopBehavior {
        fn name(&self) -> &'static str {
            "noop"
        }
        fn step(&mut self, _ctx: &mut dyn NodeCtx, _input: Option<&Message>) -> Result<StepOutcome, StepError> {
            Ok(StepOutcome::idle())
        }
    }

    fn node() -> RuntimeNode {
        RuntimeNode::new(0, "n".into(), Box::new(NoopBehavior), 0)
    }

    #[test]
    fn enqueue_on_idle_empty_queue_signals_wake() {
        let mut n = node();
        assert!(n.enqueue_message(Message::new(1, 0, 0)));
        assert!(!n.enqueue_message(Message::new(2, 0, 0)));
    }

    #[test]
    fn busy_node_does_not_pop() {
        let mut n = node();
        n.enqueue_message(Message::new(1, 0, 0));
        n.begin_reservation(0, 0, 10);
        assert!(n.pop_ready().is_none());
        n.end_reservation();
        assert!(n.pop_ready().is_some());
    }

    #[test]
    fn queue_is_fifo_across_message_and_tick() {
        let mut n = node();
        n.enqueue_message(Message::new(1, 0, 0));
        n.enqueue_tick();
        match n.pop_ready().unwrap() {
            PendingInput::Message(m) => assert_eq!(m.id, 1),
            PendingInput::Tick => panic!("expected message first"),
        }
        match n.pop_ready().unwrap() {
            PendingInput::Tick => {}
            PendingInput::Message(_) => panic!("expected tick second"),
        }
    }
}
