//! # bobsim-engine::events
//!
//! The `Event` enum and the `Queued` wrapper that makes a `BinaryHeap`
//! behave as a deterministic min-heap priority queue (§4.1).
//!
//! Three event kinds cover the whole node-runtime contract (§4.2): an
//! `Arrival` enqueues a message on a destination node's FIFO input buffer
//! (waking it if idle); a `Tick` does the same but with no message, the
//! mechanism a continuously-active source uses to re-invoke its own `step`
//! at its chosen cadence; a `Ready` fires at the end of a node's reservation
//! window, dispatching the pending outputs across its outgoing edges and
//! then either resuming the node on its next queued input or going idle.

use bobsim_types::id::NodeId;
use bobsim_types::message::Message;
use bobsim_types::time::SimTime;
use std::cmp::Ordering;

#[derive(Debug)]
pub enum Event {
    Arrival { node: NodeId, message: Message },
    Tick { node: NodeId },
    Ready { node: NodeId },
}

/// Wraps an `Event` with the scheduling metadata the priority queue needs:
/// its due time and a monotonic insertion sequence that breaks ties between
/// events scheduled for the identical simtime, guaranteeing the same
/// dispatch order across runs with the same seed and input (§5, §8 property 1).
#[derive(Debug)]
pub struct Queued<T> {
    pub time: SimTime,
    pub insert_seq: u64,
    pub payload: T,
}

impl<T> Queued<T> {
    pub fn new(time: SimTime, insert_seq: u64, payload: T) -> Self {
        Queued { time, insert_seq, payload }
    }
}

impl<T> PartialEq for Queued<T> {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.insert_seq == other.insert_seq
    }
}

impl<T> Eq for Queued<T> {}

impl<T> PartialOrd for Queued<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Queued<T> {
    /// `BinaryHeap` is a max-heap; reversing both comparisons turns it into
    /// the min-heap the scheduler needs, with ties broken by insertion order.
    fn cmp(&self, other: &Self) -> Ordering {
        other.time.cmp(&self.time).then_with(|| other.insert_seq.cmp(&self.insert_seq))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BinaryHeap;

    #[test]
    fn pops_earliest_time_first() {
        let mut heap = BinaryHeap::new();
        heap.push(Queued::new(10, 0, "late"));
        heap.push(Queued::new(1, 1, "early"));
        heap.push(Queued::new(5, 2, "mid"));
        assert_eq!(heap.pop().unwrap().payload, "early");
        assert_eq!(heap.pop().unwrap().payload, "mid");
        assert_eq!(heap.pop().unwrap().payload, "late");
    }

    #[test]
    fn ties_break_on_insertion_order() {
        let mut heap = BinaryHeap::new();
        heap.push(Queued::new(5, 2, "second"));
        heap.push(Queued::new(5, 1, "first"));
        assert_eq!(heap.pop().unwrap().payload, "first");
        assert_eq!(heap.pop().unwrap().payload, "second");
    }
}
