//! # bobsim-types::message
//!
//! Defines `Message`, the unit of data nodes exchange. A message carries an
//! arbitrary payload (§3) plus the hop-accounting fields the history writers
//! and `msg_history.txt/csv` artifacts report on.

use crate::id::{LinkId, NodeId};
use crate::time::SimTime;
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A globally unique identifier for a message, assigned at creation time by
/// the node behavior (or by `source`-style generators) that produced it.
pub type MessageId = u64;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,

    /// The node that most recently produced or forwarded this message.
    pub origin: NodeId,

    /// Arbitrary key/value payload. Unknown fields referenced by a predicate
    /// are treated as absent (§4.4) rather than a hard error.
    pub payload: IndexMap<String, Value>,

    /// Simulated time this message was first created, before any hops.
    pub create_time: SimTime,

    /// Simulated time this message was last sent out of a node, onto a link.
    pub time_sent: SimTime,

    /// Time this message spent waiting in a node's input queue before its
    /// step began, at the node that most recently handled it.
    pub wait_time: SimTime,

    /// Time this message spent being processed (setup_delay + processing_delay)
    /// at the node that most recently handled it.
    pub processing_time: SimTime,

    /// Delay incurred crossing the link that most recently carried this
    /// message, once a link model has been applied.
    pub next_hop_delay: SimTime,

    /// The link this message is currently traversing, if any. `None` while a
    /// message sits in a node's queue or was just produced.
    pub in_flight_on: Option<LinkId>,

    /// Running count of hops this message has made so far.
    pub hop_count: u32,
}

impl Message {
    pub fn new(id: MessageId, origin: NodeId, create_time: SimTime) -> Self {
        Message {
            id,
            origin,
            payload: IndexMap::new(),
            create_time,
            time_sent: create_time,
            wait_time: 0,
            processing_time: 0,
            next_hop_delay: 0,
            in_flight_on: None,
            hop_count: 0,
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.payload.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// Total simulated-time age of this message since creation, as observed
    /// at `now`. Used for `node_log.txt` and `msg_history.txt` reporting.
    pub fn age(&self, now: SimTime) -> SimTime {
        now.saturating_sub(self.create_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_field_overwrites_existing_key() {
        let msg = Message::new(1, 0, 0)
            .with_field("x", Value::Int(1))
            .with_field("x", Value::Int(2));
        assert_eq!(msg.get("x"), Some(&Value::Int(2)));
    }

    #[test]
    fn unknown_field_is_none_not_error() {
        let msg = Message::new(1, 0, 0);
        assert_eq!(msg.get("missing"), None);
    }
}
