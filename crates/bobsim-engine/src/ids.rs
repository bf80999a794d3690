//! # bobsim-engine::ids
//!
//! Monotonic ID generators for messages and the event queue's insertion
//! sequence, kept in one place so every counter overflow is an explicit
//! panic rather than a silent wraparound that would corrupt tie-breaking.

use bobsim_types::message::MessageId;

pub struct IdGen {
    msg_id: MessageId,
    insertion_seq: u64,
}

impl IdGen {
    pub fn new() -> Self {
        IdGen { msg_id: 0, insertion_seq: 0 }
    }

    pub fn next_msg_id(&mut self) -> MessageId {
        let id = self.msg_id;
        self.msg_id = self.msg_id.checked_add(1).expect("MessageId overflow");
        id
    }

    pub fn next_insertion_seq(&mut self) -> u64 {
        let id = self.insertion_seq;
        self.insertion_seq = self.insertion_seq.checked_add(1).expect("insertion sequence overflow");
        id
    }
}

impl Default for IdGen {
    fn default() -> Self {
        Self::new()
    }
}
