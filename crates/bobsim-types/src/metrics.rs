//! # bobsim-types::metrics
//!
//! Defines constants for metric names and labels, emitted via the `metrics`
//! facade. Centralizing these constants prevents typos and keeps the engine
//! (where metrics are recorded) and any external dashboard consumers in sync.

// --- Metric Names ---
pub const MET_EVENTS_PROCESSED: &str = "bobsim_events_processed_total";
pub const MET_MSG_SENT: &str = "bobsim_msg_sent_total";
pub const MET_MSG_DELIVERED: &str = "bobsim_msg_delivered_total";
pub const MET_MSG_DROPPED: &str = "bobsim_msg_dropped_total";
pub const MET_QUEUE_DEPTH_GAUGE: &str = "bobsim_node_queue_depth";
pub const MET_QUEUE_HIGH_WATER_GAUGE: &str = "bobsim_node_queue_high_water";
pub const MET_NODE_BUSY_NS_HISTO: &str = "bobsim_node_busy_ns";
pub const MET_LINK_DELAY_NS_HISTO: &str = "bobsim_link_delay_ns";
pub const MET_PREDICATE_EVAL_TOTAL: &str = "bobsim_predicate_eval_total";
pub const MET_PROPAGATION_NS_HISTO: &str = "bobsim_propagation_ns";
pub const MET_REALTIME_BEHIND_NS_GAUGE: &str = "bobsim_realtime_behind_ns";

// --- Label Keys ---
pub const LBL_NODE: &str = "node";
pub const LBL_SRC: &str = "src";
pub const LBL_DST: &str = "dst";
pub const LBL_LINK: &str = "link";
pub const LBL_BEHAVIOR: &str = "behavior";
pub const LBL_REASON: &str = "reason";
