//! # bobsim-types::id
//!
//! Defines the core identifier types used throughout the simulation.
//! Using distinct types for different kinds of IDs helps prevent bugs where,
//! for example, a `NodeId` might be accidentally used as a `LinkId`.

/// A unique identifier for a node in the simulation.
/// Invariant: nodes are assigned contiguous IDs from 0 to N-1 at load time,
/// in the order their names first appear in the scenario file.
pub type NodeId = u32;

/// A unique identifier for a directed link between two nodes, assigned at
/// load time in edge-definition order.
pub type LinkId = u32;

/// A unique identifier for a scheduled event in the simulation's master queue.
pub type EventId = u64;
