//! # bobsim-geo
//!
//! Position models for MetaNodes (§4.5): fixed geodetic points and orbital
//! (TLE + SGP4) propagators, plus the geodesy conversions they share. A
//! MetaNode has no message-processing behavior of its own; it exists purely
//! to give a node a time-varying 3D position that the `propagator` behavior
//! samples and that `bobsim-engine::output::czml` renders to a CZML file.

pub mod geodesy;
pub mod meta_node;

pub use geodesy::{Ecef, Eci, Geodetic};
pub use meta_node::{MetaNode, MetaNodeError, PositionSample};
