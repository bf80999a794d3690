//! # bobsim-types
//!
//! This crate provides the foundational, shared data types used across the
//! entire bobsim workspace. Its purpose is to break dependency cycles by
//! providing a stable, central location for types that `bobsim-engine`,
//! `bobsim-proto`, `bobsim-predicate`, `bobsim-geo` and `bobsim-cli` all
//! need to agree upon.

#![forbid(unsafe_code)]

pub mod errors;
pub mod id;
pub mod message;
pub mod metrics;
pub mod scenario;
pub mod time;
pub mod value;
