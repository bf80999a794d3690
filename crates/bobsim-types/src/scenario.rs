//! # bobsim-types::scenario
//!
//! Defines the Rust structs that map directly to the scenario file (YAML or
//! TOML, by extension). This is the authoritative schema parsed by
//! `bobsim-engine::scenario::loader` before the network graph is built.

use crate::errors::ConfigError;
use crate::time::{deserialize_sim_time, SimTime};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The top-level structure for a scenario definition file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,

    #[serde(default)]
    pub seed: Option<u64>,

    /// Wall-clock instant `SimTime` 0 maps to, used for Orbital/Geopoint
    /// propagation and CZML output.
    #[serde(default = "default_epoch")]
    pub epoch: DateTime<Utc>,

    #[serde(default, deserialize_with = "deserialize_opt_sim_time")]
    pub end_simtime: Option<SimTime>,

    pub nodes: Vec<NodeSpec>,

    #[serde(default)]
    pub links: Vec<LinkSpec>,
}

fn default_epoch() -> DateTime<Utc> {
    DateTime::from_timestamp(0, 0).unwrap_or_else(Utc::now)
}

/// Scenarios express `end_simtime` in whole seconds; internally everything
/// is nanoseconds (see `bobsim_types::time`).
fn deserialize_opt_sim_time<'de, D>(deserializer: D) -> Result<Option<SimTime>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<u64>::deserialize(deserializer).map(|o| o.map(crate::time::sim_from_secs))
}

impl Scenario {
    /// Validates the scenario for logical consistency, ahead of graph
    /// construction. Does not check predicate syntax; that happens when the
    /// link's compiled predicate is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen_names = HashSet::new();
        for node in &self.nodes {
            if !seen_names.insert(node.name.clone()) {
                return Err(ConfigError::OutOfRange {
                    key: "nodes".into(),
                    reason: format!("duplicate node name `{}`", node.name),
                });
            }
        }
        for (i, link) in self.links.iter().enumerate() {
            if !seen_names.contains(&link.from) {
                return Err(ConfigError::OutOfRange {
                    key: format!("links[{i}].from"),
                    reason: format!("unknown node `{}`", link.from),
                });
            }
            if !seen_names.contains(&link.to) {
                return Err(ConfigError::OutOfRange {
                    key: format!("links[{i}].to"),
                    reason: format!("unknown node `{}`", link.to),
                });
            }
        }
        Ok(())
    }
}

/// A single node's definition: its behavior and the config block that
/// behavior resolves against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSpec {
    pub name: String,

    pub behavior: String,

    #[serde(default)]
    pub config: IndexMap<String, toml::Value>,

    /// Optional MetaNode position model (§4.5): `Geopoint` or `Orbital`.
    #[serde(default)]
    pub position: Option<PositionSpec>,
}

/// Fixed or propagated position attached to a node, consumed by
/// `bobsim-geo` and emitted into CZML output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PositionSpec {
    Geopoint {
        lat_deg: f64,
        lon_deg: f64,
        alt_m: f64,
    },
    Orbital {
        tle_line1: String,
        tle_line2: String,
    },
}

/// A directed link between two named nodes, with an optional gating
/// predicate and a delay model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkSpec {
    pub from: String,
    pub to: String,

    /// Predicate DSL source (§4.4). An absent predicate always matches.
    #[serde(default)]
    pub when: Option<String>,

    #[serde(default)]
    pub delay: DelayModel,
}

/// Per-link delay model (§4.3). Assigned `LinkId`s follow edge-definition
/// order, not declaration order within a node's outgoing set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum DelayModel {
    Const {
        #[serde(deserialize_with = "deserialize_sim_time", default)]
        delay: SimTime,
    },
    SizeRate {
        bytes_per_sec: f64,
        #[serde(deserialize_with = "deserialize_sim_time", default)]
        fixed_overhead: SimTime,
    },
    TcpMathis {
        rtt_ms: f64,
        loss_rate: f64,
        mss_bytes: f64,
    },
}

impl Default for DelayModel {
    fn default() -> Self {
        DelayModel::Const { delay: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_duplicate_node_names() {
        let scenario = Scenario {
            name: "t".into(),
            seed: None,
            epoch: default_epoch(),
            end_simtime: None,
            nodes: vec![
                NodeSpec { name: "a".into(), behavior: "sink".into(), config: IndexMap::new(), position: None },
                NodeSpec { name: "a".into(), behavior: "sink".into(), config: IndexMap::new(), position: None },
            ],
            links: vec![],
        };
        assert!(scenario.validate().is_err());
    }

    #[test]
    fn validate_rejects_link_to_unknown_node() {
        let scenario = Scenario {
            name: "t".into(),
            seed: None,
            epoch: default_epoch(),
            end_simtime: None,
            nodes: vec![NodeSpec { name: "a".into(), behavior: "sink".into(), config: IndexMap::new(), position: None }],
            links: vec![LinkSpec { from: "a".into(), to: "ghost".into(), when: None, delay: DelayModel::default() }],
        };
        assert!(scenario.validate().is_err());
    }
}
