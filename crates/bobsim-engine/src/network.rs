//! # bobsim-engine::network
//!
//! Resolves a validated `Scenario` into a runnable graph: a stable
//! `NodeId -> Node` table (§9 Design Note "Cyclic references") built once at
//! load time, plus one `RuntimeLink` per edge holding its compiled predicate
//! and delay model. Topology lives in a `petgraph::Graph` exactly as the
//! teacher's `Net` does, edge weights carrying the link's `LinkId` so the
//! link-level attributes stay in one place rather than duplicated onto the
//! graph.

use bobsim_geo::MetaNode;
use bobsim_predicate::{compile, CompiledPredicate};
use bobsim_types::errors::LoadError;
use bobsim_types::id::{LinkId, NodeId};
use bobsim_types::scenario::{DelayModel, PositionSpec, Scenario};
use bobsim_types::time::{sim_from_secs, SimTime};
use bobsim_types::value::Value;
use indexmap::IndexMap;
use petgraph::graph::{Graph, NodeIndex};
use petgraph::Directed;

/// Mathis-equation constant used by `DelayModel::TcpMathis`. The scenario
/// schema only exposes RTT/loss/MSS (§6); the spec's formula names a `C`
/// but does not pin its value, so this follows the commonly cited
/// approximation `C ≈ 1.22` (the `sqrt(3/2)` factor in the full Mathis
/// throughput equation) rather than inventing a configurable knob nothing
/// in the scenario schema asks for.
const MATHIS_C: f64 = 1.22;

pub struct RuntimeLink {
    pub id: LinkId,
    pub src: NodeId,
    pub dst: NodeId,
    pub predicate: CompiledPredicate,
    pub delay: DelayModel,
    pub dispatched: u64,
    pub dropped: u64,
}

impl RuntimeLink {
    /// Computes this link's delivery delay for `message`, reading a
    /// `size_mbits` payload field (§3's documented convention) for the
    /// size-dependent models; absent size is treated as zero extra delay
    /// beyond any fixed overhead.
    pub fn delay_for(&self, message: &bobsim_types::message::Message) -> SimTime {
        let size_mbits = message.get("size_mbits").and_then(Value::as_f64).unwrap_or(0.0);
        match self.delay {
            DelayModel::Const { delay } => delay,
            DelayModel::SizeRate { bytes_per_sec, fixed_overhead } => {
                let bytes = size_mbits * 1_000_000.0 / 8.0;
                let secs = if bytes_per_sec > 0.0 { bytes / bytes_per_sec } else { 0.0 };
                fixed_overhead + sim_from_secs(secs.max(0.0) as u64)
            }
            DelayModel::TcpMathis { rtt_ms, loss_rate, mss_bytes } => {
                let bytes = size_mbits * 1_000_000.0 / 8.0;
                let rtt_secs = rtt_ms / 1_000.0;
                let p = loss_rate.max(f64::MIN_POSITIVE);
                let secs = if mss_bytes > 0.0 {
                    bytes * rtt_secs * p.sqrt() / (mss_bytes * MATHIS_C)
                } else {
                    0.0
                };
                sim_from_secs(secs.max(0.0) as u64)
            }
        }
    }
}

pub struct Network {
    pub graph: Graph<(), LinkId, Directed>,
    pub node_names: IndexMap<String, NodeId>,
    pub node_behaviors: Vec<String>,
    pub meta_nodes: Vec<Option<MetaNode>>,
    pub links: Vec<RuntimeLink>,
    pub outgoing: Vec<Vec<LinkId>>,
    node_indices: Vec<NodeIndex>,
}

impl Network {
    pub fn node_name(&self, id: NodeId) -> &str {
        self.node_names.get_index(id as usize).map(|(name, _)| name.as_str()).unwrap_or("?")
    }

    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.node_names.get(name).copied()
    }

    pub fn node_count(&self) -> usize {
        self.node_names.len()
    }

    pub fn has_incoming(&self, id: NodeId) -> bool {
        self.graph.neighbors_directed(self.node_indices[id as usize], petgraph::Direction::Incoming).next().is_some()
    }

    /// Resolves a validated scenario into a runnable graph. `Scenario::validate`
    /// must have already been called; this additionally compiles every
    /// link's predicate, surfacing `PredicateError` through `LoadError` on a
    /// malformed `when` string (§7's "fatal at load" policy).
    pub fn from_scenario(scenario: &Scenario) -> Result<Self, LoadError> {
        let mut graph: Graph<(), LinkId, Directed> = Graph::new();
        let mut node_names = IndexMap::new();
        let mut node_behaviors = Vec::new();
        let mut meta_nodes = Vec::new();
        let mut node_indices = Vec::new();

        for (i, node) in scenario.nodes.iter().enumerate() {
            let idx = graph.add_node(());
            node_indices.push(idx);
            node_names.insert(node.name.clone(), i as NodeId);
            node_behaviors.push(node.behavior.clone());
            meta_nodes.push(match &node.position {
                None => None,
                Some(PositionSpec::Geopoint { lat_deg, lon_deg, alt_m }) => {
                    Some(MetaNode::geopoint(*lat_deg, *lon_deg, *alt_m))
                }
                Some(PositionSpec::Orbital { tle_line1, tle_line2 }) => {
                    Some(MetaNode::orbital(tle_line1, tle_line2).map_err(|e| LoadError::Parse {
                        path: node.name.clone(),
                        format: "TLE",
                        source: Box::new(e),
                    })?)
                }
            });
        }

        let mut links = Vec::new();
        let mut outgoing = vec![Vec::new(); scenario.nodes.len()];
        for (link_id, link) in scenario.links.iter().enumerate() {
            let src = *node_names.get(&link.from).ok_or_else(|| LoadError::UnknownNode(link.from.clone()))?;
            let dst = *node_names.get(&link.to).ok_or_else(|| LoadError::UnknownNode(link.to.clone()))?;
            let predicate = match &link.when {
                None => CompiledPredicate::always(),
                Some(src_str) => compile(src_str)?,
            };
            graph.add_edge(node_indices[src as usize], node_indices[dst as usize], link_id as LinkId);
            outgoing[src as usize].push(link_id as LinkId);
            links.push(RuntimeLink { id: link_id as LinkId, src, dst, predicate, delay: link.delay, dispatched: 0, dropped: 0 });
        }

        Ok(Network { graph, node_names, node_behaviors, meta_nodes, links, outgoing, node_indices })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bobsim_types::scenario::{LinkSpec, NodeSpec};
    use chrono::{DateTime, Utc};

    fn scenario(nodes: Vec<NodeSpec>, links: Vec<LinkSpec>) -> Scenario {
        Scenario {
            name: "t".into(),
            seed: None,
            epoch: DateTime::<Utc>::from_timestamp(0, 0).unwrap(),
            end_simtime: None,
            nodes,
            links,
        }
    }

    fn node(name: &str, behavior: &str) -> NodeSpec {
        NodeSpec { name: name.into(), behavior: behavior.into(), config: IndexMap::new(), position: None }
    }

    #[test]
    fn source_node_has_no_incoming_edges() {
        let s = scenario(
            vec![node("src", "source.pulse"), node("sink", "sink")],
            vec![LinkSpec { from: "src".into(), to: "sink".into(), when: None, delay: DelayModel::default() }],
        );
        let net = Network::from_scenario(&s).unwrap();
        let src = net.node_id("src").unwrap();
        let sink = net.node_id("sink").unwrap();
        assert!(!net.has_incoming(src));
        assert!(net.has_incoming(sink));
    }

    #[test]
    fn unknown_link_endpoint_is_load_error() {
        let s = scenario(
            vec![node("a", "sink")],
            vec![LinkSpec { from: "a".into(), to: "ghost".into(), when: None, delay: DelayModel::default() }],
        );
        assert!(Network::from_scenario(&s).is_err());
    }

    #[test]
    fn const_delay_ignores_message_size() {
        let s = scenario(vec![], vec![]);
        let _ = s;
        let link = RuntimeLink {
            id: 0,
            src: 0,
            dst: 1,
            predicate: CompiledPredicate::always(),
            delay: DelayModel::Const { delay: sim_from_secs(5) },
            dispatched: 0,
            dropped: 0,
        };
        let msg = bobsim_types::message::Message::new(1, 0, 0);
        assert_eq!(link.delay_for(&msg), sim_from_secs(5));
    }
}
