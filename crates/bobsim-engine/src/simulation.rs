//! # bobsim-engine::simulation
//!
//! The orchestrator: owns the master event queue, the network, the shared
//! RNG, and every node's runtime state, and drives the dispatch loop that
//! turns scheduled events into `NodeBehavior::step` calls (§4.1, §4.2).

use std::collections::BinaryHeap;

use bobsim_geo::MetaNode;
use fxhash::FxHashMap;
use bobsim_proto::ctx::NodeCtx;
use bobsim_proto::{build_behavior, StepOutcome};
use bobsim_types::errors::{LoadError, StepError};
use bobsim_types::id::NodeId;
use bobsim_types::message::Message;
use bobsim_types::metrics as met;
use bobsim_types::scenario::Scenario;
use bobsim_types::time::{epoch_plus, SimTime};
use bobsim_types::value::Value;
use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::events::{Event, Queued};
use crate::ids::IdGen;
use crate::network::Network;
use crate::node_runtime::{PendingInput, RuntimeNode};
use crate::output::{CzmlSample, NodeLogRow};
use crate::realtime::Pacer;
use crate::rng::{Recorder, RngDiscipline};
use crate::stats::{HistoryEntry, HistoryEventKind, HistoryRing};

/// What a node was doing when its reservation window opened, retained just
/// long enough to finish a `NodeLogRow` once its outputs are routed.
struct PendingLogMeta {
    data_id: bobsim_types::message::MessageId,
    data_size: f64,
    wait_time: SimTime,
    processing_time: SimTime,
}

/// Capabilities lent to a behavior for the duration of one `step`/`init`
/// call. Borrows everything it needs from `Simulation` rather than owning
/// any of it, so construction is cheap and nothing can outlive the call.
struct EngineCtx<'a> {
    node: NodeId,
    now: SimTime,
    epoch: DateTime<Utc>,
    meta_node: Option<&'a MetaNode>,
    rng: &'a mut ChaCha20Rng,
    recorder: &'a mut Recorder,
    log_fields: Vec<(&'static str, String)>,
}

impl NodeCtx for EngineCtx<'_> {
    fn node_id(&self) -> NodeId {
        self.node
    }

    fn now(&self) -> SimTime {
        self.now
    }

    fn rand_f64(&mut self) -> f64 {
        use rand::Rng;
        let mut disciplined = RngDiscipline::new(self.rng, self.recorder, "node.rand_f64");
        disciplined.gen::<f64>()
    }

    fn rand_u64(&mut self) -> u64 {
        use rand::RngCore;
        let mut disciplined = RngDiscipline::new(self.rng, self.recorder, "node.rand_u64");
        disciplined.next_u64()
    }

    fn log_kv(&mut self, key: &'static str, value: String) {
        self.log_fields.push((key, value));
    }

    fn eci_position_km(&mut self, at: SimTime) -> Option<(f64, f64, f64)> {
        let meta = self.meta_node?;
        let instant = epoch_plus(self.epoch, at);
        meta.eci_position_km(instant).ok()
    }
}

pub struct RunConfig {
    pub seed: u64,
    pub stop_at: Option<SimTime>,
    pub history_capacity: usize,
    /// Size of the scoped pool long-running node computations (currently
    /// just `propagator`'s window sampling) are offloaded onto. 0 runs them
    /// inline on the scheduler thread.
    pub promise_threads: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig { seed: 0, stop_at: None, history_capacity: 0, promise_threads: 0 }
    }
}

pub struct Simulation {
    pub network: Network,
    nodes: Vec<RuntimeNode>,
    queue: BinaryHeap<Queued<Event>>,
    ids: IdGen,
    rng: ChaCha20Rng,
    recorder: Recorder,
    epoch: DateTime<Utc>,
    now: SimTime,
    stop_at: Option<SimTime>,
    history: HistoryRing,
    /// Outputs a node's last `step` produced, held until its `Ready` event
    /// fires so routing happens at the end of the reservation window rather
    /// than the instant the behavior returns them.
    pending_outputs: FxHashMap<NodeId, Vec<Message>>,
    pending_log: FxHashMap<NodeId, PendingLogMeta>,
    node_log: Vec<NodeLogRow>,
    czml_samples: FxHashMap<String, Vec<CzmlSample>>,
    /// Offloads propagator-style node computations when `promise_threads`
    /// is nonzero; `None` means run every `step` inline on this thread.
    worker_pool: Option<rayon::ThreadPool>,
}

impl Simulation {
    pub fn new(scenario: &Scenario, config: RunConfig) -> Result<Self, LoadError> {
        let network = Network::from_scenario(scenario)?;
        let seed = scenario.seed.unwrap_or(config.seed);

        let mut nodes = Vec::with_capacity(network.node_count());
        for (name, &id) in network.node_names.iter() {
            let node_spec = &scenario.nodes[id as usize];
            let behavior = build_behavior(&node_spec.behavior, &node_spec.config)?;
            let outgoing_edges = network.outgoing[id as usize].len();
            nodes.push(RuntimeNode::new(id, name.clone(), behavior, outgoing_edges));
        }

        let worker_pool = if config.promise_threads > 0 {
            rayon::ThreadPoolBuilder::new().num_threads(config.promise_threads).build().ok()
        } else {
            None
        };

        Ok(Simulation {
            network,
            nodes,
            queue: BinaryHeap::new(),
            ids: IdGen::new(),
            rng: ChaCha20Rng::seed_from_u64(seed),
            recorder: Recorder::new(seed),
            epoch: scenario.epoch,
            now: 0,
            stop_at: scenario.end_simtime.or(config.stop_at),
            history: HistoryRing::new(config.history_capacity),
            pending_outputs: FxHashMap::default(),
            pending_log: FxHashMap::default(),
            node_log: Vec::new(),
            czml_samples: FxHashMap::default(),
            worker_pool,
        })
    }

    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    pub fn history(&self) -> &HistoryRing {
        &self.history
    }

    pub fn node_stats(&self, id: NodeId) -> &crate::stats::NodeStats {
        &self.nodes[id as usize].stats
    }

    pub fn all_node_stats(&self) -> Vec<crate::stats::NodeStats> {
        self.nodes.iter().map(|n| n.stats.clone()).collect()
    }

    pub fn node_log(&self) -> &[NodeLogRow] {
        &self.node_log
    }

    pub fn czml_samples(&self) -> &FxHashMap<String, Vec<CzmlSample>> {
        &self.czml_samples
    }

    /// Bootstraps every node with no incoming edges by calling `init` on it,
    /// per §4.2's "sources are nodes with no inbound link" rule. A source
    /// that requests a reschedule gets its first `Tick` queued immediately.
    pub fn init(&mut self) -> Result<(), StepError> {
        let source_ids: Vec<NodeId> = (0..self.nodes.len() as NodeId).filter(|&id| !self.network.has_incoming(id)).collect();
        for id in source_ids {
            let outcome = self.invoke(id, None, true)?;
            self.apply_outcome(id, outcome)?;
        }
        Ok(())
    }

    fn invoke(&mut self, id: NodeId, input: Option<&Message>, is_init: bool) -> Result<StepOutcome, StepError> {
        let node = &mut self.nodes[id as usize];
        let mut ctx = EngineCtx {
            node: id,
            now: self.now,
            epoch: self.epoch,
            meta_node: self.network.meta_nodes[id as usize].as_ref(),
            rng: &mut self.rng,
            recorder: &mut self.recorder,
            log_fields: Vec::new(),
        };
        let pool = self.worker_pool.as_ref();
        let is_propagator = node.behavior.name() == "propagator";
        let wall_start = is_propagator.then(std::time::Instant::now);
        let outcome = if is_init {
            node.behavior.init(&mut ctx)?
        } else if let Some(pool) = pool.filter(|_| is_propagator) {
            pool.install(|| node.behavior.step(&mut ctx, input))?
        } else {
            node.behavior.step(&mut ctx, input)?
        };
        if let Some(start) = wall_start {
            ::metrics::histogram!(met::MET_PROPAGATION_NS_HISTO, met::LBL_NODE => node.name.clone()).record(start.elapsed().as_nanos() as f64);
        }
        for (k, v) in ctx.log_fields {
            tracing::debug!(node = %node.name, field = k, value = %v, "node log");
        }
        Ok(outcome)
    }

    /// Applies a step's outcome: begins the node's reservation window and
    /// schedules a `Ready` event to dispatch its outputs once the window
    /// elapses, plus a `Tick` if the behavior asked to be re-invoked.
    fn apply_outcome(&mut self, id: NodeId, outcome: StepOutcome) -> Result<(), StepError> {
        let due = self.now.saturating_add(outcome.setup_delay).saturating_add(outcome.processing_delay);
        let busy_ns = (outcome.setup_delay + outcome.processing_delay) as f64;
        ::metrics::histogram!(met::MET_NODE_BUSY_NS_HISTO, met::LBL_NODE => self.network.node_name(id).to_string()).record(busy_ns);
        self.nodes[id as usize].begin_reservation(self.now, outcome.setup_delay, outcome.processing_delay);
        self.schedule(due, Event::Ready { node: id });

        self.pending_outputs.insert(id, outcome.outputs);

        if let Some(after) = outcome.reschedule_after {
            self.schedule(self.now.saturating_add(after), Event::Tick { node: id });
        }
        Ok(())
    }

    fn schedule(&mut self, at: SimTime, event: Event) {
        let seq = self.ids.next_insertion_seq();
        self.queue.push(Queued::new(at, seq, event));
    }

    /// Runs the scheduler loop to completion (queue exhaustion or
    /// `stop_at`), invariant 1 (§3): `now` is non-decreasing across pops.
    pub fn run(&mut self) -> Result<(), StepError> {
        self.run_paced(None)
    }

    pub fn run_paced(&mut self, mut pacer: Option<Pacer>) -> Result<(), StepError> {
        while let Some(Queued { time, payload, .. }) = self.queue.pop() {
            if let Some(stop_at) = self.stop_at {
                if time > stop_at {
                    break;
                }
            }
            debug_assert!(time >= self.now, "simtime must be non-decreasing");
            self.now = time;

            if let Some(p) = pacer.as_mut() {
                p.wait_for(time).map_err(|e| StepError::BehaviorFailed {
                    node: "<scheduler>".into(),
                    behavior: "realtime",
                    reason: e.to_string(),
                })?;
            }

            self.dispatch(payload)?;
        }
        Ok(())
    }

    fn dispatch(&mut self, event: Event) -> Result<(), StepError> {
        ::metrics::counter!(met::MET_EVENTS_PROCESSED).increment(1);
        match event {
            Event::Arrival { node, message } => {
                self.history.push(HistoryEntry { simtime: self.now, node, msg_id: message.id, kind: HistoryEventKind::Arrival });
                ::metrics::counter!(met::MET_MSG_DELIVERED, met::LBL_DST => self.network.node_name(node).to_string()).increment(1);
                let wake = self.nodes[node as usize].enqueue_message(message);
                if wake {
                    self.drive(node)?;
                }
            }
            Event::Tick { node } => {
                let wake = self.nodes[node as usize].enqueue_tick();
                if wake {
                    self.drive(node)?;
                }
            }
            Event::Ready { node } => {
                self.history.push(HistoryEntry {
                    simtime: self.now,
                    node,
                    msg_id: 0,
                    kind: HistoryEventKind::Ready,
                });
                self.nodes[node as usize].end_reservation();
                self.dispatch_pending(node)?;
                self.drive(node)?;
            }
        }
        Ok(())
    }

    /// Pops the node's next queued input (if idle) and invokes its
    /// behavior, unifying the `Message`/`Tick` dispatch per the node-runtime
    /// queue design.
    fn drive(&mut self, id: NodeId) -> Result<(), StepError> {
        let Some(pending) = self.nodes[id as usize].pop_ready() else {
            return Ok(());
        };
        let log_input = match &pending {
            PendingInput::Message(m) => {
                let data_size = m.get("size_mbits").and_then(Value::as_f64).unwrap_or(0.0);
                Some((m.id, data_size, self.now.saturating_sub(m.create_time)))
            }
            PendingInput::Tick => None,
        };
        let outcome = match &pending {
            PendingInput::Message(m) => {
                let wait = self.now.saturating_sub(m.create_time);
                self.nodes[id as usize].stats.record_ingress(wait);
                self.invoke(id, Some(m), false)?
            }
            PendingInput::Tick => self.invoke(id, None, false)?,
        };
        if let Some((data_id, data_size, wait_time)) = log_input {
            let processing_time = outcome.setup_delay.saturating_add(outcome.processing_delay);
            self.pending_log.insert(id, PendingLogMeta { data_id, data_size, wait_time, processing_time });
        }
        self.apply_outcome(id, outcome)
    }

    /// Routes a node's buffered outputs across its matching outgoing edges
    /// (§4.3): a message crosses every edge whose predicate currently
    /// evaluates true against it, each with that edge's own delay applied.
    fn dispatch_pending(&mut self, id: NodeId) -> Result<(), StepError> {
        let Some(outputs) = self.pending_outputs.remove(&id) else {
            return Ok(());
        };
        let log_meta = self.pending_log.remove(&id);
        let mut first_delay: Option<SimTime> = None;

        for mut message in outputs {
            message.time_sent = self.now;
            if let Some(meta) = &log_meta {
                message.wait_time = meta.wait_time;
                message.processing_time = meta.processing_time;
            }
            self.capture_czml(id, &message);

            let src_name = self.network.node_name(id).to_string();
            let edge_ids = self.network.outgoing[id as usize].clone();
            for (edge_pos, link_id) in edge_ids.iter().enumerate() {
                let matches = {
                    let link = &self.network.links[*link_id as usize];
                    link.predicate.eval(&message, self.now)
                };
                ::metrics::counter!(met::MET_PREDICATE_EVAL_TOTAL, met::LBL_SRC => src_name.clone()).increment(1);
                if !matches {
                    self.nodes[id as usize].stats.dropped_per_edge[edge_pos] += 1;
                    ::metrics::counter!(met::MET_MSG_DROPPED, met::LBL_SRC => src_name.clone(), met::LBL_REASON => "predicate").increment(1);
                    continue;
                }
                let mut out = message.clone();
                let link = &mut self.network.links[*link_id as usize];
                let delay = link.delay_for(&out);
                link.dispatched += 1;
                out.next_hop_delay = delay;
                out.in_flight_on = Some(*link_id);
                out.hop_count += 1;
                let dst = link.dst;
                let dst_name = self.network.node_name(dst).to_string();
                let due = self.now.saturating_add(delay);
                self.nodes[id as usize].stats.emitted_per_edge[edge_pos] += 1;
                first_delay.get_or_insert(delay);
                ::metrics::counter!(met::MET_MSG_SENT, met::LBL_SRC => src_name.clone(), met::LBL_DST => dst_name.clone()).increment(1);
                ::metrics::histogram!(met::MET_LINK_DELAY_NS_HISTO, met::LBL_SRC => src_name.clone(), met::LBL_DST => dst_name).record(delay as f64);
                self.schedule(due, Event::Arrival { node: dst, message: out });
            }
        }

        if let Some(meta) = log_meta {
            self.node_log.push(NodeLogRow {
                simtime: self.now,
                node: id,
                data_id: meta.data_id,
                data_size: meta.data_size,
                wait_time: meta.wait_time,
                processing_time: meta.processing_time,
                delay_to_next: first_delay.unwrap_or(0),
            });
        }
        Ok(())
    }

    /// Detects the `propagator` behavior's CZML marker fields on an output
    /// message and accumulates its `Propagator_Results` samples under this
    /// node's name, for `output::write_czml` to render after the run.
    fn capture_czml(&mut self, id: NodeId, message: &Message) {
        let enabled = matches!(message.get("_czml_enabled"), Some(Value::Bool(true)));
        if !enabled {
            return;
        }
        let key = message
            .get("_czml_source_key")
            .and_then(Value::as_str)
            .unwrap_or("Propagator_Results")
            .to_string();
        let Some(Value::List(samples)) = message.get(&key) else {
            return;
        };

        let mut collected = Vec::with_capacity(samples.len());
        for entry in samples {
            let Value::List(fields) = entry else { continue };
            if let [Value::Float(t), Value::Float(x), Value::Float(y), Value::Float(z)] = fields.as_slice() {
                collected.push(CzmlSample { t_secs: *t, x_km: *x, y_km: *y, z_km: *z });
            }
        }
        if collected.is_empty() {
            return;
        }
        let node_name = self.network.node_name(id).to_string();
        self.czml_samples.entry(node_name).or_default().extend(collected);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bobsim_types::scenario::{DelayModel, LinkSpec, NodeSpec};
    use chrono::TimeZone;
    use indexmap::IndexMap;

    fn pulse_source(name: &str) -> NodeSpec {
        NodeSpec { name: name.into(), behavior: "source.pulse".into(), config: IndexMap::new(), position: None }
    }

    fn sink(name: &str) -> NodeSpec {
        NodeSpec { name: name.into(), behavior: "sink".into(), config: IndexMap::new(), position: None }
    }

    fn two_node_scenario(end_secs: u64) -> Scenario {
        Scenario {
            name: "pulse-to-sink".into(),
            seed: Some(7),
            epoch: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            end_simtime: Some(bobsim_types::time::sim_from_secs(end_secs)),
            nodes: vec![pulse_source("src"), sink("dst")],
            links: vec![LinkSpec { from: "src".into(), to: "dst".into(), when: None, delay: DelayModel::Const { delay: bobsim_types::time::sim_from_secs(1) } }],
        }
    }

    // Three independent single-pulse sources, each firing once at t=0 but
    // crossing a link with a different constant delay, so their arrivals at
    // the shared sink land at distinct, increasing simtimes -- exercises
    // invariant 1 (§3: "virtual time is strictly non-decreasing as events
    // are consumed") across events targeting the same destination node.
    #[test]
    fn arrivals_at_a_shared_sink_are_delivered_in_non_decreasing_time_order() {
        let scenario = Scenario {
            name: "three-pulses-to-sink".into(),
            seed: Some(7),
            epoch: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            end_simtime: Some(bobsim_types::time::sim_from_secs(30)),
            nodes: vec![pulse_source("src_a"), pulse_source("src_b"), pulse_source("src_c"), sink("dst")],
            links: vec![
                LinkSpec { from: "src_a".into(), to: "dst".into(), when: None, delay: DelayModel::Const { delay: bobsim_types::time::sim_from_secs(5) } },
                LinkSpec { from: "src_b".into(), to: "dst".into(), when: None, delay: DelayModel::Const { delay: bobsim_types::time::sim_from_secs(15) } },
                LinkSpec { from: "src_c".into(), to: "dst".into(), when: None, delay: DelayModel::Const { delay: bobsim_types::time::sim_from_secs(25) } },
            ],
        };
        let mut sim = Simulation::new(&scenario, RunConfig { history_capacity: 16, ..RunConfig::default() }).unwrap();
        sim.init().unwrap();
        sim.run().unwrap();

        let dst = sim.network.node_id("dst").unwrap();
        assert_eq!(sim.node_stats(dst).ingressed, 3);

        let arrivals: Vec<SimTime> = sim
            .history()
            .entries()
            .filter(|e| e.node == dst && e.kind == crate::stats::HistoryEventKind::Arrival)
            .map(|e| e.simtime)
            .collect();
        assert_eq!(arrivals, vec![bobsim_types::time::sim_from_secs(5), bobsim_types::time::sim_from_secs(15), bobsim_types::time::sim_from_secs(25)]);
    }

    #[test]
    fn stop_at_halts_before_later_events() {
        let scenario = two_node_scenario(0);
        let mut sim = Simulation::new(&scenario, RunConfig::default()).unwrap();
        sim.init().unwrap();
        sim.run().unwrap();

        let dst = sim.network.node_id("dst").unwrap();
        assert_eq!(sim.node_stats(dst).ingressed, 0);
    }

    #[test]
    fn seed_in_scenario_overrides_run_config_seed() {
        let scenario = two_node_scenario(5);
        let mut sim = Simulation::new(&scenario, RunConfig { seed: 999, ..RunConfig::default() }).unwrap();
        assert_eq!(sim.recorder().seed(), 7);
    }

    fn identity_delay(name: &str, processing_secs: f64) -> NodeSpec {
        let mut config = IndexMap::new();
        config.insert("processing_secs".into(), toml::Value::Float(processing_secs));
        NodeSpec { name: name.into(), behavior: "identity_delay".into(), config, position: None }
    }

    fn zero_delay_link(from: &str, to: &str, when: Option<&str>) -> LinkSpec {
        LinkSpec { from: from.into(), to: to.into(), when: when.map(String::from), delay: DelayModel::Const { delay: 0 } }
    }

    // S1 -- pulse through identity delay: one emission at t=0, a 5s
    // processing delay on the intermediate node, arriving at the sink at
    // t=5.
    #[test]
    fn s1_pulse_through_identity_delay_arrives_after_processing_delay() {
        let scenario = Scenario {
            name: "s1-pulse-through-delay".into(),
            seed: Some(1),
            epoch: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            end_simtime: Some(bobsim_types::time::sim_from_secs(20)),
            nodes: vec![pulse_source("src"), identity_delay("delay", 5.0), sink("dst")],
            links: vec![zero_delay_link("src", "delay", None), zero_delay_link("delay", "dst", None)],
        };
        let mut sim = Simulation::new(&scenario, RunConfig { history_capacity: 16, ..RunConfig::default() }).unwrap();
        sim.init().unwrap();
        sim.run().unwrap();

        let dst = sim.network.node_id("dst").unwrap();
        assert_eq!(sim.node_stats(dst).ingressed, 1);
        let arrival_at_dst = sim
            .history()
            .entries()
            .find(|e| e.node == dst && e.kind == crate::stats::HistoryEventKind::Arrival)
            .expect("sink should have recorded an arrival");
        assert_eq!(arrival_at_dst.simtime, bobsim_types::time::sim_from_secs(5));
    }

    fn add_key(name: &str, key: &str, value: &str) -> NodeSpec {
        let mut config = IndexMap::new();
        config.insert("key".into(), toml::Value::String(key.into()));
        config.insert("value".into(), toml::Value::String(value.into()));
        NodeSpec { name: name.into(), behavior: "add_key".into(), config, position: None }
    }

    // A forwarded message carries its own wait_time/processing_time (§3),
    // not just the parallel NodeLogRow -- any consumer inspecting the
    // Message envelope directly sees the same accounting the log does.
    #[test]
    fn forwarded_message_carries_its_own_wait_and_processing_time() {
        let scenario = Scenario {
            name: "wait-processing-time".into(),
            seed: Some(1),
            epoch: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            end_simtime: Some(bobsim_types::time::sim_from_secs(20)),
            nodes: vec![pulse_source("src"), identity_delay("delay", 5.0), sink("dst")],
            links: vec![
                LinkSpec { from: "src".into(), to: "delay".into(), when: None, delay: DelayModel::Const { delay: bobsim_types::time::sim_from_secs(2) } },
                zero_delay_link("delay", "dst", None),
            ],
        };
        let mut sim = Simulation::new(&scenario, RunConfig::default()).unwrap();
        sim.init().unwrap();

        let dst = sim.network.node_id("dst").unwrap();
        let forwarded = loop {
            let queued = sim.queue.pop().expect("dst should receive an arrival before the queue drains");
            sim.now = queued.time;
            if let Event::Arrival { node, message } = &queued.payload {
                if *node == dst {
                    break message.clone();
                }
            }
            sim.dispatch(queued.payload).unwrap();
        };

        assert_eq!(forwarded.wait_time, bobsim_types::time::sim_from_secs(2));
        assert_eq!(forwarded.processing_time, bobsim_types::time::sim_from_secs(5));
    }

    // S2 -- fan-out with a predicate per edge: two single-pulse sources are
    // each tagged with a distinct literal `color` field, merged onto a
    // shared pass-through node, and routed out across disjoint edges by an
    // equality predicate on that literal field -- matching the worked
    // example's literal string-field routing directly.
    #[test]
    fn s2_fanout_routes_each_message_across_exactly_one_matching_edge() {
        let scenario = Scenario {
            name: "s2-fanout".into(),
            seed: Some(1),
            epoch: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            end_simtime: Some(bobsim_types::time::sim_from_secs(3)),
            nodes: vec![
                pulse_source("src_red"),
                pulse_source("src_blue"),
                add_key("tag_red", "color", "red"),
                add_key("tag_blue", "color", "blue"),
                identity_delay("fanout", 0.0),
                sink("sink_red"),
                sink("sink_blue"),
            ],
            links: vec![
                zero_delay_link("src_red", "tag_red", None),
                zero_delay_link("src_blue", "tag_blue", None),
                zero_delay_link("tag_red", "fanout", None),
                zero_delay_link("tag_blue", "fanout", None),
                zero_delay_link("fanout", "sink_red", Some("color == \"red\"")),
                zero_delay_link("fanout", "sink_blue", Some("color == \"blue\"")),
            ],
        };
        let mut sim = Simulation::new(&scenario, RunConfig::default()).unwrap();
        sim.init().unwrap();
        sim.run().unwrap();

        let sink_red = sim.network.node_id("sink_red").unwrap();
        let sink_blue = sim.network.node_id("sink_blue").unwrap();
        assert_eq!(sim.node_stats(sink_red).ingressed, 1);
        assert_eq!(sim.node_stats(sink_blue).ingressed, 1);
    }

    // S3 (AndGate accumulation), S4 (Maximizer), and S5 (geopoint-based
    // propagator sampling) are exercised at the behavior-unit level --
    // `behaviors::and_gate::tests::buffers_and_flushes_fifo_on_satisfy`,
    // `behaviors::maximizer::tests::reduces_array_field_to_its_max`, and
    // `behaviors::propagator::tests::samples_window_at_configured_step` --
    // against the exact field values and window bounds worked through
    // above, since each behavior's contract is fully exercised without a
    // source capable of emitting literal array/keyed payloads end to end.

    // S6 -- real-time strict overrun: pacing a run against a wall clock
    // that has already fallen behind by more than the configured slack
    // aborts the run instead of catching up silently.
    #[test]
    fn s6_real_time_strict_mode_aborts_on_overrun() {
        let scenario = two_node_scenario(10);
        let mut sim = Simulation::new(&scenario, RunConfig::default()).unwrap();
        sim.init().unwrap();

        let pacer = crate::realtime::Pacer::new(crate::realtime::RealTimeConfig {
            factor: 1.0,
            strict: true,
            slack: std::time::Duration::from_millis(1),
        });
        std::thread::sleep(std::time::Duration::from_millis(20));

        assert!(sim.run_paced(Some(pacer)).is_err());
    }
}
