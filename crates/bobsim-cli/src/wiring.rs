//! # bobsim-cli::wiring
//!
//! Loads a scenario file and assembles everything a run needs: the
//! simulation, the real-time pacer (if requested), and the results
//! directory layout.

use anyhow::{Context, Result};
use bobsim_engine::output::results_dir_name;
use bobsim_engine::realtime::{Pacer, RealTimeConfig};
use bobsim_engine::{RunConfig, Simulation};
use bobsim_types::scenario::Scenario;
use bobsim_types::time::sim_from_secs;
use chrono::Utc;
use std::path::{Path, PathBuf};

use crate::args::RunOpts;

/// `end_simtime` used when neither the scenario nor `--stop-at-secs`
/// specify one (§6).
const DEFAULT_END_SIMTIME_SECS: u64 = 9001;

pub fn load_scenario(path: &Path) -> Result<Scenario> {
    bobsim_engine::scenario::load(path).with_context(|| format!("failed to load scenario {}", path.display()))
}

/// Applies CLI overrides (`--epoch`, `--seed`, `--stop-at-secs`) onto a
/// loaded scenario, in place, before the network is built. `Simulation::new`
/// treats a scenario-carried seed/end_simtime as authoritative over
/// `RunConfig`'s defaults, so CLI overrides have to land on the scenario
/// itself rather than on the `RunConfig` passed alongside it.
pub fn apply_overrides(scenario: &mut Scenario, opts: &RunOpts) {
    if let Some(epoch) = opts.epoch {
        scenario.epoch = epoch;
    }
    if let Some(seed) = opts.seed {
        scenario.seed = Some(seed);
    }
    if let Some(stop_at_secs) = opts.stop_at_secs {
        scenario.end_simtime = Some(sim_from_secs(stop_at_secs));
    } else if scenario.end_simtime.is_none() {
        scenario.end_simtime = Some(sim_from_secs(DEFAULT_END_SIMTIME_SECS));
    }
}

pub fn build_simulation(scenario: &Scenario, opts: &RunOpts) -> Result<Simulation> {
    let config = RunConfig {
        history_capacity: if opts.node_stats_history { opts.history_capacity } else { 0 },
        promise_threads: opts.promise_threads,
        ..RunConfig::default()
    };
    Ok(Simulation::new(scenario, config)?)
}

pub fn build_pacer(opts: &RunOpts) -> Option<Pacer> {
    if !opts.real_time {
        return None;
    }
    Some(Pacer::new(RealTimeConfig::new(opts.real_time_factor, opts.real_time_strict)))
}

/// Resolves the `./Results/<network_name><start_iso>` directory for this
/// run and creates it, returning its path.
pub fn prepare_results_dir(opts: &RunOpts, scenario: &Scenario) -> Result<PathBuf> {
    let network_name = opts.network_name.clone().unwrap_or_else(|| scenario.name.clone());
    let dir = PathBuf::from("Results").join(results_dir_name(&network_name, Utc::now()));
    std::fs::create_dir_all(&dir).with_context(|| format!("failed to create results directory {}", dir.display()))?;
    Ok(dir)
}
