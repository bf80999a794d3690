//! # bobsim-cli::commands::run
//!
//! Implements the `run` subcommand: load a scenario, drive the simulation to
//! completion, and persist the results artifacts under
//! `./Results/<network_name><start_iso>` (§6, §7).

use anyhow::Result;
use bobsim_engine::output::{self, CzmlSample};
use std::path::PathBuf;
use std::time::Instant;

use crate::args::{LogFormat, RunOpts};
use crate::logging;
use crate::wiring::{apply_overrides, build_pacer, build_simulation, load_scenario, prepare_results_dir};

pub fn exec(opts: RunOpts, log_format: LogFormat, log_file: Option<PathBuf>) -> Result<()> {
    let mut scenario = load_scenario(&opts.scenario)?;
    apply_overrides(&mut scenario, &opts);
    let results_dir = prepare_results_dir(&opts, &scenario)?;

    // `--log-file` overrides the default location; otherwise `simulation.log`
    // lives inside this run's own results directory (§6).
    let sim_log = log_file.unwrap_or_else(|| results_dir.join("simulation.log"));
    logging::init(log_format, Some(&sim_log));

    tracing::info!(
        scenario = %scenario.name,
        seed = scenario.seed.unwrap_or(0),
        promise_threads = opts.promise_threads,
        results_dir = %results_dir.display(),
        "starting run"
    );

    let mut sim = build_simulation(&scenario, &opts)?;
    let pacer = build_pacer(&opts);

    sim.init()?;

    if opts.initial_node_states {
        output::write_sim_end_state(&results_dir.join("initial_node_state.txt"), &sim.network, sim.now())?;
    }

    let wall_start = Instant::now();
    sim.run_paced(pacer)?;
    let wall_elapsed = wall_start.elapsed();

    tracing::info!(final_simtime = sim.now(), wall_secs = wall_elapsed.as_secs_f64(), "run complete");
    for (site, draws) in sim.recorder().sites() {
        tracing::info!(site = %site, draws, "rng draw site summary");
    }

    output::write_loaded_network(&results_dir.join("loaded_network.json"), &scenario)?;
    output::write_loaded_node_config(&results_dir.join("loaded_node_config.txt"), &scenario)?;
    output::write_node_log(&results_dir.join("node_log.txt"), &sim.network, sim.node_log())?;

    if opts.node_stats || opts.node_stats_history {
        let stats = sim.all_node_stats();
        if opts.node_stats_history {
            output::write_node_stats_total(&results_dir.join("node_stats_total.txt"), &sim.network, &stats, sim.history())?;
            output::write_msg_history_txt(&results_dir.join("msg_history.txt"), &sim.network, sim.history())?;
            output::write_msg_history_csv(&results_dir.join("msg_history.csv"), &sim.network, sim.history())?;
        } else {
            output::write_node_stats(&results_dir.join("node_stats.txt"), &sim.network, &stats)?;
        }
    }

    if opts.final_node_states {
        output::write_sim_end_state(&results_dir.join("sim_end_state.txt"), &sim.network, sim.now())?;
    }

    let czml_dir = results_dir.join("czml").join(&scenario.name);
    for (node_name, samples) in sim.czml_samples() {
        let converted: Vec<CzmlSample> = samples.clone();
        output::write_czml(&czml_dir.join(format!("{node_name}.czml")), node_name, scenario.epoch, &converted)?;
    }

    if opts.write_to_terminal {
        println!("Simulation '{}' finished at simtime {}", scenario.name, sim.now());
        println!("Results written to {}", results_dir.display());
    }

    Ok(())
}
