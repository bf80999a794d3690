//! # bobsim-cli::args
//!
//! The command-line argument structure (§6).

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(long, global = true, default_value = "human")]
    pub log: LogFormat,

    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a simulation from a scenario file.
    Run(RunOpts),
    /// Validate a scenario file without running it.
    Validate {
        #[arg(value_name = "SCENARIO_PATH")]
        scenario: PathBuf,
    },
    /// List every node behavior compiled into this binary.
    ListBehaviors,
}

#[derive(Args, Debug)]
pub struct RunOpts {
    /// Path to the scenario file (YAML or TOML, selected by extension).
    #[arg(short, long)]
    pub scenario: PathBuf,

    /// Overrides the RNG seed the scenario file specifies.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Overrides the scenario's end_simtime, in seconds. Defaults to the
    /// scenario's own value, or 9001 if that is also unset.
    #[arg(long)]
    pub stop_at_secs: Option<u64>,

    /// Overrides the scenario's epoch (ISO-8601 UTC); defaults to the
    /// scenario's own `epoch` field.
    #[arg(long)]
    pub epoch: Option<DateTime<Utc>>,

    /// Label used for the `./Results/<network_name><start_iso>` directory;
    /// defaults to the scenario's own `name`.
    #[arg(long)]
    pub network_name: Option<String>,

    /// Paces dispatch against wall-clock instead of running at full speed.
    #[arg(long)]
    pub real_time: bool,

    /// Aborts the run if real-time pacing falls behind by more than the
    /// slack budget, instead of warning and continuing.
    #[arg(long)]
    pub real_time_strict: bool,

    /// Wall-clock seconds per simulated second under `--real-time`.
    #[arg(long, default_value_t = 1.0)]
    pub real_time_factor: f64,

    /// Writes per-event progress to the terminal as the run proceeds.
    #[arg(long)]
    pub write_to_terminal: bool,

    /// Writes `node_stats.txt`/`node_stats_total.txt` after the run.
    #[arg(long)]
    pub node_stats: bool,

    /// Enables the bounded message-history ring backing
    /// `msg_history.txt`/`.csv`; implies `--node-stats`.
    #[arg(long)]
    pub node_stats_history: bool,

    /// Capacity of the message-history ring when `--node-stats-history` is set.
    #[arg(long, default_value_t = 10_000)]
    pub history_capacity: usize,

    /// Writes `initial_node_state.txt` with each node's state right after
    /// `init()`, before the first event is dispatched.
    #[arg(long)]
    pub initial_node_states: bool,

    /// Writes `sim_end_state.txt` with each node's final state.
    #[arg(long)]
    pub final_node_states: bool,

    /// Size of the `rayon` scoped pool used to offload long-running node
    /// computations (e.g. orbit propagation over large windows). 0 disables
    /// the pool and runs those computations inline.
    #[arg(long, default_value_t = 0)]
    pub promise_threads: usize,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Human,
    Json,
}
