//! # bobsim-cli::commands::validate
//!
//! Implements the `validate` subcommand: load a scenario and resolve it into
//! a network without scheduling anything.

use anyhow::Result;
use bobsim_engine::Network;
use std::path::PathBuf;

use crate::wiring::load_scenario;

pub fn exec(path: PathBuf) -> Result<()> {
    println!("Validating scenario: {}", path.display());
    let scenario = load_scenario(&path)?;
    let network = Network::from_scenario(&scenario)?;

    println!(
        "Scenario '{}' is valid: {} nodes, {} links.",
        scenario.name,
        network.node_count(),
        network.links.len()
    );
    Ok(())
}
