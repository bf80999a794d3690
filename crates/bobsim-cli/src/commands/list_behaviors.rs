//! # bobsim-cli::commands::list_behaviors
//!
//! Implements the `list-behaviors` subcommand (renamed from the teacher's
//! `list-protocols` to match this domain's vocabulary).

use anyhow::Result;

pub fn exec() -> Result<()> {
    println!("Available node behaviors:");
    for name in bobsim_proto::BEHAVIOR_NAMES {
        println!("  {name}");
    }
    Ok(())
}
