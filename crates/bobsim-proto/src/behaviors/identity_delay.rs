//! Forwards every inbound message unchanged after a fixed delay. The
//! simplest possible node behavior, useful as a link-delay stand-in when a
//! scenario wants the delay to live on the node rather than the edge.

use crate::behavior::{NodeBehavior, StepOutcome};
use crate::config::ConfigReader;
use crate::ctx::NodeCtx;
use bobsim_types::errors::{ConfigError, StepError};
use bobsim_types::message::Message;
use bobsim_types::time::{sim_from_secs, SimTime};
use indexmap::IndexMap;

pub struct IdentityDelay {
    setup_delay: SimTime,
    processing_delay: SimTime,
}

impl IdentityDelay {
    pub fn from_config(map: &IndexMap<String, toml::Value>) -> Result<Self, ConfigError> {
        let reader = ConfigReader::new("identity_delay", map);
        let setup_secs = reader.optional_f64("setup_secs", 0.0)?;
        let processing_secs = reader.required_f64("processing_secs")?;
        reader.finish();
        Ok(IdentityDelay {
            setup_delay: sim_from_secs(setup_secs.max(0.0) as u64),
            processing_delay: sim_from_secs(processing_secs.max(0.0) as u64),
        })
    }
}

impl NodeBehavior for IdentityDelay {
    fn name(&self) -> &'static str {
        "identity_delay"
    }

    fn step(&mut self, _ctx: &mut dyn NodeCtx, input: Option<&Message>) -> Result<StepOutcome, StepError> {
        let Some(input) = input else {
            return Ok(StepOutcome::idle());
        };
        let mut out = StepOutcome::idle();
        out.setup_delay = self.setup_delay;
        out.processing_delay = self.processing_delay;
        out.outputs.push(input.clone());
        Ok(out)
    }
}
