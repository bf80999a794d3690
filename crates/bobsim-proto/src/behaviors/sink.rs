//! Terminal node: consumes every inbound message and produces no output.
//! Exists so scenarios can route traffic to a dead end deliberately rather
//! than the engine having to special-case nodes with no outgoing links.

use crate::behavior::{NodeBehavior, StepOutcome};
use crate::config::ConfigReader;
use crate::ctx::NodeCtx;
use bobsim_types::errors::{ConfigError, StepError};
use bobsim_types::message::Message;
use indexmap::IndexMap;

pub struct Sink {
    received: u64,
    log_arrivals: bool,
}

impl Sink {
    pub fn from_config(map: &IndexMap<String, toml::Value>) -> Result<Self, ConfigError> {
        let reader = ConfigReader::new("sink", map);
        let log_arrivals = reader.optional_bool("log_arrivals", false)?;
        reader.finish();
        Ok(Sink { received: 0, log_arrivals })
    }
}

impl NodeBehavior for Sink {
    fn name(&self) -> &'static str {
        "sink"
    }

    fn step(&mut self, ctx: &mut dyn NodeCtx, input: Option<&Message>) -> Result<StepOutcome, StepError> {
        let Some(input) = input else {
            return Ok(StepOutcome::idle());
        };
        self.received += 1;
        if self.log_arrivals {
            tracing::debug!(node = ctx.node_id(), msg_id = input.id, total = self.received, "sink received message");
        }
        ctx.log_kv("received", self.received.to_string());
        Ok(StepOutcome::idle())
    }
}
