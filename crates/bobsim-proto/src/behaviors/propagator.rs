//! Samples an attached meta-node's position over a configured time window
//! and attaches the resulting ephemeris to every outgoing message (S5).
//!
//! The behavior itself only calls `ctx.eci_position_km` -- it knows nothing
//! about geodesy, TLEs, or CZML. It marks its output with `_czml_enabled`
//! when a visualization window is configured; the engine's output writer is
//! the one that turns the marked samples into a `czml/<network>/<node>.czml`
//! file, keeping file I/O out of the behavior layer entirely.

use crate::behavior::{NodeBehavior, StepOutcome};
use crate::config::ConfigReader;
use crate::ctx::NodeCtx;
use bobsim_types::errors::{ConfigError, StepError};
use bobsim_types::message::Message;
use bobsim_types::time::{sim_from_secs, sim_to_secs_f64, SimTime};
use bobsim_types::value::Value;
use indexmap::IndexMap;

pub struct Propagator {
    key: String,
    start_secs: f64,
    end_secs: f64,
    step_secs: f64,
    czml: bool,
}

impl Propagator {
    pub fn from_config(map: &IndexMap<String, toml::Value>) -> Result<Self, ConfigError> {
        let reader = ConfigReader::new("propagator", map);
        let key = reader.optional_str("key", "Propagator_Results")?;
        let start_secs = reader.optional_f64("start_secs", 0.0)?;
        let end_secs = reader.required_f64("end_secs")?;
        let step_secs = reader.optional_f64("step_secs", 30.0)?;
        if step_secs <= 0.0 {
            return Err(ConfigError::OutOfRange { key: "propagator.step_secs".into(), reason: "must be > 0".into() });
        }
        if end_secs < start_secs {
            return Err(ConfigError::OutOfRange { key: "propagator.end_secs".into(), reason: "must be >= start_secs".into() });
        }
        let czml = reader.optional_bool("czml", false)?;
        reader.finish();
        Ok(Propagator { key, start_secs, end_secs, step_secs, czml })
    }

    fn sample_window(&self, ctx: &mut dyn NodeCtx) -> Vec<Value> {
        let mut samples = Vec::new();
        let mut t = self.start_secs;
        loop {
            let at: SimTime = sim_from_secs(t.round() as u64);
            if let Some((x, y, z)) = ctx.eci_position_km(at) {
                samples.push(Value::List(vec![
                    Value::Float(sim_to_secs_f64(at)),
                    Value::Float(x),
                    Value::Float(y),
                    Value::Float(z),
                ]));
            }
            if t >= self.end_secs {
                break;
            }
            t = (t + self.step_secs).min(self.end_secs);
        }
        samples
    }
}

impl NodeBehavior for Propagator {
    fn name(&self) -> &'static str {
        "propagator"
    }

    fn step(&mut self, ctx: &mut dyn NodeCtx, input: Option<&Message>) -> Result<StepOutcome, StepError> {
        let Some(input) = input else {
            return Ok(StepOutcome::idle());
        };
        let samples = self.sample_window(ctx);
        let mut out_msg = input.clone();
        out_msg.payload.insert(self.key.clone(), Value::List(samples));
        if self.czml {
            out_msg.payload.insert("_czml_enabled".into(), Value::Bool(true));
            out_msg.payload.insert("_czml_source_key".into(), Value::Str(self.key.clone()));
        }
        Ok(StepOutcome::idle().with_output(out_msg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bobsim_types::id::NodeId;

    struct FakeCtx;
    impl NodeCtx for FakeCtx {
        fn node_id(&self) -> NodeId {
            0
        }
        fn now(&self) -> SimTime {
            0
        }
        fn rand_f64(&mut self) -> f64 {
            0.0
        }
        fn rand_u64(&mut self) -> u64 {
            0
        }
        fn log_kv(&mut self, _key: &'static str, _value: String) {}
        fn eci_position_km(&mut self, at: SimTime) -> Option<(f64, f64, f64)> {
            let t = sim_to_secs_f64(at);
            Some((6378.137 + t, 0.0, 0.0))
        }
    }

    #[test]
    fn samples_window_at_configured_step() {
        let map: IndexMap<String, toml::Value> = [
            ("end_secs".to_string(), toml::Value::Float(60.0)),
            ("step_secs".to_string(), toml::Value::Float(30.0)),
        ]
        .into_iter()
        .collect();
        let mut behavior = Propagator::from_config(&map).unwrap();
        let mut ctx = FakeCtx;

        let input = Message::new(1, 0, 0);
        let out = behavior.step(&mut ctx, Some(&input)).unwrap();
        assert_eq!(out.outputs.len(), 1);
        let results = out.outputs[0].get("Propagator_Results").unwrap();
        let list = results.as_list().unwrap();
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn czml_flag_marks_output_for_engine_to_render() {
        let map: IndexMap<String, toml::Value> = [
            ("end_secs".to_string(), toml::Value::Float(60.0)),
            ("czml".to_string(), toml::Value::Boolean(true)),
        ]
        .into_iter()
        .collect();
        let mut behavior = Propagator::from_config(&map).unwrap();
        let mut ctx = FakeCtx;

        let input = Message::new(1, 0, 0);
        let out = behavior.step(&mut ctx, Some(&input)).unwrap();
        assert_eq!(out.outputs[0].get("_czml_enabled").unwrap().as_bool(), Some(true));
    }

    #[test]
    fn rejects_inverted_window() {
        let map: IndexMap<String, toml::Value> = [
            ("start_secs".to_string(), toml::Value::Float(60.0)),
            ("end_secs".to_string(), toml::Value::Float(0.0)),
        ]
        .into_iter()
        .collect();
        assert!(Propagator::from_config(&map).is_err());
    }
}
