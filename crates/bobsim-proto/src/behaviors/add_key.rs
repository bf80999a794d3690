//! Copies the input payload and sets a single configured field to a
//! configured literal value, forwarding one output per input. The
//! key-value-tagger transform node (§4.2): no internal state, no delay
//! unless one is configured.

use crate::behavior::{NodeBehavior, StepOutcome};
use crate::config::ConfigReader;
use crate::ctx::NodeCtx;
use bobsim_types::errors::{ConfigError, StepError};
use bobsim_types::message::Message;
use bobsim_types::time::{sim_from_secs, SimTime};
use bobsim_types::value::Value;
use indexmap::IndexMap;

pub struct AddKey {
    key: String,
    value: Value,
    processing_delay: SimTime,
}

impl AddKey {
    pub fn from_config(map: &IndexMap<String, toml::Value>) -> Result<Self, ConfigError> {
        let reader = ConfigReader::new("add_key", map);
        let key = reader.required_str("key")?;
        let processing_secs = reader.optional_f64("processing_secs", 0.0)?;

        reader.touch("value");
        let raw = map.get("value").ok_or_else(|| ConfigError::MissingKey("add_key.value".into()))?;
        let value = toml_to_value(raw);

        reader.finish();
        Ok(AddKey { key, value, processing_delay: sim_from_secs(processing_secs.max(0.0) as u64) })
    }
}

fn toml_to_value(raw: &toml::Value) -> Value {
    match raw {
        toml::Value::String(s) => Value::Str(s.clone()),
        toml::Value::Integer(i) => Value::Int(*i),
        toml::Value::Float(f) => Value::Float(*f),
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Datetime(dt) => Value::Str(dt.to_string()),
        toml::Value::Array(items) => Value::List(items.iter().map(toml_to_value).collect()),
        toml::Value::Table(map) => {
            Value::Map(map.iter().map(|(k, v)| (k.clone(), toml_to_value(v))).collect())
        }
    }
}

impl NodeBehavior for AddKey {
    fn name(&self) -> &'static str {
        "add_key"
    }

    fn step(&mut self, _ctx: &mut dyn NodeCtx, input: Option<&Message>) -> Result<StepOutcome, StepError> {
        let Some(input) = input else {
            return Ok(StepOutcome::idle());
        };
        let output = input.clone().with_field(self.key.clone(), self.value.clone());
        let mut out = StepOutcome::idle();
        out.processing_delay = self.processing_delay;
        out.outputs.push(output);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeCtx;
    impl NodeCtx for FakeCtx {
        fn node_id(&self) -> bobsim_types::id::NodeId {
            0
        }
        fn now(&self) -> bobsim_types::time::SimTime {
            0
        }
        fn rand_f64(&mut self) -> f64 {
            0.0
        }
        fn rand_u64(&mut self) -> u64 {
            0
        }
        fn log_kv(&mut self, _key: &'static str, _value: String) {}
        fn eci_position_km(&mut self, _at: bobsim_types::time::SimTime) -> Option<(f64, f64, f64)> {
            None
        }
    }

    #[test]
    fn tags_every_input_with_the_configured_field() {
        let map: IndexMap<String, toml::Value> = [
            ("key".to_string(), toml::Value::String("region".into())),
            ("value".to_string(), toml::Value::String("east".into())),
        ]
        .into_iter()
        .collect();
        let mut behavior = AddKey::from_config(&map).unwrap();
        let mut ctx = FakeCtx;

        let msg = Message::new(1, 0, 0);
        let out = behavior.step(&mut ctx, Some(&msg)).unwrap();
        assert_eq!(out.outputs[0].get("region"), Some(&Value::Str("east".into())));
    }

    #[test]
    fn overwrites_an_existing_field() {
        let map: IndexMap<String, toml::Value> = [
            ("key".to_string(), toml::Value::String("priority".into())),
            ("value".to_string(), toml::Value::Integer(5)),
        ]
        .into_iter()
        .collect();
        let mut behavior = AddKey::from_config(&map).unwrap();
        let mut ctx = FakeCtx;

        let msg = Message::new(1, 0, 0).with_field("priority", Value::Int(1));
        let out = behavior.step(&mut ctx, Some(&msg)).unwrap();
        assert_eq!(out.outputs[0].get("priority"), Some(&Value::Int(5)));
    }
}
