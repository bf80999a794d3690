//! Forwards every inbound message after a delay that depends on the value
//! of one of its payload fields, looked up in a `delays` table supplied by
//! config. Keys absent from the table fall back to `default_secs`.

use crate::behavior::{NodeBehavior, StepOutcome};
use crate::config::ConfigReader;
use crate::ctx::NodeCtx;
use bobsim_types::errors::{ConfigError, StepError};
use bobsim_types::message::Message;
use bobsim_types::time::{sim_from_secs, SimTime};
use indexmap::IndexMap;
use std::collections::HashMap;

pub struct KeyDelay {
    key_field: String,
    delays: HashMap<String, SimTime>,
    default_delay: SimTime,
}

impl KeyDelay {
    pub fn from_config(map: &IndexMap<String, toml::Value>) -> Result<Self, ConfigError> {
        let reader = ConfigReader::new("key_delay", map);
        let key_field = reader.required_str("key_field")?;
        let default_secs = reader.optional_f64("default_secs", 0.0)?;

        reader.touch("delays");
        let mut delays = HashMap::new();
        if let Some(raw) = map.get("delays") {
            let table = raw.as_table().ok_or_else(|| ConfigError::WrongType {
                key: "key_delay.delays".into(),
                expected: "table",
                found: "non-table",
            })?;
            for (key, value) in table {
                let secs = value
                    .as_float()
                    .or_else(|| value.as_integer().map(|i| i as f64))
                    .ok_or_else(|| ConfigError::WrongType {
                        key: format!("key_delay.delays.{key}"),
                        expected: "number",
                        found: "non-number",
                    })?;
                delays.insert(key.clone(), sim_from_secs(secs.max(0.0) as u64));
            }
        }

        reader.finish();
        Ok(KeyDelay {
            key_field,
            delays,
            default_delay: sim_from_secs(default_secs.max(0.0) as u64),
        })
    }
}

impl NodeBehavior for KeyDelay {
    fn name(&self) -> &'static str {
        "key_delay"
    }

    fn step(&mut self, _ctx: &mut dyn NodeCtx, input: Option<&Message>) -> Result<StepOutcome, StepError> {
        let Some(input) = input else {
            return Ok(StepOutcome::idle());
        };
        let key = input.get(&self.key_field).map(|v| v.to_string());
        let delay = key
            .and_then(|k| self.delays.get(&k).copied())
            .unwrap_or(self.default_delay);

        let mut out = StepOutcome::idle();
        out.processing_delay = delay;
        out.outputs.push(input.clone());
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bobsim_types::value::Value;

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
    fn unknown_key_falls_back_to_default() {
        let map: IndexMap<String, toml::Value> = [
            ("key_field".to_string(), toml::Value::String("priority".into())),
            ("default_secs".to_string(), toml::Value::Float(2.0)),
        ]
        .into_iter()
        .collect();
        let mut behavior = KeyDelay::from_config(&map).unwrap();
        let mut ctx = FakeCtx;

        let msg = Message::new(1, 0, 0).with_field("priority", Value::Str("unseen".into()));
        let out = behavior.step(&mut ctx, Some(&msg)).unwrap();
        assert_eq!(out.processing_delay, sim_from_secs(2));
    }

    #[test]
    fn known_key_uses_table_value() {
        let mut delays_table = toml::map::Map::new();
        delays_table.insert("high".into(), toml::Value::Float(1.0));
        let map: IndexMap<String, toml::Value> = [
            ("key_field".to_string(), toml::Value::String("priority".into())),
            ("delays".to_string(), toml::Value::Table(delays_table)),
        ]
        .into_iter()
        .collect();
        let mut behavior = KeyDelay::from_config(&map).unwrap();
        let mut ctx = FakeCtx;

        let msg = Message::new(1, 0, 0).with_field("priority", Value::Str("high".into()));
        let out = behavior.step(&mut ctx, Some(&msg)).unwrap();
        assert_eq!(out.processing_delay, sim_from_secs(1));
    }
}
