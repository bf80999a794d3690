//! Reduces a configured numeric-array payload field to its maximum element
//! and forwards a single output with that field overwritten by the scalar
//! result. A pure, stateless transform: unlike `key_delay` or `and_gate` it
//! carries no memory across `step` calls.

use crate::behavior::{NodeBehavior, StepOutcome};
use crate::config::ConfigReader;
use crate::ctx::NodeCtx;
use bobsim_types::errors::{ConfigError, StepError};
use bobsim_types::message::Message;
use bobsim_types::value::Value;
use indexmap::IndexMap;

pub struct Maximizer {
    key: String,
}

impl Maximizer {
    pub fn from_config(map: &IndexMap<String, toml::Value>) -> Result<Self, ConfigError> {
        let reader = ConfigReader::new("maximizer", map);
        let key = reader.required_str("key")?;
        reader.finish();
        Ok(Maximizer { key })
    }
}

impl NodeBehavior for Maximizer {
    fn name(&self) -> &'static str {
        "maximizer"
    }

    fn step(&mut self, _ctx: &mut dyn NodeCtx, input: Option<&Message>) -> Result<StepOutcome, StepError> {
        let Some(input) = input else {
            return Ok(StepOutcome::idle());
        };
        let Some(values) = input.get(&self.key).and_then(|v| v.as_list()) else {
            return Ok(StepOutcome::idle());
        };
        let all_ints = values.iter().all(|v| matches!(v, Value::Int(_)));
        let Some(max) = values.iter().filter_map(Value::as_f64).fold(None, |acc, v| {
            Some(acc.map_or(v, |a: f64| a.max(v)))
        }) else {
            return Ok(StepOutcome::idle());
        };
        let max_value = if all_ints { Value::Int(max as i64) } else { Value::Float(max) };

        let output = input.clone().with_field(self.key.clone(), max_value);
        Ok(StepOutcome::idle().with_output(output))
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
    fn reduces_array_field_to_its_max() {
        let map: IndexMap<String, toml::Value> =
            [("key".to_string(), toml::Value::String("values".into()))].into_iter().collect();
        let mut max = Maximizer::from_config(&map).unwrap();
        let mut ctx = FakeCtx;

        let values = vec![3, 1, 4, 1, 5, 9, 2, 6].into_iter().map(Value::Int).collect();
        let msg = Message::new(1, 0, 0).with_field("values", Value::List(values));
        let out = max.step(&mut ctx, Some(&msg)).unwrap();

        assert_eq!(out.outputs.len(), 1);
        assert_eq!(out.outputs[0].get("values"), Some(&Value::Int(9)));
    }

    #[test]
    fn missing_field_drops_silently() {
        let map: IndexMap<String, toml::Value> =
            [("key".to_string(), toml::Value::String("values".into()))].into_iter().collect();
        let mut max = Maximizer::from_config(&map).unwrap();
        let mut ctx = FakeCtx;

        let msg = Message::new(1, 0, 0);
        let out = max.step(&mut ctx, Some(&msg)).unwrap();
        assert!(out.outputs.is_empty());
    }
}
