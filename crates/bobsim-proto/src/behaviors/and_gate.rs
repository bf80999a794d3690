//! Condition gate: tracks a running payload state built by merging every
//! inbound message field-by-field (last write wins) and evaluates a list of
//! predicates against that state on every arrival. While any condition is
//! still false the triggering message is either dropped or buffered,
//! depending on `drop_blocked_messages`; the instant all conditions hold,
//! the buffered messages are flushed (oldest-first if `blocked_messages_fifo`,
//! newest-first otherwise) followed by the message that tipped the gate, and
//! the running state resets so the gate needs fresh input to fire again.

use crate::behavior::{NodeBehavior, StepOutcome};
use crate::config::ConfigReader;
use crate::ctx::NodeCtx;
use bobsim_predicate::{compile, CompiledPredicate};
use bobsim_types::errors::{ConfigError, StepError};
use bobsim_types::message::Message;
use indexmap::IndexMap;
use std::collections::VecDeque;

pub struct AndGate {
    conditions: Vec<CompiledPredicate>,
    drop_blocked_messages: bool,
    blocked_messages_fifo: bool,
    state: Message,
    buffer: VecDeque<Message>,
}

impl AndGate {
    pub fn from_config(map: &IndexMap<String, toml::Value>) -> Result<Self, ConfigError> {
        let reader = ConfigReader::new("and_gate", map);
        let raw_conditions = reader.optional_str_list("conditions")?;
        let conditions = raw_conditions
            .iter()
            .map(|src| {
                compile(src).map_err(|source| ConfigError::InvalidPredicate {
                    key: "and_gate.conditions".into(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let drop_blocked_messages = reader.optional_bool("drop_blocked_messages", true)?;
        let blocked_messages_fifo = reader.optional_bool("blocked_messages_fifo", true)?;
        reader.finish();

        Ok(AndGate {
            conditions,
            drop_blocked_messages,
            blocked_messages_fifo,
            state: Message::new(0, 0, 0),
            buffer: VecDeque::new(),
        })
    }

    fn satisfied(&self, now: bobsim_types::time::SimTime) -> bool {
        self.conditions.iter().all(|c| c.eval(&self.state, now))
    }
}

impl NodeBehavior for AndGate {
    fn name(&self) -> &'static str {
        "and_gate"
    }

    fn step(&mut self, ctx: &mut dyn NodeCtx, input: Option<&Message>) -> Result<StepOutcome, StepError> {
        let Some(input) = input else {
            return Ok(StepOutcome::idle());
        };
        let now = ctx.now();

        for (k, v) in &input.payload {
            self.state.payload.insert(k.clone(), v.clone());
        }

        if !self.satisfied(now) {
            if !self.drop_blocked_messages {
                self.buffer.push_back(input.clone());
            }
            return Ok(StepOutcome::idle());
        }

        let mut out = StepOutcome::idle();
        if self.blocked_messages_fifo {
            out.outputs.extend(self.buffer.drain(..));
        } else {
            while let Some(m) = self.buffer.pop_back() {
                out.outputs.push(m);
            }
        }
        out.outputs.push(input.clone());

        self.buffer.clear();
        self.state = Message::new(0, ctx.node_id(), now);

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bobsim_types::id::NodeId;
    use bobsim_types::value::Value;

    struct FakeCtx {
        node: NodeId,
        now: bobsim_types::time::SimTime,
    }

    impl NodeCtx for FakeCtx {
        fn node_id(&self) -> NodeId {
            self.node
        }
        fn now(&self) -> bobsim_types::time::SimTime {
            self.now
        }
        fn rand_f64(&mut self) -> f64 {
            0.5
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
    fn buffers_and_flushes_fifo_on_satisfy() {
        let map: IndexMap<String, toml::Value> = [
            (
                "conditions".to_string(),
                toml::Value::Array(vec![
                    toml::Value::String("x == 1".into()),
                    toml::Value::String("y == 1".into()),
                ]),
            ),
            ("drop_blocked_messages".to_string(), toml::Value::Boolean(false)),
            ("blocked_messages_fifo".to_string(), toml::Value::Boolean(true)),
        ]
        .into_iter()
        .collect();
        let mut gate = AndGate::from_config(&map).unwrap();
        let mut ctx = FakeCtx { node: 0, now: 1 };

        let m1 = Message::new(1, 9, 1).with_field("x", Value::Int(1));
        let out1 = gate.step(&mut ctx, Some(&m1)).unwrap();
        assert!(out1.outputs.is_empty());

        ctx.now = 2;
        let m2 = Message::new(2, 9, 2).with_field("y", Value::Int(0));
        let out2 = gate.step(&mut ctx, Some(&m2)).unwrap();
        assert!(out2.outputs.is_empty());

        ctx.now = 3;
        let m3 = Message::new(3, 9, 3).with_field("y", Value::Int(1));
        let out3 = gate.step(&mut ctx, Some(&m3)).unwrap();
        assert_eq!(out3.outputs.len(), 3);
        assert_eq!(out3.outputs[0].id, 1);
        assert_eq!(out3.outputs[1].id, 2);
        assert_eq!(out3.outputs[2].id, 3);
    }

    #[test]
    fn no_conditions_is_always_open() {
        let map: IndexMap<String, toml::Value> = IndexMap::new();
        let mut gate = AndGate::from_config(&map).unwrap();
        let mut ctx = FakeCtx { node: 0, now: 0 };

        let m1 = Message::new(1, 9, 0);
        let out = gate.step(&mut ctx, Some(&m1)).unwrap();
        assert_eq!(out.outputs.len(), 1);
    }

    #[test]
    fn drop_blocked_messages_default_discards_until_satisfied() {
        let map: IndexMap<String, toml::Value> = [(
            "conditions".to_string(),
            toml::Value::Array(vec![toml::Value::String("x == 1".into())]),
        )]
        .into_iter()
        .collect();
        let mut gate = AndGate::from_config(&map).unwrap();
        let mut ctx = FakeCtx { node: 0, now: 0 };

        let blocked = Message::new(1, 9, 0).with_field("x", Value::Int(0));
        let out1 = gate.step(&mut ctx, Some(&blocked)).unwrap();
        assert!(out1.outputs.is_empty());

        let satisfying = Message::new(2, 9, 0).with_field("x", Value::Int(1));
        let out2 = gate.step(&mut ctx, Some(&satisfying)).unwrap();
        assert_eq!(out2.outputs.len(), 1);
        assert_eq!(out2.outputs[0].id, 2);
    }
}
