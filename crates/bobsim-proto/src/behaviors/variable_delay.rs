//! Forwards every inbound message unchanged, like `identity_delay`, but
//! draws its processing delay from a distribution each time rather than
//! using a fixed constant -- useful for modeling variable-latency relays
//! without reaching for a link-level delay model. Sampling goes through
//! `rand_distr` so the distribution shapes match the statistics module's
//! own sampling rather than a hand-rolled approximation.

use crate::behavior::{NodeBehavior, StepOutcome};
use crate::config::ConfigReader;
use crate::ctx::NodeCtx;
use crate::ctx_rng::CtxRng;
use bobsim_types::errors::{ConfigError, StepError};
use bobsim_types::message::Message;
use bobsim_types::time::{sim_from_secs, SimTime};
use indexmap::IndexMap;
use rand_distr::{Distribution, Normal, Uniform};

#[derive(Clone, Copy)]
enum DelayDist {
    Uniform { lo_secs: f64, hi_secs: f64 },
    Normal { mean_secs: f64, stddev_secs: f64 },
}

pub struct VariableDelay {
    dist: DelayDist,
}

impl VariableDelay {
    pub fn from_config(map: &IndexMap<String, toml::Value>) -> Result<Self, ConfigError> {
        let reader = ConfigReader::new("variable_delay", map);
        let model = reader.optional_str("model", "uniform")?;
        let dist = match model.as_str() {
            "uniform" => {
                let lo_secs = reader.optional_f64("lo_secs", 0.0)?;
                let hi_secs = reader.required_f64("hi_secs")?;
                if hi_secs < lo_secs {
                    return Err(ConfigError::OutOfRange {
                        key: "variable_delay.hi_secs".into(),
                        reason: "must be >= lo_secs".into(),
                    });
                }
                DelayDist::Uniform { lo_secs, hi_secs }
            }
            "normal" => {
                let mean_secs = reader.required_f64("mean_secs")?;
                let stddev_secs = reader.optional_f64("stddev_secs", 0.0)?;
                DelayDist::Normal { mean_secs, stddev_secs }
            }
            other => {
                return Err(ConfigError::OutOfRange {
                    key: "variable_delay.model".into(),
                    reason: format!("unknown distribution `{other}`, expected uniform or normal"),
                })
            }
        };
        reader.finish();
        Ok(VariableDelay { dist })
    }

    fn sample_delay_secs(&self, ctx: &mut dyn NodeCtx) -> f64 {
        let mut rng = CtxRng::new(ctx);
        match self.dist {
            DelayDist::Uniform { lo_secs, hi_secs } => {
                if hi_secs <= lo_secs {
                    lo_secs
                } else {
                    Uniform::new_inclusive(lo_secs, hi_secs).sample(&mut rng)
                }
            }
            DelayDist::Normal { mean_secs, stddev_secs } => {
                if stddev_secs <= 0.0 {
                    mean_secs.max(0.0)
                } else {
                    Normal::new(mean_secs, stddev_secs).expect("validated stddev > 0").sample(&mut rng).max(0.0)
                }
            }
        }
    }
}

impl NodeBehavior for VariableDelay {
    fn name(&self) -> &'static str {
        "variable_delay"
    }

    fn step(&mut self, ctx: &mut dyn NodeCtx, input: Option<&Message>) -> Result<StepOutcome, StepError> {
        let Some(input) = input else {
            return Ok(StepOutcome::idle());
        };
        let delay_secs = self.sample_delay_secs(ctx);
        let delay: SimTime = sim_from_secs(delay_secs as u64);
        let mut out = StepOutcome::idle();
        out.processing_delay = delay;
        out.outputs.push(input.clone());
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_distribution() {
        let map: IndexMap<String, toml::Value> = [
            ("model".to_string(), toml::Value::String("gamma".into())),
        ]
        .into_iter()
        .collect();
        assert!(VariableDelay::from_config(&map).is_err());
    }

    #[test]
    fn uniform_requires_hi_at_least_lo() {
        let map: IndexMap<String, toml::Value> = [
            ("model".to_string(), toml::Value::String("uniform".into())),
            ("lo_secs".to_string(), toml::Value::Float(5.0)),
            ("hi_secs".to_string(), toml::Value::Float(1.0)),
        ]
        .into_iter()
        .collect();
        assert!(VariableDelay::from_config(&map).is_err());
    }
}
