//! # bobsim-engine::realtime
//!
//! An optional pacing adapter for the scheduler loop (§9.1). Between popping
//! events it sleeps until wall-clock catches up with `epoch + due_simtime /
//! factor`, so an operator can watch a run unfold at (roughly) real speed
//! instead of as fast as the CPU allows. Simtime semantics are unaffected --
//! this only throttles dispatch.

use bobsim_types::errors::RealTimeError;
use bobsim_types::metrics as met;
use bobsim_types::time::{sim_to_secs_f64, SimTime};
use std::time::{Duration, Instant};

/// Threshold past which "strict" mode treats the run as unrecoverably
/// behind. The scenario schema names no default for this, so this follows
/// the 50ms cadence the teacher's own UI snapshot ticking already treats as
/// its natural real-time unit (§9.1 Open Question resolution).
pub const DEFAULT_SLACK: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy)]
pub struct RealTimeConfig {
    pub factor: f64,
    pub strict: bool,
    pub slack: Duration,
}

impl RealTimeConfig {
    pub fn new(factor: f64, strict: bool) -> Self {
        RealTimeConfig { factor, strict, slack: DEFAULT_SLACK }
    }
}

/// Paces dispatch against a start-of-run wall-clock anchor. One `Pacer` is
/// created per run and consulted once before each event is popped off the
/// scheduler's queue.
pub struct Pacer {
    config: RealTimeConfig,
    start: Instant,
    warned_once: bool,
}

impl Pacer {
    pub fn new(config: RealTimeConfig) -> Self {
        Pacer { config, start: Instant::now(), warned_once: false }
    }

    /// Blocks (or, in non-strict overrun, logs a one-time warning and
    /// returns immediately) until wall-clock has caught up with `due_simtime`
    /// scaled by the configured factor. Returns an error only in strict mode
    /// once the overrun exceeds `slack`.
    pub fn wait_for(&mut self, due_simtime: SimTime) -> Result<(), RealTimeError> {
        let target_secs = sim_to_secs_f64(due_simtime) / self.config.factor;
        let target = self.start + Duration::from_secs_f64(target_secs.max(0.0));
        let now = Instant::now();

        if now >= target {
            let behind = now.duration_since(target);
            ::metrics::gauge!(met::MET_REALTIME_BEHIND_NS_GAUGE).set(behind.as_nanos() as f64);
            if behind > self.config.slack {
                if self.config.strict {
                    return Err(RealTimeError::SlackExceeded {
                        behind_ms: behind.as_millis() as u64,
                        slack_ms: self.config.slack.as_millis() as u64,
                    });
                } else if !self.warned_once {
                    tracing::warn!(behind_ms = behind.as_millis() as u64, "real-time run falling behind simtime");
                    self.warned_once = true;
                }
            }
            return Ok(());
        }

        std::thread::sleep(target - now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bobsim_types::time::sim_from_ms;

    #[test]
    fn non_strict_overrun_warns_without_erroring() {
        let mut pacer = Pacer::new(RealTimeConfig { factor: 1.0, strict: false, slack: Duration::from_millis(1) });
        std::thread::sleep(Duration::from_millis(5));
        assert!(pacer.wait_for(sim_from_ms(0)).is_ok());
    }

    #[test]
    fn strict_overrun_past_slack_errors() {
        let mut pacer = Pacer::new(RealTimeConfig { factor: 1.0, strict: true, slack: Duration::from_millis(1) });
        std::thread::sleep(Duration::from_millis(20));
        assert!(pacer.wait_for(sim_from_ms(0)).is_err());
    }

    #[test]
    fn within_slack_does_not_error_even_when_strict() {
        let pacer_config = RealTimeConfig { factor: 1.0, strict: true, slack: Duration::from_millis(200) };
        let mut pacer = Pacer::new(pacer_config);
        assert!(pacer.wait_for(sim_from_ms(0)).is_ok());
    }
}
