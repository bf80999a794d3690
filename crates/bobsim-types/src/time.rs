//! # bobsim-types::time
//!
//! Defines the representation of time within the simulation.
//! Simulated time is discrete and represented in nanoseconds to provide
//! high resolution for link delays and processing windows; the predicate
//! DSL's `SimTime` symbol is documented in seconds and is converted at
//! parse time (see `bobsim-predicate`).

use crate::errors::SimError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The fundamental unit of time in the simulation, measured in nanoseconds.
/// A `u128` provides an enormous range, preventing overflow for any practical
/// simulation duration.
pub type SimTime = u128;

/// The start of simulation time.
pub const SIM_EPOCH: SimTime = 0;

/// The maximum representable simulation time.
pub const MAX_SIM_TIME: SimTime = u128::MAX;

/// The default `end_simtime` the CLI surface documents, in seconds.
pub const DEFAULT_END_SIMTIME_SECS: u64 = 9001;

pub fn sim_from_secs(secs: u64) -> SimTime {
    (secs as u128) * 1_000_000_000
}

pub fn sim_from_ms(ms: u64) -> SimTime {
    (ms as u128) * 1_000_000
}

pub fn sim_from_us(us: u64) -> SimTime {
    (us as u128) * 1_000
}

pub fn sim_to_secs_f64(t: SimTime) -> f64 {
    (t as f64) / 1_000_000_000.0
}

/// Performs a checked addition on `SimTime`, returning an error on overflow.
pub fn checked_add(base: SimTime, offset: SimTime) -> Result<SimTime, SimError> {
    base.checked_add(offset)
        .ok_or(SimError::TimeOverflow { base, offset })
}

/// Performs a checked subtraction on `SimTime`, returning an error on overflow.
pub fn checked_sub(base: SimTime, offset: SimTime) -> Result<SimTime, SimError> {
    base.checked_sub(offset)
        .ok_or(SimError::TimeUnderflow { base, offset })
}

/// Maps a scenario epoch plus a simtime offset to an absolute UTC instant.
/// Invariant 5 (§3): this mapping must always succeed for any `SimTime` a
/// well-formed scenario can produce, so overflow here is a programmer error
/// rather than a recoverable condition.
pub fn epoch_plus(epoch: DateTime<Utc>, sim_time: SimTime) -> DateTime<Utc> {
    let secs = (sim_time / 1_000_000_000) as i64;
    let nanos = (sim_time % 1_000_000_000) as u32;
    epoch + chrono::Duration::seconds(secs) + chrono::Duration::nanoseconds(nanos as i64)
}

/// Custom (de)serializer so `SimTime` reads/writes as a plain integer of
/// nanoseconds in scenario files and `loaded_network.json`, while still
/// tolerating the smaller integer widths TOML/YAML parsers hand back.
pub fn serialize_sim_time<S>(value: &SimTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    // u128 isn't directly serializable by every format (notably TOML); widen
    // to a string if it would overflow u64, otherwise keep it as a number.
    if *value <= u64::MAX as u128 {
        serializer.serialize_u64(*value as u64)
    } else {
        serializer.serialize_str(&value.to_string())
    }
}

pub fn deserialize_sim_time<'de, D>(deserializer: D) -> Result<SimTime, D::Error>
where
    D: Deserializer<'de>,
{
    struct SimTimeVisitor;

    impl<'de> serde::de::Visitor<'de> for SimTimeVisitor {
        type Value = SimTime;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a non-negative integer of nanoseconds")
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value as u128)
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            if value < 0 {
                return Err(E::custom("SimTime cannot be negative"));
            }
            Ok(value as u128)
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            if value < 0.0 {
                return Err(E::custom("SimTime cannot be negative"));
            }
            Ok(value as u128)
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            value.parse::<u128>().map_err(E::custom)
        }
    }

    deserializer.deserialize_any(SimTimeVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn epoch_plus_adds_nanosecond_precision() {
        let epoch = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let t = sim_from_secs(60) + 500_000_000; // 60.5s
        let got = epoch_plus(epoch, t);
        assert_eq!(got.timestamp(), epoch.timestamp() + 60);
        assert_eq!(got.timestamp_subsec_nanos(), 500_000_000);
    }

    #[test]
    fn checked_add_reports_overflow() {
        let err = checked_add(MAX_SIM_TIME, 1).unwrap_err();
        assert!(matches!(err, SimError::TimeOverflow { .. }));
    }
}
