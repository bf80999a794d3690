//! # bobsim-geo::meta_node
//!
//! `MetaNode` is the position model attached to a node via `PositionSpec`
//! (§4.5). It has no `step` of its own -- it is queried by the engine
//! whenever a node's position is needed, and by `czml` when building visual
//! output. Propagation failures (e.g. an SGP4 epoch the propagator rejects)
//! are surfaced as `MetaNodeError` rather than panicking, since a bad TLE in
//! one scenario node should not take down an otherwise-valid run.

use crate::geodesy::{Ecef, Geodetic};
use chrono::{DateTime, Utc};
use sgp4::{Elements, MinutesSinceEpoch};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetaNodeError {
    #[error("failed to parse TLE: {0}")]
    InvalidTle(String),

    #[error("SGP4 propagation failed at {at}: {reason}")]
    PropagationFailed { at: DateTime<Utc>, reason: String },
}

/// A node's position model: either fixed on the WGS-84 ellipsoid, or
/// propagated from a two-line element set via SGP4.
pub enum MetaNode {
    Geopoint(Geodetic),
    Orbital {
        elements: Box<Elements>,
        constants: Box<sgp4::Constants>,
    },
}

impl MetaNode {
    pub fn geopoint(lat_deg: f64, lon_deg: f64, alt_m: f64) -> Self {
        MetaNode::Geopoint(Geodetic::new(lat_deg, lon_deg, alt_m))
    }

    pub fn orbital(tle_line1: &str, tle_line2: &str) -> Result<Self, MetaNodeError> {
        let elements = Elements::from_tle(None, tle_line1.as_bytes(), tle_line2.as_bytes())
            .map_err(|e| MetaNodeError::InvalidTle(e.to_string()))?;
        let constants = sgp4::Constants::from_elements(&elements)
            .map_err(|e| MetaNodeError::InvalidTle(e.to_string()))?;
        Ok(MetaNode::Orbital { elements: Box::new(elements), constants: Box::new(constants) })
    }

    /// Returns this node's position at `instant` as a geodetic point.
    pub fn position_at(&self, instant: DateTime<Utc>) -> Result<Geodetic, MetaNodeError> {
        match self {
            MetaNode::Geopoint(g) => Ok(*g),
            MetaNode::Orbital { .. } => {
                let (eci_km, _velocity_km_s) = self.eci_state_km(instant)?;
                let eci = crate::geodesy::Eci(eci_km * 1000.0);
                let ecef: Ecef = eci.to_ecef(instant);
                Ok(ecef.to_geodetic())
            }
        }
    }

    /// Returns `(lat°, lon°, alt_km, inertial velocity magnitude km/s)` --
    /// the `position(simtime)` interface both meta-node shapes expose (§4.5).
    /// Geopoints co-rotate with the Earth and report `0.0` for velocity since
    /// no scenario observes an inertial speed for a fixed ground point.
    pub fn position(&self, instant: DateTime<Utc>) -> Result<PositionSample, MetaNodeError> {
        match self {
            MetaNode::Geopoint(g) => Ok(PositionSample {
                lat_deg: g.lat_deg,
                lon_deg: g.lon_deg,
                alt_km: g.alt_m / 1000.0,
                velocity_km_s: 0.0,
            }),
            MetaNode::Orbital { .. } => {
                let geodetic = self.position_at(instant)?;
                let (_eci_km, velocity_km_s) = self.eci_state_km(instant)?;
                Ok(PositionSample {
                    lat_deg: geodetic.lat_deg,
                    lon_deg: geodetic.lon_deg,
                    alt_km: geodetic.alt_m / 1000.0,
                    velocity_km_s: velocity_km_s.norm(),
                })
            }
        }
    }

    /// Returns this node's ECI position in kilometers at `instant`, the
    /// shape `NodeCtx::eci_position_km` hands to node behaviors like
    /// `propagator` that sample a trajectory without needing geodesy.
    pub fn eci_position_km(&self, instant: DateTime<Utc>) -> Result<(f64, f64, f64), MetaNodeError> {
        match self {
            MetaNode::Geopoint(g) => {
                let ecef = g.to_ecef();
                let eci = ecef.to_eci(instant);
                let km = eci.0 / 1000.0;
                Ok((km.x, km.y, km.z))
            }
            MetaNode::Orbital { .. } => {
                let (eci_km, _velocity_km_s) = self.eci_state_km(instant)?;
                Ok((eci_km.x, eci_km.y, eci_km.z))
            }
        }
    }

    /// Propagates the orbital element set to `instant` and returns its
    /// TEME-frame (already inertial) position in km and velocity in km/s.
    /// Not meaningful for `Geopoint`; callers route around it above.
    fn eci_state_km(&self, instant: DateTime<Utc>) -> Result<(nalgebra::Vector3<f64>, nalgebra::Vector3<f64>), MetaNodeError> {
        let MetaNode::Orbital { elements, constants } = self else {
            unreachable!("eci_state_km is only called for the Orbital variant")
        };
        let epoch = elements.datetime_to_minutes_since_epoch(&instant.naive_utc());
        let prediction = constants
            .propagate(MinutesSinceEpoch(epoch))
            .map_err(|e| MetaNodeError::PropagationFailed { at: instant, reason: e.to_string() })?;

        let [x_km, y_km, z_km] = prediction.position;
        let [vx, vy, vz] = prediction.velocity;
        Ok((nalgebra::Vector3::new(x_km, y_km, z_km), nalgebra::Vector3::new(vx, vy, vz)))
    }
}

/// A point-in-time position sample: geodetic coordinates plus inertial
/// speed, the quantity both `Geopoint` and `Orbital` meta-nodes expose
/// through `MetaNode::position`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSample {
    pub lat_deg: f64,
    pub lon_deg: f64,
    pub alt_km: f64,
    pub velocity_km_s: f64,
}
