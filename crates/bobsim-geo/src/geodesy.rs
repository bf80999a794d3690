//! # bobsim-geo::geodesy
//!
//! WGS-84 geodetic/ECEF/ECI conversions. These are deliberately kept as
//! plain functions over small value types rather than a trait hierarchy:
//! there is exactly one datum in play and no plans to add others.

use chrono::{DateTime, Utc};
use hifitime::Epoch;
use nalgebra::Vector3;

/// WGS-84 semi-major axis, meters.
pub const WGS84_A: f64 = 6_378_137.0;
/// WGS-84 flattening.
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// WGS-84 first eccentricity squared, derived from `WGS84_F`.
pub const WGS84_E2: f64 = WGS84_F * (2.0 - WGS84_F);

/// A point on or above the WGS-84 ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geodetic {
    pub lat_deg: f64,
    pub lon_deg: f64,
    pub alt_m: f64,
}

/// Earth-centered, Earth-fixed Cartesian coordinates, meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ecef(pub Vector3<f64>);

/// Earth-centered inertial Cartesian coordinates, meters. Used for CZML
/// output and for comparing orbital positions to ground points at a given
/// instant, since ECI does not rotate with the Earth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Eci(pub Vector3<f64>);

impl Geodetic {
    pub fn new(lat_deg: f64, lon_deg: f64, alt_m: f64) -> Self {
        Geodetic { lat_deg, lon_deg, alt_m }
    }

    /// Converts geodetic coordinates to ECEF meters.
    pub fn to_ecef(self) -> Ecef {
        let lat = self.lat_deg.to_radians();
        let lon = self.lon_deg.to_radians();
        let sin_lat = lat.sin();
        let cos_lat = lat.cos();
        let n = WGS84_A / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();

        let x = (n + self.alt_m) * cos_lat * lon.cos();
        let y = (n + self.alt_m) * cos_lat * lon.sin();
        let z = (n * (1.0 - WGS84_E2) + self.alt_m) * sin_lat;

        Ecef(Vector3::new(x, y, z))
    }
}

impl Ecef {
    /// Converts ECEF meters to geodetic coordinates via Bowring's iterative
    /// method, converging in a handful of iterations for any point near
    /// Earth's surface or in low/medium orbit.
    pub fn to_geodetic(self) -> Geodetic {
        let (x, y, z) = (self.0.x, self.0.y, self.0.z);
        let lon = y.atan2(x);
        let p = (x * x + y * y).sqrt();

        let mut lat = (z / p).atan2(1.0 - WGS84_E2);
        for _ in 0..5 {
            let sin_lat = lat.sin();
            let n = WGS84_A / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
            let alt = p / lat.cos() - n;
            lat = (z / p).atan2(1.0 - WGS84_E2 * n / (n + alt));
        }

        let sin_lat = lat.sin();
        let n = WGS84_A / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
        let alt = p / lat.cos() - n;

        Geodetic { lat_deg: lat.to_degrees(), lon_deg: lon.to_degrees(), alt_m: alt }
    }

    /// Rotates ECEF into ECI using Greenwich Mean Sidereal Time at `instant`.
    pub fn to_eci(self, instant: DateTime<Utc>) -> Eci {
        let gmst = gmst_radians(instant);
        let (sin_g, cos_g) = gmst.sin_cos();
        let x = self.0.x * cos_g - self.0.y * sin_g;
        let y = self.0.x * sin_g + self.0.y * cos_g;
        Eci(Vector3::new(x, y, self.0.z))
    }
}

impl Eci {
    /// Rotates ECI back into ECEF using Greenwich Mean Sidereal Time at
    /// `instant`. Inverse of `Ecef::to_eci`.
    pub fn to_ecef(self, instant: DateTime<Utc>) -> Ecef {
        let gmst = gmst_radians(instant);
        let (sin_g, cos_g) = gmst.sin_cos();
        let x = self.0.x * cos_g + self.0.y * sin_g;
        let y = -self.0.x * sin_g + self.0.y * cos_g;
        Ecef(Vector3::new(x, y, self.0.z))
    }
}

/// Greenwich Mean Sidereal Time at `instant`, in radians, via `hifitime`'s
/// Julian-date machinery.
fn gmst_radians(instant: DateTime<Utc>) -> f64 {
    let epoch = Epoch::from_gregorian_utc(
        instant.format("%Y").to_string().parse().unwrap_or(2000),
        instant.format("%m").to_string().parse().unwrap_or(1),
        instant.format("%d").to_string().parse().unwrap_or(1),
        instant.format("%H").to_string().parse().unwrap_or(0),
        instant.format("%M").to_string().parse().unwrap_or(0),
        instant.format("%S").to_string().parse().unwrap_or(0),
        instant.timestamp_subsec_nanos(),
    );
    let jd_ut1 = epoch.to_jde_utc_days();
    let t = (jd_ut1 - 2_451_545.0) / 36_525.0;

    // IAU 1982 GMST polynomial, degrees.
    let gmst_deg = 280.460_618_37
        + 360.985_647_366_29 * (jd_ut1 - 2_451_545.0)
        + 0.000_387_933 * t * t
        - t * t * t / 38_710_000.0;

    let normalized = gmst_deg.rem_euclid(360.0);
    normalized.to_radians()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn geodetic_ecef_round_trip_is_stable() {
        let g = Geodetic::new(37.7749, -122.4194, 30.0);
        let ecef = g.to_ecef();
        let back = ecef.to_geodetic();
        assert!((g.lat_deg - back.lat_deg).abs() < 1e-6);
        assert!((g.lon_deg - back.lon_deg).abs() < 1e-6);
        assert!((g.alt_m - back.alt_m).abs() < 1e-3);
    }

    #[test]
    fn equator_prime_meridian_sea_level_is_near_wgs84_a() {
        let g = Geodetic::new(0.0, 0.0, 0.0);
        let ecef = g.to_ecef();
        assert!((ecef.0.x - WGS84_A).abs() < 1.0);
        assert!(ecef.0.y.abs() < 1e-6);
        assert!(ecef.0.z.abs() < 1e-6);
    }

    #[test]
    fn eci_ecef_round_trip_preserves_magnitude() {
        let g = Geodetic::new(10.0, 45.0, 500_000.0);
        let ecef = g.to_ecef();
        let instant = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let eci = ecef.to_eci(instant);
        let back = eci.to_ecef(instant);
        assert!((ecef.0 - back.0).norm() < 1e-3);
    }
}
