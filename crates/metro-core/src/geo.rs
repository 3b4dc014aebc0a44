//! Geographic coordinate type.
//!
//! Stations are few (hundreds at most), so positions are kept in `f64`; the
//! distance feeds the travel-time physics and the rerouting fallback, both of
//! which compare distances between nearby stations.

use serde::{Deserialize, Serialize};

/// Average walking speed used for transfer-by-foot trips, metres per second.
pub const WALKING_SPEED_MPS: f64 = 1.4;

/// A WGS-84 coordinate.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Haversine great-circle distance in metres.
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        const R: f64 = 6_371_000.0; // mean Earth radius, metres

        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        R * c
    }

    /// Whole seconds needed to walk from `self` to `other` (rounded up).
    pub fn walking_secs(self, other: GeoPoint) -> i64 {
        (self.distance_m(other) / WALKING_SPEED_MPS).ceil() as i64
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}
