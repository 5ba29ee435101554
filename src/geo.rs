//! Geographic primitives for loctag.
//!
//! This module defines the raw data produced by a position source: the
//! `Coordinate` and `PositionSample` types the acquisition engine consumes,
//! plus the great-circle distance used to compare samples. The platform's
//! authorization state is modeled here too, since it gates whether a source
//! may be started at all.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mean earth radius in meters, used for great-circle distances.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A latitude/longitude pair in floating-point degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A single raw position report from a location source
#[derive(Debug, Clone, PartialEq)]
pub struct PositionSample {
    /// Where the receiver believes the device is
    pub coordinate: Coordinate,
    /// Radius of uncertainty in meters; smaller is better. A negative
    /// value marks the sample as invalid.
    pub horizontal_accuracy: f64,
    /// When the sample was measured
    pub timestamp: DateTime<Utc>,
}

impl PositionSample {
    pub fn new(coordinate: Coordinate, horizontal_accuracy: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            coordinate,
            horizontal_accuracy,
            timestamp,
        }
    }

    /// Whether the receiver flagged this sample as unusable
    pub fn is_valid(&self) -> bool {
        self.horizontal_accuracy >= 0.0
    }
}

/// Authorization state of the platform's location permission, read once
/// per start attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    Authorized,
    Denied,
    Restricted,
    Undetermined,
}

impl AuthorizationStatus {
    /// Whether this status permits sampling to begin
    pub fn allows_sampling(&self) -> bool {
        matches!(self, AuthorizationStatus::Authorized)
    }
}

/// Great-circle distance between two coordinates in meters (haversine)
pub fn distance_meters(a: Coordinate, b: Coordinate) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}
