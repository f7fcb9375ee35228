//! Spatial relation calculator.
//!
//! Great-circle distance (haversine, R = 6371 km), initial bearing
//! (forward azimuth), and the device-heading-relative pointing angle used
//! to rotate the on-screen arrow. All pure functions; the driver feeds
//! them the latest known position and heading.

use serde::Serialize;

use crate::types::{Activity, Coordinate};

/// Earth's mean radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Tunables for the spatial calculator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialConfig {
    /// Below this distance a target is flagged "near" and gets the
    /// attention-drawing presentation.
    pub near_threshold_m: f64,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self { near_threshold_m: 300.0 }
    }
}

/// Great-circle distance between two coordinates, in kilometers.
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let (lat1, lon1) = a.to_radians();
    let (lat2, lon2) = b.to_radians();

    let d_lat = lat2 - lat1;
    let d_lon = lon2 - lon1;

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Initial bearing from `a` to `b` in degrees, normalized to [0, 360).
/// 0 = north, 90 = east.
pub fn bearing_deg(a: Coordinate, b: Coordinate) -> f64 {
    let (lat1, lon1) = a.to_radians();
    let (lat2, lon2) = b.to_radians();
    let d_lon = lon2 - lon1;

    let y = d_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();

    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// Rotation for the on-screen arrow: bearing relative to where the device
/// is pointing. With no heading available the pointer falls back to
/// absolute bearing (north-up).
pub fn pointing_angle(bearing: f64, device_heading: Option<f64>) -> f64 {
    let heading = device_heading.unwrap_or(0.0);
    ((bearing - heading) % 360.0 + 360.0) % 360.0
}

/// Derived spatial view of one non-completed activity. Ephemeral.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpatialRelation {
    pub distance_km: f64,
    pub bearing_deg: f64,
    /// Arrow rotation relative to the device heading.
    pub pointing_deg: f64,
    /// Within the configured near threshold.
    pub near: bool,
}

impl SpatialRelation {
    /// Compute the relation from the user to an activity's primary
    /// coordinate.
    ///
    /// Returns `None` when the position is unknown or the activity is
    /// completed; absence means "unknown", never "at the activity".
    pub fn compute(
        user: Option<Coordinate>,
        device_heading: Option<f64>,
        activity: &Activity,
        config: &SpatialConfig,
    ) -> Option<Self> {
        if activity.completed {
            return None;
        }
        let user = user?;
        let km = distance_km(user, activity.coords);
        let bearing = bearing_deg(user, activity.coords);
        Some(SpatialRelation {
            distance_km: km,
            bearing_deg: bearing,
            pointing_deg: pointing_angle(bearing, device_heading),
            near: km * 1000.0 < config.near_threshold_m,
        })
    }
}

/// Format a distance the way the timeline badges show it: meters below
/// 1 km (nearest meter), kilometers with one decimal above.
pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        format!("{} m", (km * 1000.0).round() as i64)
    } else {
        format!("{km:.1} km")
    }
}
