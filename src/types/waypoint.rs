//! User waypoints and fixed points of interest.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Coordinate;

/// Stable identifier for a user-created waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WaypointId(pub u64);

impl std::fmt::Display for WaypointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "wpt-{}", self.0)
    }
}

/// A point the user dropped on the map.
///
/// Owned by the application's persisted-state collaborator; the engine
/// only renders and locates these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub id: WaypointId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub coords: Coordinate,
    pub created_at: DateTime<Utc>,
}

/// A fixed point of interest shipped with the itinerary (track waypoints,
/// landmarks). Immutable, never user-editable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedPoint {
    pub name: String,
    pub coords: Coordinate,
}

impl FixedPoint {
    pub fn new(name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self { name: name.into(), coords: Coordinate::new(lat, lng) }
    }
}
