//! Scheduled activity records.

use serde::{Deserialize, Serialize};

use super::{Coordinate, TimeOfDay};

/// Stable identifier for a scheduled activity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityId(pub String);

impl ActivityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ActivityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Classification tag for an activity.
///
/// Informational only: the calculators never branch on it, but summary
/// surfaces (budget, report) group by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Logistics,
    Transport,
    Sightseeing,
    Food,
}

/// One immutable itinerary entry.
///
/// Everything except `completed` is fixed once the schedule is loaded.
/// `completed` is flipped only by an explicit user toggle, never inferred
/// from the clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub title: String,
    /// Window start, same-day, strictly before `end`.
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub location_name: String,
    /// Distinct departure point name, for legs that end elsewhere.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_location_name: Option<String>,
    pub coords: Coordinate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_coords: Option<Coordinate>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub key_details: String,
    #[serde(default)]
    pub price_eur: f64,
    pub kind: ActivityKind,
    #[serde(default)]
    pub completed: bool,
    /// Marks a leg where being late forfeits the rest of the day
    /// (e.g. the last train back to the port).
    #[serde(default)]
    pub critical: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contingency_note: Option<String>,
}

impl Activity {
    /// Scheduled window length in minutes.
    pub fn duration_minutes(&self) -> u32 {
        self.start.until(self.end)
    }
}
