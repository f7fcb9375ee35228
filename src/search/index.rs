//! Local substring matching over the itinerary's own places.

use crate::types::{Activity, FixedPoint, SearchHit, SearchOrigin, Waypoint};

/// The three internal collections a query is matched against, in ranking
/// order: schedule first, fixed points second, user waypoints third.
#[derive(Debug, Clone, Default)]
pub struct LocalIndex {
    pub activities: Vec<Activity>,
    pub fixed_points: Vec<FixedPoint>,
    pub waypoints: Vec<Waypoint>,
}

impl LocalIndex {
    pub fn new(
        activities: Vec<Activity>,
        fixed_points: Vec<FixedPoint>,
        waypoints: Vec<Waypoint>,
    ) -> Self {
        Self { activities, fixed_points, waypoints }
    }

    /// Case-insensitive substring match, in origin order.
    pub fn matches(&self, query: &str) -> Vec<SearchHit> {
        let needle = query.to_lowercase();
        let mut hits = Vec::new();

        for act in &self.activities {
            if act.title.to_lowercase().contains(&needle)
                || act.location_name.to_lowercase().contains(&needle)
            {
                hits.push(SearchHit {
                    label: act.title.clone(),
                    coords: act.coords,
                    origin: SearchOrigin::Schedule,
                    detail: act.location_name.clone(),
                });
            }
        }

        for point in &self.fixed_points {
            if point.name.to_lowercase().contains(&needle) {
                hits.push(SearchHit {
                    label: point.name.clone(),
                    coords: point.coords,
                    origin: SearchOrigin::Poi,
                    detail: "Point of interest".to_string(),
                });
            }
        }

        for wpt in &self.waypoints {
            if wpt.name.to_lowercase().contains(&needle) {
                hits.push(SearchHit {
                    label: wpt.name.clone(),
                    coords: wpt.coords,
                    origin: SearchOrigin::Mine,
                    detail: wpt.note.clone().unwrap_or_else(|| "My waypoint".to_string()),
                });
            }
        }

        hits
    }
}
