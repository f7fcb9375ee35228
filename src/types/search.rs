//! Search result types and the external-lookup region bound.

use serde::{Deserialize, Serialize};

use super::Coordinate;

/// Where a search hit came from. Internal origins always rank before
/// `External` in merged results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchOrigin {
    /// Matched a scheduled activity's title or location name.
    Schedule,
    /// Matched a fixed point of interest.
    Poi,
    /// Matched a user waypoint.
    Mine,
    /// Returned by the external place lookup.
    External,
}

/// One ranked search result. Ephemeral: rebuilt on every query change,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub label: String,
    pub coords: Coordinate,
    pub origin: SearchOrigin,
    /// Secondary descriptive line (location name, address fragment, note).
    pub detail: String,
}

/// A raw result from the external place-lookup collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalPlace {
    pub label: String,
    pub coords: Coordinate,
    pub address_fragment: String,
}

impl From<ExternalPlace> for SearchHit {
    fn from(p: ExternalPlace) -> Self {
        SearchHit {
            label: p.label,
            coords: p.coords,
            origin: SearchOrigin::External,
            detail: p.address_fragment,
        }
    }
}

/// Lat/lng box bounding external lookups to the excursion area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingRegion {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingRegion {
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self { south, west, north, east }
    }

    /// A box of `half_span_deg` degrees around a center point.
    pub fn around(center: Coordinate, half_span_deg: f64) -> Self {
        Self {
            south: center.lat - half_span_deg,
            west: center.lng - half_span_deg,
            north: center.lat + half_span_deg,
            east: center.lng + half_span_deg,
        }
    }

    pub fn contains(&self, c: Coordinate) -> bool {
        c.lat >= self.south && c.lat <= self.north && c.lng >= self.west && c.lng <= self.east
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_contains_center() {
        let center = Coordinate::new(43.77, 11.25);
        let region = BoundingRegion::around(center, 0.1);
        assert!(region.contains(center));
        assert!(!region.contains(Coordinate::new(44.0, 11.25)));
    }

    #[test]
    fn external_place_converts_to_hit() {
        let place = ExternalPlace {
            label: "Caffè Gilli".into(),
            coords: Coordinate::new(43.7714, 11.2542),
            address_fragment: "Via Roma 1".into(),
        };
        let hit: SearchHit = place.into();
        assert_eq!(hit.origin, SearchOrigin::External);
        assert_eq!(hit.detail, "Via Roma 1");
    }
}
