//! Core data model for the tracking engine.
//!
//! These types mirror the itinerary domain: a fixed schedule of
//! [`Activity`] windows anchored to [`Coordinate`]s, user-created
//! [`Waypoint`]s, the fixed points of interest shipped with the guide, and
//! the ephemeral [`SearchHit`] results produced by the place matcher.
//!
//! Everything here is plain data. Derived state (progress, lifecycle,
//! distance, bearing) lives in [`crate::temporal`] and [`crate::spatial`]
//! and is recomputed from these inputs rather than stored on them.

mod activity;
mod coordinate;
mod search;
mod time_of_day;
mod waypoint;

pub use activity::{Activity, ActivityId, ActivityKind};
pub use coordinate::Coordinate;
pub use search::{BoundingRegion, ExternalPlace, SearchHit, SearchOrigin};
pub use time_of_day::TimeOfDay;
pub use waypoint::{FixedPoint, Waypoint, WaypointId};
