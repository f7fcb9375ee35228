//! Temporal-spatial tracking engine for a single day ashore.
//!
//! Portcall tracks live progress through a fixed, geography-anchored
//! itinerary during a port call: what is upcoming, active, completed, or
//! missed; how far away and in which direction every remaining stop lies;
//! and a consistent map overlay that follows the schedule, the user's
//! position, and their own waypoints as each changes independently.
//!
//! # Features
//!
//! - **Temporal state**: four-state lifecycle and progress per activity
//!   and per gap, derived from the wall clock and the schedule
//! - **Spatial relation**: haversine distance, forward-azimuth bearing,
//!   and a device-heading-relative pointing angle per remaining stop
//! - **Overlay reconciliation**: a keyed layer arena rebuilt only where
//!   inputs changed, with no leaked or duplicated handles
//! - **Place search**: debounced local + external matching, latest query
//!   wins
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use portcall::{ExcursionTracker, Schedule, SpatialConfig};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> portcall::Result<()> {
//!     let schedule = Schedule::new(load_itinerary())?;
//!     let (tracker, feeds) =
//!         ExcursionTracker::with_system_sensors(schedule, None, SpatialConfig::default())?;
//!
//!     // Platform adapters push fixes through `feeds`...
//!     let mut snapshots = tracker.subscribe();
//!     while let Some(snapshot) = snapshots.next().await {
//!         println!("{} activities tracked at {}", snapshot.timeline.activities.len(), snapshot.now);
//!     }
//!     # drop(feeds);
//!     Ok(())
//! }
//! # fn load_itinerary() -> Vec<portcall::Activity> { Vec::new() }
//! ```

// Core types and error handling
mod error;
pub mod types;

// Domain model and calculators
pub mod schedule;
pub mod spatial;
pub mod temporal;

// Stream-based tracking architecture
pub mod driver;
pub mod sources;
pub mod stream;
pub mod tracker;

// Map overlay and search
pub mod overlay;
pub mod search;

// Collaborator surfaces
pub mod navigation;
pub mod persist;

// Core exports
pub use error::*;
pub use types::*;

pub use driver::{Driver, DriverChannels, TrackerSnapshot};
pub use overlay::{LayerKey, MapEvent, MapSurface, OverlayInputs, OverlayIntent, OverlaySynchronizer};
pub use persist::{CompletionStore, JsonCompletionStore};
pub use schedule::Schedule;
pub use search::{LocalIndex, PlaceLookup, SearchMatcher, SearchPipeline};
pub use sources::{SensorEvent, SensorFeeds, SensorHub, SystemSensors};
pub use spatial::{SpatialConfig, SpatialRelation};
pub use temporal::{LifecycleState, TimelineSnapshot};
pub use tracker::ExcursionTracker;
