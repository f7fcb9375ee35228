//! Map overlay synchronizer.
//!
//! Owns the live layer set, a keyed arena of visual handles, and
//! reconciles it against the current inputs whenever any of them change.
//! The arena has exactly one writer (this module); no other component may
//! create or destroy a layer handle. Invariant: at most one live handle
//! per [`LayerKey`], and an old handle is always released before its
//! replacement is created.

mod surface;

use std::collections::HashMap;

use chrono::Utc;
use tracing::{debug, trace};

use crate::error::TrackingError;
use crate::navigation::maps_deeplink;
use crate::types::{Activity, ActivityId, Coordinate, FixedPoint, Waypoint, WaypointId};

pub use surface::{
    CircleSpec, LayerHandle, MapEvent, MapSurface, MarkerSpec, MarkerStyle, PolylineSpec,
};

/// Default view zoom, matching the initial map view.
pub const DEFAULT_ZOOM: u8 = 14;
/// Zoom used when focusing on a single point.
pub const FOCUS_ZOOM: u8 = 16;

/// Track color on the standard base map.
const TRACK_COLOR: &str = "#1e3a8a";
/// Track color when the satellite base map is active (dark imagery needs
/// a light line).
const TRACK_COLOR_SATELLITE: &str = "#fbbf24";

/// Stable identity of one visual element on the map.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LayerKey {
    Activity(ActivityId),
    Poi(usize),
    Track,
    Waypoint(WaypointId),
    SearchHit,
    UserPosition,
}

/// Everything the overlay renders from. All fields are compared against
/// the previous reconcile to decide which layer groups to rebuild.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OverlayInputs {
    pub activities: Vec<Activity>,
    pub fixed_points: Vec<FixedPoint>,
    pub track: Vec<Coordinate>,
    pub waypoints: Vec<Waypoint>,
    pub user_position: Option<Coordinate>,
    pub satellite_mode: bool,
}

/// User intent derived from a surface event, for the owning application
/// to act on.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayIntent {
    /// A map tap opened the waypoint creation form at this coordinate.
    WaypointFormOpened(Coordinate),
    /// The user asked to delete this waypoint from its popup.
    DeleteWaypoint(WaypointId),
    /// An activity marker was selected.
    ActivitySelected(ActivityId),
}

/// Exclusive owner of the live layer set.
pub struct OverlaySynchronizer<S: MapSurface> {
    surface: S,
    layers: HashMap<LayerKey, LayerHandle>,
    last_inputs: Option<OverlayInputs>,
    /// Coordinate captured by a map tap, awaiting form confirmation.
    pending_waypoint: Option<Coordinate>,
    next_waypoint_id: u64,
}

impl<S: MapSurface> OverlaySynchronizer<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            layers: HashMap::new(),
            last_inputs: None,
            pending_waypoint: None,
            next_waypoint_id: 1,
        }
    }

    /// Number of live handles. Reconciling twice with identical inputs
    /// leaves this unchanged.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Bring the layer set into agreement with `inputs`.
    ///
    /// Only groups whose inputs changed since the previous call are
    /// touched; unchanged keys keep their handles (and any open popups).
    pub fn reconcile(&mut self, inputs: &OverlayInputs) {
        let prev = self.last_inputs.take();
        let mut churn = 0usize;

        // Activity markers, diffed per id so an unrelated edit never
        // closes another activity's popup.
        if prev.as_ref().is_none_or(|p| p.activities != inputs.activities) {
            churn += self.sync_activities(prev.as_ref(), inputs);
        }

        // Fixed points are static in practice; rebuilt as a group if they
        // ever do change.
        if prev.as_ref().is_none_or(|p| p.fixed_points != inputs.fixed_points) {
            churn += self.sync_fixed_points(inputs);
        }

        // Track styling depends on the base-map mode alone.
        if prev
            .as_ref()
            .is_none_or(|p| p.track != inputs.track || p.satellite_mode != inputs.satellite_mode)
        {
            churn += self.sync_track(inputs);
        }

        // Waypoints, diffed per id: deleting one releases exactly its own
        // handle.
        if prev.as_ref().is_none_or(|p| p.waypoints != inputs.waypoints) {
            churn += self.sync_waypoints(prev.as_ref(), inputs);
        }

        if prev.as_ref().is_none_or(|p| p.user_position != inputs.user_position) {
            churn += self.sync_user_position(inputs);
        }

        debug!(churn, live = self.layers.len(), "Overlay reconciled");
        self.last_inputs = Some(inputs.clone());
    }

    /// Pan/zoom the view. Independent of `reconcile`.
    pub fn focus(&mut self, center: Coordinate, zoom: u8) {
        self.surface.fly_to(center, zoom);
    }

    /// Place (or replace) the single transient search marker and focus on
    /// it. At most one exists at any time.
    pub fn place_search_marker(&mut self, label: &str, coords: Coordinate) {
        self.release(&LayerKey::SearchHit);
        let handle = self.surface.add_marker(MarkerSpec {
            coords,
            style: MarkerStyle::SearchResult,
            title: label.to_string(),
            detail: None,
            deep_link: Some(maps_deeplink(coords)),
            delete_target: None,
        });
        self.layers.insert(LayerKey::SearchHit, handle);
        self.surface.fly_to(coords, FOCUS_ZOOM);
    }

    /// Remove the transient search marker, if present.
    pub fn clear_search_marker(&mut self) {
        self.release(&LayerKey::SearchHit);
    }

    /// Translate a surface event into user intent.
    ///
    /// A bare tap starts the waypoint protocol: the coordinate is parked
    /// and the creation form opens. No layer is created yet.
    pub fn handle_event(&mut self, event: MapEvent) -> Option<OverlayIntent> {
        match event {
            MapEvent::Tap(coords) => {
                self.pending_waypoint = Some(coords);
                Some(OverlayIntent::WaypointFormOpened(coords))
            }
            MapEvent::MarkerClick(handle) => match self.key_of(handle)? {
                LayerKey::Activity(id) => Some(OverlayIntent::ActivitySelected(id.clone())),
                _ => None,
            },
            MapEvent::DeleteClick(handle) => match self.key_of(handle)? {
                LayerKey::Waypoint(id) => Some(OverlayIntent::DeleteWaypoint(*id)),
                _ => None,
            },
        }
    }

    /// Confirm the waypoint form.
    ///
    /// Name is required; note is optional. On success the pending
    /// coordinate is consumed and the finished waypoint returned for the
    /// owner to persist. Its layer appears on the next `reconcile`, never
    /// optimistically.
    pub fn confirm_waypoint(
        &mut self,
        name: &str,
        note: Option<String>,
    ) -> crate::Result<Waypoint> {
        let coords = self
            .pending_waypoint
            .ok_or_else(|| TrackingError::waypoint_form("no pending map tap"))?;
        let name = name.trim();
        if name.is_empty() {
            // Form stays open, pending coordinate kept
            return Err(TrackingError::waypoint_form("name is required"));
        }

        self.pending_waypoint = None;
        let id = WaypointId(self.next_waypoint_id);
        self.next_waypoint_id += 1;
        Ok(Waypoint { id, name: name.to_string(), note, coords, created_at: Utc::now() })
    }

    /// Cancel the waypoint form, discarding the pending coordinate. No
    /// layer side effects.
    pub fn cancel_waypoint(&mut self) {
        self.pending_waypoint = None;
    }

    /// A map tap is parked awaiting form confirmation.
    pub fn has_pending_waypoint(&self) -> bool {
        self.pending_waypoint.is_some()
    }

    fn key_of(&self, handle: LayerHandle) -> Option<&LayerKey> {
        self.layers.iter().find_map(|(k, &h)| (h == handle).then_some(k))
    }

    /// Release the handle under `key`, if any. Returns whether one
    /// existed.
    fn release(&mut self, key: &LayerKey) -> bool {
        if let Some(handle) = self.layers.remove(key) {
            trace!(?key, "Releasing layer");
            self.surface.remove(handle);
            true
        } else {
            false
        }
    }

    fn sync_activities(&mut self, prev: Option<&OverlayInputs>, inputs: &OverlayInputs) -> usize {
        let empty = Vec::new();
        let old = prev.map_or(&empty, |p| &p.activities);
        let mut churn = 0;

        // Drop markers for activities that vanished
        for gone in old.iter().filter(|a| !inputs.activities.iter().any(|n| n.id == a.id)) {
            if self.release(&LayerKey::Activity(gone.id.clone())) {
                churn += 1;
            }
        }

        // Add or rebuild changed ones
        for act in &inputs.activities {
            let unchanged = old.iter().any(|o| o == act);
            if unchanged && self.layers.contains_key(&LayerKey::Activity(act.id.clone())) {
                continue;
            }
            let key = LayerKey::Activity(act.id.clone());
            self.release(&key);
            let handle = self.surface.add_marker(MarkerSpec {
                coords: act.coords,
                style: MarkerStyle::Activity,
                title: act.title.clone(),
                detail: Some(act.description.clone()),
                deep_link: Some(maps_deeplink(act.coords)),
                delete_target: None,
            });
            self.layers.insert(key, handle);
            churn += 1;
        }
        churn
    }

    fn sync_fixed_points(&mut self, inputs: &OverlayInputs) -> usize {
        let mut churn = 0;
        let stale: Vec<LayerKey> = self
            .layers
            .keys()
            .filter(|k| matches!(k, LayerKey::Poi(_)))
            .cloned()
            .collect();
        for key in stale {
            self.release(&key);
            churn += 1;
        }
        for (idx, point) in inputs.fixed_points.iter().enumerate() {
            let handle = self
                .surface
                .add_circle(CircleSpec { coords: point.coords, label: point.name.clone() });
            self.layers.insert(LayerKey::Poi(idx), handle);
            churn += 1;
        }
        churn
    }

    fn sync_track(&mut self, inputs: &OverlayInputs) -> usize {
        let mut churn = 0;
        if self.release(&LayerKey::Track) {
            churn += 1;
        }
        if !inputs.track.is_empty() {
            let color = if inputs.satellite_mode { TRACK_COLOR_SATELLITE } else { TRACK_COLOR };
            let handle = self.surface.add_polyline(PolylineSpec {
                points: inputs.track.clone(),
                color,
                dashed: true,
            });
            self.layers.insert(LayerKey::Track, handle);
            churn += 1;
        }
        churn
    }

    fn sync_waypoints(&mut self, prev: Option<&OverlayInputs>, inputs: &OverlayInputs) -> usize {
        let empty = Vec::new();
        let old = prev.map_or(&empty, |p| &p.waypoints);
        let mut churn = 0;

        for gone in old.iter().filter(|w| !inputs.waypoints.iter().any(|n| n.id == w.id)) {
            if self.release(&LayerKey::Waypoint(gone.id)) {
                churn += 1;
            }
        }

        for wpt in &inputs.waypoints {
            let unchanged = old.iter().any(|o| o == wpt);
            if unchanged && self.layers.contains_key(&LayerKey::Waypoint(wpt.id)) {
                continue;
            }
            let key = LayerKey::Waypoint(wpt.id);
            self.release(&key);
            // delete_target re-wires the popup delete button on every
            // rebuild; handlers do not survive handle replacement
            let handle = self.surface.add_marker(MarkerSpec {
                coords: wpt.coords,
                style: MarkerStyle::Waypoint,
                title: wpt.name.clone(),
                detail: wpt.note.clone(),
                deep_link: Some(maps_deeplink(wpt.coords)),
                delete_target: Some(wpt.id),
            });
            self.layers.insert(key, handle);
            churn += 1;
        }
        churn
    }

    fn sync_user_position(&mut self, inputs: &OverlayInputs) -> usize {
        let mut churn = 0;
        if self.release(&LayerKey::UserPosition) {
            churn += 1;
        }
        if let Some(coords) = inputs.user_position {
            let handle = self.surface.add_marker(MarkerSpec {
                coords,
                style: MarkerStyle::UserPosition,
                title: "You are here".to_string(),
                detail: None,
                deep_link: None,
                delete_target: None,
            });
            self.layers.insert(LayerKey::UserPosition, handle);
            churn += 1;
        }
        churn
    }
}
