//! Rendering collaborator interface.
//!
//! The synchronizer never draws anything itself: it issues create/remove
//! commands against a [`MapSurface`] and receives tap/click events back.
//! The real implementation wraps the map widget; tests use a recording
//! fake.

use crate::types::{Coordinate, WaypointId};

/// Opaque handle to one live visual element, issued by the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerHandle(pub u64);

/// Visual role of a marker; the surface maps this to an icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerStyle {
    Activity,
    Waypoint,
    UserPosition,
    SearchResult,
}

/// A point marker with popup content.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub coords: Coordinate,
    pub style: MarkerStyle,
    pub title: String,
    /// Secondary popup lines (description, note).
    pub detail: Option<String>,
    /// External navigation deep-link shown in the popup.
    pub deep_link: Option<String>,
    /// When set, the popup carries a delete button wired to this waypoint.
    /// Re-supplied on every rebuild: handlers never survive handle
    /// replacement.
    pub delete_target: Option<WaypointId>,
}

/// A small labelled circle (fixed points of interest).
#[derive(Debug, Clone, PartialEq)]
pub struct CircleSpec {
    pub coords: Coordinate,
    pub label: String,
}

/// A styled polyline (the static track).
#[derive(Debug, Clone, PartialEq)]
pub struct PolylineSpec {
    pub points: Vec<Coordinate>,
    /// CSS color; depends on the base-map mode.
    pub color: &'static str,
    pub dashed: bool,
}

/// Commands the synchronizer issues to the rendering collaborator.
///
/// Every `add_*` returns a fresh handle; the synchronizer guarantees it
/// calls [`MapSurface::remove`] on a key's old handle before adding a
/// replacement.
pub trait MapSurface {
    fn add_marker(&mut self, spec: MarkerSpec) -> LayerHandle;
    fn add_circle(&mut self, spec: CircleSpec) -> LayerHandle;
    fn add_polyline(&mut self, spec: PolylineSpec) -> LayerHandle;
    fn remove(&mut self, handle: LayerHandle);
    fn fly_to(&mut self, center: Coordinate, zoom: u8);
}

/// Events the surface reports back from user interaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapEvent {
    /// Bare map tap at a coordinate (starts the waypoint protocol).
    Tap(Coordinate),
    /// Click on a marker.
    MarkerClick(LayerHandle),
    /// Click on a popup's delete button.
    DeleteClick(LayerHandle),
}
