//! Navigation handoff helpers.
//!
//! Pure formatting only: producing deep-link URLs and share text from a
//! coordinate. Opening them is the surrounding app's business.

use crate::types::Coordinate;

/// Directions deep-link for the external maps app.
pub fn maps_deeplink(target: Coordinate) -> String {
    format!("https://www.google.com/maps/dir/?api=1&destination={},{}", target.lat, target.lng)
}

/// Pin deep-link (view, not directions).
pub fn maps_pin(target: Coordinate) -> String {
    format!("https://maps.google.com/?q={},{}", target.lat, target.lng)
}

/// Emergency share message carrying the current position, or a no-fix
/// fallback when the position is unknown.
pub fn sos_message(position: Option<Coordinate>) -> String {
    match position {
        Some(pos) => format!("SOS! I need help. My current location is: {}", maps_pin(pos)),
        None => "SOS! I need help. I cannot get a GPS fix.".to_string(),
    }
}
