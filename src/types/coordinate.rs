//! Geographic coordinate type.

use serde::{Deserialize, Serialize};

/// A WGS-84 latitude/longitude pair in degrees.
///
/// No range validation beyond finiteness: feeding a coordinate outside
/// [-90, 90] / [-180, 180] is a caller error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    /// Create a coordinate from degrees.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Both components are finite numbers.
    ///
    /// Sensor adapters drop non-finite readings before they reach the
    /// calculators, keeping the prior known-good fix.
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// (lat, lng) converted to radians, for the great-circle math.
    pub fn to_radians(&self) -> (f64, f64) {
        (self.lat.to_radians(), self.lng.to_radians())
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.5},{:.5}", self.lat, self.lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finite_check_rejects_nan_and_inf() {
        assert!(Coordinate::new(43.77, 11.25).is_finite());
        assert!(!Coordinate::new(f64::NAN, 11.25).is_finite());
        assert!(!Coordinate::new(43.77, f64::INFINITY).is_finite());
    }

    #[test]
    fn display_is_stable() {
        assert_eq!(Coordinate::new(43.7731, 11.2553).to_string(), "43.77310,11.25530");
    }
}
