//! Geographic primitives shared across the workspace.

use serde::{Deserialize, Serialize};

/// Zoom level at which model positions are projected onto the world plane.
/// The projection itself belongs to the map host; the constant is fixed so
/// every model resolves into the same plane regardless of the current view.
pub const REFERENCE_ZOOM: f64 = 20.0;

/// Geographic coordinate in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Finite components with latitude inside [-90, 90]. Longitude is left
    /// unwrapped; hosts normalize it when projecting.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite() && self.lat.abs() <= 90.0
    }
}

/// Cartesian coordinate on the map's flat rendering plane.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
}

impl WorldPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latlng_validity_bounds() {
        assert!(LatLng::new(39.91, 116.39).is_valid());
        assert!(LatLng::new(-90.0, 200.0).is_valid());
        assert!(!LatLng::new(90.5, 0.0).is_valid());
        assert!(!LatLng::new(f64::NAN, 0.0).is_valid());
        assert!(!LatLng::new(0.0, f64::INFINITY).is_valid());
    }

    #[test]
    fn latlng_serde_roundtrip() {
        let p = LatLng::new(31.23, 121.47);
        let s = serde_json::to_string(&p).unwrap();
        let p2: LatLng = serde_json::from_str(&s).unwrap();
        assert_eq!(p, p2);
    }
}
