use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;

use super::CarrierId;

/// A WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Latitude in [-90, 90] and longitude in [-180, 180].
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

impl Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4})", self.lat, self.lng)
    }
}

/// One step of a precomputed route.
pub type Waypoint = GeoPoint;

/// Per-carrier routes produced by the optimizer. Immutable for the duration of a playback run.
pub type RouteMap = HashMap<CarrierId, Vec<Waypoint>>;
