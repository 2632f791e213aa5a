use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::GeoPoint;

/// Type-safe identifier for carriers (`C1`, `C2`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CarrierId(pub String);

impl CarrierId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CarrierId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for CarrierId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Display for CarrierId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarrierStatus {
    #[default]
    Available,
    Offline,
}

/// A vehicle or field worker. Only its position ever changes after roster load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Carrier {
    pub id: CarrierId,
    pub name: String,
    pub position: GeoPoint,
    pub hours_worked: f64,
    pub status: CarrierStatus,
}

/// Roster entry used to seed the carrier store.
///
/// Matches the roster endpoint's wire shape: `{id, lat, lng, hours_worked}` plus optional
/// `name` and `status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarrierCreate {
    pub id: CarrierId,
    #[serde(default)]
    pub name: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub hours_worked: f64,
    #[serde(default)]
    pub status: CarrierStatus,
}

impl CarrierCreate {
    pub fn new(id: impl Into<CarrierId>, lat: f64, lng: f64, hours_worked: f64) -> Self {
        Self {
            id: id.into(),
            name: None,
            lat,
            lng,
            hours_worked,
            status: CarrierStatus::Available,
        }
    }
}
