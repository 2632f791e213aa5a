//! # Work Order Intake
//!
//! Turns raw form input into a validated order. Coordinates arrive as text; the requested
//! time is split over date, hour, minute and AM/PM fields and only used when all four are
//! filled in.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::model::{EtaRequest, GeoPoint, OrderCreate};

pub const MAX_CLIENT_NAME_LEN: usize = 100;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Client name is required")]
    ClientNameRequired,

    #[error("Client name must be at most 100 characters")]
    ClientNameTooLong,

    #[error("Valid latitude required (-90 to 90)")]
    Latitude,

    #[error("Valid longitude required (-180 to 180)")]
    Longitude,

    #[error("Invalid requested time: {0}")]
    RequestedTime(String),
}

/// Raw form fields as typed by the operator.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrderForm {
    pub client_name: String,
    pub dropoff_lat: String,
    pub dropoff_lon: String,
    #[serde(default)]
    pub requested_date: Option<String>,
    #[serde(default)]
    pub requested_hour: Option<String>,
    #[serde(default)]
    pub requested_minute: Option<String>,
    #[serde(default)]
    pub requested_am_pm: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedOrder {
    pub client_name: String,
    pub dropoff: GeoPoint,
    pub requested_at: DateTime<Utc>,
}

impl WorkOrderForm {
    /// Checks every field. `now` is used when the requested time is incomplete.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<ValidatedOrder, ValidationError> {
        let client_name = self.client_name.trim();
        if client_name.is_empty() {
            return Err(ValidationError::ClientNameRequired);
        }
        if client_name.chars().count() > MAX_CLIENT_NAME_LEN {
            return Err(ValidationError::ClientNameTooLong);
        }

        let lat = parse_coordinate(&self.dropoff_lat, 90.0).ok_or(ValidationError::Latitude)?;
        let lng = parse_coordinate(&self.dropoff_lon, 180.0).ok_or(ValidationError::Longitude)?;

        Ok(ValidatedOrder {
            client_name: client_name.to_string(),
            dropoff: GeoPoint::new(lat, lng),
            requested_at: self.requested_time()?.unwrap_or(now),
        })
    }

    fn requested_time(&self) -> Result<Option<DateTime<Utc>>, ValidationError> {
        let (Some(date), Some(hour), Some(minute), Some(am_pm)) = (
            filled(&self.requested_date),
            filled(&self.requested_hour),
            filled(&self.requested_minute),
            filled(&self.requested_am_pm),
        ) else {
            return Ok(None);
        };

        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| ValidationError::RequestedTime(format!("bad date {date:?}")))?;
        let hour: u32 = hour
            .parse()
            .ok()
            .filter(|h| (1..=12).contains(h))
            .ok_or_else(|| ValidationError::RequestedTime(format!("bad hour {hour:?}")))?;
        let minute: u32 = minute
            .parse()
            .ok()
            .filter(|m| *m < 60)
            .ok_or_else(|| ValidationError::RequestedTime(format!("bad minute {minute:?}")))?;
        let hour = match am_pm.to_ascii_uppercase().as_str() {
            "AM" => hour % 12,
            "PM" => hour % 12 + 12,
            other => {
                return Err(ValidationError::RequestedTime(format!(
                    "expected AM or PM, got {other:?}"
                )))
            }
        };

        let time = NaiveTime::from_hms_opt(hour, minute, 0)
            .ok_or_else(|| ValidationError::RequestedTime(format!("{hour}:{minute}")))?;
        Ok(Some(Utc.from_utc_datetime(&date.and_time(time))))
    }
}

impl ValidatedOrder {
    /// Request for the ETA-prediction service. Day of week counts from Sunday = 0.
    pub fn eta_request(&self) -> EtaRequest {
        EtaRequest {
            client_name: self.client_name.clone(),
            dropoff_lat: self.dropoff.lat,
            dropoff_lon: self.dropoff.lng,
            day_of_week: self.requested_at.weekday().num_days_from_sunday(),
            hour: self.requested_at.hour(),
        }
    }

    /// Create payload. ETA and distance start at zero until a prediction is recorded.
    pub fn into_create(self) -> OrderCreate {
        OrderCreate {
            id: None,
            client_name: self.client_name,
            requested_at: self.requested_at,
            pickup: None,
            dropoff: self.dropoff,
            distance_km: 0.0,
            eta_minutes: 0.0,
        }
    }
}

fn filled(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_coordinate(raw: &str, bound: f64) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && (-bound..=bound).contains(v))
}
