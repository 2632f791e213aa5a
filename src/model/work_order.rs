//! A customer request for a delivery or service visit.
//!
//! # Actor Framework
//! This struct implements the [`ActorEntity`](fleet_actor::ActorEntity) trait,
//! allowing it to be managed by a [`ResourceActor`](fleet_actor::ResourceActor).
//!
//! See [`order_actor`](crate::order_actor) for the transition rules enforced on every patch.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::{CarrierId, GeoPoint};

/// Type-safe identifier for work orders.
///
/// Caller-supplied ids are kept verbatim; generated ones look like `WO-<n>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkOrderId(pub String);

impl WorkOrderId {
    pub fn generated(seq: u64) -> Self {
        Self(format!("WO-{seq}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WorkOrderId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for WorkOrderId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Display for WorkOrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle of a work order. Moves forward only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Assigned,
    Completed,
}

impl OrderStatus {
    /// `pending -> assigned -> completed`. Staying put is allowed, which covers re-assignment.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Pending)
                | (Pending, Assigned)
                | (Assigned, Assigned)
                | (Assigned, Completed)
                | (Completed, Completed)
        )
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Assigned => "assigned",
            OrderStatus::Completed => "completed",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkOrder {
    pub id: WorkOrderId,
    pub client_name: String,
    pub requested_at: DateTime<Utc>,
    pub pickup: Option<GeoPoint>,
    pub dropoff: GeoPoint,
    pub distance_km: f64,
    pub eta_minutes: f64,
    pub status: OrderStatus,
    pub carrier: Option<CarrierId>,
}

impl WorkOrder {
    /// ETA as shown in the orders table, always two decimals.
    pub fn eta_label(&self) -> String {
        format!("{:.2}", self.eta_minutes)
    }

    /// Assigned carrier, or `—` while unassigned.
    pub fn carrier_label(&self) -> String {
        match &self.carrier {
            Some(carrier) => carrier.to_string(),
            None => "—".to_string(),
        }
    }
}

/// Payload for creating a work order. New orders always start `pending` with no carrier.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub id: Option<WorkOrderId>,
    pub client_name: String,
    pub requested_at: DateTime<Utc>,
    pub pickup: Option<GeoPoint>,
    pub dropoff: GeoPoint,
    pub distance_km: f64,
    pub eta_minutes: f64,
}

/// A partial update. Absent fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderPatch {
    pub eta_minutes: Option<f64>,
    pub distance_km: Option<f64>,
    pub status: Option<OrderStatus>,
    pub carrier: Option<CarrierId>,
}

impl OrderPatch {
    /// Assignment produced by the optimizer. An absent time leaves the stored ETA alone.
    pub fn assign(carrier: CarrierId, eta_minutes: Option<f64>) -> Self {
        Self {
            eta_minutes,
            status: Some(OrderStatus::Assigned),
            carrier: Some(carrier),
            ..Default::default()
        }
    }

    /// Output of the ETA-prediction service.
    pub fn prediction(eta_minutes: f64, distance_km: f64) -> Self {
        Self {
            eta_minutes: Some(eta_minutes),
            distance_km: Some(distance_km),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(eta_minutes: f64, carrier: Option<&str>) -> WorkOrder {
        WorkOrder {
            id: WorkOrderId::from("WO-1"),
            client_name: "Acme".to_string(),
            requested_at: Utc::now(),
            pickup: None,
            dropoff: GeoPoint::new(39.0, -76.9),
            distance_km: 0.0,
            eta_minutes,
            status: OrderStatus::Pending,
            carrier: carrier.map(CarrierId::from),
        }
    }

    #[test]
    fn test_status_moves_forward_only() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Assigned));
        assert!(Assigned.can_transition_to(Assigned));
        assert!(Assigned.can_transition_to(Completed));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Assigned.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(Assigned));
    }

    #[test]
    fn test_labels() {
        assert_eq!(order(14.0, Some("C2")).eta_label(), "14.00");
        assert_eq!(order(22.456, None).eta_label(), "22.46");
        assert_eq!(order(0.0, None).carrier_label(), "—");
        assert_eq!(order(0.0, Some("C2")).carrier_label(), "C2");
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&OrderStatus::Assigned).unwrap();
        assert_eq!(json, "\"assigned\"");
    }
}
