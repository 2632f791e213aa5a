//! [`ActorEntity`] implementation for [`WorkOrder`].
//!
//! Every rule about what an order may look like lives here, so the store can never hold an
//! order that breaks them: status only moves forward, a carrier is present exactly when the
//! order is no longer pending, and times and distances are finite and non-negative.

use async_trait::async_trait;
use fleet_actor::ActorEntity;

use super::actions::OrderAction;
use super::error::OrderError;
use crate::model::{OrderCreate, OrderPatch, OrderStatus, WorkOrder, WorkOrderId};

#[async_trait]
impl ActorEntity for WorkOrder {
    type Id = WorkOrderId;
    type Create = OrderCreate;
    type Update = OrderPatch;
    type Action = OrderAction;
    type ActionResult = WorkOrder;
    type Context = ();
    type Error = OrderError;

    /// Builds a pending order. Without a caller-supplied id the order becomes `WO-<seq>`.
    fn from_create_params(seq: u64, params: OrderCreate) -> Result<Self, OrderError> {
        let id = match params.id {
            Some(id) if id.as_str().trim().is_empty() => {
                return Err(OrderError::ValidationError("Order id must not be empty".into()))
            }
            Some(id) => id,
            None => WorkOrderId::generated(seq),
        };
        if params.client_name.trim().is_empty() {
            return Err(OrderError::ValidationError("Client name is required".into()));
        }
        if !params.dropoff.is_valid() {
            return Err(OrderError::ValidationError(format!(
                "Dropoff out of range: {}",
                params.dropoff
            )));
        }
        if let Some(pickup) = params.pickup.filter(|p| !p.is_valid()) {
            return Err(OrderError::ValidationError(format!(
                "Pickup out of range: {pickup}"
            )));
        }
        check_measure("distance_km", params.distance_km)?;
        check_measure("eta_minutes", params.eta_minutes)?;

        Ok(Self {
            id,
            client_name: params.client_name.trim().to_string(),
            requested_at: params.requested_at,
            pickup: params.pickup,
            dropoff: params.dropoff,
            distance_km: params.distance_km,
            eta_minutes: params.eta_minutes,
            status: OrderStatus::Pending,
            carrier: None,
        })
    }

    fn id(&self) -> &WorkOrderId {
        &self.id
    }

    /// Validates the whole patch before touching any field.
    async fn on_update(&mut self, patch: OrderPatch, _ctx: &()) -> Result<(), OrderError> {
        if self.status == OrderStatus::Completed && patch != OrderPatch::default() {
            return Err(OrderError::ValidationError(format!(
                "Order {} is completed",
                self.id
            )));
        }

        let next_status = patch.status.unwrap_or(self.status);
        if !self.status.can_transition_to(next_status) {
            return Err(OrderError::InvalidTransition {
                from: self.status,
                to: next_status,
            });
        }

        let has_carrier = patch.carrier.is_some() || self.carrier.is_some();
        match (next_status, has_carrier) {
            (OrderStatus::Pending, true) => {
                return Err(OrderError::ValidationError(
                    "A pending order cannot have a carrier".into(),
                ))
            }
            (OrderStatus::Assigned | OrderStatus::Completed, false) => {
                return Err(OrderError::ValidationError(format!(
                    "Order {} cannot be {next_status} without a carrier",
                    self.id
                )))
            }
            _ => {}
        }

        if let Some(eta) = patch.eta_minutes {
            check_measure("eta_minutes", eta)?;
        }
        if let Some(distance) = patch.distance_km {
            check_measure("distance_km", distance)?;
        }

        if let Some(eta) = patch.eta_minutes {
            self.eta_minutes = eta;
        }
        if let Some(distance) = patch.distance_km {
            self.distance_km = distance;
        }
        if let Some(carrier) = patch.carrier {
            self.carrier = Some(carrier);
        }
        self.status = next_status;
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: OrderAction,
        _ctx: &(),
    ) -> Result<WorkOrder, OrderError> {
        match action {
            OrderAction::Complete => {
                if self.status != OrderStatus::Assigned {
                    return Err(OrderError::InvalidTransition {
                        from: self.status,
                        to: OrderStatus::Completed,
                    });
                }
                self.status = OrderStatus::Completed;
                Ok(self.clone())
            }
        }
    }
}

fn check_measure(field: &str, value: f64) -> Result<(), OrderError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(OrderError::ValidationError(format!(
            "{field} must be a non-negative number, got {value}"
        )))
    }
}
