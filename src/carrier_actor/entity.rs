//! [`ActorEntity`] implementation for [`Carrier`].
//!
//! A patch is a position fix. Carriers have no custom actions.

use async_trait::async_trait;
use fleet_actor::ActorEntity;

use super::error::CarrierError;
use crate::model::{Carrier, CarrierCreate, CarrierId, GeoPoint};

/// Carriers accept no actions; the type has no values.
#[derive(Debug, Clone)]
pub enum CarrierAction {}

#[async_trait]
impl ActorEntity for Carrier {
    type Id = CarrierId;
    type Create = CarrierCreate;
    type Update = GeoPoint;
    type Action = CarrierAction;
    type ActionResult = ();
    type Context = ();
    type Error = CarrierError;

    fn from_create_params(_seq: u64, params: CarrierCreate) -> Result<Self, CarrierError> {
        if params.id.as_str().trim().is_empty() {
            return Err(CarrierError::ValidationError("Carrier id must not be empty".into()));
        }
        let position = GeoPoint::new(params.lat, params.lng);
        if !position.is_valid() {
            return Err(CarrierError::ValidationError(format!(
                "Position out of range: {position}"
            )));
        }
        if !params.hours_worked.is_finite() || params.hours_worked < 0.0 {
            return Err(CarrierError::ValidationError(format!(
                "hours_worked must be a non-negative number, got {}",
                params.hours_worked
            )));
        }

        let name = params
            .name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| format!("Carrier {}", params.id));
        Ok(Self {
            id: params.id,
            name,
            position,
            hours_worked: params.hours_worked,
            status: params.status,
        })
    }

    fn id(&self) -> &CarrierId {
        &self.id
    }

    async fn on_update(&mut self, position: GeoPoint, _ctx: &()) -> Result<(), CarrierError> {
        if !position.is_valid() {
            return Err(CarrierError::ValidationError(format!(
                "Position out of range: {position}"
            )));
        }
        self.position = position;
        Ok(())
    }

    async fn handle_action(&mut self, action: CarrierAction, _ctx: &()) -> Result<(), CarrierError> {
        match action {}
    }
}
