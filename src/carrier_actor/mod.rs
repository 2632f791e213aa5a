//! # Carrier Store
//!
//! Owns carrier identity and last known position. Carriers are seeded from the roster when
//! the system starts; afterwards the only writer is the position simulator.

pub mod entity;
pub mod error;

pub use error::*;

use crate::clients::CarrierClient;
use crate::model::Carrier;
use fleet_actor::ResourceActor;

/// Creates a new Carrier actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<Carrier>, CarrierClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size);
    (actor, CarrierClient::new(generic_client))
}
