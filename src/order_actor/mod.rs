//! # Order Store
//!
//! The single owner of every [`WorkOrder`]. Orders are created by intake, patched by the
//! optimizer reconciliation and the ETA service, and completed by the operator. They are never
//! deleted.
//!
//! ## Structure
//!
//! - [`entity`] - [`ActorEntity`](fleet_actor::ActorEntity) implementation and patch rules
//! - [`error`] - [`OrderError`]
//! - [`actions`] - [`OrderAction`]
//! - [`new()`] - Factory function that creates the actor and client
//!
//! ## Usage
//!
//! ```rust
//! use chrono::Utc;
//! use fleet_dispatch::model::{GeoPoint, OrderCreate};
//! use fleet_dispatch::order_actor;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (actor, client) = order_actor::new(32);
//!     tokio::spawn(actor.run(()));
//!
//!     let id = client
//!         .submit(OrderCreate {
//!             id: None,
//!             client_name: "Acme".to_string(),
//!             requested_at: Utc::now(),
//!             pickup: None,
//!             dropoff: GeoPoint::new(39.0, -76.9),
//!             distance_km: 0.0,
//!             eta_minutes: 0.0,
//!         })
//!         .await?;
//!     assert_eq!(id.as_str(), "WO-1");
//!     Ok(())
//! }
//! ```

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::clients::OrderClient;
use crate::model::WorkOrder;
use fleet_actor::ResourceActor;

/// Creates a new Order actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<WorkOrder>, OrderClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size);
    (actor, OrderClient::new(generic_client))
}
