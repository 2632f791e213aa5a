//! Domain clients wrapping the generic [`ResourceClient`](fleet_actor::ResourceClient) of each
//! store. Both implement [`ActorClient`](fleet_actor::ActorClient), which provides `get` and
//! `list`.

pub mod carrier_client;
pub mod order_client;

pub use carrier_client::CarrierClient;
pub use order_client::OrderClient;
