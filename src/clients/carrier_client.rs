//! # Carrier Client
//!
//! Provides a high-level API for interacting with the Carrier store.
use crate::carrier_actor::CarrierError;
use crate::model::{Carrier, CarrierCreate, CarrierId, GeoPoint};
use async_trait::async_trait;
use fleet_actor::{ActorClient, FrameworkError, ResourceClient, Snapshot};
use tokio::sync::watch;
use tracing::{debug, instrument};

/// Client for interacting with the Carrier store.
#[derive(Clone)]
pub struct CarrierClient {
    inner: ResourceClient<Carrier>,
}

impl CarrierClient {
    pub fn new(inner: ResourceClient<Carrier>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self))]
    pub async fn register(&self, params: CarrierCreate) -> Result<CarrierId, CarrierError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    /// Writes a new position for a carrier. Called on every simulator tick.
    #[instrument(skip(self), level = "debug")]
    pub async fn move_to(&self, id: CarrierId, position: GeoPoint) -> Result<Carrier, CarrierError> {
        self.inner
            .update(id, position)
            .await
            .map_err(Self::map_error)
    }

    /// Last known position of every carrier, in roster order.
    #[instrument(skip(self))]
    pub async fn positions(&self) -> Result<Vec<(CarrierId, GeoPoint)>, CarrierError> {
        let carriers = self.list().await?;
        Ok(carriers.into_iter().map(|c| (c.id, c.position)).collect())
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot<Carrier>> {
        self.inner.subscribe()
    }
}

#[async_trait]
impl ActorClient<Carrier> for CarrierClient {
    type Error = CarrierError;

    fn inner(&self) -> &ResourceClient<Carrier> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::NotFound(id) => CarrierError::NotFound(id),
            FrameworkError::AlreadyExists(id) => {
                CarrierError::ValidationError(format!("Carrier {id} already exists"))
            }
            FrameworkError::EntityError(inner) => match inner.downcast::<CarrierError>() {
                Ok(carrier_error) => *carrier_error,
                Err(other) => CarrierError::ActorCommunicationError(other.to_string()),
            },
            other => CarrierError::ActorCommunicationError(other.to_string()),
        }
    }
}
