//! # Order Client
//!
//! Provides a high-level API for interacting with the Order store.
//! It wraps a `ResourceClient<WorkOrder>` and exposes dispatch-specific operations.
use crate::model::{EtaPrediction, OrderCreate, OrderPatch, WorkOrder, WorkOrderId};
use crate::order_actor::{OrderAction, OrderError};
use async_trait::async_trait;
use fleet_actor::{ActorClient, FrameworkError, ResourceClient, Snapshot};
use tokio::sync::watch;
use tracing::{debug, instrument};

/// Client for interacting with the Order store.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<WorkOrder>,
}

impl OrderClient {
    pub fn new(inner: ResourceClient<WorkOrder>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self))]
    pub async fn submit(&self, params: OrderCreate) -> Result<WorkOrderId, OrderError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    /// Every order in submission order, read in one step.
    #[instrument(skip(self))]
    pub async fn snapshot(&self) -> Result<Vec<WorkOrder>, OrderError> {
        self.list().await
    }

    /// Applies all patches as one unit: the store commits every patch or none of them.
    #[instrument(skip(self, patches), fields(count = patches.len()))]
    pub async fn apply_patches(
        &self,
        patches: Vec<(WorkOrderId, OrderPatch)>,
    ) -> Result<Vec<WorkOrder>, OrderError> {
        debug!("Sending request");
        self.inner
            .update_batch(patches)
            .await
            .map_err(Self::map_error)
    }

    /// Stores the output of the ETA-prediction service on an order.
    #[instrument(skip(self))]
    pub async fn record_prediction(
        &self,
        id: WorkOrderId,
        prediction: EtaPrediction,
    ) -> Result<WorkOrder, OrderError> {
        debug!("Sending request");
        self.inner
            .update(
                id,
                OrderPatch::prediction(prediction.eta_minutes, prediction.distance_km),
            )
            .await
            .map_err(Self::map_error)
    }

    /// Marks an assigned order as completed.
    #[instrument(skip(self))]
    pub async fn complete(&self, id: WorkOrderId) -> Result<WorkOrder, OrderError> {
        debug!("Sending request");
        self.inner
            .perform_action(id, OrderAction::Complete)
            .await
            .map_err(Self::map_error)
    }

    /// Observe every published state of the store.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<WorkOrder>> {
        self.inner.subscribe()
    }
}

#[async_trait]
impl ActorClient<WorkOrder> for OrderClient {
    type Error = OrderError;

    fn inner(&self) -> &ResourceClient<WorkOrder> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::NotFound(id) => OrderError::NotFound(id),
            FrameworkError::AlreadyExists(id) => {
                OrderError::ValidationError(format!("Order {id} already exists"))
            }
            FrameworkError::EntityError(inner) => match inner.downcast::<OrderError>() {
                Ok(order_error) => *order_error,
                Err(other) => OrderError::ActorCommunicationError(other.to_string()),
            },
            other => OrderError::ActorCommunicationError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OrderStatus;
    use fleet_actor::mock::{create_mock_client, expect_action, expect_update, expect_update_batch};

    #[tokio::test]
    async fn test_apply_patches_sends_one_batch() {
        let (client, mut receiver) = create_mock_client::<WorkOrder>(10);
        let order_client = OrderClient::new(client);

        let patches = vec![
            (WorkOrderId::from("WO-1"), OrderPatch::assign("C1".into(), Some(12.0))),
            (WorkOrderId::from("WO-2"), OrderPatch::assign("C2".into(), None)),
        ];
        let task = tokio::spawn(async move { order_client.apply_patches(patches).await });

        let (updates, responder) = expect_update_batch(&mut receiver)
            .await
            .expect("Expected UpdateBatch request");
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].0, WorkOrderId::from("WO-1"));
        assert_eq!(updates[1].1.eta_minutes, None);
        responder.send(Ok(Vec::new())).unwrap();

        assert!(task.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_record_prediction_patches_eta_and_distance() {
        let (client, mut receiver) = create_mock_client::<WorkOrder>(10);
        let order_client = OrderClient::new(client);

        let task = tokio::spawn(async move {
            order_client
                .record_prediction(
                    WorkOrderId::from("WO-3"),
                    EtaPrediction {
                        eta_minutes: 22.5,
                        distance_km: 9.3,
                    },
                )
                .await
        });

        let (id, patch, responder) = expect_update(&mut receiver)
            .await
            .expect("Expected Update request");
        assert_eq!(id, WorkOrderId::from("WO-3"));
        assert_eq!(patch, OrderPatch::prediction(22.5, 9.3));
        responder
            .send(Err(FrameworkError::NotFound("WO-3".to_string())))
            .unwrap();

        let result = task.await.unwrap();
        assert_eq!(result, Err(OrderError::NotFound("WO-3".to_string())));
    }

    #[tokio::test]
    async fn test_complete_preserves_entity_error() {
        let (client, mut receiver) = create_mock_client::<WorkOrder>(10);
        let order_client = OrderClient::new(client);

        let task =
            tokio::spawn(async move { order_client.complete(WorkOrderId::from("WO-1")).await });

        let (_, action, responder) = expect_action(&mut receiver)
            .await
            .expect("Expected Action request");
        assert!(matches!(action, OrderAction::Complete));
        responder
            .send(Err(FrameworkError::EntityError(Box::new(
                OrderError::InvalidTransition {
                    from: OrderStatus::Pending,
                    to: OrderStatus::Completed,
                },
            ))))
            .unwrap();

        let result = task.await.unwrap();
        assert!(matches!(
            result,
            Err(OrderError::InvalidTransition {
                from: OrderStatus::Pending,
                ..
            })
        ));
    }
}
