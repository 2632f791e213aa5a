//! # Mock Stores
//!
//! `MockClient<T>` hands out a real [`ResourceClient<T>`] whose requests are answered from a
//! queue of expectations instead of a running [`ResourceActor`](crate::ResourceActor). Use it
//! to test code that talks to a store (the optimization orchestrator, a domain client) without
//! spawning the store, and to inject failures that are awkward to provoke for real.
//!
//! | | MockClient | Real Actor |
//! |---|---|---|
//! | **State** | None, answers are scripted | Real records |
//! | **Use Case** | Logic *around* a client | The store itself or the full system |
//! | **Error Injection** | `return_err` | Requires crafting bad data |
//!
//! ```rust
//! use fleet_actor::mock::MockClient;
//! use fleet_actor::{ActorEntity, FrameworkError};
//! use async_trait::async_trait;
//!
//! #[derive(Clone, Debug)] struct Stop { id: u32 }
//! #[derive(Debug)] enum StopAction {}
//! #[derive(Debug, thiserror::Error)] #[error("stop error")] struct StopError;
//!
//! #[async_trait]
//! impl ActorEntity for Stop {
//!     type Id = u32; type Create = (); type Update = ();
//!     type Action = StopAction; type ActionResult = (); type Context = (); type Error = StopError;
//!     fn from_create_params(seq: u64, _: ()) -> Result<Self, Self::Error> { Ok(Self { id: seq as u32 }) }
//!     fn id(&self) -> &u32 { &self.id }
//!     async fn on_update(&mut self, _: (), _: &()) -> Result<(), Self::Error> { Ok(()) }
//!     async fn handle_action(&mut self, _: StopAction, _: &()) -> Result<(), Self::Error> { Ok(()) }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockClient::<Stop>::new();
//!     mock.expect_list().return_err(FrameworkError::ActorClosed);
//!
//!     let result = mock.client().list().await;
//!     assert!(matches!(result, Err(FrameworkError::ActorClosed)));
//!     mock.verify();
//! }
//! ```
//!
//! For step-by-step control, [`create_mock_client`] returns the raw request receiver and the
//! `expect_*` helper functions pull typed requests off it.

use crate::client::ResourceClient;
use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::message::{ResourceRequest, Snapshot};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot, watch};

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// An expected request and the scripted reply.
enum Expectation<T: ActorEntity> {
    Get {
        response: Result<Option<T>, FrameworkError>,
    },
    Create {
        response: Result<T::Id, FrameworkError>,
    },
    List {
        response: Result<Vec<T>, FrameworkError>,
    },
    UpdateBatch {
        response: Result<Vec<T>, FrameworkError>,
    },
    Action {
        response: Result<T::ActionResult, FrameworkError>,
    },
}

/// A mock store with expectation tracking.
///
/// Expectations are consumed in order. A request that does not match the next expectation
/// panics the background task, which surfaces to the caller as
/// [`FrameworkError::ActorDropped`].
pub struct MockClient<T: ActorEntity> {
    client: ResourceClient<T>,
    expectations: Arc<Mutex<VecDeque<Expectation<T>>>>,
    received: Arc<Mutex<Vec<String>>>,
    _snapshots: watch::Sender<Snapshot<T>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: ActorEntity> Default for MockClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ActorEntity> MockClient<T> {
    /// Creates a new mock client with no expectations.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<ResourceRequest<T>>(100);
        let (snapshots, snapshot_rx) = watch::channel(Snapshot::default());
        let expectations = Arc::new(Mutex::new(VecDeque::new()));
        let received = Arc::new(Mutex::new(Vec::new()));
        let expectations_clone = expectations.clone();
        let received_clone = received.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                received_clone
                    .lock()
                    .unwrap()
                    .push(request_kind(&request).to_string());
                let expectation = expectations_clone.lock().unwrap().pop_front();

                match (request, expectation) {
                    (ResourceRequest::Get { respond_to, .. }, Some(Expectation::Get { response })) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        ResourceRequest::Create { respond_to, .. },
                        Some(Expectation::Create { response }),
                    ) => {
                        let _ = respond_to.send(response);
                    }
                    (ResourceRequest::List { respond_to }, Some(Expectation::List { response })) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        ResourceRequest::UpdateBatch { respond_to, .. },
                        Some(Expectation::UpdateBatch { response }),
                    ) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        ResourceRequest::Action { respond_to, .. },
                        Some(Expectation::Action { response }),
                    ) => {
                        let _ = respond_to.send(response);
                    }
                    (request, _) => {
                        panic!(
                            "Unexpected {} request or expectation mismatch",
                            request_kind(&request)
                        );
                    }
                }
            }
        });

        Self {
            client: ResourceClient::new(sender, snapshot_rx),
            expectations,
            received,
            _snapshots: snapshots,
            _handle: handle,
        }
    }

    /// Returns the client for use in tests.
    pub fn client(&self) -> ResourceClient<T> {
        self.client.clone()
    }

    /// Expects a `get` operation.
    pub fn expect_get(&mut self) -> ExpectationBuilder<T, Option<T>> {
        ExpectationBuilder::new(self.expectations.clone(), |response| Expectation::Get {
            response,
        })
    }

    /// Expects a `create` operation.
    pub fn expect_create(&mut self) -> ExpectationBuilder<T, T::Id> {
        ExpectationBuilder::new(self.expectations.clone(), |response| Expectation::Create {
            response,
        })
    }

    /// Expects a `list` operation.
    pub fn expect_list(&mut self) -> ExpectationBuilder<T, Vec<T>> {
        ExpectationBuilder::new(self.expectations.clone(), |response| Expectation::List {
            response,
        })
    }

    /// Expects an `update_batch` operation.
    pub fn expect_update_batch(&mut self) -> ExpectationBuilder<T, Vec<T>> {
        ExpectationBuilder::new(self.expectations.clone(), |response| {
            Expectation::UpdateBatch { response }
        })
    }

    /// Expects an `action` operation.
    pub fn expect_action(&mut self) -> ExpectationBuilder<T, T::ActionResult> {
        ExpectationBuilder::new(self.expectations.clone(), |response| Expectation::Action {
            response,
        })
    }

    /// Request kinds received so far, in arrival order (e.g. `["List", "UpdateBatch"]`).
    pub fn received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }
}

/// Builder that queues the reply for one expected request.
pub struct ExpectationBuilder<T: ActorEntity, R> {
    expectations: Arc<Mutex<VecDeque<Expectation<T>>>>,
    wrap: fn(Result<R, FrameworkError>) -> Expectation<T>,
}

impl<T: ActorEntity, R> ExpectationBuilder<T, R> {
    fn new(
        expectations: Arc<Mutex<VecDeque<Expectation<T>>>>,
        wrap: fn(Result<R, FrameworkError>) -> Expectation<T>,
    ) -> Self {
        Self { expectations, wrap }
    }

    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: R) {
        self.expectations
            .lock()
            .unwrap()
            .push_back((self.wrap)(Ok(value)));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: FrameworkError) {
        self.expectations
            .lock()
            .unwrap()
            .push_back((self.wrap)(Err(error)));
    }
}

fn request_kind<T: ActorEntity>(request: &ResourceRequest<T>) -> &'static str {
    match request {
        ResourceRequest::Create { .. } => "Create",
        ResourceRequest::Get { .. } => "Get",
        ResourceRequest::List { .. } => "List",
        ResourceRequest::Update { .. } => "Update",
        ResourceRequest::UpdateBatch { .. } => "UpdateBatch",
        ResourceRequest::Action { .. } => "Action",
    }
}

// =============================================================================
// RAW RECEIVER HELPERS
// =============================================================================

/// Creates a client and the receiver its requests arrive on.
///
/// The test plays the actor: pull a request with one of the `expect_*` helpers, assert on its
/// payload, then answer through the returned responder.
pub fn create_mock_client<T: ActorEntity>(
    buffer_size: usize,
) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    let (_snapshots, snapshot_rx) = watch::channel(Snapshot::default());
    (ResourceClient::new(sender, snapshot_rx), receiver)
}

/// Helper to verify that the next message is a Create request
pub async fn expect_create<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Create, oneshot::Sender<Result<T::Id, FrameworkError>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { params, respond_to }) => Some((params, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Update request
pub async fn expect_update<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, T::Update, oneshot::Sender<Result<T, FrameworkError>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Update {
            id,
            update,
            respond_to,
        }) => Some((id, update, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an UpdateBatch request
pub async fn expect_update_batch<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(
    Vec<(T::Id, T::Update)>,
    oneshot::Sender<Result<Vec<T>, FrameworkError>>,
)> {
    match receiver.recv().await {
        Some(ResourceRequest::UpdateBatch {
            updates,
            respond_to,
        }) => Some((updates, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Action request
pub async fn expect_action<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(
    T::Id,
    T::Action,
    oneshot::Sender<Result<T::ActionResult, FrameworkError>>,
)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action {
            id,
            action,
            respond_to,
        }) => Some((id, action, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    #[derive(Clone, Debug, PartialEq)]
    struct Depot {
        id: u32,
        name: String,
    }

    #[derive(Debug)]
    struct DepotCreate {
        name: String,
    }

    #[derive(Debug)]
    enum DepotAction {}

    #[derive(Debug, thiserror::Error)]
    #[error("Depot error")]
    struct DepotError;

    #[async_trait]
    impl ActorEntity for Depot {
        type Id = u32;
        type Create = DepotCreate;
        type Update = String;
        type Action = DepotAction;
        type ActionResult = ();
        type Context = ();
        type Error = DepotError;

        fn from_create_params(seq: u64, params: DepotCreate) -> Result<Self, Self::Error> {
            Ok(Self {
                id: seq as u32,
                name: params.name,
            })
        }

        fn id(&self) -> &u32 {
            &self.id
        }

        async fn on_update(&mut self, name: String, _ctx: &()) -> Result<(), Self::Error> {
            self.name = name;
            Ok(())
        }

        async fn handle_action(&mut self, _action: DepotAction, _ctx: &()) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_raw_receiver_round_trip() {
        let (client, mut receiver) = create_mock_client::<Depot>(10);

        let create_task = tokio::spawn(async move {
            client
                .create(DepotCreate {
                    name: "North".to_string(),
                })
                .await
        });

        let (payload, responder) = expect_create(&mut receiver)
            .await
            .expect("Expected Create request");
        assert_eq!(payload.name, "North");
        responder.send(Ok(7)).unwrap();

        let result = create_task.await.unwrap();
        assert!(matches!(result, Ok(7)));
    }

    #[tokio::test]
    async fn test_expectations_are_served_in_order() {
        let mut mock = MockClient::<Depot>::new();
        mock.expect_create().return_ok(1);
        mock.expect_list().return_ok(vec![Depot {
            id: 1,
            name: "North".to_string(),
        }]);
        mock.expect_update_batch()
            .return_err(FrameworkError::NotFound("9".to_string()));

        let client = mock.client();
        let id = client
            .create(DepotCreate {
                name: "North".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(id, 1);

        let all = client.list().await.unwrap();
        assert_eq!(all.len(), 1);

        let batch = client.update_batch(vec![(9, "Gone".to_string())]).await;
        assert!(matches!(batch, Err(FrameworkError::NotFound(_))));

        assert_eq!(mock.received(), vec!["Create", "List", "UpdateBatch"]);
        mock.verify();
    }

    #[tokio::test]
    async fn test_unexpected_request_surfaces_as_dropped() {
        let mock = MockClient::<Depot>::new();
        let result = mock.client().get(1).await;
        assert!(matches!(result, Err(FrameworkError::ActorDropped)));
    }
}
