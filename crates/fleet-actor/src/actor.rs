use crate::client::ResourceClient;
use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::message::{ResourceRequest, Snapshot};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// The generic actor that owns every record of one type.
///
/// # Architecture Note
/// This struct is the "server" half of a store. It owns the records and the receiving end of
/// the request channel, and it is the only code that ever mutates them. Requests are handled
/// one at a time in [`ResourceActor::run`], so the store needs no `Mutex`: the single-writer
/// discipline comes from exclusive ownership inside one Tokio task.
///
/// # Usage Pattern
///
/// 1.  **Create**: `ResourceActor::new()` returns the `actor` (server) and a `client`.
/// 2.  **Wire**: pass dependencies into `actor.run(context)`.
/// 3.  **Run**: spawn the run loop; hand clones of the client to whoever needs the store.
///
/// ```rust
/// use fleet_actor::{ActorEntity, ResourceActor};
/// use async_trait::async_trait;
///
/// #[derive(Clone, Debug)] struct Pin { id: String, label: String }
/// #[derive(Debug)] struct PinCreate { label: String }
/// #[derive(Debug)] enum PinAction {}
/// #[derive(Debug)] struct PinError;
/// impl std::fmt::Display for PinError {
///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "pin error") }
/// }
/// impl std::error::Error for PinError {}
///
/// #[async_trait]
/// impl ActorEntity for Pin {
///     type Id = String;
///     type Create = PinCreate;
///     type Update = String;
///     type Action = PinAction;
///     type ActionResult = ();
///     type Context = ();
///     type Error = PinError;
///
///     fn from_create_params(seq: u64, params: PinCreate) -> Result<Self, PinError> {
///         Ok(Self { id: format!("pin-{seq}"), label: params.label })
///     }
///     fn id(&self) -> &String { &self.id }
///     async fn on_update(&mut self, label: String, _: &()) -> Result<(), PinError> {
///         self.label = label;
///         Ok(())
///     }
///     async fn handle_action(&mut self, _: PinAction, _: &()) -> Result<(), PinError> { Ok(()) }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let (actor, client) = ResourceActor::<Pin>::new(10);
///     tokio::spawn(actor.run(()));
///
///     let id = client.create(PinCreate { label: "depot".into() }).await.unwrap();
///     assert_eq!(id, "pin-1");
/// }
/// ```
///
/// # Operations
///
/// * **Create**: builds the record with the next sequence number, runs `on_create`, rejects a
///   duplicate id with [`FrameworkError::AlreadyExists`], then inserts it.
/// * **Get / List**: clones out one record or all of them in insertion order.
/// * **Update**: runs `on_update` on the stored record.
/// * **UpdateBatch**: runs every `on_update` on staged copies; commits only if all succeed.
/// * **Action**: runs `handle_action` on the stored record.
///
/// Every successful mutation publishes a fresh [`Snapshot`] on a watch channel.
pub struct ResourceActor<T: ActorEntity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    insertion_order: Vec<T::Id>,
    next_seq: u64,
    snapshots: watch::Sender<Snapshot<T>>,
}

impl<T: ActorEntity> ResourceActor<T> {
    /// Creates a new `ResourceActor` and its associated `ResourceClient`.
    ///
    /// `buffer_size` is the capacity of the request channel; when it is full, client calls
    /// wait for space.
    pub fn new(buffer_size: usize) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let (snapshots, snapshot_rx) = watch::channel(Snapshot::default());
        let actor = Self {
            receiver,
            store: HashMap::new(),
            insertion_order: Vec::new(),
            next_seq: 1,
            snapshots,
        };
        let client = ResourceClient::new(sender, snapshot_rx);
        (actor, client)
    }

    /// Runs the actor's event loop, processing messages until every client is dropped.
    ///
    /// # Context Injection
    /// `context` is handed to every entity hook. It is supplied here rather than in `new()` so
    /// stores can be wired to each other after all of them exist.
    pub async fn run(mut self, context: T::Context) {
        // "WorkOrder" instead of "fleet_dispatch::model::work_order::WorkOrder"
        let entity_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(entity_type, "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    debug!(entity_type, ?params, "Create");
                    let seq = self.next_seq;

                    let mut item = match T::from_create_params(seq, params) {
                        Ok(item) => item,
                        Err(e) => {
                            warn!(entity_type, error = %e, "Create failed");
                            let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                            continue;
                        }
                    };
                    let id = item.id().clone();
                    if self.store.contains_key(&id) {
                        warn!(entity_type, %id, "Duplicate id");
                        let _ = respond_to.send(Err(FrameworkError::AlreadyExists(id.to_string())));
                        continue;
                    }
                    if let Err(e) = item.on_create(&context).await {
                        warn!(entity_type, %id, error = %e, "on_create failed");
                        let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                        continue;
                    }

                    self.next_seq += 1;
                    self.store.insert(id.clone(), item);
                    self.insertion_order.push(id.clone());
                    self.publish();
                    info!(entity_type, %id, size = self.store.len(), "Created");
                    let _ = respond_to.send(Ok(id));
                }
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    let found = item.is_some();
                    debug!(entity_type, %id, found, "Get");
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::List { respond_to } => {
                    debug!(entity_type, size = self.store.len(), "List");
                    let _ = respond_to.send(Ok(self.ordered_items()));
                }
                ResourceRequest::Update {
                    id,
                    update,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?update, "Update");
                    let Some(item) = self.store.get_mut(&id) else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                        continue;
                    };
                    if let Err(e) = item.on_update(update, &context).await {
                        warn!(entity_type, %id, error = %e, "Update failed");
                        let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                        continue;
                    }
                    let updated = item.clone();
                    self.publish();
                    info!(entity_type, %id, "Updated");
                    let _ = respond_to.send(Ok(updated));
                }
                ResourceRequest::UpdateBatch {
                    updates,
                    respond_to,
                } => {
                    let count = updates.len();
                    debug!(entity_type, count, "UpdateBatch");
                    match self.stage_batch(updates, &context).await {
                        Ok(staged) => {
                            for item in &staged {
                                self.store.insert(item.id().clone(), item.clone());
                            }
                            if !staged.is_empty() {
                                self.publish();
                            }
                            info!(entity_type, count, "Batch committed");
                            let _ = respond_to.send(Ok(staged));
                        }
                        Err(e) => {
                            warn!(entity_type, count, error = %e, "Batch rejected");
                            let _ = respond_to.send(Err(e));
                        }
                    }
                }
                ResourceRequest::Action {
                    id,
                    action,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?action, "Action");
                    let Some(item) = self.store.get_mut(&id) else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                        continue;
                    };
                    let result = item
                        .handle_action(action, &context)
                        .await
                        .map_err(|e| FrameworkError::EntityError(Box::new(e)));
                    match &result {
                        Ok(_) => {
                            self.publish();
                            debug!(entity_type, %id, "Action ok");
                        }
                        Err(e) => warn!(entity_type, %id, error = %e, "Action failed"),
                    }
                    let _ = respond_to.send(result);
                }
            }
        }

        info!(entity_type, size = self.store.len(), "Shutdown");
    }

    /// Applies every patch to a copy. Later patches for the same id build on earlier ones.
    async fn stage_batch(
        &self,
        updates: Vec<(T::Id, T::Update)>,
        context: &T::Context,
    ) -> Result<Vec<T>, FrameworkError> {
        let mut staged: Vec<T> = Vec::with_capacity(updates.len());
        for (id, update) in updates {
            let base = staged
                .iter()
                .rev()
                .find(|item| item.id() == &id)
                .or_else(|| self.store.get(&id))
                .cloned()
                .ok_or_else(|| FrameworkError::NotFound(id.to_string()))?;
            let mut item = base;
            item.on_update(update, context)
                .await
                .map_err(|e| FrameworkError::EntityError(Box::new(e)))?;
            staged.push(item);
        }
        Ok(staged)
    }

    fn ordered_items(&self) -> Vec<T> {
        self.insertion_order
            .iter()
            .filter_map(|id| self.store.get(id).cloned())
            .collect()
    }

    fn publish(&mut self) {
        let revision = self.snapshots.borrow().revision + 1;
        let items = Arc::new(self.ordered_items());
        self.snapshots.send_replace(Snapshot { revision, items });
    }
}
