use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use std::sync::Arc;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by actors.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Internal message type sent to a [`ResourceActor`](crate::ResourceActor).
///
/// The variants cover the lifecycle of an in-memory record: create it, read one or all of
/// them, patch one, patch many at once, or run a record-specific action. Records are never
/// removed, so there is no delete.
///
/// `UpdateBatch` is the only way to change several records in one step: the actor stages every
/// patch on copies and commits them together, so a failing patch leaves the store untouched.
#[derive(Debug)]
pub enum ResourceRequest<T: ActorEntity> {
    Create {
        params: T::Create,
        respond_to: Response<T::Id>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    List {
        respond_to: Response<Vec<T>>,
    },
    Update {
        id: T::Id,
        update: T::Update,
        respond_to: Response<T>,
    },
    UpdateBatch {
        updates: Vec<(T::Id, T::Update)>,
        respond_to: Response<Vec<T>>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
}

/// The state of a store as observers see it.
///
/// A new snapshot is published after every successful mutation. `revision` increases by
/// exactly one per committed request, including a whole batch.
#[derive(Debug, Clone)]
pub struct Snapshot<T> {
    pub revision: u64,
    pub items: Arc<Vec<T>>,
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self {
            revision: 0,
            items: Arc::new(Vec::new()),
        }
    }
}
