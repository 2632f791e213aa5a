//! # Store Entities
//!
//! The [`ActorEntity`] trait is the contract between a domain type (a work order, a carrier)
//! and the generic [`ResourceActor`](crate::ResourceActor) that owns every instance of it.

use async_trait::async_trait;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait that any record must implement to be owned by a [`ResourceActor`](crate::ResourceActor).
///
/// # Identity
/// Unlike a database-style store, records here usually carry an identity chosen outside the
/// store (an order number typed by an operator, a carrier id from the roster). The actor hands
/// `from_create_params` a 1-based insertion sequence number that the entity may use to mint an
/// id when the caller did not supply one, and afterwards keys the record by [`ActorEntity::id`].
///
/// # Async & Context
/// Hooks are `#[async_trait]` so they may talk to other stores. The `Context` type is injected
/// into every hook when the actor starts running ("late binding" of dependencies).
#[async_trait]
pub trait ActorEntity: Clone + Send + Sync + 'static {
    /// The unique identifier for this record.
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;

    /// The data required to create a new record.
    type Create: Send + Sync + Debug;

    /// The data required to patch an existing record.
    type Update: Send + Sync + Debug;

    /// Record-specific operations beyond create/patch (e.g. `Complete`, `MoveTo`).
    type Action: Send + Sync + Debug;

    /// The result type returned by actions.
    type ActionResult: Send + Sync + Debug;

    /// Dependencies injected into the actor. Use `()` if none are needed.
    type Context: Send + Sync;

    /// The error type for this record.
    ///
    /// One error enum per store rather than one per message: callers match on a single type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Build the record from its payload. `seq` is the store's insertion counter.
    fn from_create_params(seq: u64, params: Self::Create) -> Result<Self, Self::Error>;

    /// The key this record is stored under.
    fn id(&self) -> &Self::Id;

    // --- Lifecycle Hooks (Async) ---

    /// Called after construction, before the record becomes visible.
    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Apply a patch. Implementations must leave `self` untouched when returning an error;
    /// batch patches rely on this to stay all-or-nothing.
    async fn on_update(
        &mut self,
        update: Self::Update,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error>;

    // --- Action Handler (Async) ---

    /// Handle a record-specific action.
    async fn handle_action(
        &mut self,
        action: Self::Action,
        _ctx: &Self::Context,
    ) -> Result<Self::ActionResult, Self::Error>;
}
