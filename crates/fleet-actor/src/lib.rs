//! # Fleet Actor
//!
//! Building blocks for the in-memory stores of the dispatch system. Each store is a single
//! Tokio task that owns every record of one type and serves requests from a channel, so
//! records are only ever changed by one writer and readers always get a consistent copy.
//!
//! ## Architecture Overview
//!
//! 1. **Entity Layer** ([`ActorEntity`]) - the record type and its validation hooks
//! 2. **Runtime Layer** ([`ResourceActor`]) - the task that owns and mutates records
//! 3. **Interface Layer** ([`ResourceClient`]) - cloneable, typed handle to a store
//!
//! Domain logic lives once in the entity; the framework handles message passing, error
//! mapping and publishing snapshots to observers.
//!
//! ```rust
//! use fleet_actor::{ActorEntity, FrameworkError, ResourceActor};
//! use async_trait::async_trait;
//!
//! #[derive(Clone, Debug)]
//! struct Job {
//!     id: String,
//!     minutes: f64,
//! }
//!
//! #[derive(Debug)] struct JobCreate { id: Option<String>, minutes: f64 }
//! #[derive(Debug)] enum JobAction {}
//! #[derive(Debug, thiserror::Error)]
//! #[error("{0}")]
//! struct JobError(String);
//!
//! #[async_trait]
//! impl ActorEntity for Job {
//!     type Id = String;
//!     type Create = JobCreate;
//!     type Update = f64;
//!     type Action = JobAction;
//!     type ActionResult = ();
//!     type Context = ();
//!     type Error = JobError;
//!
//!     fn from_create_params(seq: u64, params: JobCreate) -> Result<Self, JobError> {
//!         let id = params.id.unwrap_or_else(|| format!("J-{seq}"));
//!         Ok(Self { id, minutes: params.minutes })
//!     }
//!
//!     fn id(&self) -> &String { &self.id }
//!
//!     async fn on_update(&mut self, minutes: f64, _: &()) -> Result<(), JobError> {
//!         if minutes < 0.0 {
//!             return Err(JobError("negative".into()));
//!         }
//!         self.minutes = minutes;
//!         Ok(())
//!     }
//!
//!     async fn handle_action(&mut self, _: JobAction, _: &()) -> Result<(), JobError> { Ok(()) }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, client) = ResourceActor::<Job>::new(10);
//!     tokio::spawn(actor.run(()));
//!
//!     let a = client.create(JobCreate { id: None, minutes: 5.0 }).await.unwrap();
//!     let b = client.create(JobCreate { id: Some("X".into()), minutes: 9.0 }).await.unwrap();
//!     assert_eq!(a, "J-1");
//!
//!     // Either both patches land or neither does.
//!     let rejected = client.update_batch(vec![(a.clone(), 7.0), (b.clone(), -1.0)]).await;
//!     assert!(matches!(rejected, Err(FrameworkError::EntityError(_))));
//!     assert_eq!(client.get(a).await.unwrap().unwrap().minutes, 5.0);
//! }
//! ```
//!
//! ## Context Injection
//!
//! Dependencies are passed to [`ResourceActor::run`], not to `new()`, so stores can hold
//! clients of each other without construction-order problems.
//!
//! ## Observing a Store
//!
//! Every successful mutation publishes a [`Snapshot`] on a watch channel. Observers call
//! [`ResourceClient::subscribe`] and see the full ordered record list plus a revision counter.
//! A batch update publishes once.
//!
//! ## Testing
//!
//! [`mock::MockClient`] answers client requests from scripted expectations, so logic built on
//! top of a store can be tested without running one.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;

// Re-export core types for convenience
pub use actor::ResourceActor;
pub use client::ResourceClient;
pub use client_trait::ActorClient;
pub use entity::ActorEntity;
pub use error::FrameworkError;
pub use message::{ResourceRequest, Response, Snapshot};
