//! # Fleet Dispatch
//!
//! The dispatch core of a small delivery fleet: it keeps work orders and carriers, asks an
//! external optimizer for assignments, folds the answer back into the order store and plays
//! the returned routes back as carrier position updates.
//!
//! ## Architecture
//!
//! Both stores are single-writer actors built on [`fleet_actor::ResourceActor`]. Every
//! mutation goes through the owning task, and each successful write or batch publishes one
//! new snapshot revision. Everything else talks to the stores through typed clients.
//!
//! ## Module Tour
//!
//! ### 1. Data ([`model`])
//! Work orders, carriers, coordinates and the optimizer wire format.
//!
//! ### 2. Stores ([`order_actor`], [`carrier_actor`], [`clients`])
//! - **Role**: entity rules (status transitions, validation) and the clients that wrap them.
//! - **Key items**: [`OrderClient`](clients::OrderClient), [`CarrierClient`](clients::CarrierClient).
//!
//! ### 3. Workflows ([`intake`], [`reconciler`], [`orchestrator`], [`simulator`])
//! - **Intake** validates operator input and requests an ETA.
//! - **Reconciler** is a pure function from an order snapshot and an optimizer response to a
//!   batch of patches plus rejections.
//! - **Orchestrator** runs one optimization at a time and applies the reconciliation atomically.
//! - **Simulator** moves carriers along their routes, one waypoint per tick.
//!
//! ### 4. Outside world ([`services`], [`notify`])
//! Traits for the optimizer, ETA and roster services with HTTP and in-process
//! implementations, and a broadcast channel for operator notifications.
//!
//! ### 5. Wiring ([`lifecycle`], [`config`], [`error`])
//! [`DispatchSystem`](lifecycle::DispatchSystem) starts and stops everything.
//!
//! ## Running the Demo
//!
//! ```bash
//! RUST_LOG=info cargo run
//! ```

pub mod carrier_actor;
pub mod clients;
pub mod config;
pub mod error;
pub mod intake;
pub mod lifecycle;
pub mod model;
pub mod notify;
pub mod orchestrator;
pub mod order_actor;
pub mod reconciler;
pub mod services;
pub mod simulator;
