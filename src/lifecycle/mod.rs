//! Runtime wiring and lifecycle management.
//!
//! - **Store lifecycle**: spawning the order and carrier stores and shutting them down
//! - **Wiring**: handing store clients and external services to the workflows
//! - **Observability setup**: initializing tracing
//!
//! # Main Components
//!
//! - [`DispatchSystem`] - owns the stores, the optimization orchestrator and the simulator
//! - [`Services`] - the optimizer, ETA predictor and roster the system calls out to
//! - [`setup_tracing`] - initializes logging

pub mod dispatch_system;
pub mod tracing;

pub use dispatch_system::{DispatchSystem, Services};
pub use self::tracing::setup_tracing;
