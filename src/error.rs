//! # Error Taxonomy
//!
//! Each component has its own error enum. [`ErrorKind`] is the coarse classification the
//! orchestrator records in its state and operators see in notifications. [`DispatchError`] is
//! what the [`DispatchSystem`](crate::lifecycle::DispatchSystem) surface returns.

use serde::Serialize;
use std::fmt::Display;
use thiserror::Error;

use crate::carrier_actor::CarrierError;
use crate::intake::ValidationError;
use crate::orchestrator::OrchestratorError;
use crate::order_actor::OrderError;
use crate::services::ServiceError;
use crate::simulator::SimulatorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    NetworkFailure,
    ServiceError,
    MalformedResponse,
    Timeout,
    ValidationError,
    /// Talking to a store failed or a store rejected the change.
    Store,
    /// The caller gave up on the operation before it finished.
    Cancelled,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ErrorKind::NetworkFailure => "network failure",
            ErrorKind::ServiceError => "service error",
            ErrorKind::MalformedResponse => "malformed response",
            ErrorKind::Timeout => "timeout",
            ErrorKind::ValidationError => "validation error",
            ErrorKind::Store => "store error",
            ErrorKind::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Carrier(#[from] CarrierError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Optimization(#[from] OrchestratorError),

    #[error(transparent)]
    Simulation(#[from] SimulatorError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Store task failed: {0}")]
    Shutdown(String),
}

impl DispatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::Order(OrderError::ValidationError(_))
            | DispatchError::Carrier(CarrierError::ValidationError(_))
            | DispatchError::Validation(_)
            | DispatchError::Config(_) => ErrorKind::ValidationError,
            DispatchError::Order(_) | DispatchError::Carrier(_) => ErrorKind::Store,
            DispatchError::Service(e) => e.kind(),
            DispatchError::Optimization(e) => e.kind(),
            DispatchError::Simulation(_) | DispatchError::Shutdown(_) => ErrorKind::Store,
        }
    }
}
