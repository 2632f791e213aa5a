//! # External Services
//!
//! The optimizer, the ETA predictor and the carrier roster sit behind capability traits. The
//! [`http`] module talks to the real endpoints; [`scripted`] holds in-process stand-ins that
//! answer from a script, used by tests and offline runs.

pub mod http;
pub mod roster;
pub mod scripted;

pub use http::{HttpEtaPredictor, HttpOptimizer, HttpRoster};
pub use roster::StaticRoster;
pub use scripted::{FixedEta, ScriptedOptimizer};

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::error::ErrorKind;
use crate::model::{CarrierCreate, EtaPrediction, EtaRequest, OptimizerResponse, WorkOrder};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ServiceError {
    #[error("Network failure: {0}")]
    Network(String),

    /// Non-2xx status. `body` is the response text, possibly empty.
    #[error("Service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Network(_) => ErrorKind::NetworkFailure,
            ServiceError::Status { .. } => ErrorKind::ServiceError,
            ServiceError::Malformed(_) => ErrorKind::MalformedResponse,
            ServiceError::Timeout(_) => ErrorKind::Timeout,
        }
    }
}

/// Route optimizer. Receives the order snapshot the response will be reconciled against.
#[async_trait]
pub trait OptimizerService: Send + Sync {
    async fn submit(&self, snapshot: &[WorkOrder]) -> Result<OptimizerResponse, ServiceError>;
}

/// ETA and distance prediction for a single new order.
#[async_trait]
pub trait EtaPredictor: Send + Sync {
    async fn predict(&self, request: &EtaRequest) -> Result<EtaPrediction, ServiceError>;
}

/// Source of the carrier roster loaded at startup.
#[async_trait]
pub trait RosterSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<CarrierCreate>, ServiceError>;
}
