//! Error types for the Carrier store.

use thiserror::Error;

/// Errors that can occur during carrier operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CarrierError {
    /// The requested carrier was not found.
    #[error("Carrier not found: {0}")]
    NotFound(String),

    /// The carrier data provided is invalid.
    #[error("Carrier validation error: {0}")]
    ValidationError(String),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<String> for CarrierError {
    fn from(msg: String) -> Self {
        CarrierError::ActorCommunicationError(msg)
    }
}
