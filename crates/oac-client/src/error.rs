use thiserror::Error;

use oac_core::error::{BuildError, SpecError};

use crate::transport::TransportError;
use crate::validation::ValidationError;

/// Umbrella error for client construction and operation calls.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("spec error: {0}")]
    Spec(#[from] SpecError),

    #[error("{0}")]
    Build(#[from] BuildError),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("unknown operation: {0}")]
    UnknownOperation(String),
}
