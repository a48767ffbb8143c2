//! Error types for the dummy domain.

use role_rpc::RpcError;
use thiserror::Error;

/// Errors returned by dummy controllers and clients.
#[derive(Debug, Error)]
pub enum DummyError {
    /// The dummy data provided is invalid.
    #[error("Dummy validation error: {0}")]
    ValidationError(String),

    /// A result could not be decoded.
    #[error("Malformed dummy payload: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The call failed on its way through the RPC layer.
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),
}

impl From<DummyError> for RpcError {
    fn from(e: DummyError) -> Self {
        match e {
            DummyError::Rpc(inner) => inner,
            DummyError::ValidationError(message) => RpcError::Validation(vec![message]),
            other => RpcError::Application(other.to_string()),
        }
    }
}
