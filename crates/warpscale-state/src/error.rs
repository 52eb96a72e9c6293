//! Error types for the local state store.

use thiserror::Error;
use warpscale_core::ControlPlaneError;

/// Result type alias for state store operations.
pub type StateResult<T> = Result<T, StateError>;

/// Failures of the redb-backed store. Callers of the control plane see
/// all of them as transport errors.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to open state database: {0}")]
    Open(String),

    #[error("transaction error: {0}")]
    Transaction(String),

    #[error("table error: {0}")]
    Table(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("corrupt deployment record {key}: {reason}")]
    Corrupt { key: String, reason: String },

    #[error("failed to encode deployment: {0}")]
    Encode(String),
}

impl From<StateError> for ControlPlaneError {
    fn from(err: StateError) -> Self {
        ControlPlaneError::Transport(err.to_string())
    }
}
