//! Store error types

use thiserror::Error;

/// Errors from document store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store lock poisoned")]
    Poisoned,
}
