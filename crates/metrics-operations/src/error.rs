//! Errors an operation can report back to the dispatcher.

use metrics_provider::ProviderError;
use metrics_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("job cancelled")]
    Cancelled,
}
