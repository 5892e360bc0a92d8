//! Errors that abort a job before any task is spawned.

use metrics_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("collection exceeds capacity: {0} documents")]
    OverCapacity(usize),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
