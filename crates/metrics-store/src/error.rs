//! Catalog store error types.

use thiserror::Error;

/// Errors from the document store (App catalog + Exception queue).
#[derive(Debug, Error)]
pub enum StoreError {
    /// `replace_app`/`set_tracked`/`get_app` targeted a document that does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The target collection exceeds [`metrics_core::CAPACITY`].
    #[error("collection exceeds capacity: {0} documents")]
    OverCapacity(usize),

    /// The underlying database connection or query failed.
    #[error("database error: {0}")]
    Connection(#[from] sqlx::Error),

    /// A stored document could not be decoded into its expected shape.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}
