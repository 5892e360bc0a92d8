//! Provider adapter error types.

use thiserror::Error;

/// Errors from fetching a player count or app catalog from an upstream provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// `domain` is not one of the closed set this adapter dispatches over.
    #[error("unknown domain: {0}")]
    UnknownDomain(String),

    /// The HTTP request itself failed (connect, timeout, non-2xx).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body could not be decoded as the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// The decoded response did not contain a parseable player count.
    #[error("parse error: {0}")]
    Parse(String),
}
