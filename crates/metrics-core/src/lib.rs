//! # Metrics Core
//!
//! Shared domain types for the metrics tracker: the `App` document family
//! and the HTTP-boundary error type.

pub mod error;
pub mod types;

pub use error::{ApiError, ErrorResponse};
pub use types::{App, AppId, DailySample, Domain, ExceptionEntry, MonthRecord, StaticData};

/// Maximum documents a single job may operate over.
pub const CAPACITY: usize = 200_000;

/// Number of trailing months the Track operation inspects for activity.
pub const NO_ACTIVITY_LIMIT: usize = 3;

/// Result type alias for internal operations using `anyhow`.
pub type Result<T> = anyhow::Result<T>;
