//! Error types for the HTTP boundary.
//!
//! Internal crates use their own `thiserror` enums (`ProviderError`,
//! `StoreError`, `OperationError`, `DispatchError`); only infra-level
//! failures that abort a job before it can produce a report are mapped
//! down to this shared type for the job-trigger HTTP surface.

use serde::Serialize;

/// API error types for HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Resource not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The catalog exceeds the per-job document cap.
    #[error("Collection exceeds capacity: {0}")]
    OverCapacity(String),

    /// An upstream provider or store call failed.
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Internal server error (wraps anyhow errors).
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::OverCapacity(_) => "OVER_CAPACITY",
            Self::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::OverCapacity(_) => 507,
            Self::ExternalService(_) => 502,
            Self::Internal(_) => 500,
        }
    }
}

/// Standardized error response body.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "axum", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self {
            error: err.to_string(),
            code: err.code().to_string(),
        }
    }
}

#[cfg(feature = "axum")]
mod axum_impl {
    use super::{ApiError, ErrorResponse};
    use axum::{
        http::StatusCode,
        response::{IntoResponse, Response},
        Json,
    };

    impl IntoResponse for ApiError {
        fn into_response(self) -> Response {
            let status = match self.status_code() {
                404 => StatusCode::NOT_FOUND,
                502 => StatusCode::BAD_GATEWAY,
                507 => StatusCode::INSUFFICIENT_STORAGE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            let body = ErrorResponse::from(&self);
            (status, Json(body)).into_response()
        }
    }
}
