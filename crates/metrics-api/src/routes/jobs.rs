//! One route per named job. Each runs its job to completion (or deadline)
//! and echoes the resulting tally. Per-app failures never surface as HTTP
//! errors — only infra-level failures (`OverCapacity`, a dead store) do.

use axum::{extract::State, routing::post, Json, Router};
use metrics_core::ApiError;
use metrics_dispatcher::{DispatchError, Report};
use metrics_jobs::JobError;
use metrics_operations::JobContext;
use metrics_store::StoreError;
use serde::Serialize;

use crate::app::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/daily", post(daily))
        .route("/monthly", post(monthly))
        .route("/track", post(track))
        .route("/refresh", post(refresh))
        .route("/recover", post(recover))
}

#[derive(Debug, Serialize)]
struct JobResponse {
    job: String,
    success: usize,
    errors: usize,
}

impl From<Report> for JobResponse {
    fn from(report: Report) -> Self {
        Self {
            job: report.job_kind.to_string(),
            success: report.success,
            errors: report.errors,
        }
    }
}

fn map_job_error(err: JobError) -> ApiError {
    match err {
        JobError::Dispatch(DispatchError::OverCapacity(n))
        | JobError::Store(StoreError::OverCapacity(n)) => {
            ApiError::OverCapacity(format!("{n} documents exceeds the job capacity"))
        }
        other => ApiError::ExternalService(other.to_string()),
    }
}

async fn daily(State(state): State<AppState>) -> Result<Json<JobResponse>, ApiError> {
    let ctx = JobContext::new(state.provider.clone());
    let report = metrics_jobs::daily(&state.dispatcher, &state.store, ctx)
        .await
        .map_err(map_job_error)?;
    Ok(Json(report.into()))
}

async fn monthly(State(state): State<AppState>) -> Result<Json<JobResponse>, ApiError> {
    let ctx = JobContext::new(state.provider.clone());
    let report = metrics_jobs::monthly(&state.dispatcher, &state.store, ctx)
        .await
        .map_err(map_job_error)?;
    Ok(Json(report.into()))
}

async fn track(State(state): State<AppState>) -> Result<Json<JobResponse>, ApiError> {
    let ctx = JobContext::new(state.provider.clone());
    let report = metrics_jobs::track(&state.dispatcher, &state.store, ctx)
        .await
        .map_err(map_job_error)?;
    Ok(Json(report.into()))
}

async fn refresh(State(state): State<AppState>) -> Result<Json<JobResponse>, ApiError> {
    let ctx = JobContext::new(state.provider.clone());
    let report = metrics_jobs::refresh(&state.dispatcher, &state.store, ctx)
        .await
        .map_err(map_job_error)?;
    Ok(Json(report.into()))
}

async fn recover(State(state): State<AppState>) -> Result<Json<JobResponse>, ApiError> {
    let ctx = JobContext::new(state.provider.clone());
    let report = metrics_jobs::recovery(&state.dispatcher, &state.store, ctx)
        .await
        .map_err(map_job_error)?;
    Ok(Json(report.into()))
}
