//! Liveness probe. Does not touch the store — a job endpoint failing
//! doesn't mean the process itself is unhealthy.

use axum::{routing::get, Router};

use crate::app::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/healthz", get(healthz))
}

async fn healthz() -> &'static str {
    "ok"
}
