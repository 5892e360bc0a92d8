//! Smoke tests for the job trigger surface.
//!
//! Every test needs `DATABASE_URL` set to a reachable Postgres instance;
//! they skip gracefully (not fail) when it isn't, the same convention the
//! wider test suite uses for its database-backed smoke tests.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use metrics_api::app::create_app;
use metrics_config::Settings;
use tokio::time::{timeout, Duration};
use tower::ServiceExt;
use tracing::warn;

async fn create_test_app() -> Option<axum::Router> {
    let settings = Settings::from_env().ok()?;
    match create_app(&settings).await {
        Ok(app) => Some(app),
        Err(e) => {
            warn!(error = %e, "could not create test app (DB may be unavailable), skipping");
            None
        }
    }
}

async fn make_request(app: &axum::Router, method: &str, path: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method(method)
        .uri(path)
        .body(Body::empty())
        .expect("request should be valid");

    let response = timeout(Duration::from_secs(10), app.clone().oneshot(request))
        .await
        .expect("request should not time out")
        .expect("request should succeed");

    let status = response.status();
    let body = timeout(Duration::from_secs(10), response.into_body().collect())
        .await
        .expect("body collection should not time out")
        .expect("body should collect")
        .to_bytes();

    let json = if body.is_empty() {
        serde_json::json!({})
    } else {
        serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null)
    };

    (status, json)
}

#[tokio::test]
async fn healthz_returns_200() {
    let Some(app) = create_test_app().await else {
        return;
    };

    let request = Request::builder()
        .method("GET")
        .uri("/healthz")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn daily_job_on_empty_catalog_reports_zero_and_zero() {
    let Some(app) = create_test_app().await else {
        return;
    };

    let (status, json) = make_request(&app, "POST", "/daily").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.get("job").and_then(|v| v.as_str()), Some("daily"));
    assert_eq!(json.get("success").and_then(serde_json::Value::as_u64), Some(0));
}
