//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use beacon_assist::AssistProvider;
use beacon_test_support::FixedClock;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use beacon_api::state::{AppState, Repositories};

/// Build the full app with PostgreSQL repositories and the fixed test clock.
pub fn build_test_app(pool: PgPool) -> Router {
    let repositories = Repositories::postgres(&pool);
    let app_state = AppState::new(
        pool,
        Arc::new(FixedClock::reference()),
        repositories,
        AssistProvider::Mock.build(),
    );
    beacon_api::app(app_state)
}

/// Send a request with an optional JSON body and extra headers.
pub async fn request_json(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<&serde_json::Value>,
    headers: &[(&str, &str)],
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body_bytes).unwrap_or(serde_json::Value::Null);

    (status, json)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    request_json(app, "POST", uri, Some(body), &[]).await
}

/// Send a PATCH request with a JSON body and return the response.
pub async fn patch_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    request_json(app, "PATCH", uri, Some(body), &[]).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    request_json(app, "GET", uri, None, &[]).await
}
