//! Beacon — HTTP API.
//!
//! Library half of the `beacon-api` binary: configuration, telemetry,
//! shared state and the axum router, exposed so integration tests can
//! drive the same application the server runs.

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod telemetry;

use state::AppState;

/// Builds the full application router.
pub fn app(state: AppState) -> Router {
    // TODO: Replace CorsLayer::permissive() with configured origins once a browser client exists.
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/events", routes::events::router())
        .nest("/api/v1/customers", routes::customers::router())
        .nest("/api/v1/segments", routes::segments::router())
        .nest("/api/v1/campaigns", routes::campaigns::router())
        .nest("/api/v1/assist", routes::assist::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
