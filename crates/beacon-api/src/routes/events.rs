//! Routes for the Tracking bounded context: event ingestion.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::{Json, Router, routing::post};
use beacon_core::error::DomainError;
use beacon_tracking::application::command_handlers::{self, IngestOutcome};
use beacon_tracking::domain::commands;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the client's deduplication token.
pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

/// Request body for POST /api/v1/events.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestEventRequest {
    /// Customer email.
    pub email: String,
    /// Event type.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Optional property bag.
    #[serde(default)]
    pub properties: Option<serde_json::Value>,
    /// Optional occurrence time; defaults to now.
    #[serde(default)]
    pub occurred_at: Option<DateTime<Utc>>,
}

/// POST /api/v1/events
#[instrument(skip(state, headers, request), fields(event_type = %request.event_type))]
async fn ingest_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<IngestEventRequest>,
) -> Result<(StatusCode, Json<IngestOutcome>), ApiError> {
    let idempotency_key = match headers.get(IDEMPOTENCY_KEY_HEADER) {
        Some(value) => Some(value.to_str().map(str::to_owned).map_err(|_| {
            ApiError(DomainError::Validation(
                "Idempotency-Key header must be visible ASCII".to_owned(),
            ))
        })?),
        None => None,
    };
    let command = commands::IngestEvent {
        correlation_id: Uuid::new_v4(),
        email: request.email,
        event_type: request.event_type,
        properties: request.properties,
        occurred_at: request.occurred_at,
        idempotency_key,
    };

    let outcome = command_handlers::handle_ingest_event(
        &command,
        state.clock.as_ref(),
        &*state.repositories.customers,
        &*state.repositories.events,
    )
    .await?;

    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(outcome)))
}

/// Returns the router for event ingestion.
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(ingest_event))
}
