//! Routes for the Segments bounded context.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Json, Router, routing::get, routing::post};
use beacon_core::audience::AudienceMatch;
use beacon_core::repository::SegmentRecord;
use beacon_segments::application::{command_handlers, query_handlers};
use beacon_segments::domain::commands;
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /api/v1/segments.
#[derive(Debug, Deserialize)]
pub struct CreateSegmentRequest {
    /// Display name.
    pub name: String,
    /// Rule definition, validated by the handler.
    pub definition: serde_json::Value,
}

/// Request body for PATCH /api/v1/segments/{id}.
#[derive(Debug, Deserialize)]
pub struct UpdateSegmentRequest {
    /// New display name.
    #[serde(default)]
    pub name: Option<String>,
    /// New rule definition.
    #[serde(default)]
    pub definition: Option<serde_json::Value>,
}

/// Request body for POST /api/v1/segments/preview.
#[derive(Debug, Deserialize)]
pub struct PreviewDefinitionRequest {
    /// Unsaved rule definition.
    pub definition: serde_json::Value,
}

/// POST /api/v1/segments
#[instrument(skip(state, request))]
async fn create_segment(
    State(state): State<AppState>,
    Json(request): Json<CreateSegmentRequest>,
) -> Result<(StatusCode, Json<SegmentRecord>), ApiError> {
    let command = commands::CreateSegment {
        correlation_id: Uuid::new_v4(),
        name: request.name,
        definition: request.definition,
    };

    let segment = command_handlers::handle_create_segment(
        &command,
        state.clock.as_ref(),
        &*state.repositories.segments,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(segment)))
}

/// GET /api/v1/segments
#[instrument(skip(state))]
async fn list_segments(
    State(state): State<AppState>,
) -> Result<Json<Vec<SegmentRecord>>, ApiError> {
    let segments = query_handlers::list_segments(&*state.repositories.segments).await?;
    Ok(Json(segments))
}

/// GET /api/v1/segments/{id}
#[instrument(skip(state))]
async fn get_segment(
    State(state): State<AppState>,
    Path(segment_id): Path<Uuid>,
) -> Result<Json<SegmentRecord>, ApiError> {
    let segment =
        query_handlers::get_segment_by_id(segment_id, &*state.repositories.segments).await?;
    Ok(Json(segment))
}

/// PATCH /api/v1/segments/{id}
#[instrument(skip(state, request))]
async fn update_segment(
    State(state): State<AppState>,
    Path(segment_id): Path<Uuid>,
    Json(request): Json<UpdateSegmentRequest>,
) -> Result<Json<SegmentRecord>, ApiError> {
    let command = commands::UpdateSegment {
        correlation_id: Uuid::new_v4(),
        segment_id,
        name: request.name,
        definition: request.definition,
    };

    let segment = command_handlers::handle_update_segment(
        &command,
        state.clock.as_ref(),
        &*state.repositories.segments,
    )
    .await?;

    Ok(Json(segment))
}

/// GET /api/v1/segments/{id}/preview
#[instrument(skip(state))]
async fn preview_segment(
    State(state): State<AppState>,
    Path(segment_id): Path<Uuid>,
) -> Result<Json<AudienceMatch>, ApiError> {
    let audience = query_handlers::preview_segment(
        segment_id,
        state.clock.as_ref(),
        &*state.repositories.segments,
        &*state.repositories.events,
    )
    .await?;
    Ok(Json(audience))
}

/// POST /api/v1/segments/preview
#[instrument(skip(state, request))]
async fn preview_definition(
    State(state): State<AppState>,
    Json(request): Json<PreviewDefinitionRequest>,
) -> Result<Json<AudienceMatch>, ApiError> {
    let audience = query_handlers::preview_definition(
        &request.definition,
        state.clock.as_ref(),
        &*state.repositories.events,
    )
    .await?;
    Ok(Json(audience))
}

/// Returns the router for the segments context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_segment).get(list_segments))
        .route("/preview", post(preview_definition))
        .route("/{id}", get(get_segment).patch(update_segment))
        .route("/{id}/preview", get(preview_segment))
}
